//! HTTP client for guide data servers
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `request_url`: request URL construction and mirror selection
//! - `http`: conditional GET requests
//! - `download`: streaming the body into the cache with atomic writes
//!
//! [`GuideFetcher`] is the seam the scheduler dispatches through; the
//! production implementation is [`GuideClient`].

use std::future::Future;

use reqwest::StatusCode;

use crate::app::cache::CacheValidators;
use crate::app::queue::RequestInfo;
use crate::errors::{DownloadError, DownloadResult};

// Module declarations
pub mod config;
pub mod download;
pub mod http;
pub mod request_url;

pub use config::ClientConfig;
pub use request_url::{build_request_url, choose_base_url};

use download::DownloadHandler;
use http::HttpHandler;

/// Successful outcome of one guide fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// New data was written to the cache data file
    Downloaded {
        /// Size of the stored gzip payload
        bytes: u64,
    },
    /// The server confirmed the cached data is current
    NotModified,
}

/// Performs the network part of a guide request
///
/// Implementations write new data to `request.data_file` and update
/// `request.validators` from the response. They must not touch the metadata
/// file or clean up after failures; the scheduler does both.
pub trait GuideFetcher: Send + Sync + 'static {
    /// Fetch one guide file
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::NotFound` for an explicit 404 and any other
    /// `DownloadError` for transport, status or I/O failures.
    fn fetch(
        &self,
        request: &mut RequestInfo,
    ) -> impl Future<Output = DownloadResult<FetchStatus>> + Send;
}

/// HTTP client for guide servers
#[derive(Debug, Clone)]
pub struct GuideClient {
    http_handler: HttpHandler,
    download_handler: DownloadHandler,
}

impl GuideClient {
    /// Creates a new GuideClient with default configuration
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if HTTP client creation fails
    pub fn new() -> DownloadResult<Self> {
        Self::with_config(&ClientConfig::default())
    }

    /// Creates a new GuideClient with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if HTTP client creation fails
    pub fn with_config(config: &ClientConfig) -> DownloadResult<Self> {
        let client = config.build_http_client()?;
        tracing::debug!("Created guide client with user agent {}", config.user_agent);
        Ok(Self {
            http_handler: HttpHandler::new(client),
            download_handler: DownloadHandler::new(),
        })
    }
}

impl GuideFetcher for GuideClient {
    async fn fetch(&self, request: &mut RequestInfo) -> DownloadResult<FetchStatus> {
        let response = self
            .http_handler
            .get_response(&request.url, &request.validators)
            .await?;

        match response.status() {
            StatusCode::OK => {
                request.validators = CacheValidators::from_headers(response.headers());
                let bytes = self
                    .download_handler
                    .save_response(response, &request.data_file)
                    .await?;
                Ok(FetchStatus::Downloaded { bytes })
            }
            StatusCode::NOT_MODIFIED => {
                request.validators.update_from_headers(response.headers());
                Ok(FetchStatus::NotModified)
            }
            StatusCode::NOT_FOUND => Err(DownloadError::NotFound {
                url: request.url.to_string(),
            }),
            status => Err(DownloadError::ServerError {
                status: status.as_u16(),
            }),
        }
    }
}

#[cfg(test)]
mod tests;
