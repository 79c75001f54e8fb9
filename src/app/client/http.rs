//! Core HTTP operations for guide requests
//!
//! This module issues the conditional GET for one guide file. It does not
//! retry: a failed request is reported once and the caller decides whether to
//! fetch again.

use reqwest::header::{ACCEPT_ENCODING, IF_MODIFIED_SINCE, IF_NONE_MATCH};
use reqwest::{Client, RequestBuilder, Response};
use url::Url;

use crate::app::cache::CacheValidators;
use crate::constants::http;
use crate::errors::DownloadResult;

/// HTTP operations handler
#[derive(Debug, Clone)]
pub struct HttpHandler {
    client: Client,
}

impl HttpHandler {
    /// Creates a new HttpHandler with the given client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build the GET request for a guide file
    ///
    /// Validators, when known, are sent as `If-None-Match` and
    /// `If-Modified-Since` so the server can answer 304.
    pub fn build_request(&self, url: &Url, validators: &CacheValidators) -> RequestBuilder {
        let mut request = self
            .client
            .get(url.as_str())
            .header(ACCEPT_ENCODING, http::ACCEPT_ENCODING);

        if let Some(etag) = &validators.etag {
            request = request.header(IF_NONE_MATCH, etag.as_str());
        }
        if let Some(modified) = &validators.last_modified {
            request = request.header(IF_MODIFIED_SINCE, modified.as_str());
        }
        request
    }

    /// Send the conditional GET and return the raw response
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::Http` on transport failure. Non-success
    /// statuses are returned as responses for the caller to classify.
    pub async fn get_response(
        &self,
        url: &Url,
        validators: &CacheValidators,
    ) -> DownloadResult<Response> {
        let response = self.build_request(url, validators).send().await?;
        tracing::debug!("HTTP {} for {}", response.status().as_u16(), url);
        Ok(response)
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}
