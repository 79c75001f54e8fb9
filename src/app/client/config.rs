//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP client
//! used for guide downloads.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::http;
use crate::errors::{DownloadError, DownloadResult};

/// Configuration for the guide HTTP client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// TCP keep-alive settings
    pub tcp_keepalive: Option<Duration>,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// Request timeout
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: http::USER_AGENT.to_string(),
            tcp_keepalive: Some(http::TCP_KEEPALIVE),
            tcp_nodelay: true,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Set the User-Agent header value
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builds the HTTP client with the specified configuration
    ///
    /// Redirects follow reqwest's default policy. Response bodies are not
    /// decompressed by the client: the gzip payload is stored as received.
    pub fn build_http_client(&self) -> DownloadResult<Client> {
        let mut client_builder = Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.as_str())
            .tcp_nodelay(self.tcp_nodelay);

        if let Some(keepalive) = self.tcp_keepalive {
            client_builder = client_builder.tcp_keepalive(keepalive);
        }

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        client_builder
            .build()
            .map_err(|e| DownloadError::ClientBuild {
                reason: e.to_string(),
            })
    }
}
