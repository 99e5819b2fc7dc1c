//! HTTP transport used by [`XplentyClient`](crate::XplentyClient).
//!
//! The client only needs one capability from the network: send a request
//! and hand back the response body, or fail with the status and body when
//! the API refuses it. [`ReqwestTransport`] is the default implementation;
//! anything else (a recording fake, a proxy-aware client) can be plugged in
//! with [`XplentyClient::with_transport`](crate::XplentyClient::with_transport).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use url::Url;

use crate::error::{Result, XplentyError};

const USER_AGENT: &str = concat!("xplenty-rs/", env!("CARGO_PKG_VERSION"));

/// Sends one HTTP request and returns the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the request.
    ///
    /// # Errors
    ///
    /// Returns [`XplentyError::Api`] for non-success statuses and
    /// [`XplentyError::Http`] when the request could not be sent.
    async fn perform(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>>;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Build a transport with compression enabled and a 300 second timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(Duration::from_secs(300))
            .build()?;

        Ok(Self { http })
    }

    /// Wrap an already configured `reqwest` client.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    /// Extract error message from a failed response body.
    fn extract_error_message(body: &str, status: StatusCode) -> String {
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
            if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
                return msg.to_string();
            }
            if let Some(err) = json.get("error").and_then(|m| m.as_str()) {
                return err.to_string();
            }
        }

        if body.trim().is_empty() {
            format!("HTTP {status}")
        } else {
            body.to_string()
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn perform(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        let mut request = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            return Ok(bytes.to_vec());
        }

        let body = String::from_utf8_lossy(&bytes).into_owned();
        tracing::debug!(status = status.as_u16(), "request rejected by API");
        Err(XplentyError::Api {
            status_code: status.as_u16(),
            message: Self::extract_error_message(&body, status),
            body,
        })
    }
}
