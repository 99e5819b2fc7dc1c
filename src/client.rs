//! Xplenty API client.
//!
//! Low-level client that handles authentication, URL building and JSON
//! decoding. Resource operations are implemented via traits on model types.

use std::env;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use url::{form_urlencoded, Url};

use crate::error::{Result, XplentyError};
use crate::transport::{ReqwestTransport, Transport};

const DEFAULT_API_URL: &str = "https://api.xplenty.com";
const API_VERSION: u8 = 2;

/// Low-level Xplenty API client.
///
/// Requests go to `{base_url}/{account_id}/api/` and carry the versioned
/// `Accept` header and a Basic `Authorization` header built from the API key.
///
/// This struct is cheaply cloneable; clones share the same transport.
///
/// # Example
///
/// ```no_run
/// use xplenty::XplentyClient;
///
/// # fn example() -> xplenty::Result<()> {
/// // Create from environment variables
/// let client = XplentyClient::from_env()?;
///
/// // Or configure manually
/// let client = XplentyClient::new("my-account", "api-key")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct XplentyClient {
    transport: Arc<dyn Transport>,
    api_url: Arc<Url>,
    account_id: String,
    headers: HeaderMap,
}

impl std::fmt::Debug for XplentyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XplentyClient")
            .field("account_id", &self.account_id)
            .field("api_url", &self.api_url.as_str())
            .finish_non_exhaustive()
    }
}

impl XplentyClient {
    /// Create a client from environment variables.
    ///
    /// Uses `XPLENTY_ACCOUNT_ID` and `XPLENTY_API_KEY`, and optionally
    /// `XPLENTY_API_URL` for the base URL (defaults to
    /// `https://api.xplenty.com`).
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is not set.
    pub fn from_env() -> Result<Self> {
        let account_id = env::var("XPLENTY_ACCOUNT_ID").map_err(|_| {
            XplentyError::ConfigMissing("XPLENTY_ACCOUNT_ID environment variable not set".to_string())
        })?;
        let api_key = env::var("XPLENTY_API_KEY").map_err(|_| {
            XplentyError::ConfigMissing("XPLENTY_API_KEY environment variable not set".to_string())
        })?;

        let base_url = env::var("XPLENTY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Self::with_base_url(&account_id, &api_key, &base_url)
    }

    /// Create a client for the public Xplenty API.
    ///
    /// # Errors
    ///
    /// Returns an error if the account id does not form a valid URL or the
    /// HTTP client cannot be built.
    pub fn new(account_id: &str, api_key: &str) -> Result<Self> {
        Self::with_base_url(account_id, api_key, DEFAULT_API_URL)
    }

    /// Create a client against a custom base URL (e.g. a mock server).
    ///
    /// # Arguments
    ///
    /// * `account_id` - Xplenty account id, inserted into every path
    /// * `api_key` - Xplenty API key
    /// * `base_url` - Service root, without the account segment
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting URL is invalid.
    pub fn with_base_url(account_id: &str, api_key: &str, base_url: &str) -> Result<Self> {
        if account_id.is_empty() {
            return Err(XplentyError::ConfigMissing("account id is empty".to_string()));
        }

        let api_url = Url::parse(&format!(
            "{}/{}/api/",
            base_url.trim_end_matches('/'),
            account_id
        ))?;

        Ok(Self {
            transport: Arc::new(ReqwestTransport::new()?),
            api_url: Arc::new(api_url),
            account_id: account_id.to_string(),
            headers: Self::default_headers(api_key)?,
        })
    }

    /// Replace the transport, keeping URL and credentials.
    #[must_use]
    pub fn with_transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    fn default_headers(api_key: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_str(&format!("application/vnd.xplenty+json; version={API_VERSION}"))
                .map_err(|_| XplentyError::ConfigMissing("invalid API version".to_string()))?,
        );
        let mut auth = HeaderValue::from_str(&basic_auth(api_key))
            .map_err(|_| XplentyError::ConfigMissing("API key is not header-safe".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        Ok(headers)
    }

    /// The account this client talks to.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// The API root, `{base}/{account_id}/api/`.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Resolve a path relative to the API root.
    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.api_url.join(path)?)
    }

    /// Make a GET request.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Value> {
        let url = self.url(path)?;
        self.send(Method::GET, url, None).await
    }

    /// Make a GET request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let mut url = self.url(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        self.send(Method::GET, url, None).await
    }

    /// Make a POST request with a form-encoded body.
    #[tracing::instrument(skip(self, form))]
    pub async fn post(&self, path: &str, form: &[(String, String)]) -> Result<Value> {
        let url = self.url(path)?;
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();
        self.send(Method::POST, url, Some(body.into_bytes())).await
    }

    /// Make a DELETE request.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, path: &str) -> Result<Value> {
        let url = self.url(path)?;
        self.send(Method::DELETE, url, None).await
    }

    async fn send(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> Result<Value> {
        let mut headers = self.headers.clone();
        if body.is_some() {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
        }

        tracing::debug!(%method, %url, "sending request");
        let bytes = self.transport.perform(method, url, headers, body).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// `Authorization` value for an API key: the key alone, base64 encoded.
pub(crate) fn basic_auth(api_key: &str) -> String {
    format!("Basic {}", STANDARD.encode(api_key.as_bytes()))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    type Sent = Arc<Mutex<Vec<(Method, Url, HeaderMap, Option<Vec<u8>>)>>>;

    /// Records requests and answers each with a fixed body.
    #[derive(Default)]
    struct Canned {
        body: Vec<u8>,
        seen: Sent,
    }

    #[async_trait]
    impl Transport for Canned {
        async fn perform(
            &self,
            method: Method,
            url: Url,
            headers: HeaderMap,
            body: Option<Vec<u8>>,
        ) -> Result<Vec<u8>> {
            self.seen.lock().unwrap().push((method, url, headers, body));
            Ok(self.body.clone())
        }
    }

    fn canned(body: Value) -> (XplentyClient, Sent) {
        let transport = Canned {
            body: serde_json::to_vec(&body).unwrap(),
            ..Default::default()
        };
        let seen = transport.seen.clone();
        let client = XplentyClient::new("foo", "bar").unwrap().with_transport(transport);
        (client, seen)
    }

    #[test]
    fn test_client_debug() {
        let client = XplentyClient::new("foo", "secret-key").unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("XplentyClient"));
        assert!(debug.contains("foo"));
        // Key should not be in debug output
        assert!(!debug.contains("secret-key"));
        assert!(!debug.contains(&STANDARD.encode("secret-key")));
    }

    #[test]
    fn test_basic_auth_encodes_key_only() {
        assert_eq!(basic_auth("bar"), "Basic YmFy");
    }

    #[test]
    fn test_api_url_includes_account() {
        let client = XplentyClient::new("foo", "bar").unwrap();
        assert_eq!(client.api_url().as_str(), "https://api.xplenty.com/foo/api/");
        assert_eq!(
            client.url("clusters/5").unwrap().as_str(),
            "https://api.xplenty.com/foo/api/clusters/5"
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client1 = XplentyClient::with_base_url("foo", "bar", "http://localhost:8080").unwrap();
        let client2 = XplentyClient::with_base_url("foo", "bar", "http://localhost:8080/").unwrap();
        assert_eq!(client1.api_url().as_str(), client2.api_url().as_str());
    }

    #[test]
    fn test_empty_account_rejected() {
        let err = XplentyClient::new("", "bar").unwrap_err();
        assert!(matches!(err, XplentyError::ConfigMissing(_)));
    }

    #[tokio::test]
    async fn test_get_sends_auth_and_accept_headers() {
        let (client, seen) = canned(json!({"ok": true}));

        let value = client.get("clusters").await.unwrap();
        assert_eq!(value, json!({"ok": true}));

        let seen = seen.lock().unwrap();
        let (method, url, headers, body) = &seen[0];
        assert_eq!(*method, Method::GET);
        assert_eq!(url.as_str(), "https://api.xplenty.com/foo/api/clusters");
        assert_eq!(headers[AUTHORIZATION], "Basic YmFy");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert!(!headers[ACCEPT].is_sensitive());
        assert_eq!(headers[ACCEPT], "application/vnd.xplenty+json; version=2");
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_get_with_query_appends_pairs() {
        let (client, seen) = canned(json!([]));

        client
            .get_with_query("packages", &[("offset", "0".to_string()), ("limit", "20".to_string())])
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen[0].1.as_str(),
            "https://api.xplenty.com/foo/api/packages?offset=0&limit=20"
        );
    }

    #[tokio::test]
    async fn test_post_form_encodes_body() {
        let (client, seen) = canned(json!({"id": 1}));

        let form = vec![
            ("cluster[nodes]".to_string(), "2".to_string()),
            ("cluster[name]".to_string(), "my cluster".to_string()),
        ];
        client.post("clusters", &form).await.unwrap();

        let seen = seen.lock().unwrap();
        let (method, _, headers, body) = &seen[0];
        assert_eq!(*method, Method::POST);
        assert_eq!(headers[CONTENT_TYPE], "application/x-www-form-urlencoded");
        let body = String::from_utf8(body.clone().unwrap()).unwrap();
        assert_eq!(body, "cluster%5Bnodes%5D=2&cluster%5Bname%5D=my+cluster");
    }

    #[tokio::test]
    async fn test_non_json_body_is_parse_error() {
        let transport = Canned {
            body: b"<html>".to_vec(),
            ..Default::default()
        };
        let client = XplentyClient::new("foo", "bar").unwrap().with_transport(transport);

        let err = client.delete("jobs/1").await.unwrap_err();
        assert!(matches!(err, XplentyError::Parse(_)));
    }
}
