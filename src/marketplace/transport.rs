//! HTTP transport for marketplace calls.
//!
//! [`HttpTransport`] is the seam between [`super::ApiManager`] and the
//! network. [`ReqwestTransport`] is the production implementation; tests
//! substitute a scripted fake.

use std::time::{Duration, Instant};

use reqwest::Url;
use tracing::{debug, warn};

use super::error::MarketplaceError;

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("hrm-marketplace/", env!("CARGO_PKG_VERSION"));

/// HTTP method used by marketplace calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET request.
    Get,
    /// POST request with a form-encoded body.
    Post,
}

/// An outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute target URL.
    pub url: Url,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Form fields (sent `application/x-www-form-urlencoded` when non-empty).
    pub form: Vec<(String, String)>,
}

impl HttpRequest {
    /// Creates a GET request.
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            headers: Vec::new(),
            form: Vec::new(),
        }
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(url: Url) -> Self {
        Self {
            method: Method::Post,
            url,
            headers: Vec::new(),
            form: Vec::new(),
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Adds a form field.
    #[must_use]
    pub fn field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.form.push((name.to_string(), value.into()));
        self
    }

    /// Returns the first header value with the given name (case-insensitive).
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the value of a form field.
    #[must_use]
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Full response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for HTTP 200.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Decodes the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, MarketplaceError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| MarketplaceError::MalformedResponse(format!("invalid JSON: {}", e)))
    }
}

/// Performs HTTP requests on behalf of the marketplace client.
///
/// Connection-level failures must be reported as
/// [`MarketplaceError::Transport`]. Non-200 statuses are not errors at this
/// layer; they are returned as ordinary responses.
pub trait HttpTransport {
    /// Sends a request and reads the full body.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, MarketplaceError>;
}

/// Blocking `reqwest` transport.
pub struct ReqwestTransport {
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Creates a transport with the given per-call timeout.
    pub fn new(timeout: Duration) -> Result<Self, MarketplaceError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| MarketplaceError::Transport(format!("failed to build client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wraps a preconfigured client (custom proxy, TLS or timeout settings).
    #[must_use]
    pub fn from_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, MarketplaceError> {
        debug!("[MARKETPLACE] {:?} {}", request.method, request.url);
        let start = Instant::now();

        let mut builder = match request.method {
            Method::Get => self.client.get(request.url.clone()),
            Method::Post => self.client.post(request.url.clone()),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        let response = builder.send().map_err(|e| {
            warn!("[MARKETPLACE] HTTP request failed: {}", e);
            MarketplaceError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().map_err(|e| {
            warn!("[MARKETPLACE] Failed to read response body: {}", e);
            MarketplaceError::Transport(format!("failed to read body: {}", e))
        })?;

        debug!(
            "[MARKETPLACE] Response: {} ({} bytes) in {:?}",
            status,
            body.len(),
            start.elapsed()
        );

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::post(url("https://mp.test/oauth/v2/token"))
            .header("Accept", "application/json")
            .field("grant_type", "client_credentials");

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.header_value("accept"), Some("application/json"));
        assert_eq!(request.field_value("grant_type"), Some("client_credentials"));
        assert_eq!(request.field_value("missing"), None);
    }

    #[test]
    fn test_response_json() {
        let response = HttpResponse::new(200, br#"{"a":1}"#.to_vec());
        assert!(response.is_ok());
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["a"], 1);

        let bad = HttpResponse::new(200, b"not json".to_vec());
        assert!(matches!(
            bad.json::<serde_json::Value>(),
            Err(MarketplaceError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_reqwest_transport_connection_refused() {
        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let request = HttpRequest::get(url(&format!("http://127.0.0.1:{}/api/v1/addon", port)));
        let result = transport.send(&request);
        assert!(matches!(result, Err(MarketplaceError::Transport(_))));
    }
}
