//! Transport abstraction for renewal-info requests
//!
//! The [`Transport`] trait performs the single network exchange behind each
//! client operation. [`HttpTransport`] is the reqwest-backed implementation:
//! GETs are unauthenticated, POSTs are JWS-signed by an injected
//! [`RequestSigner`].

use ari_proto::{
    parse_retry_after, Problem, RenewalInfo, RenewalInfoUpdateRequest, JOSE_JSON_CONTENT_TYPE,
    PROBLEM_JSON_CONTENT_TYPE,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::{ACCEPT, CONTENT_TYPE, RETRY_AFTER};
use http::{HeaderMap, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::TransportError;

/// Raw HTTP response handed back to the caller
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as a renewal-info document
    pub fn renewal_info(&self) -> Result<RenewalInfo, serde_json::Error> {
        RenewalInfo::from_slice(&self.body)
    }

    /// How long the server asks the client to wait before polling again
    pub fn retry_after(&self, now: DateTime<Utc>) -> Option<Duration> {
        let value = self.headers.get(RETRY_AFTER)?.to_str().ok()?;
        parse_retry_after(value, now)
    }
}

/// Performs the network exchange for renewal-info operations
///
/// Implementations own authentication, timeouts and any retry policy.
///
/// # Example
/// ```ignore
/// struct LoggingTransport<T>(T);
///
/// #[async_trait]
/// impl<T: Transport> Transport for LoggingTransport<T> {
///     async fn get(&self, url: &str) -> Result<Response, TransportError> {
///         println!("GET {}", url);
///         self.0.get(url).await
///     }
///     // ...
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and return the response as-is, whatever its status
    async fn get(&self, url: &str) -> Result<Response, TransportError>;

    /// POST `body` to `url`
    async fn post(
        &self,
        url: &str,
        body: &RenewalInfoUpdateRequest,
    ) -> Result<Response, TransportError>;
}

/// Wraps a JSON payload into a signed ACME request body
///
/// Account keys, `kid` selection and nonce handling live behind this trait.
#[async_trait]
pub trait RequestSigner: Send + Sync {
    /// Produce the JWS body to POST to `url` for `payload`
    async fn sign(&self, url: &str, payload: &[u8]) -> Result<Vec<u8>, TransportError>;
}

/// HTTP transport configuration
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Skip TLS verification (for test CAs such as Pebble)
    pub insecure: bool,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: concat!("ari-client/", env!("CARGO_PKG_VERSION")).to_string(),
            insecure: false,
        }
    }
}

/// Build the reqwest client shared by the transport and directory fetcher
pub(crate) fn build_client(config: &HttpTransportConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.as_str())
        .danger_accept_invalid_certs(config.insecure)
        .build()
}

/// reqwest-backed [`Transport`]
pub struct HttpTransport {
    client: reqwest::Client,
    signer: Option<Arc<dyn RequestSigner>>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("signer", &self.signer.is_some())
            .finish()
    }
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let client = build_client(&config).map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            signer: None,
        })
    }

    /// Set the signer used for POST requests
    pub fn with_signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    async fn read_response(
        url: &str,
        response: reqwest::Response,
    ) -> Result<Response, TransportError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::request(url, e))?;

        Ok(Response::new(status, headers, body))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Response, TransportError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::request(url, e))?;

        let response = Self::read_response(url, response).await?;
        debug!("GET {} -> {}", url, response.status);

        Ok(response)
    }

    async fn post(
        &self,
        url: &str,
        body: &RenewalInfoUpdateRequest,
    ) -> Result<Response, TransportError> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| TransportError::Unauthenticated(url.to_string()))?;

        let payload = serde_json::to_vec(body)?;
        let signed = signer.sign(url, &payload).await?;

        debug!("POST {} ({} bytes)", url, signed.len());

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, JOSE_JSON_CONTENT_TYPE)
            .header(ACCEPT, PROBLEM_JSON_CONTENT_TYPE)
            .body(signed)
            .send()
            .await
            .map_err(|e| TransportError::request(url, e))?;

        let response = Self::read_response(url, response).await?;

        if response.is_success() {
            return Ok(response);
        }

        let problem = if response.body.is_empty() {
            None
        } else {
            let problem =
                Problem::from_slice(&response.body).map_err(|e| TransportError::Decode {
                    url: url.to_string(),
                    status: response.status,
                    body: String::from_utf8_lossy(&response.body).into_owned(),
                    message: e.to_string(),
                })?;
            Some(problem)
        };

        warn!(
            "POST {} rejected with {}: {}",
            url,
            response.status,
            problem
                .as_ref()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "no problem document".to_string())
        );

        Err(TransportError::Status {
            url: url.to_string(),
            status: response.status,
            problem,
        })
    }
}
