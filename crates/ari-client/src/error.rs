//! Error types for renewal-info exchanges

use ari_proto::Problem;
use http::StatusCode;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Coarse classification callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The directory has no renewal-info endpoint
    CapabilityUnsupported,
    /// The caller passed an unusable argument
    InvalidArgument,
    /// Network, HTTP or signing failure in the transport
    TransportFailure,
    /// A response body could not be decoded
    DecodeFailure,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::CapabilityUnsupported => write!(f, "capability unsupported"),
            ErrorKind::InvalidArgument => write!(f, "invalid argument"),
            ErrorKind::TransportFailure => write!(f, "transport failure"),
            ErrorKind::DecodeFailure => write!(f, "decode failure"),
        }
    }
}

/// Errors raised by a [`Transport`](crate::Transport)
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("Server returned {status} for {url}")]
    Status {
        url: String,
        status: StatusCode,
        problem: Option<Problem>,
    },

    #[error("No request signer configured for POST to {0}")]
    Unauthenticated(String),

    #[error("Failed to sign request: {0}")]
    Signing(String),

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// The body of a `status` response from `url` was not the expected document
    #[error("Failed to decode {status} response from {url}: {message}")]
    Decode {
        url: String,
        status: StatusCode,
        /// Raw body, lossily converted to UTF-8
        body: String,
        message: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl TransportError {
    pub fn request(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        TransportError::Request {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportError::Decode { .. } => ErrorKind::DecodeFailure,
            _ => ErrorKind::TransportFailure,
        }
    }

    /// HTTP status behind the failure, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TransportError::Status { status, .. } | TransportError::Decode { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Hint for callers: connection failures, 5xx and 429 are worth retrying,
    /// whether or not the error body could be decoded
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Request { .. } => true,
            _ => self.status().is_some_and(|status| {
                status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
            }),
        }
    }
}

/// Errors returned by [`RenewalInfoClient`](crate::RenewalInfoClient) operations
#[derive(Debug, Error)]
pub enum RenewalInfoError {
    #[error("renewalInfo: server does not advertise a renewal info endpoint")]
    CapabilityUnsupported,

    #[error("renewalInfo: {0}")]
    InvalidArgument(&'static str),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl RenewalInfoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenewalInfoError::CapabilityUnsupported => ErrorKind::CapabilityUnsupported,
            RenewalInfoError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            RenewalInfoError::Transport(err) => err.kind(),
        }
    }

    /// Local failures never are; transport failures defer to [`TransportError::is_retryable`]
    pub fn is_retryable(&self) -> bool {
        match self {
            RenewalInfoError::Transport(err) => err.is_retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            RenewalInfoError::CapabilityUnsupported.kind(),
            ErrorKind::CapabilityUnsupported
        );
        assert_eq!(
            RenewalInfoError::InvalidArgument("certID cannot be empty").kind(),
            ErrorKind::InvalidArgument
        );

        let decode = RenewalInfoError::from(TransportError::Decode {
            url: "https://ca.example/ari".to_string(),
            status: StatusCode::BAD_REQUEST,
            body: "not json".to_string(),
            message: "expected value".to_string(),
        });
        assert_eq!(decode.kind(), ErrorKind::DecodeFailure);
        assert!(!decode.is_retryable());

        let unauthenticated =
            RenewalInfoError::from(TransportError::Unauthenticated("https://ca.example/ari".into()));
        assert_eq!(unauthenticated.kind(), ErrorKind::TransportFailure);
    }

    #[test]
    fn test_retry_hints() {
        assert!(!RenewalInfoError::CapabilityUnsupported.is_retryable());

        let refused = TransportError::request(
            "https://ca.example/ari/abc",
            std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        );
        assert!(refused.is_retryable());

        let status = |status| TransportError::Status {
            url: "https://ca.example/ari".to_string(),
            status,
            problem: None,
        };
        assert!(status(StatusCode::SERVICE_UNAVAILABLE).is_retryable());
        assert!(status(StatusCode::TOO_MANY_REQUESTS).is_retryable());
        assert!(!status(StatusCode::BAD_REQUEST).is_retryable());
        assert_eq!(
            status(StatusCode::BAD_REQUEST).status(),
            Some(StatusCode::BAD_REQUEST)
        );
        assert!(TransportError::Signing("no key".into()).status().is_none());
    }

    #[test]
    fn test_undecodable_server_error_is_retryable() {
        let decode = |status| TransportError::Decode {
            url: "https://ca.example/ari".to_string(),
            status,
            body: "<html>Service Unavailable</html>".to_string(),
            message: "expected value at line 1 column 1".to_string(),
        };

        let unavailable = decode(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(unavailable.kind(), ErrorKind::DecodeFailure);
        assert_eq!(unavailable.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert!(unavailable.is_retryable());
        assert!(decode(StatusCode::TOO_MANY_REQUESTS).is_retryable());
        assert!(!decode(StatusCode::FORBIDDEN).is_retryable());

        assert_eq!(
            unavailable.to_string(),
            "Failed to decode 503 Service Unavailable response from https://ca.example/ari: \
             expected value at line 1 column 1"
        );
    }

    #[test]
    fn test_transport_error_is_transparent() {
        let err = RenewalInfoError::from(TransportError::request(
            "https://ca.example/ari/abc",
            std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer"),
        ));

        assert_eq!(
            err.to_string(),
            "Request to https://ca.example/ari/abc failed: reset by peer"
        );

        let io = err
            .source()
            .and_then(|e| e.downcast_ref::<std::io::Error>())
            .expect("io error in source chain");
        assert_eq!(io.kind(), std::io::ErrorKind::ConnectionReset);
    }

    #[test]
    fn test_invalid_argument_message() {
        let err = RenewalInfoError::InvalidArgument("replaced cannot be false");
        assert_eq!(err.to_string(), "renewalInfo: replaced cannot be false");
    }
}
