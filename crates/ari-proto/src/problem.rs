//! RFC 7807 problem documents returned by ACME servers on error
//!
//! The standard members are decoded into [`ProblemDetails`]. ACME problem
//! types are URNs (`urn:ietf:params:acme:error:*`), which `http::Uri` cannot
//! represent, so the raw `type` string is kept alongside.

use problem_details::ProblemDetails;
use serde_json::{Map, Value};

/// ACME error prefix (RFC 8555 §6.7)
pub const ACME_ERROR_NAMESPACE: &str = "urn:ietf:params:acme:error:";

/// Problem type used when a document omits `type` (RFC 7807 §4.2)
pub const BLANK_PROBLEM_TYPE: &str = "about:blank";

/// Non-standard members such as ACME `subproblems` and `identifier`
pub type ProblemExtensions = Map<String, Value>;

/// Problem document describing a failed ACME request
#[derive(Debug, Clone)]
pub struct Problem {
    /// Raw `type` member
    pub kind: String,
    pub details: ProblemDetails<ProblemExtensions>,
}

impl Problem {
    /// Decode a problem document from a JSON response body
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let mut members: Map<String, Value> = serde_json::from_slice(bytes)?;

        let kind = match members.remove("type") {
            Some(Value::String(kind)) => kind,
            _ => BLANK_PROBLEM_TYPE.to_string(),
        };
        let details = serde_json::from_value(Value::Object(members))?;

        Ok(Self { kind, details })
    }

    /// Returns the ACME error name (e.g. `malformed`) if the type is in the ACME namespace
    pub fn acme_error(&self) -> Option<&str> {
        self.kind.strip_prefix(ACME_ERROR_NAMESPACE)
    }

    pub fn detail(&self) -> Option<&str> {
        self.details.detail.as_deref()
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.detail() {
            Some(detail) => write!(f, "{}: {}", self.kind, detail),
            None => write!(f, "{}", self.kind),
        }
    }
}
