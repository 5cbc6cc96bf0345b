//! Renewal information types
//!
//! A certificate is named by a [`CertificateId`]. Fetching renewal info
//! returns a [`RenewalInfo`] body carrying the window in which the CA would
//! like the certificate renewed. Reporting a replacement sends a
//! [`RenewalInfoUpdateRequest`].

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Opaque identifier naming a certificate within the CA's renewal-info scheme
///
/// Usually derived from the certificate's Authority Key Identifier and serial
/// number (see [`CertificateId::from_parts`]). The identifier is already
/// base64url-encoded and is placed in request URLs as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateId(String);

impl CertificateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the identifier from the raw Authority Key Identifier `keyIdentifier`
    /// bytes and the raw DER serial number bytes: `base64url(aki) "." base64url(serial)`.
    pub fn from_parts(authority_key_identifier: &[u8], serial: &[u8]) -> Self {
        Self(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(authority_key_identifier),
            URL_SAFE_NO_PAD.encode(serial)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for CertificateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CertificateId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CertificateId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for CertificateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Body POSTed to the renewal-info endpoint to report a replaced certificate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalInfoUpdateRequest {
    #[serde(rename = "certID")]
    pub cert_id: CertificateId,
    /// Must be `true`; the protocol defines no meaning for reporting `false`
    pub replaced: bool,
}

impl RenewalInfoUpdateRequest {
    pub fn new(cert_id: impl Into<CertificateId>, replaced: bool) -> Self {
        Self {
            cert_id: cert_id.into(),
            replaced,
        }
    }

    /// Request reporting that the certificate has been replaced
    pub fn replaced(cert_id: impl Into<CertificateId>) -> Self {
        Self::new(cert_id, true)
    }
}

/// Window in which the CA suggests renewing the certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SuggestedWindow {
    /// A window is only usable if it ends after it starts
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// Returns whether `at` falls inside `[start, end)`
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

/// Renewal information returned by the CA for a certificate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalInfo {
    pub suggested_window: SuggestedWindow,
    /// Human-readable page explaining why the window was chosen
    #[serde(
        rename = "explanationURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub explanation_url: Option<String>,
}

impl RenewalInfo {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Parse a `Retry-After` header value relative to `now`
///
/// Accepts both delta-seconds and HTTP-date forms. Dates in the past yield a
/// zero duration. Returns `None` for values that are neither.
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_certificate_id_from_parts() {
        let aki = [
            0x69, 0x88, 0x5B, 0x6B, 0x87, 0x46, 0x40, 0x41, 0xE1, 0xB3, 0x7B, 0x84, 0x7B, 0xA0,
            0xAE, 0x2C, 0xDE, 0x01, 0xC8, 0xD4,
        ];
        let serial = [0x00, 0x87, 0x65, 0x43, 0x21];

        let id = CertificateId::from_parts(&aki, &serial);
        assert_eq!(id.as_str(), "aYhba4dGQEHhs3uEe6CuLN4ByNQ.AIdlQyE");
    }

    #[test]
    fn test_certificate_id_emptiness() {
        assert!(CertificateId::default().is_empty());
        assert!(CertificateId::from("").is_empty());
        assert!(!CertificateId::from("abc123").is_empty());
        assert_eq!(CertificateId::from("abc123").to_string(), "abc123");
    }

    #[test]
    fn test_update_request_wire_shape() {
        let req = RenewalInfoUpdateRequest::replaced("abc123");
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json, serde_json::json!({"certID": "abc123", "replaced": true}));
    }

    #[test]
    fn test_parse_renewal_info() {
        let body = br#"{
            "suggestedWindow": {
                "start": "2021-01-03T00:00:00Z",
                "end": "2021-01-07T00:00:00Z"
            },
            "explanationURL": "https://acme.example.com/docs/example"
        }"#;

        let info = RenewalInfo::from_slice(body).unwrap();
        let window = info.suggested_window;

        assert_eq!(window.start, Utc.with_ymd_and_hms(2021, 1, 3, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2021, 1, 7, 0, 0, 0).unwrap());
        assert!(window.is_valid());
        assert!(window.contains(Utc.with_ymd_and_hms(2021, 1, 5, 12, 0, 0).unwrap()));
        assert!(!window.contains(window.end));
        assert_eq!(
            info.explanation_url.as_deref(),
            Some("https://acme.example.com/docs/example")
        );
    }

    #[test]
    fn test_parse_renewal_info_without_explanation() {
        let body = br#"{"suggestedWindow": {"start": "2021-01-07T00:00:00Z", "end": "2021-01-03T00:00:00Z"}}"#;

        let info = RenewalInfo::from_slice(body).unwrap();
        assert!(info.explanation_url.is_none());
        assert!(!info.suggested_window.is_valid());
    }

    #[test]
    fn test_parse_retry_after() {
        let now = Utc.with_ymd_and_hms(2015, 10, 21, 7, 0, 0).unwrap();

        assert_eq!(
            parse_retry_after("21600", now),
            Some(Duration::from_secs(21600))
        );
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT", now),
            Some(Duration::from_secs(28 * 60))
        );
        // Already elapsed
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 06:00:00 GMT", now),
            Some(Duration::ZERO)
        );
        assert_eq!(parse_retry_after("soon", now), None);
    }
}
