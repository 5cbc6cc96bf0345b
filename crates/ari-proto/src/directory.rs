//! ACME directory document
//!
//! Clients discover the endpoints a certificate authority offers by fetching
//! its directory URL. The renewal-info endpoint is optional: an empty or
//! missing `renewalInfo` entry means the server does not implement ARI.

use serde::{Deserialize, Serialize};

/// Directory document published by an ACME server (RFC 8555 §7.1.1)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directory {
    #[serde(default)]
    pub new_nonce: String,
    #[serde(default)]
    pub new_account: String,
    #[serde(default)]
    pub new_order: String,
    #[serde(default)]
    pub new_authz: String,
    #[serde(default)]
    pub revoke_cert: String,
    #[serde(default)]
    pub key_change: String,
    /// Renewal information endpoint; empty when ARI is not offered
    #[serde(default)]
    pub renewal_info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<DirectoryMeta>,
}

/// Optional metadata attached to a directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caa_identities: Vec<String>,
    #[serde(default)]
    pub external_account_required: bool,
}

impl Directory {
    /// Directory with only the renewal-info endpoint set
    pub fn with_renewal_info(url: impl Into<String>) -> Self {
        Self {
            renewal_info: url.into(),
            ..Self::default()
        }
    }

    /// Returns the renewal-info endpoint, or `None` if the server doesn't advertise one
    pub fn renewal_info_url(&self) -> Option<&str> {
        if self.renewal_info.is_empty() {
            None
        } else {
            Some(&self.renewal_info)
        }
    }

    /// Returns whether the server advertises ARI support
    pub fn supports_renewal_info(&self) -> bool {
        self.renewal_info_url().is_some()
    }

    /// Parse a directory document from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
