//! ACME Renewal Information (ARI) Protocol Definitions
//!
//! This crate defines the wire types exchanged with a certificate authority's
//! directory and renewal-info endpoint (draft-ietf-acme-ari).

pub mod directory;
pub mod problem;
pub mod renewal;

pub use directory::{Directory, DirectoryMeta};
pub use problem::{Problem, ProblemExtensions};
pub use renewal::{
    parse_retry_after, CertificateId, RenewalInfo, RenewalInfoUpdateRequest, SuggestedWindow,
};

/// Let's Encrypt production directory
pub const LETS_ENCRYPT_DIRECTORY: &str = "https://acme-v02.api.letsencrypt.org/directory";

/// Let's Encrypt staging directory (for testing)
pub const LETS_ENCRYPT_STAGING_DIRECTORY: &str =
    "https://acme-staging-v02.api.letsencrypt.org/directory";

/// Content type for JWS-signed ACME POST bodies
pub const JOSE_JSON_CONTENT_TYPE: &str = "application/jose+json";

/// Content type for RFC 7807 problem documents
pub const PROBLEM_JSON_CONTENT_TYPE: &str = "application/problem+json";
