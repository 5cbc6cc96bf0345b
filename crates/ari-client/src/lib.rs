//! ACME Renewal Information client
//!
//! Queries a certificate authority's renewal-info endpoint for suggested
//! renewal windows and reports replaced certificates. The endpoint is
//! optional: servers that don't advertise it in their directory yield
//! [`RenewalInfoError::CapabilityUnsupported`].

pub mod client;
pub mod directory;
pub mod error;
pub mod transport;

pub use client::RenewalInfoClient;
pub use directory::{DirectoryError, DirectoryFetcher, DirectoryProvider, SharedDirectory};
pub use error::{BoxError, ErrorKind, RenewalInfoError, TransportError};
pub use transport::{HttpTransport, HttpTransportConfig, RequestSigner, Response, Transport};

pub use ari_proto::{CertificateId, Directory, RenewalInfo, RenewalInfoUpdateRequest};
