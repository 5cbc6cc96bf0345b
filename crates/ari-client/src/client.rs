//! Renewal information client
//!
//! Note: the renewal-info endpoint comes from an IETF draft
//! (draft-ietf-acme-ari) and not every ACME server implements it.

use ari_proto::{CertificateId, RenewalInfoUpdateRequest};
use std::sync::Arc;

use crate::directory::DirectoryProvider;
use crate::error::RenewalInfoError;
use crate::transport::{Response, Transport};

/// Queries and updates renewal information for certificates
///
/// Holds shared handles to its collaborators and no other state, so clones
/// can be used concurrently. The directory is consulted on every call.
#[derive(Clone)]
pub struct RenewalInfoClient {
    directory: Arc<dyn DirectoryProvider>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for RenewalInfoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenewalInfoClient")
            .field("renewal_info_url", &self.directory.renewal_info_url())
            .finish()
    }
}

impl RenewalInfoClient {
    pub fn new(directory: Arc<dyn DirectoryProvider>, transport: Arc<dyn Transport>) -> Self {
        Self {
            directory,
            transport,
        }
    }

    /// Whether the directory currently advertises a renewal-info endpoint
    pub fn supports_renewal_info(&self) -> bool {
        self.endpoint().is_ok()
    }

    fn endpoint(&self) -> Result<String, RenewalInfoError> {
        self.directory
            .renewal_info_url()
            .filter(|url| !url.is_empty())
            .ok_or(RenewalInfoError::CapabilityUnsupported)
    }

    /// GET renewal information for a certificate
    ///
    /// Returns [`RenewalInfoError::CapabilityUnsupported`] when the server
    /// doesn't advertise the endpoint, even if `cert_id` is also invalid.
    /// The response is returned as-is, including 4xx/5xx statuses.
    pub async fn fetch_renewal_info(
        &self,
        cert_id: &CertificateId,
    ) -> Result<Response, RenewalInfoError> {
        let endpoint = self.endpoint()?;

        if cert_id.is_empty() {
            return Err(RenewalInfoError::InvalidArgument("certID cannot be empty"));
        }

        let url = format!("{}/{}", endpoint, cert_id);
        Ok(self.transport.get(&url).await?)
    }

    /// POST an update reporting that a certificate has been replaced
    pub async fn submit_renewal_info_update(
        &self,
        req: RenewalInfoUpdateRequest,
    ) -> Result<Response, RenewalInfoError> {
        let endpoint = self.endpoint()?;

        if req.cert_id.is_empty() {
            return Err(RenewalInfoError::InvalidArgument("certID cannot be empty"));
        }

        if !req.replaced {
            return Err(RenewalInfoError::InvalidArgument("replaced cannot be false"));
        }

        Ok(self.transport.post(&endpoint, &req).await?)
    }
}
