//! Authorization decisions for the consent flow.
//!
//! Every gate method either returns `Ok(())` or a specific `CoreError`;
//! callers never receive silently-empty data in place of a refusal. The
//! gate owns no storage — it judges a request row its caller already
//! fetched, using the injected directory and signature verifier.

use std::sync::Arc;

use hrkey_core::error::CoreError;
use hrkey_core::request::RequestStatus;
use hrkey_core::types::DbId;
use hrkey_db::models::access_request::DataAccessRequest;

use crate::services::{SignatureVerifier, SignerDirectory};

pub struct ConsentGate {
    directory: Arc<dyn SignerDirectory>,
    verifier: Arc<dyn SignatureVerifier>,
}

impl ConsentGate {
    pub fn new(directory: Arc<dyn SignerDirectory>, verifier: Arc<dyn SignatureVerifier>) -> Self {
        Self {
            directory,
            verifier,
        }
    }

    /// May `requester` open a request on behalf of `company_id`?
    /// Superadmins bypass the signer check.
    pub async fn authorize_creation(
        &self,
        requester_user_id: DbId,
        company_id: DbId,
        is_superadmin: bool,
    ) -> Result<(), CoreError> {
        if is_superadmin {
            return Ok(());
        }
        let is_signer = self
            .directory
            .is_active_signer(requester_user_id, company_id)
            .await
            .map_err(|e| CoreError::Internal(format!("signer lookup failed: {e}")))?;
        if is_signer {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "only an active signer of the company may request data access".into(),
            ))
        }
    }

    /// May `acting_user_id` approve this request with this consent proof?
    ///
    /// Ownership, then state, then signature. The conditional update in
    /// the repository remains the final arbiter of the PENDING state;
    /// this check exists to give precise errors before it runs.
    pub fn authorize_approval(
        &self,
        request: &DataAccessRequest,
        acting_user_id: DbId,
        wallet_address: &str,
        message: &str,
        signature: &str,
    ) -> Result<(), CoreError> {
        if request.target_user_id != acting_user_id {
            return Err(CoreError::Forbidden(
                "only the data subject may approve this request".into(),
            ));
        }

        let status = request.status()?;
        if status != RequestStatus::Pending {
            return Err(CoreError::Conflict(format!(
                "request {} is {}, not PENDING",
                request.id,
                status.as_str()
            )));
        }
        if request.expires_at < chrono::Utc::now() {
            return Err(CoreError::Conflict(format!(
                "request {} has expired",
                request.id
            )));
        }

        if !self.verifier.verify(wallet_address, message, signature) {
            return Err(CoreError::Forbidden(
                "wallet signature does not prove consent".into(),
            ));
        }
        Ok(())
    }

    /// May `acting_user_id` reject this request? Ownership only; refusal
    /// needs no cryptographic proof.
    pub fn authorize_rejection(
        &self,
        request: &DataAccessRequest,
        acting_user_id: DbId,
    ) -> Result<(), CoreError> {
        if request.target_user_id != acting_user_id {
            return Err(CoreError::Forbidden(
                "only the data subject may reject this request".into(),
            ));
        }
        let status = request.status()?;
        if status != RequestStatus::Pending {
            return Err(CoreError::Conflict(format!(
                "request {} is {}, not PENDING",
                request.id,
                status.as_str()
            )));
        }
        Ok(())
    }

    /// May `acting_user_id` retrieve the data behind this request?
    /// Requires both an active signer seat at the requesting company and
    /// an APPROVED request.
    pub async fn authorize_retrieval(
        &self,
        request: &DataAccessRequest,
        acting_user_id: DbId,
    ) -> Result<(), CoreError> {
        let is_signer = self
            .directory
            .is_active_signer(acting_user_id, request.company_id)
            .await
            .map_err(|e| CoreError::Internal(format!("signer lookup failed: {e}")))?;
        if !is_signer {
            return Err(CoreError::Forbidden(
                "only an active signer of the requesting company may access this data".into(),
            ));
        }
        if request.status()? != RequestStatus::Approved {
            return Err(CoreError::Forbidden(
                "the data subject has not approved this request".into(),
            ));
        }
        Ok(())
    }

    /// May the caller view this request at all? Company signers and the
    /// subject can; everyone else gets a 403.
    pub async fn authorize_view(
        &self,
        request: &DataAccessRequest,
        acting_user_id: DbId,
    ) -> Result<(), CoreError> {
        if request.target_user_id == acting_user_id {
            return Ok(());
        }
        let is_signer = self
            .directory
            .is_active_signer(acting_user_id, request.company_id)
            .await
            .map_err(|e| CoreError::Internal(format!("signer lookup failed: {e}")))?;
        if is_signer {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "not authorized to view this request".into(),
            ))
        }
    }
}
