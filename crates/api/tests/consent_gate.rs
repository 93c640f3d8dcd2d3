//! Tests for the consent-gate authorization rules, using in-memory stand-ins
//! for the signer directory and the wallet-signature verifier. No database
//! or HTTP server involved.

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{Duration, Utc};

use hrkey_api::gate::ConsentGate;
use hrkey_api::services::{SignatureVerifier, SignerDirectory, UserIdentity};
use hrkey_core::error::CoreError;
use hrkey_core::types::{DbId, Timestamp};
use hrkey_db::models::access_request::DataAccessRequest;

/// Directory that knows a fixed set of (user, company) signer pairs.
struct StubDirectory {
    signer_pairs: Vec<(DbId, DbId)>,
}

#[async_trait]
impl SignerDirectory for StubDirectory {
    async fn is_active_signer(
        &self,
        user_id: DbId,
        company_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        Ok(self.signer_pairs.contains(&(user_id, company_id)))
    }

    async fn get_user(&self, _user_id: DbId) -> Result<Option<UserIdentity>, sqlx::Error> {
        Ok(None)
    }
}

/// Verifier with a fixed verdict.
struct StubVerifier(bool);

impl SignatureVerifier for StubVerifier {
    fn verify(&self, _address: &str, _message: &str, _signature: &str) -> bool {
        self.0
    }
}

const COMPANY: DbId = 10;
const SIGNER: DbId = 1;
const SUBJECT: DbId = 2;
const STRANGER: DbId = 99;

fn gate(signature_valid: bool) -> ConsentGate {
    ConsentGate::new(
        Arc::new(StubDirectory {
            signer_pairs: vec![(SIGNER, COMPANY)],
        }),
        Arc::new(StubVerifier(signature_valid)),
    )
}

fn request(status: &str, expires_at: Timestamp) -> DataAccessRequest {
    DataAccessRequest {
        id: 7,
        company_id: COMPANY,
        requested_by_user_id: SIGNER,
        target_user_id: SUBJECT,
        reference_id: None,
        requested_data_type: "profile".into(),
        status: status.into(),
        price_amount: 10_000,
        currency: "USD".into(),
        reason: None,
        metadata: serde_json::json!({
            "platform_fee_percent": 40,
            "user_fee_percent": 40,
            "ref_creator_fee_percent": 20,
        }),
        consent_given_at: None,
        consent_wallet_signature: None,
        consent_message: None,
        data_accessed: false,
        data_accessed_at: None,
        access_count: 0,
        expires_at,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn live_request(status: &str) -> DataAccessRequest {
    request(status, Utc::now() + Duration::days(7))
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn active_signer_may_create() {
    assert!(gate(true)
        .authorize_creation(SIGNER, COMPANY, false)
        .await
        .is_ok());
}

#[tokio::test]
async fn non_signer_may_not_create() {
    assert_matches!(
        gate(true).authorize_creation(STRANGER, COMPANY, false).await,
        Err(CoreError::Forbidden(_))
    );
}

#[tokio::test]
async fn superadmin_bypasses_signer_check() {
    assert!(gate(true)
        .authorize_creation(STRANGER, COMPANY, true)
        .await
        .is_ok());
}

// ---------------------------------------------------------------------------
// Approval
// ---------------------------------------------------------------------------

#[tokio::test]
async fn subject_with_valid_signature_may_approve() {
    let req = live_request("PENDING");
    assert!(gate(true)
        .authorize_approval(&req, SUBJECT, "addr", "msg", "sig")
        .is_ok());
}

#[tokio::test]
async fn only_the_subject_may_approve() {
    let req = live_request("PENDING");
    assert_matches!(
        gate(true).authorize_approval(&req, STRANGER, "addr", "msg", "sig"),
        Err(CoreError::Forbidden(_))
    );
    // Even the requesting signer cannot approve on the subject's behalf.
    assert_matches!(
        gate(true).authorize_approval(&req, SIGNER, "addr", "msg", "sig"),
        Err(CoreError::Forbidden(_))
    );
}

#[tokio::test]
async fn invalid_signature_blocks_approval() {
    let req = live_request("PENDING");
    assert_matches!(
        gate(false).authorize_approval(&req, SUBJECT, "addr", "msg", "sig"),
        Err(CoreError::Forbidden(_))
    );
}

#[tokio::test]
async fn settled_request_cannot_be_approved() {
    for status in ["APPROVED", "REJECTED", "EXPIRED"] {
        let req = live_request(status);
        assert_matches!(
            gate(true).authorize_approval(&req, SUBJECT, "addr", "msg", "sig"),
            Err(CoreError::Conflict(_)),
            "status {status}"
        );
    }
}

#[tokio::test]
async fn expired_deadline_blocks_approval_before_signature_check() {
    // Still PENDING in storage but past its deadline: conflict, not a
    // signature failure.
    let req = request("PENDING", Utc::now() - Duration::seconds(1));
    assert_matches!(
        gate(true).authorize_approval(&req, SUBJECT, "addr", "msg", "sig"),
        Err(CoreError::Conflict(_))
    );
}

// ---------------------------------------------------------------------------
// Rejection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn subject_may_reject_without_signature() {
    let req = live_request("PENDING");
    assert!(gate(false).authorize_rejection(&req, SUBJECT).is_ok());
}

#[tokio::test]
async fn only_the_subject_may_reject() {
    let req = live_request("PENDING");
    assert_matches!(
        gate(true).authorize_rejection(&req, SIGNER),
        Err(CoreError::Forbidden(_))
    );
}

#[tokio::test]
async fn settled_request_cannot_be_rejected() {
    let req = live_request("APPROVED");
    assert_matches!(
        gate(true).authorize_rejection(&req, SUBJECT),
        Err(CoreError::Conflict(_))
    );
}

// ---------------------------------------------------------------------------
// Retrieval
// ---------------------------------------------------------------------------

#[tokio::test]
async fn signer_may_retrieve_approved_data() {
    let req = live_request("APPROVED");
    assert!(gate(true).authorize_retrieval(&req, SIGNER).await.is_ok());
}

#[tokio::test]
async fn non_signer_may_not_retrieve() {
    let req = live_request("APPROVED");
    assert_matches!(
        gate(true).authorize_retrieval(&req, STRANGER).await,
        Err(CoreError::Forbidden(_))
    );
    // The subject cannot retrieve through the company's purchase either.
    assert_matches!(
        gate(true).authorize_retrieval(&req, SUBJECT).await,
        Err(CoreError::Forbidden(_))
    );
}

#[tokio::test]
async fn unapproved_request_releases_no_data() {
    for status in ["PENDING", "REJECTED", "EXPIRED"] {
        let req = live_request(status);
        assert_matches!(
            gate(true).authorize_retrieval(&req, SIGNER).await,
            Err(CoreError::Forbidden(_)),
            "status {status}"
        );
    }
}

// ---------------------------------------------------------------------------
// Viewing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn subject_and_signer_may_view() {
    let req = live_request("PENDING");
    assert!(gate(true).authorize_view(&req, SUBJECT).await.is_ok());
    assert!(gate(true).authorize_view(&req, SIGNER).await.is_ok());
}

#[tokio::test]
async fn strangers_may_not_view() {
    let req = live_request("PENDING");
    assert_matches!(
        gate(true).authorize_view(&req, STRANGER).await,
        Err(CoreError::Forbidden(_))
    );
}
