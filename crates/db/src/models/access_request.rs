//! Data-access request rows and DTOs.

use hrkey_core::error::CoreError;
use hrkey_core::request::{FeePercents, RequestStatus};
use hrkey_core::types::{DbId, MinorUnits, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `data_access_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DataAccessRequest {
    pub id: DbId,
    pub company_id: DbId,
    pub requested_by_user_id: DbId,
    pub target_user_id: DbId,
    pub reference_id: Option<DbId>,
    pub requested_data_type: String,
    pub status: String,
    pub price_amount: MinorUnits,
    pub currency: String,
    pub reason: Option<String>,
    pub metadata: serde_json::Value,
    pub consent_given_at: Option<Timestamp>,
    pub consent_wallet_signature: Option<String>,
    pub consent_message: Option<String>,
    pub data_accessed: bool,
    pub data_accessed_at: Option<Timestamp>,
    pub access_count: i32,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DataAccessRequest {
    pub fn status(&self) -> Result<RequestStatus, CoreError> {
        RequestStatus::parse(&self.status)
    }

    /// The fee-percent snapshot taken at creation time. Approval reads
    /// this, never the live pricing table.
    pub fn fee_snapshot(&self) -> Result<FeePercents, CoreError> {
        serde_json::from_value(self.metadata.clone()).map_err(|e| {
            CoreError::Internal(format!(
                "request {} has a malformed fee snapshot: {e}",
                self.id
            ))
        })
    }
}

/// DTO for inserting a new data-access request.
#[derive(Debug, Clone)]
pub struct CreateAccessRequest {
    pub company_id: DbId,
    pub requested_by_user_id: DbId,
    pub target_user_id: DbId,
    pub reference_id: Option<DbId>,
    pub requested_data_type: String,
    pub price_amount: MinorUnits,
    pub currency: String,
    pub reason: Option<String>,
    /// Fee-percent snapshot, serialized into the `metadata` column.
    pub fee_snapshot: FeePercents,
    pub expires_at: Timestamp,
}

/// Consent fields recorded when the subject approves a request.
#[derive(Debug, Clone)]
pub struct ConsentRecord {
    pub wallet_signature: String,
    pub message: String,
}

/// Request body for the approve endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApproveAccessRequest {
    pub signature: String,
    pub wallet_address: String,
    pub message: String,
}

/// Request body for the create endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccessRequestBody {
    pub company_id: DbId,
    pub target_user_id: DbId,
    pub data_type: String,
    pub reference_id: Option<DbId>,
    pub reason: Option<String>,
}
