//! Revenue share rows: the durable record of one approved request's
//! three-way split. Exactly one share per request.

use hrkey_core::beneficiary::BeneficiaryRef;
use hrkey_core::types::{DbId, MinorUnits, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Status a share is created with; flipping to `PAID` belongs to the
/// external payout reporting flow.
pub const SHARE_STATUS_PENDING_PAYOUT: &str = "PENDING_PAYOUT";

/// A row from the `revenue_shares` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RevenueShare {
    pub id: DbId,
    pub data_access_request_id: DbId,
    pub total_amount: MinorUnits,
    pub currency: String,
    pub platform_amount: MinorUnits,
    pub platform_percent: i32,
    pub user_amount: MinorUnits,
    pub user_percent: i32,
    pub ref_creator_amount: MinorUnits,
    pub ref_creator_percent: i32,
    pub ref_creator_user_id: Option<DbId>,
    pub ref_creator_email: Option<String>,
    pub status: String,
    pub credited_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RevenueShare {
    /// Whether every ledger credit for this share is durable.
    pub fn is_credited(&self) -> bool {
        self.credited_at.is_some()
    }

    /// The reference author's ledger identity, if one was resolved at
    /// approval time. `None` means the author share is skipped entirely.
    pub fn ref_creator_beneficiary(&self) -> Option<BeneficiaryRef> {
        if let Some(user_id) = self.ref_creator_user_id {
            return Some(BeneficiaryRef::registered(user_id));
        }
        self.ref_creator_email
            .as_deref()
            .and_then(|email| BeneficiaryRef::external(email).ok())
    }
}

/// DTO for inserting a revenue share.
#[derive(Debug, Clone)]
pub struct CreateRevenueShare {
    pub data_access_request_id: DbId,
    pub total_amount: MinorUnits,
    pub currency: String,
    pub platform_amount: MinorUnits,
    pub platform_percent: i32,
    pub user_amount: MinorUnits,
    pub user_percent: i32,
    pub ref_creator_amount: MinorUnits,
    pub ref_creator_percent: i32,
    pub ref_creator_user_id: Option<DbId>,
    pub ref_creator_email: Option<String>,
}
