//! Balance ledger and transaction-log rows.

use hrkey_core::types::{DbId, MinorUnits, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const TXN_TYPE_EARNING: &str = "EARNING";
pub const TXN_TYPE_PAYOUT: &str = "PAYOUT";

pub const TXN_STATUS_COMPLETED: &str = "completed";
pub const TXN_STATUS_PENDING: &str = "pending";
pub const TXN_STATUS_CONFIRMED: &str = "confirmed";
pub const TXN_STATUS_FAILED: &str = "failed";

/// A row from the `user_balance_ledgers` table.
///
/// Invariant (also a CHECK constraint):
/// `current_balance == total_earned - total_paid_out`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserBalanceLedger {
    pub id: DbId,
    pub beneficiary_key: String,
    pub user_id: Option<DbId>,
    pub user_email: Option<String>,
    pub total_earned: MinorUnits,
    pub total_paid_out: MinorUnits,
    pub current_balance: MinorUnits,
    pub currency: String,
    pub min_payout_threshold: MinorUnits,
    pub preferred_payout_method: Option<String>,
    pub wallet_address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the append-only `revenue_transactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RevenueTransaction {
    pub id: DbId,
    pub ledger_id: DbId,
    pub beneficiary_key: String,
    pub revenue_share_id: Option<DbId>,
    pub transaction_type: String,
    pub amount: MinorUnits,
    pub balance_before: MinorUnits,
    pub balance_after: MinorUnits,
    pub status: String,
    pub payment_provider: Option<String>,
    pub external_tx_id: Option<String>,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

/// Request body for the payout endpoint. `amount` in minor units;
/// omitted means "everything available".
#[derive(Debug, Clone, Deserialize)]
pub struct PayoutRequestBody {
    pub amount: Option<MinorUnits>,
    pub method: hrkey_core::payout::PayoutMethod,
}

/// Request body for the payout confirmation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmPayoutBody {
    pub external_tx_id: String,
    pub payment_provider: String,
}

/// Request body for the payout failure endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FailPayoutBody {
    pub reason: Option<String>,
}

/// Balance summary returned by the balance endpoint; zeroed when the
/// caller has no ledger row yet.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSummary {
    pub total_earned: MinorUnits,
    pub total_paid_out: MinorUnits,
    pub current_balance: MinorUnits,
    pub currency: String,
}

impl BalanceSummary {
    pub fn zeroed(currency: &str) -> Self {
        Self {
            total_earned: 0,
            total_paid_out: 0,
            current_balance: 0,
            currency: currency.to_string(),
        }
    }
}

impl From<&UserBalanceLedger> for BalanceSummary {
    fn from(ledger: &UserBalanceLedger) -> Self {
        Self {
            total_earned: ledger.total_earned,
            total_paid_out: ledger.total_paid_out,
            current_balance: ledger.current_balance,
            currency: ledger.currency.clone(),
        }
    }
}
