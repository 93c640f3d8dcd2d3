//! Read access to balance ledgers and the transaction log. Mutations live
//! in `revenue_repo` (credits) and `payout_repo` (reservations/debits).

use sqlx::PgPool;

use hrkey_core::beneficiary::BeneficiaryRef;
use hrkey_core::types::{DbId, MinorUnits};

use crate::models::ledger::{
    RevenueTransaction, UserBalanceLedger, TXN_STATUS_PENDING, TXN_TYPE_PAYOUT,
};

/// Column list for user_balance_ledgers queries.
pub(crate) const LEDGER_COLUMNS: &str = "id, beneficiary_key, user_id, user_email, \
    total_earned, total_paid_out, current_balance, currency, min_payout_threshold, \
    preferred_payout_method, wallet_address, created_at, updated_at";

/// Column list for revenue_transactions queries.
pub(crate) const TXN_COLUMNS: &str = "id, ledger_id, beneficiary_key, revenue_share_id, \
    transaction_type, amount, balance_before, balance_after, status, \
    payment_provider, external_tx_id, description, created_at";

pub struct LedgerRepo;

impl LedgerRepo {
    /// Find a ledger by its beneficiary key.
    pub async fn find_by_beneficiary(
        pool: &PgPool,
        beneficiary: &BeneficiaryRef,
    ) -> Result<Option<UserBalanceLedger>, sqlx::Error> {
        let query = format!(
            "SELECT {LEDGER_COLUMNS} FROM user_balance_ledgers WHERE beneficiary_key = $1"
        );
        sqlx::query_as::<_, UserBalanceLedger>(&query)
            .bind(beneficiary.ledger_key())
            .fetch_optional(pool)
            .await
    }

    /// Total amount reserved by payout transactions still pending on a
    /// ledger. Payout amounts are negative, hence the sign flip.
    ///
    /// Generic over the executor so `payout_repo` can run it inside the
    /// transaction that holds the ledger row lock.
    pub async fn pending_payout_total<'e, E>(
        executor: E,
        ledger_id: DbId,
    ) -> Result<MinorUnits, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "SELECT COALESCE(SUM(-amount), 0)::BIGINT
             FROM revenue_transactions
             WHERE ledger_id = $1
               AND transaction_type = '{TXN_TYPE_PAYOUT}'
               AND status = '{TXN_STATUS_PENDING}'"
        );
        sqlx::query_scalar(&query)
            .bind(ledger_id)
            .fetch_one(executor)
            .await
    }

    /// Transaction history for a ledger, newest first.
    pub async fn list_transactions(
        pool: &PgPool,
        ledger_id: DbId,
    ) -> Result<Vec<RevenueTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {TXN_COLUMNS} FROM revenue_transactions
             WHERE ledger_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, RevenueTransaction>(&query)
            .bind(ledger_id)
            .fetch_all(pool)
            .await
    }
}
