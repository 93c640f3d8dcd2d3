//! Repository for `revenue_shares` and the ledger-crediting flow.
//!
//! Crediting is idempotent twice over: share creation upserts on the
//! request id, and each beneficiary credit is a single CTE statement that
//! inserts the audit transaction and increments the ledger atomically —
//! a duplicate transaction aborts the whole statement, so a retry can
//! never double-credit a balance.

use sqlx::PgPool;

use hrkey_core::beneficiary::BeneficiaryRef;
use hrkey_core::payout::DEFAULT_MIN_PAYOUT_THRESHOLD;
use hrkey_core::types::{DbId, MinorUnits, Timestamp};

use crate::models::ledger::{TXN_STATUS_COMPLETED, TXN_TYPE_EARNING};
use crate::models::revenue::{CreateRevenueShare, RevenueShare, SHARE_STATUS_PENDING_PAYOUT};
use crate::DbError;

/// Column list for revenue_shares queries.
const SHARE_COLUMNS: &str = "id, data_access_request_id, total_amount, currency, \
    platform_amount, platform_percent, user_amount, user_percent, \
    ref_creator_amount, ref_creator_percent, ref_creator_user_id, ref_creator_email, \
    status, credited_at, created_at, updated_at";

/// Unique constraint guaranteeing at-most-once crediting per
/// (share, beneficiary).
const UQ_CREDIT: &str = "uq_revenue_transactions_share_beneficiary";

pub struct RevenueRepo;

impl RevenueRepo {
    /// Create the revenue share for an approved request, or return the
    /// existing one. Exactly one share can ever exist per request
    /// (`uq_revenue_shares_request`); a concurrent duplicate attempt is a
    /// success-no-op, never a re-credit.
    pub async fn create_or_get_share(
        pool: &PgPool,
        input: &CreateRevenueShare,
    ) -> Result<RevenueShare, sqlx::Error> {
        let query = format!(
            "INSERT INTO revenue_shares
                (data_access_request_id, total_amount, currency,
                 platform_amount, platform_percent, user_amount, user_percent,
                 ref_creator_amount, ref_creator_percent, ref_creator_user_id,
                 ref_creator_email, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                     '{SHARE_STATUS_PENDING_PAYOUT}')
             ON CONFLICT (data_access_request_id) DO NOTHING
             RETURNING {SHARE_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, RevenueShare>(&query)
            .bind(input.data_access_request_id)
            .bind(input.total_amount)
            .bind(&input.currency)
            .bind(input.platform_amount)
            .bind(input.platform_percent)
            .bind(input.user_amount)
            .bind(input.user_percent)
            .bind(input.ref_creator_amount)
            .bind(input.ref_creator_percent)
            .bind(input.ref_creator_user_id)
            .bind(&input.ref_creator_email)
            .fetch_optional(pool)
            .await?;

        if let Some(share) = inserted {
            return Ok(share);
        }

        let query = format!(
            "SELECT {SHARE_COLUMNS} FROM revenue_shares WHERE data_access_request_id = $1"
        );
        sqlx::query_as::<_, RevenueShare>(&query)
            .bind(input.data_access_request_id)
            .fetch_one(pool)
            .await
    }

    /// Find a share by its request id.
    pub async fn find_by_request(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Option<RevenueShare>, sqlx::Error> {
        let query = format!(
            "SELECT {SHARE_COLUMNS} FROM revenue_shares WHERE data_access_request_id = $1"
        );
        sqlx::query_as::<_, RevenueShare>(&query)
            .bind(request_id)
            .fetch_optional(pool)
            .await
    }

    /// Credit one beneficiary for one share.
    ///
    /// A single statement: the ledger row is created (first credit) or
    /// atomically incremented, and the feeding CTE supplies the
    /// balance_before/balance_after snapshot for the audit transaction.
    /// A 23505 on the (share, beneficiary) uniqueness rolls the paired
    /// ledger increment back and is treated as already-credited.
    pub async fn credit_beneficiary(
        pool: &PgPool,
        share_id: DbId,
        beneficiary: &BeneficiaryRef,
        amount: MinorUnits,
        currency: &str,
        description: &str,
    ) -> Result<(), sqlx::Error> {
        if amount == 0 {
            tracing::debug!(share_id, key = %beneficiary.ledger_key(), "Skipping zero-amount credit");
            return Ok(());
        }

        let query = format!(
            "WITH credit AS (
                INSERT INTO user_balance_ledgers
                    (beneficiary_key, user_id, user_email, total_earned, current_balance,
                     currency, min_payout_threshold)
                VALUES ($1, $2, $3, $4, $4, $5, {DEFAULT_MIN_PAYOUT_THRESHOLD})
                ON CONFLICT (beneficiary_key) DO UPDATE
                    SET total_earned = user_balance_ledgers.total_earned + $4,
                        current_balance = user_balance_ledgers.current_balance + $4,
                        updated_at = now()
                RETURNING id, beneficiary_key, current_balance
            )
            INSERT INTO revenue_transactions
                (ledger_id, beneficiary_key, revenue_share_id, transaction_type,
                 amount, balance_before, balance_after, status, description)
            SELECT id, beneficiary_key, $6, '{TXN_TYPE_EARNING}',
                   $4, current_balance - $4, current_balance, '{TXN_STATUS_COMPLETED}', $7
            FROM credit"
        );
        let result = sqlx::query(&query)
        .bind(beneficiary.ledger_key())
        .bind(beneficiary.user_id())
        .bind(beneficiary.email())
        .bind(amount)
        .bind(currency)
        .bind(share_id)
        .bind(description)
        .execute(pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
                    && e.constraint() == Some(UQ_CREDIT) =>
            {
                tracing::debug!(
                    share_id,
                    key = %beneficiary.ledger_key(),
                    "Beneficiary already credited for this share"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Apply a share's split to the beneficiary ledgers: subject first,
    /// then the reference author when one resolved. The platform cut goes
    /// to the external treasury and is only recorded on the share row.
    ///
    /// Idempotent and resumable: each credit is independently
    /// at-most-once, and `credited_at` is stamped only after both are
    /// durable, so a partial failure is retried from the share row rather
    /// than abandoned.
    pub async fn apply_split(
        pool: &PgPool,
        share: &RevenueShare,
        target_user_id: DbId,
    ) -> Result<(), DbError> {
        if share.is_credited() {
            return Ok(());
        }

        let subject = BeneficiaryRef::registered(target_user_id);
        let description = format!(
            "Earning from data access request {}",
            share.data_access_request_id
        );
        Self::credit_beneficiary(
            pool,
            share.id,
            &subject,
            share.user_amount,
            &share.currency,
            &description,
        )
        .await?;

        if let Some(author) = share.ref_creator_beneficiary() {
            Self::credit_beneficiary(
                pool,
                share.id,
                &author,
                share.ref_creator_amount,
                &share.currency,
                &description,
            )
            .await?;
        }

        sqlx::query(
            "UPDATE revenue_shares
             SET credited_at = now(), updated_at = now()
             WHERE id = $1 AND credited_at IS NULL",
        )
        .bind(share.id)
        .execute(pool)
        .await?;

        tracing::info!(
            share_id = share.id,
            request_id = share.data_access_request_id,
            user_amount = share.user_amount,
            ref_creator_amount = share.ref_creator_amount,
            "Revenue share credited"
        );
        Ok(())
    }

    /// Shares whose crediting never completed, oldest first. Fed to the
    /// revenue reconciler.
    pub async fn list_uncredited(
        pool: &PgPool,
        created_before: Timestamp,
        limit: i64,
    ) -> Result<Vec<RevenueShare>, sqlx::Error> {
        let query = format!(
            "SELECT {SHARE_COLUMNS} FROM revenue_shares
             WHERE credited_at IS NULL AND created_at < $1
             ORDER BY created_at ASC
             LIMIT $2"
        );
        sqlx::query_as::<_, RevenueShare>(&query)
            .bind(created_before)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
