//! Payout lifecycle: request (reserve), confirm (debit), fail (release).
//!
//! A payout request never touches `current_balance`; it appends a pending
//! PAYOUT transaction that reserves part of the balance. Only confirmation
//! — after the external payment actually went through — debits the ledger,
//! so a failed external payout can never strand funds. The request path
//! takes a row lock on the ledger so two concurrent requests cannot both
//! reserve the same money.

use sqlx::PgPool;

use hrkey_core::beneficiary::BeneficiaryRef;
use hrkey_core::error::CoreError;
use hrkey_core::payout::{validate_payout, PayoutMethod};
use hrkey_core::types::{DbId, MinorUnits};

use crate::models::ledger::{
    RevenueTransaction, UserBalanceLedger, TXN_STATUS_CONFIRMED, TXN_STATUS_FAILED,
    TXN_STATUS_PENDING, TXN_TYPE_PAYOUT,
};
use crate::repositories::ledger_repo::{LEDGER_COLUMNS, TXN_COLUMNS};
use crate::repositories::LedgerRepo;
use crate::DbError;

pub struct PayoutRepo;

impl PayoutRepo {
    /// Reserve a payout: validate against the available balance and append
    /// a pending PAYOUT transaction.
    ///
    /// Runs in one database transaction with the ledger row locked
    /// (`FOR UPDATE`), so the available-balance check and the reservation
    /// are atomic with respect to concurrent payout requests and credits.
    pub async fn request(
        pool: &PgPool,
        beneficiary: &BeneficiaryRef,
        requested: Option<MinorUnits>,
        method: PayoutMethod,
    ) -> Result<RevenueTransaction, DbError> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {LEDGER_COLUMNS} FROM user_balance_ledgers
             WHERE beneficiary_key = $1
             FOR UPDATE"
        );
        let ledger: Option<UserBalanceLedger> = sqlx::query_as(&query)
            .bind(beneficiary.ledger_key())
            .fetch_optional(&mut *tx)
            .await?;
        let ledger = ledger.ok_or_else(|| {
            CoreError::Validation("no earnings balance exists for this account".into())
        })?;

        let reserved: MinorUnits = LedgerRepo::pending_payout_total(&mut *tx, ledger.id).await?;

        let amount = validate_payout(
            requested,
            ledger.current_balance,
            reserved,
            ledger.min_payout_threshold,
        )?;

        let query = format!(
            "INSERT INTO revenue_transactions
                (ledger_id, beneficiary_key, transaction_type, amount,
                 balance_before, balance_after, status, payment_provider, description)
             VALUES ($1, $2, '{TXN_TYPE_PAYOUT}', $3, $4, $5, '{TXN_STATUS_PENDING}', $6, $7)
             RETURNING {TXN_COLUMNS}"
        );
        let txn: RevenueTransaction = sqlx::query_as(&query)
            .bind(ledger.id)
            .bind(&ledger.beneficiary_key)
            .bind(-amount)
            .bind(ledger.current_balance)
            .bind(ledger.current_balance - amount)
            .bind(method.as_str())
            .bind(format!("Payout via {}", method.as_str()))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            ledger_id = ledger.id,
            transaction_id = txn.id,
            amount,
            method = method.as_str(),
            "Payout requested"
        );
        Ok(txn)
    }

    /// Confirm a pending payout after the external payment settled.
    ///
    /// Conditionally flips the transaction pending -> confirmed (a second
    /// confirmation attempt loses the conditional update and gets a
    /// conflict) and, in the same database transaction, debits the ledger:
    /// `total_paid_out` up, `current_balance` down, keeping
    /// `current_balance == total_earned - total_paid_out` at every commit.
    pub async fn confirm(
        pool: &PgPool,
        transaction_id: DbId,
        external_tx_id: &str,
        payment_provider: &str,
    ) -> Result<RevenueTransaction, DbError> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE revenue_transactions
             SET status = '{TXN_STATUS_CONFIRMED}', external_tx_id = $2, payment_provider = $3
             WHERE id = $1 AND transaction_type = '{TXN_TYPE_PAYOUT}' AND status = '{TXN_STATUS_PENDING}'
             RETURNING {TXN_COLUMNS}"
        );
        let txn: Option<RevenueTransaction> = sqlx::query_as(&query)
            .bind(transaction_id)
            .bind(external_tx_id)
            .bind(payment_provider)
            .fetch_optional(&mut *tx)
            .await?;
        let txn = txn.ok_or_else(|| {
            CoreError::Conflict(format!(
                "payout transaction {transaction_id} is not pending"
            ))
        })?;

        let debit = -txn.amount;
        sqlx::query(
            "UPDATE user_balance_ledgers
             SET total_paid_out = total_paid_out + $2,
                 current_balance = current_balance - $2,
                 updated_at = now()
             WHERE id = $1",
        )
        .bind(txn.ledger_id)
        .bind(debit)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id,
            ledger_id = txn.ledger_id,
            amount = debit,
            external_tx_id,
            "Payout confirmed, ledger debited"
        );
        Ok(txn)
    }

    /// Mark a pending payout as failed, releasing its reservation. The
    /// ledger is untouched — the money was never debited.
    pub async fn fail(
        pool: &PgPool,
        transaction_id: DbId,
        reason: &str,
    ) -> Result<RevenueTransaction, DbError> {
        let query = format!(
            "UPDATE revenue_transactions
             SET status = '{TXN_STATUS_FAILED}', description = $2
             WHERE id = $1 AND transaction_type = '{TXN_TYPE_PAYOUT}' AND status = '{TXN_STATUS_PENDING}'
             RETURNING {TXN_COLUMNS}"
        );
        let txn: Option<RevenueTransaction> = sqlx::query_as(&query)
            .bind(transaction_id)
            .bind(reason)
            .fetch_optional(pool)
            .await?;
        let txn = txn.ok_or_else(|| {
            CoreError::Conflict(format!(
                "payout transaction {transaction_id} is not pending"
            ))
        })?;

        tracing::warn!(transaction_id, ledger_id = txn.ledger_id, reason, "Payout failed");
        Ok(txn)
    }
}
