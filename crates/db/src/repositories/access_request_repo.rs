//! Repository for the `data_access_requests` table.
//!
//! Every status change is a conditional update keyed on the expected prior
//! state (`WHERE status = 'PENDING'`); zero affected rows means another
//! writer got there first and the caller must treat the attempt as a
//! conflict. There is no read-then-write anywhere in this module.

use sqlx::PgPool;

use hrkey_core::request::RequestStatus;
use hrkey_core::types::DbId;

use crate::models::access_request::{ConsentRecord, CreateAccessRequest, DataAccessRequest};

/// Column list for data_access_requests queries.
const REQUEST_COLUMNS: &str = "id, company_id, requested_by_user_id, target_user_id, \
    reference_id, requested_data_type, status, price_amount, currency, reason, metadata, \
    consent_given_at, consent_wallet_signature, consent_message, \
    data_accessed, data_accessed_at, access_count, expires_at, created_at, updated_at";

pub struct AccessRequestRepo;

impl AccessRequestRepo {
    /// Insert a new request, returning the created row.
    ///
    /// The partial unique index `uq_access_requests_pending` enforces the
    /// one-PENDING-per-(company, target) invariant; a violation surfaces
    /// as a 23505 database error which the API layer maps to 409.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAccessRequest,
    ) -> Result<DataAccessRequest, sqlx::Error> {
        let metadata = serde_json::to_value(input.fee_snapshot)
            .expect("FeePercents always serializes");
        let query = format!(
            "INSERT INTO data_access_requests
                (company_id, requested_by_user_id, target_user_id, reference_id,
                 requested_data_type, price_amount, currency, reason, metadata, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {REQUEST_COLUMNS}"
        );
        sqlx::query_as::<_, DataAccessRequest>(&query)
            .bind(input.company_id)
            .bind(input.requested_by_user_id)
            .bind(input.target_user_id)
            .bind(input.reference_id)
            .bind(&input.requested_data_type)
            .bind(input.price_amount)
            .bind(&input.currency)
            .bind(&input.reason)
            .bind(metadata)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Lazily expire a single PENDING request past its deadline, then
    /// fetch it. Callers always see an up-to-date status.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DataAccessRequest>, sqlx::Error> {
        sqlx::query(
            "UPDATE data_access_requests
             SET status = 'EXPIRED', updated_at = now()
             WHERE id = $1 AND status = 'PENDING' AND expires_at < now()",
        )
        .bind(id)
        .execute(pool)
        .await?;

        let query = format!("SELECT {REQUEST_COLUMNS} FROM data_access_requests WHERE id = $1");
        sqlx::query_as::<_, DataAccessRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List live PENDING requests targeting a subject, oldest first,
    /// lazily expiring any that are past their deadline.
    pub async fn list_pending_for_target(
        pool: &PgPool,
        target_user_id: DbId,
    ) -> Result<Vec<DataAccessRequest>, sqlx::Error> {
        sqlx::query(
            "UPDATE data_access_requests
             SET status = 'EXPIRED', updated_at = now()
             WHERE target_user_id = $1 AND status = 'PENDING' AND expires_at < now()",
        )
        .bind(target_user_id)
        .execute(pool)
        .await?;

        let query = format!(
            "SELECT {REQUEST_COLUMNS} FROM data_access_requests
             WHERE target_user_id = $1 AND status = 'PENDING'
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, DataAccessRequest>(&query)
            .bind(target_user_id)
            .fetch_all(pool)
            .await
    }

    /// Approve a request, recording the consent proof.
    ///
    /// Conditional on the row still being PENDING and unexpired; returns
    /// `None` when another writer already settled it (or it expired), in
    /// which case exactly one concurrent caller saw `Some`.
    pub async fn approve(
        pool: &PgPool,
        id: DbId,
        consent: &ConsentRecord,
    ) -> Result<Option<DataAccessRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE data_access_requests
             SET status = 'APPROVED',
                 consent_given_at = now(),
                 consent_wallet_signature = $2,
                 consent_message = $3,
                 updated_at = now()
             WHERE id = $1 AND status = 'PENDING' AND expires_at >= now()
             RETURNING {REQUEST_COLUMNS}"
        );
        sqlx::query_as::<_, DataAccessRequest>(&query)
            .bind(id)
            .bind(&consent.wallet_signature)
            .bind(&consent.message)
            .fetch_optional(pool)
            .await
    }

    /// Move a PENDING request to a terminal state (REJECTED or EXPIRED).
    ///
    /// Returns `None` when the row was not PENDING any more.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        to: RequestStatus,
    ) -> Result<Option<DataAccessRequest>, sqlx::Error> {
        debug_assert!(RequestStatus::Pending.can_transition_to(to));
        let query = format!(
            "UPDATE data_access_requests
             SET status = $2, updated_at = now()
             WHERE id = $1 AND status = 'PENDING'
             RETURNING {REQUEST_COLUMNS}"
        );
        sqlx::query_as::<_, DataAccessRequest>(&query)
            .bind(id)
            .bind(to.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Record one successful data retrieval: bump `access_count`, stamp
    /// `data_accessed_at`, latch `data_accessed`. Conditional on the
    /// request being APPROVED; additive, so concurrent calls are safe.
    pub async fn record_access(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DataAccessRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE data_access_requests
             SET access_count = access_count + 1,
                 data_accessed = TRUE,
                 data_accessed_at = now(),
                 updated_at = now()
             WHERE id = $1 AND status = 'APPROVED'
             RETURNING {REQUEST_COLUMNS}"
        );
        sqlx::query_as::<_, DataAccessRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
