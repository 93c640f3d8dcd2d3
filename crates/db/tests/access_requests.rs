//! Integration tests for the data-access request lifecycle:
//! pending-uniqueness, conditional transitions, lazy expiry, and access
//! tracking. Run against a real database via `#[sqlx::test]`.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use hrkey_core::request::{FeePercents, RequestStatus};
use hrkey_core::types::DbId;
use hrkey_db::models::access_request::{ConsentRecord, CreateAccessRequest};
use hrkey_db::repositories::AccessRequestRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, email: &str) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO users (email, full_name) VALUES ($1, $2) RETURNING id",
    )
    .bind(email)
    .bind("Test User")
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn seed_company(pool: &PgPool, name: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO companies (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

fn snapshot() -> FeePercents {
    FeePercents {
        platform_fee_percent: 40,
        user_fee_percent: 40,
        ref_creator_fee_percent: 20,
    }
}

fn new_request(company_id: DbId, signer_id: DbId, target_id: DbId) -> CreateAccessRequest {
    CreateAccessRequest {
        company_id,
        requested_by_user_id: signer_id,
        target_user_id: target_id,
        reference_id: None,
        requested_data_type: "profile".to_string(),
        price_amount: 10_000,
        currency: "USD".to_string(),
        reason: Some("pre-hire screening".to_string()),
        fee_snapshot: snapshot(),
        expires_at: Utc::now() + Duration::days(7),
    }
}

fn consent() -> ConsentRecord {
    ConsentRecord {
        wallet_signature: "ab".repeat(64),
        message: "I consent to data access".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_snapshots_fee_percents_into_metadata(pool: PgPool) {
    let company = seed_company(&pool, "Acme").await;
    let signer = seed_user(&pool, "signer@acme.test").await;
    let target = seed_user(&pool, "candidate@mail.test").await;

    let request = AccessRequestRepo::create(&pool, &new_request(company, signer, target))
        .await
        .unwrap();

    assert_eq!(request.status().unwrap(), RequestStatus::Pending);
    assert_eq!(request.price_amount, 10_000);
    assert_eq!(request.fee_snapshot().unwrap(), snapshot());
    assert_eq!(request.access_count, 0);
    assert!(!request.data_accessed);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_pending_request_for_same_pair_is_rejected(pool: PgPool) {
    let company = seed_company(&pool, "Acme").await;
    let signer = seed_user(&pool, "signer@acme.test").await;
    let target = seed_user(&pool, "candidate@mail.test").await;

    AccessRequestRepo::create(&pool, &new_request(company, signer, target))
        .await
        .unwrap();
    let err = AccessRequestRepo::create(&pool, &new_request(company, signer, target))
        .await
        .unwrap_err();

    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.code().as_deref(), Some("23505"));
            assert_eq!(db_err.constraint(), Some("uq_access_requests_pending"));
        }
        other => panic!("expected unique violation, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn settled_request_frees_the_pair_for_a_new_pending(pool: PgPool) {
    let company = seed_company(&pool, "Acme").await;
    let signer = seed_user(&pool, "signer@acme.test").await;
    let target = seed_user(&pool, "candidate@mail.test").await;

    let first = AccessRequestRepo::create(&pool, &new_request(company, signer, target))
        .await
        .unwrap();
    AccessRequestRepo::transition(&pool, first.id, RequestStatus::Rejected)
        .await
        .unwrap()
        .unwrap();

    // The partial unique index only covers PENDING rows.
    AccessRequestRepo::create(&pool, &new_request(company, signer, target))
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn approve_records_consent_and_settles_the_request(pool: PgPool) {
    let company = seed_company(&pool, "Acme").await;
    let signer = seed_user(&pool, "signer@acme.test").await;
    let target = seed_user(&pool, "candidate@mail.test").await;

    let request = AccessRequestRepo::create(&pool, &new_request(company, signer, target))
        .await
        .unwrap();

    let approved = AccessRequestRepo::approve(&pool, request.id, &consent())
        .await
        .unwrap()
        .expect("first approval wins");

    assert_eq!(approved.status().unwrap(), RequestStatus::Approved);
    assert!(approved.consent_given_at.is_some());
    assert_eq!(
        approved.consent_message.as_deref(),
        Some("I consent to data access")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_approval_attempt_loses_the_conditional_update(pool: PgPool) {
    let company = seed_company(&pool, "Acme").await;
    let signer = seed_user(&pool, "signer@acme.test").await;
    let target = seed_user(&pool, "candidate@mail.test").await;

    let request = AccessRequestRepo::create(&pool, &new_request(company, signer, target))
        .await
        .unwrap();

    let first = AccessRequestRepo::approve(&pool, request.id, &consent())
        .await
        .unwrap();
    let second = AccessRequestRepo::approve(&pool, request.id, &consent())
        .await
        .unwrap();

    assert!(first.is_some());
    assert!(second.is_none(), "exactly one approval may succeed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rejecting_an_approved_request_fails(pool: PgPool) {
    let company = seed_company(&pool, "Acme").await;
    let signer = seed_user(&pool, "signer@acme.test").await;
    let target = seed_user(&pool, "candidate@mail.test").await;

    let request = AccessRequestRepo::create(&pool, &new_request(company, signer, target))
        .await
        .unwrap();
    AccessRequestRepo::approve(&pool, request.id, &consent())
        .await
        .unwrap()
        .unwrap();

    let rejected = AccessRequestRepo::transition(&pool, request.id, RequestStatus::Rejected)
        .await
        .unwrap();
    assert!(rejected.is_none());

    // The stored status is untouched.
    let row = AccessRequestRepo::find_by_id(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status().unwrap(), RequestStatus::Approved);
}

// ---------------------------------------------------------------------------
// Lazy expiry
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn stale_pending_request_expires_on_read(pool: PgPool) {
    let company = seed_company(&pool, "Acme").await;
    let signer = seed_user(&pool, "signer@acme.test").await;
    let target = seed_user(&pool, "candidate@mail.test").await;

    let mut input = new_request(company, signer, target);
    input.expires_at = Utc::now() - Duration::hours(1);
    let request = AccessRequestRepo::create(&pool, &input).await.unwrap();

    let pending = AccessRequestRepo::list_pending_for_target(&pool, target)
        .await
        .unwrap();
    assert!(pending.is_empty(), "expired requests are not pending");

    let row = AccessRequestRepo::find_by_id(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status().unwrap(), RequestStatus::Expired);

    // Approval of the now-expired request loses the conditional update.
    let approved = AccessRequestRepo::approve(&pool, request.id, &consent())
        .await
        .unwrap();
    assert!(approved.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn approval_guard_also_covers_an_unswept_stale_row(pool: PgPool) {
    let company = seed_company(&pool, "Acme").await;
    let signer = seed_user(&pool, "signer@acme.test").await;
    let target = seed_user(&pool, "candidate@mail.test").await;

    let mut input = new_request(company, signer, target);
    input.expires_at = Utc::now() - Duration::hours(1);
    let request = AccessRequestRepo::create(&pool, &input).await.unwrap();

    // No read expired the row yet; the approve statement's own
    // expires_at guard must still refuse it.
    let approved = AccessRequestRepo::approve(&pool, request.id, &consent())
        .await
        .unwrap();
    assert!(approved.is_none());
}

// ---------------------------------------------------------------------------
// Access tracking
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn record_access_is_additive_and_unbounded(pool: PgPool) {
    let company = seed_company(&pool, "Acme").await;
    let signer = seed_user(&pool, "signer@acme.test").await;
    let target = seed_user(&pool, "candidate@mail.test").await;

    let request = AccessRequestRepo::create(&pool, &new_request(company, signer, target))
        .await
        .unwrap();
    AccessRequestRepo::approve(&pool, request.id, &consent())
        .await
        .unwrap()
        .unwrap();

    let first = AccessRequestRepo::record_access(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.access_count, 1);
    assert!(first.data_accessed);
    assert!(first.data_accessed_at.is_some());

    let third = {
        AccessRequestRepo::record_access(&pool, request.id)
            .await
            .unwrap()
            .unwrap();
        AccessRequestRepo::record_access(&pool, request.id)
            .await
            .unwrap()
            .unwrap()
    };
    assert_eq!(third.access_count, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn record_access_refuses_unapproved_requests(pool: PgPool) {
    let company = seed_company(&pool, "Acme").await;
    let signer = seed_user(&pool, "signer@acme.test").await;
    let target = seed_user(&pool, "candidate@mail.test").await;

    let request = AccessRequestRepo::create(&pool, &new_request(company, signer, target))
        .await
        .unwrap();

    let tracked = AccessRequestRepo::record_access(&pool, request.id)
        .await
        .unwrap();
    assert!(tracked.is_none());
}
