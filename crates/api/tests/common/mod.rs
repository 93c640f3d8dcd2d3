//! Shared helpers for API integration tests: router construction mirroring
//! `main.rs`, JWT minting, HTTP plumbing, and database seeding.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use hrkey_api::auth::jwt::{generate_access_token, JwtConfig};
use hrkey_api::config::ServerConfig;
use hrkey_api::gate::ConsentGate;
use hrkey_api::router::build_app_router;
use hrkey_api::services::{
    Ed25519Verifier, Notifier, PgReferenceStore, PgSignerDirectory, ReferenceStore,
    SignatureVerifier, SignerDirectory,
};
use hrkey_api::state::AppState;
use hrkey_core::types::DbId;
use hrkey_db::pricing::PricingCatalog;

/// Notifier that swallows everything; tests never want real email.
struct NoopNotifier;

#[async_trait::async_trait]
impl Notifier for NoopNotifier {
    async fn notify(
        &self,
        _recipient_email: &str,
        _subject: &str,
        _body: String,
    ) -> Result<(), String> {
        Ok(())
    }
}

/// Build a test `ServerConfig` with safe defaults.
///
/// The pricing cache TTL is zero so every lookup hits the database --
/// tests that change pricing rows must never see a stale cache.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        request_ttl_days: 7,
        pricing_cache_ttl_secs: 0,
        default_currency: "USD".to_string(),
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the construction in `main.rs` so integration tests
/// exercise the same middleware stack that production uses, with real
/// Postgres-backed collaborators and the real ed25519 verifier.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();

    let directory: Arc<dyn SignerDirectory> = Arc::new(PgSignerDirectory::new(pool.clone()));
    let references: Arc<dyn ReferenceStore> = Arc::new(PgReferenceStore::new(pool.clone()));
    let verifier: Arc<dyn SignatureVerifier> = Arc::new(Ed25519Verifier);
    let notifier: Arc<dyn Notifier> = Arc::new(NoopNotifier);

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        pricing: Arc::new(PricingCatalog::new(Duration::from_secs(
            config.pricing_cache_ttl_secs,
        ))),
        gate: Arc::new(ConsentGate::new(Arc::clone(&directory), verifier)),
        directory,
        references,
        notifier,
    };

    build_app_router(state, &config)
}

/// Mint an access token for the given user and role.
pub fn token_for(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).unwrap()
}

/// Send one request through the router and parse the JSON response.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

pub async fn seed_user(pool: &PgPool, email: &str, wallet_address: Option<&str>) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO users (email, full_name, wallet_address) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(email)
    .bind("Test User")
    .bind(wallet_address)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn seed_company(pool: &PgPool, name: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO companies (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn seed_signer(pool: &PgPool, company_id: DbId, user_id: DbId) {
    sqlx::query("INSERT INTO company_signers (company_id, user_id) VALUES ($1, $2)")
        .bind(company_id)
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn seed_pricing(pool: &PgPool, data_type: &str, price_amount: i64) {
    sqlx::query(
        "INSERT INTO pricing_configs
            (data_type, price_amount, platform_fee_percent, user_fee_percent,
             ref_creator_fee_percent)
         VALUES ($1, $2, 40, 40, 20)",
    )
    .bind(data_type)
    .bind(price_amount)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn seed_reference(pool: &PgPool, user_id: DbId, author_user_id: Option<DbId>) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO candidate_references
            (user_id, author_user_id, author_email, author_name, content)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(user_id)
    .bind(author_user_id)
    .bind(author_user_id.is_none().then_some("author@mail.test"))
    .bind("Former Manager")
    .bind("Reliable and thorough.")
    .fetch_one(pool)
    .await
    .unwrap()
}
