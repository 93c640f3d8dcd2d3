//! Minimal user rows. Account management is external; the marketplace only
//! reads these (signer membership is checked directly in `UserRepo`).

use hrkey_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table, narrowed to the fields the data-access
/// flow needs.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub wallet_address: Option<String>,
    pub role: String,
    pub profile: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
