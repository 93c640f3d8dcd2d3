//! Candidate reference rows (read-only from the marketplace's viewpoint).

use hrkey_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `candidate_references` table.
///
/// `author_user_id` is set when the author is a registered account;
/// `author_email` covers authors who never signed up. Either (or both)
/// may be present.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CandidateReference {
    pub id: DbId,
    pub user_id: DbId,
    pub author_user_id: Option<DbId>,
    pub author_email: Option<String>,
    pub author_name: String,
    pub relationship: Option<String>,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
