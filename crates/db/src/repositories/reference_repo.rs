//! Read-only access to the `candidate_references` table.

use sqlx::PgPool;

use hrkey_core::types::DbId;

use crate::models::reference::CandidateReference;

/// Column list for candidate_references queries.
const REFERENCE_COLUMNS: &str = "id, user_id, author_user_id, author_email, author_name, \
    relationship, content, created_at, updated_at";

pub struct ReferenceRepo;

impl ReferenceRepo {
    /// Find a reference by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CandidateReference>, sqlx::Error> {
        let query = format!("SELECT {REFERENCE_COLUMNS} FROM candidate_references WHERE id = $1");
        sqlx::query_as::<_, CandidateReference>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all references for a subject, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<CandidateReference>, sqlx::Error> {
        let query = format!(
            "SELECT {REFERENCE_COLUMNS} FROM candidate_references
             WHERE user_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, CandidateReference>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
