//! Read-only reference collaborator: ownership and author identity for
//! the revenue split.

use async_trait::async_trait;
use sqlx::PgPool;

use hrkey_core::types::DbId;
use hrkey_db::repositories::ReferenceRepo;

/// The reference fields the marketplace needs: who it belongs to and who
/// wrote it.
#[derive(Debug, Clone)]
pub struct ReferenceSummary {
    pub id: DbId,
    /// The data subject the reference is about.
    pub owner_id: DbId,
    /// Set when the author is a registered account.
    pub author_user_id: Option<DbId>,
    /// Set when the author is known only by email.
    pub author_email: Option<String>,
}

#[async_trait]
pub trait ReferenceStore: Send + Sync {
    async fn get_reference(&self, id: DbId) -> Result<Option<ReferenceSummary>, sqlx::Error>;
}

/// Store backed by the platform's `candidate_references` table.
pub struct PgReferenceStore {
    pool: PgPool,
}

impl PgReferenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceStore for PgReferenceStore {
    async fn get_reference(&self, id: DbId) -> Result<Option<ReferenceSummary>, sqlx::Error> {
        let reference = ReferenceRepo::find_by_id(&self.pool, id).await?;
        Ok(reference.map(|r| ReferenceSummary {
            id: r.id,
            owner_id: r.user_id,
            author_user_id: r.author_user_id,
            author_email: r.author_email,
        }))
    }
}
