//! Identity/company collaborator: who exists, and who may sign for a
//! company.

use async_trait::async_trait;
use sqlx::PgPool;

use hrkey_core::types::DbId;
use hrkey_db::repositories::UserRepo;

/// The identity fields the marketplace needs about a user.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub wallet_address: Option<String>,
    pub profile: serde_json::Value,
}

#[async_trait]
pub trait SignerDirectory: Send + Sync {
    /// Whether `user_id` is an active signer of `company_id`.
    async fn is_active_signer(&self, user_id: DbId, company_id: DbId)
        -> Result<bool, sqlx::Error>;

    /// Look up a user's identity.
    async fn get_user(&self, user_id: DbId) -> Result<Option<UserIdentity>, sqlx::Error>;
}

/// Directory backed by the platform's own `users`/`company_signers`
/// tables.
pub struct PgSignerDirectory {
    pool: PgPool,
}

impl PgSignerDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SignerDirectory for PgSignerDirectory {
    async fn is_active_signer(
        &self,
        user_id: DbId,
        company_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        UserRepo::is_active_signer(&self.pool, user_id, company_id).await
    }

    async fn get_user(&self, user_id: DbId) -> Result<Option<UserIdentity>, sqlx::Error> {
        let user = UserRepo::find_by_id(&self.pool, user_id).await?;
        Ok(user.map(|u| UserIdentity {
            id: u.id,
            email: u.email,
            full_name: u.full_name,
            wallet_address: u.wallet_address,
            profile: u.profile,
        }))
    }
}
