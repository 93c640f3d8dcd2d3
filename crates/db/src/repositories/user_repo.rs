//! Read-only access to the platform-owned `users` and `company_signers`
//! tables.

use sqlx::PgPool;

use hrkey_core::types::DbId;

use crate::models::user::User;

/// Column list for users queries.
const USER_COLUMNS: &str =
    "id, email, full_name, wallet_address, role, profile, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    /// Find a user by their ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether `user_id` is an active signer of `company_id`.
    pub async fn is_active_signer(
        pool: &PgPool,
        user_id: DbId,
        company_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM company_signers
                WHERE user_id = $1 AND company_id = $2 AND is_active
            )",
        )
        .bind(user_id)
        .bind(company_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }
}
