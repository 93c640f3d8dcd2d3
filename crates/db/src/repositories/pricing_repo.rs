//! Repository for the `pricing_configs` table.

use sqlx::PgPool;

use hrkey_core::request::DataType;

use crate::models::pricing::PricingConfig;

/// Column list for pricing_configs queries.
const PRICING_COLUMNS: &str = "id, data_type, price_amount, currency, platform_fee_percent, \
    user_fee_percent, ref_creator_fee_percent, is_active, created_at, updated_at";

pub struct PricingRepo;

impl PricingRepo {
    /// Find the single active config for a data type, if any.
    pub async fn find_active(
        pool: &PgPool,
        data_type: DataType,
    ) -> Result<Option<PricingConfig>, sqlx::Error> {
        let query = format!(
            "SELECT {PRICING_COLUMNS} FROM pricing_configs
             WHERE data_type = $1 AND is_active"
        );
        sqlx::query_as::<_, PricingConfig>(&query)
            .bind(data_type.as_str())
            .fetch_optional(pool)
            .await
    }

    /// List all active configs.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<PricingConfig>, sqlx::Error> {
        let query = format!(
            "SELECT {PRICING_COLUMNS} FROM pricing_configs WHERE is_active ORDER BY data_type"
        );
        sqlx::query_as::<_, PricingConfig>(&query)
            .fetch_all(pool)
            .await
    }
}
