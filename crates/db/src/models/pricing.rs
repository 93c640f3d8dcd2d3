//! Pricing configuration rows.

use hrkey_core::error::CoreError;
use hrkey_core::request::FeePercents;
use hrkey_core::types::{DbId, MinorUnits, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `pricing_configs` table. Amounts are minor units.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PricingConfig {
    pub id: DbId,
    pub data_type: String,
    pub price_amount: MinorUnits,
    pub currency: String,
    pub platform_fee_percent: i32,
    pub user_fee_percent: i32,
    pub ref_creator_fee_percent: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PricingConfig {
    /// The fee percentages of this config, validated.
    pub fn fee_percents(&self) -> Result<FeePercents, CoreError> {
        let percents = FeePercents {
            platform_fee_percent: self.platform_fee_percent,
            user_fee_percent: self.user_fee_percent,
            ref_creator_fee_percent: self.ref_creator_fee_percent,
        };
        percents.validate()?;
        Ok(percents)
    }
}
