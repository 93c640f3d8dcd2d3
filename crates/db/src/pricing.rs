//! Read-through cache over active pricing configuration.
//!
//! An explicit object owned by application state and passed into whatever
//! needs prices. Entries expire after a TTL; `reload()` refetches
//! everything, `invalidate()` just drops the cache. The lock is never held
//! across an await point.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use sqlx::PgPool;

use hrkey_core::error::CoreError;
use hrkey_core::request::DataType;

use crate::models::pricing::PricingConfig;
use crate::repositories::PricingRepo;
use crate::DbError;

/// Default cache entry lifetime.
pub const DEFAULT_PRICING_CACHE_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    config: PricingConfig,
    fetched_at: Instant,
}

pub struct PricingCatalog {
    ttl: Duration,
    entries: RwLock<HashMap<DataType, CacheEntry>>,
}

impl PricingCatalog {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The active config for `data_type`, from cache when fresh.
    ///
    /// Fails with `CoreError::NotConfigured` when no active pricing row
    /// exists — the marketplace cannot price a request it has no
    /// configuration for.
    pub async fn get_active(
        &self,
        pool: &PgPool,
        data_type: DataType,
    ) -> Result<PricingConfig, DbError> {
        {
            let entries = self.entries.read().expect("pricing cache lock poisoned");
            if let Some(entry) = entries.get(&data_type) {
                if entry.fetched_at.elapsed() < self.ttl {
                    return Ok(entry.config.clone());
                }
            }
        }

        let config = PricingRepo::find_active(pool, data_type).await?.ok_or_else(|| {
            CoreError::NotConfigured(format!(
                "no active pricing configured for data type '{}'",
                data_type.as_str()
            ))
        })?;

        let mut entries = self.entries.write().expect("pricing cache lock poisoned");
        entries.insert(
            data_type,
            CacheEntry {
                config: config.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(config)
    }

    /// Drop all cached entries; the next lookup goes to the database.
    pub fn invalidate(&self) {
        self.entries
            .write()
            .expect("pricing cache lock poisoned")
            .clear();
    }

    /// Refetch every active config, replacing the cache wholesale.
    pub async fn reload(&self, pool: &PgPool) -> Result<(), DbError> {
        let configs = PricingRepo::list_active(pool).await?;
        let now = Instant::now();

        let mut fresh = HashMap::new();
        for config in configs {
            let data_type = DataType::parse(&config.data_type)?;
            fresh.insert(
                data_type,
                CacheEntry {
                    config,
                    fetched_at: now,
                },
            );
        }

        *self.entries.write().expect("pricing cache lock poisoned") = fresh;
        Ok(())
    }
}
