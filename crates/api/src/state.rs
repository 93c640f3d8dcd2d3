use std::sync::Arc;

use hrkey_db::pricing::PricingCatalog;

use crate::config::ServerConfig;
use crate::gate::ConsentGate;
use crate::services::{Notifier, ReferenceStore, SignerDirectory};

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: hrkey_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Read-through pricing cache with TTL + explicit reload.
    pub pricing: Arc<PricingCatalog>,
    /// Authorization decisions for the consent flow.
    pub gate: Arc<ConsentGate>,
    /// Identity/company collaborator.
    pub directory: Arc<dyn SignerDirectory>,
    /// Read-only reference collaborator.
    pub references: Arc<dyn ReferenceStore>,
    /// Fire-and-forget notification collaborator.
    pub notifier: Arc<dyn Notifier>,
}
