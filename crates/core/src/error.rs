use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A required upstream configuration row (e.g. active pricing) is
    /// missing. Maps to 503 rather than 500: the request was fine, the
    /// platform is not ready to serve it.
    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
