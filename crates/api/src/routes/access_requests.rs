//! Route definitions for the `/access-requests` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{access_request, data_access};
use crate::state::AppState;

/// Routes mounted at `/access-requests`.
///
/// ```text
/// POST   /                 -> create_access_request
/// GET    /pending          -> list_pending_requests (data subject)
/// GET    /{id}             -> get_access_request
/// POST   /{id}/approve     -> approve_access_request (data subject)
/// POST   /{id}/reject      -> reject_access_request (data subject)
/// GET    /{id}/data        -> retrieve_data (company signer)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(access_request::create_access_request))
        .route("/pending", get(access_request::list_pending_requests))
        .route("/{id}", get(access_request::get_access_request))
        .route("/{id}/approve", post(access_request::approve_access_request))
        .route("/{id}/reject", post(access_request::reject_access_request))
        .route("/{id}/data", get(data_access::retrieve_data))
}
