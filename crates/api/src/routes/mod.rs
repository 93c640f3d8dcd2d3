pub mod access_requests;
pub mod earnings;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /access-requests                          create (POST)
/// /access-requests/pending                  caller's live pending requests
/// /access-requests/{id}                     view one request
/// /access-requests/{id}/approve             consent with wallet signature (POST)
/// /access-requests/{id}/reject              decline (POST)
/// /access-requests/{id}/data                retrieve purchased data
///
/// /earnings/balance                         caller's balance summary
/// /earnings/transactions                    caller's transaction history
/// /earnings/payouts                          reserve a payout (POST)
/// /earnings/payouts/{transaction_id}/confirm settle, debit ledger (operator)
/// /earnings/payouts/{transaction_id}/fail    release reservation (operator)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/access-requests", access_requests::router())
        .nest("/earnings", earnings::router())
}
