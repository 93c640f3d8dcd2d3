//! Route definitions for the `/earnings` resource.
//!
//! All endpoints require authentication; payout settlement additionally
//! requires an operator role.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::earnings;
use crate::state::AppState;

/// Routes mounted at `/earnings`.
///
/// ```text
/// GET    /balance                           -> get_balance
/// GET    /transactions                      -> list_transactions
/// POST   /payouts                           -> request_payout
/// POST   /payouts/{transaction_id}/confirm  -> confirm_payout (operator)
/// POST   /payouts/{transaction_id}/fail     -> fail_payout (operator)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/balance", get(earnings::get_balance))
        .route("/transactions", get(earnings::list_transactions))
        .route("/payouts", post(earnings::request_payout))
        .route(
            "/payouts/{transaction_id}/confirm",
            post(earnings::confirm_payout),
        )
        .route(
            "/payouts/{transaction_id}/fail",
            post(earnings::fail_payout),
        )
}
