//! Handlers for earnings: balance, transaction history, and the payout
//! lifecycle.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use hrkey_core::beneficiary::BeneficiaryRef;
use hrkey_core::error::CoreError;
use hrkey_core::types::DbId;
use hrkey_db::models::ledger::{
    BalanceSummary, ConfirmPayoutBody, FailPayoutBody, PayoutRequestBody, RevenueTransaction,
};
use hrkey_db::repositories::{LedgerRepo, PayoutRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// `GET /api/v1/earnings/balance`
///
/// The caller's balance summary. A user who never earned anything has no
/// ledger row yet and gets an all-zero summary, not a 404.
pub async fn get_balance(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<BalanceSummary>>> {
    let beneficiary = BeneficiaryRef::registered(auth.user_id);
    let summary = match LedgerRepo::find_by_beneficiary(&state.pool, &beneficiary).await? {
        Some(ledger) => BalanceSummary::from(&ledger),
        None => BalanceSummary::zeroed(&state.config.default_currency),
    };
    Ok(Json(DataResponse { data: summary }))
}

/// `GET /api/v1/earnings/transactions`
///
/// The caller's transaction history, newest first. Empty without a ledger.
pub async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<RevenueTransaction>>>> {
    let beneficiary = BeneficiaryRef::registered(auth.user_id);
    let transactions = match LedgerRepo::find_by_beneficiary(&state.pool, &beneficiary).await? {
        Some(ledger) => LedgerRepo::list_transactions(&state.pool, ledger.id).await?,
        None => Vec::new(),
    };
    Ok(Json(DataResponse { data: transactions }))
}

/// `POST /api/v1/earnings/payouts`
///
/// Reserves a payout against the caller's available balance. The balance
/// itself is untouched until an operator confirms the external payment.
pub async fn request_payout(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<PayoutRequestBody>,
) -> AppResult<(StatusCode, Json<DataResponse<RevenueTransaction>>)> {
    let beneficiary = BeneficiaryRef::registered(auth.user_id);
    let txn = PayoutRepo::request(&state.pool, &beneficiary, body.amount, body.method).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: txn })))
}

/// `POST /api/v1/earnings/payouts/{transaction_id}/confirm`
///
/// Operator-only: the external payment settled, debit the ledger. A
/// transaction that is not pending (already confirmed, or failed) is a
/// conflict.
pub async fn confirm_payout(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<DbId>,
    Json(body): Json<ConfirmPayoutBody>,
) -> AppResult<Json<DataResponse<RevenueTransaction>>> {
    require_admin(&auth)?;
    let txn = PayoutRepo::confirm(
        &state.pool,
        transaction_id,
        &body.external_tx_id,
        &body.payment_provider,
    )
    .await?;
    Ok(Json(DataResponse { data: txn }))
}

/// `POST /api/v1/earnings/payouts/{transaction_id}/fail`
///
/// Operator-only: the external payment failed, release the reservation.
pub async fn fail_payout(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<DbId>,
    Json(body): Json<FailPayoutBody>,
) -> AppResult<Json<DataResponse<RevenueTransaction>>> {
    require_admin(&auth)?;
    let reason = body
        .reason
        .unwrap_or_else(|| "external payout failed".into());
    let txn = PayoutRepo::fail(&state.pool, transaction_id, &reason).await?;
    Ok(Json(DataResponse { data: txn }))
}

fn require_admin(auth: &AuthUser) -> Result<(), CoreError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "payout settlement requires an operator role".into(),
        ))
    }
}
