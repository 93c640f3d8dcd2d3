//! Handlers for the data-access request lifecycle: create, list, view,
//! approve, reject.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use serde::Serialize;

use hrkey_core::error::CoreError;
use hrkey_core::request::{DataType, RequestStatus};
use hrkey_core::split::split;
use hrkey_core::types::DbId;
use hrkey_db::models::access_request::{
    ApproveAccessRequest, ConsentRecord, CreateAccessRequest, CreateAccessRequestBody,
    DataAccessRequest,
};
use hrkey_db::models::revenue::{CreateRevenueShare, RevenueShare};
use hrkey_db::repositories::{AccessRequestRepo, RevenueRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::services::spawn_notify;
use crate::state::AppState;

/// How many times the approval path retries ledger crediting before giving
/// up and leaving the share to the reconciler.
const CREDIT_ATTEMPTS: u32 = 3;

/// Approval response: the settled request plus its revenue share.
#[derive(Debug, Serialize)]
pub struct ApprovalOutcome {
    pub request: DataAccessRequest,
    pub revenue_share: RevenueShare,
}

/// `POST /api/v1/access-requests`
///
/// Opens a PENDING request on behalf of a company. The caller must be an
/// active signer of that company (superadmins bypass the check), the
/// target must exist, and `reference` requests must name a reference that
/// belongs to the target. Price and fee percentages are snapshotted from
/// the active pricing config at this moment; later pricing changes never
/// affect this request.
pub async fn create_access_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateAccessRequestBody>,
) -> AppResult<(StatusCode, Json<DataResponse<DataAccessRequest>>)> {
    let data_type = DataType::parse(&body.data_type)?;
    if data_type.requires_reference() && body.reference_id.is_none() {
        return Err(CoreError::Validation(
            "requests for a single reference must name a reference_id".into(),
        )
        .into());
    }

    state
        .gate
        .authorize_creation(auth.user_id, body.company_id, auth.is_superadmin())
        .await?;

    let target = state
        .directory
        .get_user(body.target_user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: body.target_user_id,
        })?;

    if let Some(reference_id) = body.reference_id {
        let reference = state
            .references
            .get_reference(reference_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Reference",
                id: reference_id,
            })?;
        if reference.owner_id != body.target_user_id {
            return Err(CoreError::Validation(format!(
                "reference {reference_id} does not belong to the target user"
            ))
            .into());
        }
    }

    let pricing = state.pricing.get_active(&state.pool, data_type).await?;
    let fee_snapshot = pricing.fee_percents()?;

    let request = AccessRequestRepo::create(
        &state.pool,
        &CreateAccessRequest {
            company_id: body.company_id,
            requested_by_user_id: auth.user_id,
            target_user_id: body.target_user_id,
            reference_id: body.reference_id,
            requested_data_type: data_type.as_str().to_string(),
            price_amount: pricing.price_amount,
            currency: pricing.currency.clone(),
            reason: body.reason,
            fee_snapshot,
            expires_at: Utc::now() + Duration::days(state.config.request_ttl_days),
        },
    )
    .await?;

    tracing::info!(
        request_id = request.id,
        company_id = request.company_id,
        target_user_id = request.target_user_id,
        data_type = %request.requested_data_type,
        price_amount = request.price_amount,
        "Access request created"
    );

    spawn_notify(
        state.notifier.clone(),
        target.email,
        "New data access request".into(),
        format!(
            "A company has requested access to your {} data. \
             Review and respond before {}.",
            request.requested_data_type, request.expires_at
        ),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// `GET /api/v1/access-requests/pending`
///
/// The caller's own live PENDING requests, oldest first. Stale rows are
/// lazily expired before the listing, so nothing expired ever appears.
pub async fn list_pending_requests(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<DataAccessRequest>>>> {
    let requests = AccessRequestRepo::list_pending_for_target(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// `GET /api/v1/access-requests/{id}`
///
/// Visible to the data subject and to signers of the requesting company.
pub async fn get_access_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DataAccessRequest>>> {
    let request = find_request(&state, id).await?;
    state.gate.authorize_view(&request, auth.user_id).await?;
    Ok(Json(DataResponse { data: request }))
}

/// `POST /api/v1/access-requests/{id}/approve`
///
/// The data subject grants consent with a wallet signature. On success the
/// request is APPROVED, its revenue share exists, and the subject's and
/// reference author's ledgers are credited per the fee snapshot taken at
/// creation time. Crediting failures are retried here and, failing that,
/// re-driven by the revenue reconciler.
pub async fn approve_access_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(body): Json<ApproveAccessRequest>,
) -> AppResult<Json<DataResponse<ApprovalOutcome>>> {
    let request = find_request(&state, id).await?;
    state.gate.authorize_approval(
        &request,
        auth.user_id,
        &body.wallet_address,
        &body.message,
        &body.signature,
    )?;

    let approved = AccessRequestRepo::approve(
        &state.pool,
        id,
        &ConsentRecord {
            wallet_signature: body.signature,
            message: body.message,
        },
    )
    .await?
    .ok_or_else(|| CoreError::Conflict(format!("request {id} is no longer pending")))?;

    let share = settle_revenue(&state, &approved).await?;

    tracing::info!(
        request_id = approved.id,
        share_id = share.id,
        "Access request approved"
    );

    if let Some(requester) = state.directory.get_user(approved.requested_by_user_id).await? {
        spawn_notify(
            state.notifier.clone(),
            requester.email,
            "Data access request approved".into(),
            format!(
                "Your request for {} data (request {}) was approved. \
                 The data is now available for retrieval.",
                approved.requested_data_type, approved.id
            ),
        );
    }

    Ok(Json(DataResponse {
        data: ApprovalOutcome {
            request: approved,
            revenue_share: share,
        },
    }))
}

/// `POST /api/v1/access-requests/{id}/reject`
///
/// The data subject declines. No consent proof is required to say no.
pub async fn reject_access_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DataAccessRequest>>> {
    let request = find_request(&state, id).await?;
    state.gate.authorize_rejection(&request, auth.user_id)?;

    let rejected = AccessRequestRepo::transition(&state.pool, id, RequestStatus::Rejected)
        .await?
        .ok_or_else(|| CoreError::Conflict(format!("request {id} is no longer pending")))?;

    tracing::info!(request_id = rejected.id, "Access request rejected");

    if let Some(requester) = state.directory.get_user(rejected.requested_by_user_id).await? {
        spawn_notify(
            state.notifier.clone(),
            requester.email,
            "Data access request rejected".into(),
            format!(
                "Your request for {} data (request {}) was rejected by the candidate.",
                rejected.requested_data_type, rejected.id
            ),
        );
    }

    Ok(Json(DataResponse { data: rejected }))
}

/// Fetch a request or 404, with lazy expiry applied.
pub(crate) async fn find_request(state: &AppState, id: DbId) -> AppResult<DataAccessRequest> {
    AccessRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "DataAccessRequest",
                id,
            })
        })
}

/// Create the revenue share for an approved request and credit the
/// beneficiary ledgers.
///
/// The split is computed from the request's own fee snapshot, never from
/// live pricing. Share creation is an upsert and crediting is idempotent,
/// so re-running this after a partial failure is safe.
async fn settle_revenue(
    state: &AppState,
    approved: &DataAccessRequest,
) -> AppResult<RevenueShare> {
    let percents = approved.fee_snapshot()?;
    let amounts = split(approved.price_amount, percents)?;

    let (author_user_id, author_email) = match approved.reference_id {
        Some(reference_id) => {
            let reference = state
                .references
                .get_reference(reference_id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Reference",
                    id: reference_id,
                })?;
            // A registered author is credited by account; an unregistered
            // one accrues a balance under their email.
            match reference.author_user_id {
                Some(user_id) => (Some(user_id), None),
                None => (None, reference.author_email),
            }
        }
        None => (None, None),
    };

    let share = RevenueRepo::create_or_get_share(
        &state.pool,
        &CreateRevenueShare {
            data_access_request_id: approved.id,
            total_amount: approved.price_amount,
            currency: approved.currency.clone(),
            platform_amount: amounts.platform,
            platform_percent: percents.platform_fee_percent,
            user_amount: amounts.user,
            user_percent: percents.user_fee_percent,
            ref_creator_amount: amounts.ref_creator,
            ref_creator_percent: percents.ref_creator_fee_percent,
            ref_creator_user_id: author_user_id,
            ref_creator_email: author_email,
        },
    )
    .await?;

    let mut attempt = 0;
    loop {
        attempt += 1;
        match RevenueRepo::apply_split(&state.pool, &share, approved.target_user_id).await {
            Ok(()) => return Ok(share),
            Err(e) if attempt < CREDIT_ATTEMPTS => {
                tracing::warn!(
                    share_id = share.id,
                    attempt,
                    error = %e,
                    "Ledger crediting failed, retrying"
                );
            }
            Err(e) => {
                // The approval and the share are durable; the reconciler
                // will re-drive crediting from the uncredited share row.
                tracing::error!(
                    share_id = share.id,
                    error = %e,
                    "Ledger crediting failed, leaving share to the reconciler"
                );
                return Err(AppError::InternalError(format!(
                    "crediting for share {} did not complete",
                    share.id
                )));
            }
        }
    }
}
