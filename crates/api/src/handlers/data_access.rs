//! Handler for retrieving the data behind an approved request.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use hrkey_core::error::CoreError;
use hrkey_core::request::DataType;
use hrkey_core::types::DbId;
use hrkey_db::models::reference::CandidateReference;
use hrkey_db::repositories::{AccessRequestRepo, ReferenceRepo};

use crate::error::AppResult;
use crate::handlers::access_request::find_request;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// The subject profile fields released to an approved company.
#[derive(Debug, Serialize)]
pub struct SubjectProfile {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    pub wallet_address: Option<String>,
    pub profile: serde_json::Value,
}

/// What a retrieval returns, shaped by the request's data type.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AccessPayload {
    /// `reference` requests: the single named reference.
    Reference { reference: CandidateReference },
    /// `profile` and `full_data` requests: the subject's profile plus
    /// their full reference set.
    Profile {
        profile: SubjectProfile,
        references: Vec<CandidateReference>,
    },
}

#[derive(Debug, Serialize)]
pub struct RetrievedData {
    pub request_id: DbId,
    pub data_type: String,
    /// Total successful retrievals for this request, including this one.
    pub access_count: i32,
    #[serde(flatten)]
    pub payload: AccessPayload,
}

/// `GET /api/v1/access-requests/{id}/data`
///
/// Releases the purchased data to a signer of the requesting company.
/// Requires an APPROVED request; each successful call is recorded on the
/// request row (`access_count`, `data_accessed_at`) for the audit trail.
pub async fn retrieve_data(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RetrievedData>>> {
    let request = find_request(&state, id).await?;
    state.gate.authorize_retrieval(&request, auth.user_id).await?;

    let recorded = AccessRequestRepo::record_access(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::Conflict(format!("request {id} is no longer approved")))?;

    let payload = match DataType::parse(&recorded.requested_data_type)? {
        DataType::Reference => {
            let reference_id = recorded.reference_id.ok_or_else(|| {
                CoreError::Internal(format!("reference request {id} has no reference_id"))
            })?;
            let reference = ReferenceRepo::find_by_id(&state.pool, reference_id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Reference",
                    id: reference_id,
                })?;
            AccessPayload::Reference { reference }
        }
        DataType::Profile | DataType::FullData => {
            let subject = state
                .directory
                .get_user(recorded.target_user_id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "User",
                    id: recorded.target_user_id,
                })?;
            let references =
                ReferenceRepo::list_for_user(&state.pool, recorded.target_user_id).await?;
            AccessPayload::Profile {
                profile: SubjectProfile {
                    id: subject.id,
                    full_name: subject.full_name,
                    email: subject.email,
                    wallet_address: subject.wallet_address,
                    profile: subject.profile,
                },
                references,
            }
        }
    };

    tracing::info!(
        request_id = recorded.id,
        company_id = recorded.company_id,
        accessed_by = auth.user_id,
        access_count = recorded.access_count,
        "Data retrieved"
    );

    Ok(Json(DataResponse {
        data: RetrievedData {
            request_id: recorded.id,
            data_type: recorded.requested_data_type,
            access_count: recorded.access_count,
            payload,
        },
    }))
}
