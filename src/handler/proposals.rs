use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{delete, get, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{jobdb::JobExt, proposaldb::ProposalExt},
    dtos::proposaldtos::{
        CreateProposalDto, ProposalDto, ProposalListResponseDto, UpdateProposalStatusDto,
    },
    dtos::userdtos::Response,
    error::HttpError,
    middleware::{require_role, JWTAuthMiddeware},
    models::{proposalmodel::ProposalStatus, usermodel::UserRole},
    AppState,
};

pub fn proposals_handler() -> Router {
    Router::new()
        .route("/", get(get_proposals).post(create_proposal))
        .route("/:proposal_id/status", put(update_proposal_status))
        .route("/:proposal_id", delete(delete_proposal))
}

pub async fn get_proposals(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    // Freelancers see their own proposals; employers see every proposal
    // submitted against their jobs.
    let rows = match auth.user.role {
        UserRole::JobSeeker => {
            app_state
                .db_client
                .get_proposals_by_freelancer(auth.user.id)
                .await
        }
        UserRole::WorkerSeeker => {
            app_state
                .db_client
                .get_proposals_for_employer(auth.user.id)
                .await
        }
    }
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let proposals: Vec<ProposalDto> = rows.iter().map(ProposalDto::from_row).collect();
    let results = proposals.len() as i64;

    Ok(Json(ProposalListResponseDto {
        status: "success".to_string(),
        proposals,
        results,
    }))
}

pub async fn create_proposal(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateProposalDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth, UserRole::JobSeeker)?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let _ = app_state
        .db_client
        .get_job_by_id(body.job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Job not found. It may have been deleted."))?;

    let existing = app_state
        .db_client
        .find_proposal(body.job_id, auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if existing.is_some() {
        return Err(HttpError::conflict(
            "You have already submitted a proposal for this job.",
        ));
    }

    let proposal = app_state
        .db_client
        .save_proposal(
            body.job_id,
            auth.user.id,
            body.cover_letter,
            body.proposed_budget,
        )
        .await
        .map_err(|e| match &e {
            // Two simultaneous submissions race past the pre-check; the
            // unique index on (job_id, freelancer_id) closes the gap.
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                HttpError::conflict("You have already submitted a proposal for this job.")
            }
            _ => HttpError::server_error(e.to_string()),
        })?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": proposal
    })))
}

pub async fn update_proposal_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(proposal_id): Path<Uuid>,
    Json(body): Json<UpdateProposalStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth, UserRole::WorkerSeeker)?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if body.status != "accepted" && body.status != "rejected" {
        return Err(HttpError::bad_request(
            "Status must be 'accepted' or 'rejected'",
        ));
    }

    let proposal = app_state
        .db_client
        .get_proposal_by_id(proposal_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Proposal not found. It may have been deleted."))?;

    let job = app_state
        .db_client
        .get_job_by_id(proposal.job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Job not found. It may have been deleted."))?;

    if job.posted_by != auth.user.id {
        return Err(HttpError::forbidden(
            "You can only update proposals for jobs that you posted.",
        ));
    }

    if proposal.status.is_terminal() {
        return Err(HttpError::conflict(format!(
            "This proposal has already been {}.",
            proposal.status.to_str()
        )));
    }

    // The accept path flips the proposal and assigns the job in one
    // transaction; a concurrent responder finds it no longer pending and
    // gets a 409.
    let updated = if body.status == "accepted" {
        app_state.db_client.accept_proposal(proposal_id).await
    } else {
        app_state.db_client.reject_proposal(proposal_id).await
    }
    .map_err(|e| HttpError::server_error(e.to_string()))?
    .ok_or_else(|| HttpError::conflict("This proposal has already been responded to."))?;

    if updated.status == ProposalStatus::Accepted {
        tracing::info!(
            "proposal {} accepted; job {} assigned to {}",
            updated.id,
            updated.job_id,
            updated.freelancer_id
        );
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": updated
    })))
}

pub async fn delete_proposal(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(proposal_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let proposal = app_state
        .db_client
        .get_proposal_by_id(proposal_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| {
            HttpError::not_found("Proposal not found. It may have already been deleted.")
        })?;

    if proposal.freelancer_id != auth.user.id {
        return Err(HttpError::forbidden(
            "You can only delete your own proposals.",
        ));
    }

    if proposal.status == ProposalStatus::Accepted {
        return Err(HttpError::conflict(
            "Cannot delete an accepted proposal. Please contact the employer.",
        ));
    }

    app_state
        .db_client
        .delete_proposal(proposal_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(Response {
        status: "success",
        message: "Proposal deleted successfully".to_string(),
    }))
}
