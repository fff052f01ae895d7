use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::jobdb::JobExt,
    dtos::jobdtos::{CreateJobDto, JobDto, JobListResponseDto, JobResponseDto, UpdateJobDto},
    dtos::userdtos::Response,
    error::HttpError,
    middleware::{require_role, JWTAuthMiddeware},
    models::usermodel::UserRole,
    AppState,
};

pub fn jobs_handler() -> Router {
    Router::new()
        .route("/", get(get_jobs).post(create_job))
        .route("/:job_id", get(get_job).put(update_job).delete(delete_job))
}

pub async fn get_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    // Freelancers browse the whole board; employers only see their own
    // postings.
    let rows = match auth.user.role {
        UserRole::JobSeeker => app_state.db_client.get_all_jobs().await,
        UserRole::WorkerSeeker => app_state.db_client.get_jobs_by_employer(auth.user.id).await,
    }
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let jobs: Vec<JobDto> = rows.iter().map(JobDto::from_row).collect();
    let results = jobs.len() as i64;

    Ok(Json(JobListResponseDto {
        status: "success".to_string(),
        jobs,
        results,
    }))
}

pub async fn get_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let row = app_state
        .db_client
        .get_job_with_users(job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Job not found. It may have been deleted."))?;

    Ok(Json(JobResponseDto {
        status: "success".to_string(),
        data: JobDto::from_row(&row),
    }))
}

pub async fn create_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth, UserRole::WorkerSeeker)?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .db_client
        .save_job(
            auth.user.id,
            body.title,
            body.description,
            body.budget,
            body.skills.unwrap_or_default(),
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    tracing::info!("job {} posted by {}", job.id, auth.user.email);

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": job
    })))
}

pub async fn update_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<UpdateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .db_client
        .get_job_by_id(job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Job not found. It may have been deleted."))?;

    if job.posted_by != auth.user.id {
        return Err(HttpError::forbidden(
            "You can only update jobs that you posted.",
        ));
    }

    let updated = app_state
        .db_client
        .update_job(
            job_id,
            body.title,
            body.description,
            body.budget,
            body.skills,
            body.status,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": updated
    })))
}

pub async fn delete_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .db_client
        .get_job_by_id(job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Job not found. It may have already been deleted."))?;

    if job.posted_by != auth.user.id {
        return Err(HttpError::forbidden(
            "You can only delete jobs that you posted.",
        ));
    }

    // No cascade: proposals and messages that reference this job stay
    // behind as orphans and are filtered out of resolved listings.
    app_state
        .db_client
        .delete_job(job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(Response {
        status: "success",
        message: "Job deleted successfully".to_string(),
    }))
}
