use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{jobdb::JobExt, messagedb::MessageExt, userdb::UserExt},
    dtos::messagedtos::{MessageDto, SendMessageDto},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    service::conversation::derive_conversations,
    AppState,
};

pub fn messages_handler() -> Router {
    Router::new()
        .route("/", post(send_message))
        .route("/conversations", get(get_conversations))
        .route("/job/:job_id/user/:user_id", get(get_thread))
        .route("/unread-count", get(get_unread_count))
}

/// A user may open a thread if they are the job's employer, or if the
/// thread's counterparty is the employer (their own thread with the
/// employer). A freelancer can never browse another freelancer's thread.
fn can_view_thread(viewer_id: Uuid, counterparty_id: Uuid, employer_id: Uuid) -> bool {
    viewer_id == employer_id || counterparty_id == employer_id
}

/// A message may only flow between the employer and a counterparty:
/// either the employer sends, or the employer receives.
fn can_send_message(sender_id: Uuid, receiver_id: Uuid, employer_id: Uuid) -> bool {
    sender_id == employer_id || receiver_id == employer_id
}

pub async fn get_conversations(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let messages = app_state
        .db_client
        .get_user_messages(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let conversations = derive_conversations(auth.user.id, &messages);

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": conversations
    })))
}

pub async fn get_thread(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path((job_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .db_client
        .get_job_by_id(job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Job not found."))?;

    if !can_view_thread(auth.user.id, user_id, job.posted_by) {
        return Err(HttpError::forbidden(
            "You do not have access to this conversation.",
        ));
    }

    let messages = app_state
        .db_client
        .get_thread_messages(job_id, auth.user.id, user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    // Opening the thread marks everything addressed to the viewer as read.
    // Best effort and idempotent; the flag never moves back to unread.
    app_state
        .db_client
        .mark_thread_read(job_id, user_id, auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let messages: Vec<MessageDto> = messages.iter().map(MessageDto::from_row).collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": messages
    })))
}

pub async fn send_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<SendMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let content = body.message.trim().to_string();
    let (job_id, receiver_id) = match (body.job_id, body.receiver_id) {
        (Some(job_id), Some(receiver_id)) if !content.is_empty() => (job_id, receiver_id),
        _ => {
            return Err(HttpError::bad_request(
                "Please provide job ID, receiver ID, and message.",
            ))
        }
    };

    let job = app_state
        .db_client
        .get_job_by_id(job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Job not found."))?;

    if !can_send_message(auth.user.id, receiver_id, job.posted_by) {
        return Err(HttpError::forbidden(
            "You can only message the employer who posted this job.",
        ));
    }

    let _ = app_state
        .db_client
        .get_user(Some(receiver_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("User not found."))?;

    let message = app_state
        .db_client
        .save_message(job_id, auth.user.id, receiver_id, content)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let resolved = app_state
        .db_client
        .get_message_with_parties(message.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::server_error("Failed to load the sent message".to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": MessageDto::from_row(&resolved)
    })))
}

pub async fn get_unread_count(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let count = app_state
        .db_client
        .get_unread_count(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "count": count
        }
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employer_may_view_any_thread_on_their_job() {
        let employer = Uuid::new_v4();
        let freelancer = Uuid::new_v4();

        assert!(can_view_thread(employer, freelancer, employer));
    }

    #[test]
    fn anyone_may_view_their_own_thread_with_the_employer() {
        let employer = Uuid::new_v4();
        let freelancer = Uuid::new_v4();

        // Even a user who never exchanged messages gets an empty thread
        // back, as long as the counterparty is the employer.
        assert!(can_view_thread(freelancer, employer, employer));
    }

    #[test]
    fn a_freelancer_cannot_open_another_freelancers_thread() {
        let employer = Uuid::new_v4();
        let fay = Uuid::new_v4();
        let gus = Uuid::new_v4();

        assert!(!can_view_thread(gus, fay, employer));
    }

    #[test]
    fn a_body_missing_ids_still_reaches_the_handler() {
        let body: SendMessageDto =
            serde_json::from_str(r#"{"message": "hello there"}"#).unwrap();

        assert!(body.job_id.is_none());
        assert!(body.receiver_id.is_none());
    }

    #[test]
    fn messages_must_involve_the_employer() {
        let employer = Uuid::new_v4();
        let fay = Uuid::new_v4();
        let gus = Uuid::new_v4();

        assert!(can_send_message(employer, fay, employer));
        assert!(can_send_message(fay, employer, employer));
        assert!(!can_send_message(fay, gus, employer));
    }
}
