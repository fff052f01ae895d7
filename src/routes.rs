use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        auth::auth_handler, jobs::jobs_handler, messages::messages_handler,
        proposals::proposals_handler, users::users_handler,
    },
    middleware::auth,
    AppState,
};

async fn api_index() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Freelancer Marketplace API",
        "version": "1.0.0",
        "endpoints": {
            "auth": "/api/auth/register, /api/auth/login",
            "jobs": "/api/jobs",
            "proposals": "/api/proposals",
            "messages": "/api/messages",
            "users": "/api/users/me"
        },
        "health": "/health"
    }))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest("/users", users_handler().layer(middleware::from_fn(auth)))
        .nest("/jobs", jobs_handler().layer(middleware::from_fn(auth)))
        .nest(
            "/proposals",
            proposals_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/messages",
            messages_handler().layer(middleware::from_fn(auth)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/", get(api_index))
        .route("/health", get(health_check))
        .nest("/api", api_route)
}
