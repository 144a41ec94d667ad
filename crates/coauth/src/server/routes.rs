//! Router construction and the static endpoints.
//!
//! Everything that is not part of the device flow proper lives here: the
//! greeting, the verification page and the fixed user/meta payloads.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::device_flow::{DeviceFlowStore, handlers};

/// Shared state for HTTP handlers.
pub struct HttpState {
    pub store: DeviceFlowStore,
    /// Returned verbatim as `verification_uri` from the device-code endpoint.
    pub verification_uri: String,
}

/// Create the HTTP router.
pub fn create_router(store: DeviceFlowStore, verification_uri: String) -> Router {
    let state = Arc::new(HttpState { store, verification_uri });

    Router::new()
        .route("/", get(greeting))
        .route("/login/device", get(verification_page))
        .route("/login/device/code", post(handlers::handle_device_code))
        .route("/login/oauth/access_token", post(handlers::handle_access_token))
        .route("/api/v3/user", get(user_profile))
        .route("/api/v3/meta", get(meta))
        .route("/copilot_internal/v2/token", get(handlers::handle_session_token))
        .route("/teams/{team}/memberships/{membership}", get(handlers::handle_team_membership))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn greeting() -> &'static str {
    "Hello Popilot!"
}

/// Shown after the user opens `verification_uri`; approval already happened.
async fn verification_page() -> &'static str {
    "请关闭此页面"
}

/// Fixed profile for whoever asks.
async fn user_profile(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let token = handlers::bearer_token(&headers);
    match state.store.validate_access_token(token).await {
        Some(client_id) => tracing::debug!(client_id = %client_id, "User profile for known token"),
        None => tracing::debug!("User profile for unknown token"),
    }

    Json(serde_json::json!({
        "avatar_url": "https://avatars.githubusercontent.com/u/0?v=4",
        "id": 114_514,
        "lid": 114_514,
        "login": "野兽先辈",
        "name": "野兽先辈",
        "site_admin": false,
        "type": "User"
    }))
}

async fn meta() -> impl IntoResponse {
    Json(serde_json::json!({}))
}
