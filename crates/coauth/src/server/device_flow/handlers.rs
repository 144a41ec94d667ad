//! HTTP endpoint handlers for the device flow.
//!
//! Implements:
//! - `POST /login/device/code`: begin device authorization
//! - `POST /login/oauth/access_token`: exchange device code for access token
//! - `GET /copilot_internal/v2/token`: issue session token
//! - `GET /teams/:team/memberships/:membership`: always 404

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

use super::types::{AccessTokenGrant, DeviceAuthorization, SessionPayload};
use crate::error::FlowResult;
use crate::server::routes::HttpState;

/// Authorization schemes whose credential is passed to the registry.
///
/// GitHub clients send `token <t>` to the Copilot endpoint; everything else
/// sends `Bearer <t>`.
const AUTH_SCHEMES: &[&str] = &["bearer", "token"];

// ─── Device Authorization ────────────────────────────────────────────────────

/// `POST /login/device/code`
pub async fn handle_device_code(
    State(state): State<Arc<HttpState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<DeviceAuthorization> {
    let client_id = query_param(&params, "client_id");
    let auth = state.store.begin_device_authorization(client_id, &state.verification_uri).await;

    tracing::info!(client_id = %client_id, "Issued device code");

    Json(auth)
}

// ─── Token Endpoint ──────────────────────────────────────────────────────────

/// `POST /login/oauth/access_token`
///
/// Approval is implicit, so there is no `authorization_pending` state: a
/// known device code is redeemed immediately and anything else is a 404.
pub async fn handle_access_token(
    State(state): State<Arc<HttpState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> FlowResult<Json<AccessTokenGrant>> {
    let device_code = query_param(&params, "device_code");
    let client_id = query_param(&params, "client_id");

    let grant =
        state.store.exchange_device_code(device_code, client_id).await.inspect_err(|_| {
            tracing::debug!(client_id = %client_id, "Device code exchange rejected");
        })?;

    tracing::info!(client_id = %client_id, "Issued access token");

    Ok(Json(grant))
}

// ─── Session Token ───────────────────────────────────────────────────────────

/// `GET /copilot_internal/v2/token`
pub async fn handle_session_token(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
) -> FlowResult<Json<SessionPayload>> {
    let token = bearer_token(&headers);
    let payload = state.store.issue_session_token(token).await?;

    tracing::info!(expires_at = payload.expires_at, "Issued session token");

    Ok(Json(payload))
}

// ─── Teams ───────────────────────────────────────────────────────────────────

/// `GET /teams/:team/memberships/:membership`
///
/// Clients probe this for organisation membership; nobody is ever a member.
/// The path segments are not decoded, so any bytes in them are answered alike.
pub async fn handle_team_membership(uri: Uri) -> Response {
    tracing::debug!(path = %uri.path(), "Team membership lookup");
    team_membership_not_found()
}

/// The fixed negative answer for team membership lookups.
#[must_use]
pub fn team_membership_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "documentation_url": "https://docs.github.com/rest",
            "message": "Not Found"
        })),
    )
        .into_response()
}

/// First value of `key` in a query string, or `""` when absent.
///
/// Repeated keys are not an error; later values are ignored.
pub fn query_param<'a>(params: &'a [(String, String)], key: &str) -> &'a str {
    params.iter().find(|(k, _)| k == key).map_or("", |(_, v)| v.as_str())
}

/// Extract the credential from the `Authorization` header.
///
/// Missing, non-UTF-8 or unrecognised headers yield an empty string, which
/// never matches a record. Only the first word after the scheme is taken.
pub fn bearer_token(headers: &HeaderMap) -> &str {
    let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return "";
    };

    // Scheme and the word after it; anything further is ignored.
    let mut words = value.split_whitespace();
    let (Some(scheme), Some(credential)) = (words.next(), words.next()) else {
        return "";
    };

    if AUTH_SCHEMES.iter().any(|s| scheme.eq_ignore_ascii_case(s)) { credential } else { "" }
}
