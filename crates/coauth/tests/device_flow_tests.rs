//! End-to-end tests for the device flow via HTTP.
//!
//! Drives the axum Router in-process; no socket is bound.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use regex::Regex;
use tower::ServiceExt;

use coauth::config::Config;
use coauth::server::CoauthServer;
use coauth::server::device_flow::Phase;

const PORT: u16 = 18_080;

fn build_test_server() -> CoauthServer {
    CoauthServer::new(Config::for_testing(PORT))
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn begin(app: &axum::Router, client_id: &str) -> serde_json::Value {
    let (status, json) = send(
        app,
        Request::post(format!("/login/device/code?client_id={client_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json
}

async fn exchange(
    app: &axum::Router,
    device_code: &str,
    client_id: &str,
) -> (StatusCode, serde_json::Value) {
    send(
        app,
        Request::post(format!(
            "/login/oauth/access_token?device_code={device_code}&client_id={client_id}"
        ))
        .body(Body::empty())
        .unwrap(),
    )
    .await
}

async fn session(
    app: &axum::Router,
    authorization: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut request = Request::get("/copilot_internal/v2/token");
    if let Some(value) = authorization {
        request = request.header("Authorization", value);
    }
    send(app, request.body(Body::empty()).unwrap()).await
}

// ─── Full flow ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_device_flow() {
    let server = build_test_server();
    let app = server.router();

    // 1. Begin
    let auth = begin(&app, "abc").await;
    let device_code = auth["device_code"].as_str().unwrap().to_string();
    let user_code = auth["user_code"].as_str().unwrap();
    assert!(Regex::new(r"^[A-Z0-9]{4}-[A-Z0-9]{4}$").unwrap().is_match(user_code));
    assert_eq!(auth["interval"], 5);
    assert_eq!(auth["expires_in"], 900);
    assert_eq!(auth["verification_uri"], format!("http://localhost:{PORT}/login/device"));
    assert_eq!(server.store().phase("abc").await, Some(Phase::Pending));

    // 2. Exchange
    let (status, grant) = exchange(&app, &device_code, "abc").await;
    assert_eq!(status, StatusCode::OK);
    let access_token = grant["access_token"].as_str().unwrap().to_string();
    assert!(access_token.starts_with("ccu_"));
    assert_eq!(grant["scope"], "user:email");
    assert_eq!(grant["token_type"], "bearer");
    assert_eq!(server.store().phase("abc").await, Some(Phase::Authorized));

    // 3. Session token
    let (status, payload) = session(&app, Some(&format!("Bearer {access_token}"))).await;
    assert_eq!(status, StatusCode::OK);
    let token = payload["token"].as_str().unwrap();
    let tracking_id = payload["tracking_id"].as_str().unwrap();
    assert!(token.starts_with(&format!("tid={tracking_id};exp={};", payload["expires_at"])));
    assert!(token.contains(";sku=yearly_subscriber;st=dotcom;ssc=1;chat=1;8kp=0:"));
    assert_eq!(server.store().phase("abc").await, Some(Phase::SessionIssued));

    let record = server.store().record("abc").await.unwrap();
    let secret = record.session.unwrap().secret;
    assert!(token.ends_with(&secret));

    // 4. Negative paths
    let (status, body) = session(&app, Some("Bearer bogus")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, body) = exchange(&app, "bogus", "abc").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn test_session_token_refreshes_each_call() {
    let app = build_test_server().router();

    let auth = begin(&app, "abc").await;
    let (_, grant) = exchange(&app, auth["device_code"].as_str().unwrap(), "abc").await;
    let header = format!("Bearer {}", grant["access_token"].as_str().unwrap());

    let (_, first) = session(&app, Some(&header)).await;
    let (_, second) = session(&app, Some(&header)).await;

    assert_ne!(first["tracking_id"], second["tracking_id"]);
    let first_secret = first["token"].as_str().unwrap().rsplit(':').next().unwrap().to_string();
    let second_secret = second["token"].as_str().unwrap().rsplit(':').next().unwrap().to_string();
    assert_ne!(first_secret, second_secret);
}

#[tokio::test]
async fn test_session_payload_expiry() {
    let app = build_test_server().router();

    let auth = begin(&app, "abc").await;
    let (_, grant) = exchange(&app, auth["device_code"].as_str().unwrap(), "abc").await;
    let header = format!("Bearer {}", grant["access_token"].as_str().unwrap());

    let before = chrono::Utc::now().timestamp();
    let (_, payload) = session(&app, Some(&header)).await;
    let after = chrono::Utc::now().timestamp();

    let expires_at = payload["expires_at"].as_i64().unwrap();
    assert!((before + 3600..=after + 3600).contains(&expires_at));
    assert_eq!(payload["refresh_in"], 1500);
}

// ─── Device code endpoint ────────────────────────────────────────────────────

#[tokio::test]
async fn test_begin_twice_keeps_second_record() {
    let server = build_test_server();
    let app = server.router();

    let first = begin(&app, "abc").await;
    let second = begin(&app, "abc").await;
    assert_ne!(first["device_code"], second["device_code"]);
    assert_eq!(server.store().record_count().await, 1);

    let (status, _) = exchange(&app, first["device_code"].as_str().unwrap(), "abc").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = exchange(&app, second["device_code"].as_str().unwrap(), "abc").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_begin_without_client_id() {
    let server = build_test_server();
    let app = server.router();

    let (status, json) =
        send(&app, Request::post("/login/device/code").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["device_code"].is_string());
    assert_eq!(server.store().phase("").await, Some(Phase::Pending));
}

#[tokio::test]
async fn test_begin_with_repeated_client_id_uses_first() {
    let server = build_test_server();
    let app = server.router();

    let (status, json) = send(
        &app,
        Request::post("/login/device/code?client_id=a&client_id=b").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["device_code"].is_string());
    assert_eq!(server.store().phase("a").await, Some(Phase::Pending));
    assert_eq!(server.store().phase("b").await, None);
}

// ─── Token endpoint ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_exchange_single_field_mismatch() {
    let app = build_test_server().router();

    let auth = begin(&app, "abc").await;
    let device_code = auth["device_code"].as_str().unwrap();

    let (status, _) = exchange(&app, device_code, "other").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = exchange(&app, "wrong", "abc").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Request::post("/login/oauth/access_token").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_exchange_with_repeated_params() {
    let app = build_test_server().router();

    let (status, body) = send(
        &app,
        Request::post("/login/oauth/access_token?device_code=x&device_code=y&client_id=a")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");

    let auth = begin(&app, "a").await;
    let device_code = auth["device_code"].as_str().unwrap();
    let query = format!("device_code={device_code}&device_code=y&client_id=a&client_id=b");
    let (status, grant) = send(
        &app,
        Request::post(format!("/login/oauth/access_token?{query}")).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(grant["access_token"].as_str().unwrap().starts_with("ccu_"));
}

// ─── Session endpoint ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_session_rejects_missing_or_malformed_header() {
    let app = build_test_server().router();

    let auth = begin(&app, "abc").await;
    let (_, grant) = exchange(&app, auth["device_code"].as_str().unwrap(), "abc").await;
    let access_token = grant["access_token"].as_str().unwrap();

    let (status, _) = session(&app, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = session(&app, Some(access_token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = session(&app, Some(&format!("Basic {access_token}"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // GitHub's legacy scheme is accepted
    let (status, _) = session(&app, Some(&format!("token {access_token}"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rotated_access_token_is_rejected() {
    let app = build_test_server().router();

    let auth = begin(&app, "abc").await;
    let device_code = auth["device_code"].as_str().unwrap();
    let (_, old) = exchange(&app, device_code, "abc").await;
    let (_, new) = exchange(&app, device_code, "abc").await;

    let (status, _) =
        session(&app, Some(&format!("Bearer {}", old["access_token"].as_str().unwrap()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
        session(&app, Some(&format!("Bearer {}", new["access_token"].as_str().unwrap()))).await;
    assert_eq!(status, StatusCode::OK);
}

// ─── Static endpoints ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_static_text_endpoints() {
    let app = build_test_server().router();

    let response =
        app.clone().oneshot(Request::get("/").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"Hello Popilot!");

    let response = app
        .clone()
        .oneshot(Request::get("/login/device").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_user_and_meta() {
    let app = build_test_server().router();

    let (status, user) =
        send(&app, Request::get("/api/v3/user").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["id"], 114_514);
    assert_eq!(user["type"], "User");
    assert_eq!(user["site_admin"], false);

    let (status, meta) =
        send(&app, Request::get("/api/v3/meta").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(meta, serde_json::json!({}));
}

#[tokio::test]
async fn test_team_membership_not_found() {
    let app = build_test_server().router();

    let (status, json) = send(
        &app,
        Request::get("/teams/acme/memberships/octocat").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Not Found");
    assert_eq!(json["documentation_url"], "https://docs.github.com/rest");
}

#[tokio::test]
async fn test_team_membership_invalid_utf8_segments() {
    let app = build_test_server().router();

    let uris = [
        "/teams/%FF/memberships/x",
        "/teams/x/memberships/%C3%28",
        "/teams/%E2%9C%93/memberships/x",
    ];
    for uri in uris {
        let (status, json) = send(&app, Request::get(uri).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(json["message"], "Not Found", "{uri}");
    }
}
