//! Device-flow records and wire payloads.

use serde::Serialize;

use crate::config::flow;

/// How far a record has progressed through the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Device code issued, not yet redeemed.
    Pending,
    /// Access token issued.
    Authorized,
    /// At least one session token issued.
    SessionIssued,
}

/// Session fields set once an access token has been exchanged.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub tracking_id: String,
    /// Absolute expiry, epoch seconds.
    pub expires_at: i64,
    pub secret: String,
}

/// One device-authorization attempt, keyed by `client_id` in the store.
#[derive(Debug, Clone)]
pub struct AuthorizationRecord {
    pub client_id: String,
    pub device_code: String,
    pub user_code: String,
    pub access_token: Option<String>,
    pub session: Option<SessionGrant>,
}

impl AuthorizationRecord {
    /// A fresh pending record.
    #[must_use]
    pub fn pending(client_id: String, device_code: String, user_code: String) -> Self {
        Self { client_id, device_code, user_code, access_token: None, session: None }
    }

    /// Current phase, derived from which fields are set.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match (&self.access_token, &self.session) {
            (_, Some(_)) => Phase::SessionIssued,
            (Some(_), None) => Phase::Authorized,
            (None, None) => Phase::Pending,
        }
    }
}

/// Response to `POST /login/device/code`.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceAuthorization {
    pub device_code: String,
    pub expires_in: u64,
    pub interval: u64,
    pub user_code: String,
    pub verification_uri: String,
}

/// Response to `POST /login/oauth/access_token`.
#[derive(Debug, Clone, Serialize)]
pub struct AccessTokenGrant {
    pub access_token: String,
    pub scope: &'static str,
    pub token_type: &'static str,
}

impl AccessTokenGrant {
    #[must_use]
    pub fn new(access_token: String) -> Self {
        Self { access_token, scope: flow::SCOPE, token_type: flow::TOKEN_TYPE }
    }
}

/// Response to `GET /copilot_internal/v2/token`.
///
/// Everything except `expires_at`, `token` and `tracking_id` is a fixed
/// entitlement the emulated clients read.
#[derive(Debug, Clone, Serialize)]
pub struct SessionPayload {
    pub cocopilot_share_id: u64,
    pub annotations_enabled: bool,
    pub chat_enabled: bool,
    pub chat_jetbrains_enabled: bool,
    pub code_quote_enabled: bool,
    pub codesearch: bool,
    pub copilot_ide_agent_chat_gpt4_small_prompt: bool,
    pub copilotignore_enabled: bool,
    pub expires_at: i64,
    pub individual: bool,
    pub intellij_editor_fetcher: bool,
    pub nes_enabled: bool,
    pub organization_list: Option<Vec<String>>,
    pub prompt_8k: bool,
    pub public_suggestions: &'static str,
    pub refresh_in: u64,
    pub sku: &'static str,
    pub snippy_load_test_enabled: bool,
    pub telemetry: &'static str,
    pub token: String,
    pub tracking_id: String,
    pub vsc_electron_fetcher: bool,
    pub vs_editor_fetcher: bool,
    pub vsc_panel_v2: bool,
}

impl SessionPayload {
    /// Build the payload for a freshly issued session.
    #[must_use]
    pub fn from_grant(grant: &SessionGrant) -> Self {
        Self {
            cocopilot_share_id: 0,
            annotations_enabled: false,
            chat_enabled: true,
            chat_jetbrains_enabled: true,
            code_quote_enabled: true,
            codesearch: false,
            copilot_ide_agent_chat_gpt4_small_prompt: false,
            copilotignore_enabled: false,
            expires_at: grant.expires_at,
            individual: false,
            intellij_editor_fetcher: false,
            nes_enabled: false,
            organization_list: None,
            prompt_8k: false,
            public_suggestions: "disabled",
            refresh_in: flow::SESSION_REFRESH_IN_SECS,
            sku: flow::SKU,
            snippy_load_test_enabled: false,
            telemetry: "disabled",
            token: session_token(grant),
            tracking_id: grant.tracking_id.clone(),
            vsc_electron_fetcher: false,
            vs_editor_fetcher: false,
            vsc_panel_v2: false,
        }
    }
}

/// Composite session token: `tid=..;exp=..;sku=..;st=dotcom;ssc=1;chat=1;8kp=0:<secret>`.
#[must_use]
pub fn session_token(grant: &SessionGrant) -> String {
    format!(
        "tid={};exp={};sku={};st=dotcom;ssc=1;chat=1;8kp=0:{}",
        grant.tracking_id,
        grant.expires_at,
        flow::SKU,
        grant.secret
    )
}
