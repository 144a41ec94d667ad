//! In-memory device-flow registry following the `OAuthStore` pattern.
//!
//! Records are keyed by `client_id`, with secondary indices from device code
//! and access token back to the owning client. Every operation takes the
//! write lock once for its whole scan-then-mutate step, so concurrent callers
//! never observe a half-applied transition.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::codes;
use super::types::{
    AccessTokenGrant, AuthorizationRecord, DeviceAuthorization, Phase, SessionGrant,
    SessionPayload,
};
use crate::config::flow;
use crate::error::{FlowError, FlowResult};

#[derive(Default)]
struct Registry {
    records: HashMap<String, AuthorizationRecord>,
    by_device_code: HashMap<String, String>,
    by_access_token: HashMap<String, String>,
}

impl Registry {
    /// Drop a record and its index entries.
    fn remove(&mut self, client_id: &str) -> Option<AuthorizationRecord> {
        let record = self.records.remove(client_id)?;
        self.by_device_code.remove(&record.device_code);
        if let Some(token) = &record.access_token {
            self.by_access_token.remove(token);
        }
        Some(record)
    }
}

/// Owner of every authorization record for one server instance.
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone, Default)]
pub struct DeviceFlowStore {
    inner: Arc<RwLock<Registry>>,
}

impl DeviceFlowStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a device authorization for `client_id`, replacing any previous record.
    pub async fn begin_device_authorization(
        &self,
        client_id: &str,
        verification_uri: &str,
    ) -> DeviceAuthorization {
        let device_code = codes::device_code();
        let user_code = codes::user_code();

        let mut registry = self.inner.write().await;
        if registry.remove(client_id).is_some() {
            tracing::debug!(client_id = %client_id, "Replaced existing authorization record");
        }
        registry.by_device_code.insert(device_code.clone(), client_id.to_owned());
        let record = AuthorizationRecord::pending(
            client_id.to_owned(),
            device_code.clone(),
            user_code.clone(),
        );
        registry.records.insert(client_id.to_owned(), record);

        DeviceAuthorization {
            device_code,
            expires_in: flow::EXPIRES_IN_SECS,
            interval: flow::INTERVAL_SECS,
            user_code,
            verification_uri: verification_uri.to_owned(),
        }
    }

    /// Redeem a device code. Both `device_code` and `client_id` must match one record.
    ///
    /// Re-redeeming replaces the previous access token, which stops working.
    pub async fn exchange_device_code(
        &self,
        device_code: &str,
        client_id: &str,
    ) -> FlowResult<AccessTokenGrant> {
        let mut registry = self.inner.write().await;

        match registry.by_device_code.get(device_code) {
            Some(owner) if owner == client_id => {}
            _ => return Err(FlowError::NotFound),
        }

        let access_token = codes::access_token();
        let record = registry.records.get_mut(client_id).ok_or(FlowError::NotFound)?;
        let previous = record.access_token.replace(access_token.clone());

        if let Some(previous) = previous {
            registry.by_access_token.remove(&previous);
        }
        registry.by_access_token.insert(access_token.clone(), client_id.to_owned());

        Ok(AccessTokenGrant::new(access_token))
    }

    /// Exchange an access token for a fresh session token.
    ///
    /// An empty token never matches. Each call refreshes the tracking id,
    /// expiry and secret.
    pub async fn issue_session_token(&self, access_token: &str) -> FlowResult<SessionPayload> {
        if access_token.is_empty() {
            return Err(FlowError::Unauthorized);
        }

        let mut registry = self.inner.write().await;
        let client_id =
            registry.by_access_token.get(access_token).cloned().ok_or(FlowError::Unauthorized)?;
        let record = registry.records.get_mut(&client_id).ok_or(FlowError::Unauthorized)?;

        let grant = SessionGrant {
            tracking_id: codes::opaque_id(),
            expires_at: chrono::Utc::now().timestamp() + flow::SESSION_LIFETIME_SECS,
            secret: codes::opaque_id(),
        };
        let payload = SessionPayload::from_grant(&grant);
        record.session = Some(grant);

        Ok(payload)
    }

    /// Return the owning `client_id` if `access_token` is currently live.
    pub async fn validate_access_token(&self, access_token: &str) -> Option<String> {
        if access_token.is_empty() {
            return None;
        }
        self.inner.read().await.by_access_token.get(access_token).cloned()
    }

    /// Phase of the record for `client_id`, if one exists.
    pub async fn phase(&self, client_id: &str) -> Option<Phase> {
        self.inner.read().await.records.get(client_id).map(AuthorizationRecord::phase)
    }

    /// Snapshot of the record for `client_id`.
    pub async fn record(&self, client_id: &str) -> Option<AuthorizationRecord> {
        self.inner.read().await.records.get(client_id).cloned()
    }

    /// Number of live records.
    pub async fn record_count(&self) -> usize {
        self.inner.read().await.records.len()
    }
}

impl std::fmt::Debug for DeviceFlowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceFlowStore").finish()
    }
}
