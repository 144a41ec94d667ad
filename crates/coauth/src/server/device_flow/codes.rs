//! Identifier generation for device codes, user codes and tokens.
//!
//! All values come from UUID v4 (122 random bits). Nothing here is meant to
//! resist an attacker; the values only need to be practically unique.

use uuid::Uuid;

use crate::config::flow;

/// Opaque device code handed to the polling client.
#[must_use]
pub fn device_code() -> String {
    Uuid::new_v4().to_string()
}

/// Human-readable user code in `XXXX-XXXX` form (uppercase hex).
#[must_use]
pub fn user_code() -> String {
    let hex = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
    format!("{}-{}", &hex[..4], &hex[4..8])
}

/// Access token: fixed prefix plus a random suffix.
#[must_use]
pub fn access_token() -> String {
    format!("{}{}", flow::ACCESS_TOKEN_PREFIX, Uuid::new_v4())
}

/// Tracking id or session secret.
#[must_use]
pub fn opaque_id() -> String {
    Uuid::new_v4().to_string()
}
