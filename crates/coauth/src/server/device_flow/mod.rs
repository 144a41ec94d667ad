//! Device-authorization flow and session-token issuance.
//!
//! Emulates the GitHub device flow closely enough for editor plugins:
//! - device code issuance (`POST /login/device/code`)
//! - device code → access token exchange (`POST /login/oauth/access_token`)
//! - access token → Copilot session token (`GET /copilot_internal/v2/token`)
//!
//! Approval is implicit: a freshly issued device code can be redeemed at once.

pub mod codes;
pub mod handlers;
pub mod store;
pub mod types;

pub use store::DeviceFlowStore;
pub use types::Phase;
