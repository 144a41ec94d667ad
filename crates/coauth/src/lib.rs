//! Coauth
//!
//! A local test double for the GitHub device-authorization login and the
//! Copilot session-token endpoints. Editor plugins pointed at it can log in,
//! obtain an access token and exchange it for a session token without ever
//! talking to the real service.
//!
//! # Features
//!
//! - **Device flow**: `/login/device/code` and `/login/oauth/access_token`
//! - **Session tokens**: `/copilot_internal/v2/token` with the composite token string
//! - **In-memory**: one registry per server, nothing persisted
//!
//! # Example
//!
//! ```no_run
//! use coauth::{config::Config, server::CoauthServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     CoauthServer::new(config).run().await
//! }
//! ```

pub mod config;
pub mod error;
pub mod server;

pub use config::Config;
pub use error::{FlowError, FlowResult};
pub use server::device_flow::DeviceFlowStore;
