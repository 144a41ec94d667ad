//! Configuration for the coauth server.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Device-flow and session constants.
pub mod flow {
    /// Advisory polling interval returned to clients, in seconds.
    pub const INTERVAL_SECS: u64 = 5;

    /// Advisory device-code lifetime returned to clients, in seconds. Not enforced.
    pub const EXPIRES_IN_SECS: u64 = 900;

    /// Session token lifetime (1 hour).
    pub const SESSION_LIFETIME_SECS: i64 = 3600;

    /// How soon clients should refresh their session token, in seconds.
    pub const SESSION_REFRESH_IN_SECS: u64 = 1500;

    /// Prefix of every issued access token.
    pub const ACCESS_TOKEN_PREFIX: &str = "ccu_";

    /// Scope reported with access tokens.
    pub const SCOPE: &str = "user:email";

    /// Token type reported with access tokens.
    pub const TOKEN_TYPE: &str = "bearer";

    /// Subscription SKU embedded in session payloads.
    pub const SKU: &str = "yearly_subscriber";
}

/// Default bind address.
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080);

/// Default host used when building the verification URI.
pub const DEFAULT_PUBLIC_HOST: &str = "localhost";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP listener binds to.
    pub bind: SocketAddr,

    /// Host name clients are told to open; the port always comes from `bind`.
    pub public_host: String,
}

impl Config {
    /// Create a new configuration.
    #[must_use]
    pub fn new(bind: SocketAddr, public_host: Option<String>) -> Self {
        Self {
            bind,
            public_host: public_host.unwrap_or_else(|| DEFAULT_PUBLIC_HOST.to_string()),
        }
    }

    /// Create a test configuration that reports the given port.
    #[must_use]
    pub fn for_testing(port: u16) -> Self {
        Self::new(SocketAddr::from((Ipv4Addr::LOCALHOST, port)), None)
    }

    /// Base URL clients are sent to for out-of-band approval.
    #[must_use]
    pub fn verification_uri(&self) -> String {
        format!("http://{}:{}/login/device", self.public_host, self.bind.port())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_BIND, None)
    }
}
