//! Coauth - Entry Point
//!
//! Serves the device-flow and session-token endpoints over HTTP.

use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use coauth::{config::Config, server::CoauthServer};

#[derive(Parser, Debug)]
#[command(name = "coauth")]
#[command(about = "Local test double for the device-flow login and Copilot token endpoints")]
#[command(version)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080", env = "COAUTH_BIND")]
    bind: SocketAddr,

    /// Host name used in verification_uri (the port is taken from --bind)
    #[arg(long, env = "COAUTH_PUBLIC_HOST")]
    public_host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), bind = %cli.bind, "Starting coauth");

    let config = Config::new(cli.bind, cli.public_host);
    CoauthServer::new(config).run().await
}
