//! Bridge MCP Server
//!
//! # Usage
//!
//! ```bash
//! bridge-mcp [--config <path>] [--jira-url <url>] ...
//! ```
//!
//! Every flag can also be given through its environment variable
//! (`bridge-mcp --help` lists them) or a `.env` file in the working directory.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Control log verbosity (default: `bridge_mcp=info`)
//!
//! # Protocol
//!
//! The server communicates via JSON-RPC 2.0 over stdio:
//! - Requests/responses go through stdout
//! - Logs go to stderr

use bridge_mcp::{Args, BridgeMcpServer, Error};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Must run before clap reads the environment
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bridge_mcp=info".parse()?)
                .add_directive("bridge_core=info".parse()?)
                .add_directive("bridge_services=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }

    let args = Args::parse();
    let config = args.load_config()?;

    tracing::info!("Starting bridge-mcp server");

    let gateway = match bridge_mcp::start(&config).await {
        Ok(gateway) => gateway,
        Err(Error::Core(e @ bridge_core::Error::NoServicesEnabled { .. })) => {
            tracing::error!(error = %e, "No services are enabled. Please configure at least one service.");
            for (service, variables) in bridge_services::required_variables() {
                tracing::error!(service, variables = %variables.join(", "), "Required settings");
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let enabled = gateway.registry().enabled_ids().join(", ");
    tracing::info!(services = %enabled, "Enabled services");

    BridgeMcpServer::new(gateway).run().await?;

    Ok(())
}
