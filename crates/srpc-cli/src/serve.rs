//! # Serve Subcommand
//!
//! Builds the registry, assembles the router and serves it. Flags override
//! the `SRPC_*` environment, which overrides the defaults.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Args;
use srpc_api::ServerConfig;

use crate::telemetry;

/// Arguments for the serve subcommand.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Port to bind.
    #[arg(long)]
    pub port: Option<u16>,

    /// Path of the documentation endpoint. An empty value disables it.
    #[arg(long)]
    pub docs_path: Option<String>,

    /// Application name reported in the documentation tree.
    #[arg(long)]
    pub app_name: Option<String>,

    /// JSON file declaring echo endpoints and their schemas.
    #[arg(long)]
    pub schemas: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json_logs: bool,
}

impl ServeArgs {
    /// Apply the flags that were given on top of `config`.
    pub fn apply(&self, mut config: ServerConfig) -> anyhow::Result<ServerConfig> {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(path) = &self.docs_path {
            config.docs_path = match path.trim() {
                "" => None,
                p if p.starts_with('/') => Some(p.to_string()),
                p => anyhow::bail!("--docs-path must start with '/': {p}"),
            };
        }
        if let Some(name) = &self.app_name {
            config.app_name = name.clone();
        }
        Ok(config)
    }
}

pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.apply(ServerConfig::from_env()?)?;
    let registry = crate::build_registry(args.schemas.as_deref())?;

    let mut router = srpc_api::app(&registry, &config);
    if config.metrics_enabled {
        let handle = telemetry::install_metrics()?;
        router = telemetry::with_metrics_route(router, handle);
    }

    tracing::info!(
        endpoints = registry.len(),
        docs = config.docs_path.as_deref().unwrap_or("disabled"),
        "starting srpc"
    );
    srpc_api::serve(router, &config).await?;
    Ok(())
}
