//! # Docs Subcommand
//!
//! Prints the documentation tree for the registry `serve` would build.

use std::path::PathBuf;

use clap::Args;
use srpc_api::{generate_docs, ServerConfig};

/// Arguments for the docs subcommand.
#[derive(Args, Debug, Default)]
pub struct DocsArgs {
    /// Application name reported in the documentation tree.
    #[arg(long)]
    pub app_name: Option<String>,

    /// JSON file declaring echo endpoints and their schemas.
    #[arg(long)]
    pub schemas: Option<PathBuf>,
}

/// Render the pretty-printed documentation tree.
pub fn render(args: &DocsArgs) -> anyhow::Result<String> {
    let name = match &args.app_name {
        Some(name) => name.clone(),
        None => ServerConfig::from_env()?.app_name,
    };
    let registry = crate::build_registry(args.schemas.as_deref())?;
    Ok(serde_json::to_string_pretty(&generate_docs(&name, &registry))?)
}

pub fn run(args: DocsArgs) -> anyhow::Result<()> {
    println!("{}", render(&args)?);
    Ok(())
}
