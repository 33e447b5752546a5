//! # srpc CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// srpc: plain functions served as schema-checked JSON endpoints.
#[derive(Parser, Debug)]
#[command(name = "srpc", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the bound endpoints over HTTP.
    Serve(srpc_cli::serve::ServeArgs),
    /// Print the endpoint documentation tree and exit.
    Docs(srpc_cli::docs::DocsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            srpc_cli::telemetry::init_tracing(args.json_logs)?;
            srpc_cli::serve::run(args).await
        }
        Commands::Docs(args) => {
            srpc_cli::telemetry::init_tracing(false)?;
            srpc_cli::docs::run(args)
        }
    }
}
