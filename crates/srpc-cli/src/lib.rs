//! # srpc-cli: srpc Command-Line Interface
//!
//! ## Subcommands
//!
//! - `serve`: Serve the demo endpoints plus any echo endpoints declared in
//!   a schemas file
//! - `docs`: Print the documentation tree for the same registry and exit
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in the subcommand modules; registration and
//!   serving delegate to `srpc-api`.
//! - Schema errors abort before the server binds.

pub mod demo;
pub mod docs;
pub mod echo;
pub mod serve;
pub mod telemetry;

use std::path::Path;

use srpc_api::{EndpointRegistry, Registry};

/// The registry both subcommands operate on: the demo endpoints followed by
/// the echo endpoints declared in `schemas`, if given.
pub fn build_registry(schemas: Option<&Path>) -> anyhow::Result<Registry> {
    let mut registry = EndpointRegistry::new();
    demo::register(&mut registry)?;
    if let Some(path) = schemas {
        let file = echo::EchoFile::load(path)?;
        echo::register(&mut registry, &file)?;
    }
    Ok(registry.freeze())
}
