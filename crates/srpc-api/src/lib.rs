//! # srpc-api: Function-to-Endpoint Binding over Axum
//!
//! Exposes plain async functions as JSON endpoints. Each endpoint declares
//! an input and output [`SchemaDescriptor`](srpc_schema::SchemaDescriptor);
//! requests are decoded, validated, and dispatched, and results are wrapped
//! in a uniform [`Envelope`].
//!
//! ## Lifecycle
//!
//! ```text
//! EndpointRegistry::new()
//!     .rpc(...)?  .rpc_unit_route(...)?  .bind(...)
//!     .freeze()                         -> Registry (read-only)
//! app(&registry, &config)               -> axum::Router
//! serve(router, &config).await
//! ```
//!
//! Registration happens before the router exists. Once frozen, the
//! registry is shared by the router and the documentation generator
//! and never changes.
//!
//! ## Modules
//!
//! - [`envelope`]: `{"status":"ok"|"error", ...}` response bodies.
//! - [`error`]: decode, validation and internal failures as envelopes.
//! - [`registry`]: bindings, endpoints and the freeze step.
//! - [`binder`]: typed and raw binding, request dispatch.
//! - [`docs`]: documentation tree generation.
//! - [`config`]: [`ServerConfig`] from defaults or `SRPC_*` variables.
//! - [`app`]: router assembly, health probes, middleware.

pub mod app;
pub mod binder;
pub mod config;
pub mod docs;
pub mod envelope;
pub mod error;
pub mod registry;

pub use app::{app, serve};
pub use binder::{decode_and_validate, rpc_path, RPC_SUFFIX};
pub use config::{ConfigError, ServerConfig};
pub use docs::{generate_docs, DocumentationTree, EndpointDoc, FieldDoc, SchemaDoc};
pub use envelope::{error, error_with_code, ok, Envelope, ErrorPayload, Reply};
pub use error::RpcError;
pub use registry::{Binding, Endpoint, EndpointRegistry, Registry};
