//! # Endpoint Registry
//!
//! Records every endpoint bound through the binder. The registry has two
//! phases:
//!
//! 1. [`EndpointRegistry`] is populated at startup (`bind`, `rpc`, ...).
//! 2. [`EndpointRegistry::freeze`] turns it into a [`Registry`]: immutable,
//!    cheap to clone, shared by the router and the documentation generator.
//!
//! Iteration order is insertion order. Path uniqueness is not checked
//! here; axum rejects duplicate routes when the router is assembled.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;
use srpc_schema::{SchemaDescriptor, Validated};

use crate::error::RpcError;

/// Result of running a bound function.
pub(crate) enum Outcome {
    /// Serialized return value, to be wrapped in a success envelope.
    Content(Value),
    /// Failure normalized into an error envelope.
    Failed(RpcError),
    /// Business error response, returned as-is.
    Passthrough(Response),
}

pub(crate) type HandlerFuture = Pin<Box<dyn Future<Output = Outcome> + Send>>;

/// Type-erased bound function. Receives the validated input, if the
/// endpoint declares one.
pub(crate) type RawHandler = Arc<dyn Fn(Option<Validated>) -> HandlerFuture + Send + Sync>;

/// Static description of one endpoint: where it lives and what it accepts
/// and returns.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    path: String,
    description: Option<String>,
    input: Option<Arc<SchemaDescriptor>>,
    output: Option<Arc<SchemaDescriptor>>,
}

impl Binding {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: None,
            input: None,
            output: None,
        }
    }

    pub fn with_description(mut self, description: Option<impl Into<String>>) -> Self {
        self.description = description.map(Into::into);
        self
    }

    pub fn with_input(mut self, schema: impl Into<Arc<SchemaDescriptor>>) -> Self {
        self.input = Some(schema.into());
        self
    }

    pub fn with_output(mut self, schema: impl Into<Arc<SchemaDescriptor>>) -> Self {
        self.output = Some(schema.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn input(&self) -> Option<&SchemaDescriptor> {
        self.input.as_deref()
    }

    pub fn output(&self) -> Option<&SchemaDescriptor> {
        self.output.as_deref()
    }
}

/// A binding together with its handler.
#[derive(Clone)]
pub struct Endpoint {
    pub(crate) binding: Binding,
    pub(crate) handler: RawHandler,
}

impl Endpoint {
    pub fn binding(&self) -> &Binding {
        &self.binding
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

/// Mutable registry used during startup.
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    endpoints: Vec<Endpoint>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Whether an endpoint is already bound at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.endpoints.iter().any(|e| e.binding.path() == path)
    }

    pub(crate) fn insert(&mut self, binding: Binding, handler: RawHandler) -> &mut Self {
        tracing::info!(
            path = binding.path(),
            input = binding.input().map(SchemaDescriptor::name),
            output = binding.output().map(SchemaDescriptor::name),
            "bound endpoint"
        );
        self.endpoints.push(Endpoint { binding, handler });
        self
    }

    /// End the registration phase.
    pub fn freeze(self) -> Registry {
        tracing::info!(endpoints = self.endpoints.len(), "endpoint registry frozen");
        Registry {
            endpoints: Arc::from(self.endpoints),
        }
    }
}

/// Frozen, read-only registry.
#[derive(Debug, Clone)]
pub struct Registry {
    endpoints: Arc<[Endpoint]>,
}

impl Registry {
    /// Endpoints in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    pub fn get(&self, path: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.binding.path() == path)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
