//! # Endpoint Binder
//!
//! Turns a plain async function plus its declared schemas into an HTTP
//! handler. Per request:
//!
//! 1. If the endpoint declares an input schema, the body is decoded as JSON
//!    whatever its content type. A missing or unparseable body is a
//!    [`RpcError::Decode`].
//! 2. The decoded value is validated against the input schema. A failure is
//!    answered with an error envelope and the function is not called.
//! 3. The function runs with the typed value (or with nothing).
//! 4. Its `Ok` value is serialized into a success envelope.
//! 5. Its `Err` value is converted with `IntoResponse` and returned as-is.
//!    Business errors are the function's own contract and are not wrapped.
//!
//! ## Binding forms
//!
//! | Method | Path | Input | Output |
//! |--------|------|-------|--------|
//! | [`EndpointRegistry::rpc`] | `/{name}.json` | `I: Schema` | `O: Schema` |
//! | [`EndpointRegistry::rpc_route`] | explicit | `I: Schema` | `O: Schema` |
//! | [`EndpointRegistry::rpc_unit`] | `/{name}.json` | none | `O: Schema` |
//! | [`EndpointRegistry::rpc_unit_route`] | explicit | none | `O: Schema` |
//! | [`EndpointRegistry::bind`] | explicit | descriptor value | descriptor value |
//!
//! The typed forms derive descriptors from the types and delegate to the
//! same dispatch path as `bind`.

use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use srpc_schema::{descriptor_of, validate, Schema, SchemaDescriptor, SchemaError, Validated};

use crate::envelope;
use crate::error::RpcError;
use crate::registry::{Binding, Endpoint, EndpointRegistry, HandlerFuture, Outcome, RawHandler};

/// Suffix appended to function names to form their path.
pub const RPC_SUFFIX: &str = ".json";

/// Path for an endpoint bound by name: `index` -> `/index.json`.
pub fn rpc_path(name: &str) -> String {
    format!("/{}{RPC_SUFFIX}", name.trim_start_matches('/'))
}

impl EndpointRegistry {
    /// Bind a function over raw JSON to an explicit [`Binding`].
    ///
    /// The function receives the validated input as a JSON object (`None`
    /// when the binding declares no input) and returns the content of the
    /// success envelope.
    pub fn bind<F, Fut, E>(&mut self, binding: Binding, f: F) -> &mut Self
    where
        F: Fn(Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, E>> + Send + 'static,
        E: IntoResponse + Send + 'static,
    {
        let handler: RawHandler = Arc::new(move |input: Option<Validated>| -> HandlerFuture {
            let fut = f(input.map(Validated::into_value));
            Box::pin(async move {
                match fut.await {
                    Ok(content) => Outcome::Content(content),
                    Err(err) => Outcome::Passthrough(err.into_response()),
                }
            })
        });
        self.insert(binding, handler)
    }

    /// Bind `f` at `/{name}.json`.
    pub fn rpc<I, O, E, F, Fut>(
        &mut self,
        name: &str,
        description: Option<&str>,
        f: F,
    ) -> Result<&mut Self, SchemaError>
    where
        I: Schema + DeserializeOwned + Send + 'static,
        O: Schema + Serialize + Send + 'static,
        E: IntoResponse + Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
    {
        self.rpc_route(rpc_path(name), description, f)
    }

    /// Bind `f` at an explicit path.
    pub fn rpc_route<I, O, E, F, Fut>(
        &mut self,
        path: impl Into<String>,
        description: Option<&str>,
        f: F,
    ) -> Result<&mut Self, SchemaError>
    where
        I: Schema + DeserializeOwned + Send + 'static,
        O: Schema + Serialize + Send + 'static,
        E: IntoResponse + Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
    {
        let binding = Binding::new(path)
            .with_description(description)
            .with_input(descriptor_of::<I>()?)
            .with_output(descriptor_of::<O>()?);

        let handler: RawHandler = Arc::new(move |input: Option<Validated>| -> HandlerFuture {
            let value = match typed_input::<I>(input) {
                Ok(value) => value,
                Err(err) => return Box::pin(async move { Outcome::Failed(err) }),
            };
            let fut = f(value);
            Box::pin(async move { settle(fut.await) })
        });
        Ok(self.insert(binding, handler))
    }

    /// Bind an input-less `f` at `/{name}.json`.
    pub fn rpc_unit<O, E, F, Fut>(
        &mut self,
        name: &str,
        description: Option<&str>,
        f: F,
    ) -> Result<&mut Self, SchemaError>
    where
        O: Schema + Serialize + Send + 'static,
        E: IntoResponse + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
    {
        self.rpc_unit_route(rpc_path(name), description, f)
    }

    /// Bind an input-less `f` at an explicit path. The request body is
    /// never read.
    pub fn rpc_unit_route<O, E, F, Fut>(
        &mut self,
        path: impl Into<String>,
        description: Option<&str>,
        f: F,
    ) -> Result<&mut Self, SchemaError>
    where
        O: Schema + Serialize + Send + 'static,
        E: IntoResponse + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
    {
        let binding = Binding::new(path)
            .with_description(description)
            .with_output(descriptor_of::<O>()?);

        let handler: RawHandler = Arc::new(move |_: Option<Validated>| -> HandlerFuture {
            let fut = f();
            Box::pin(async move { settle(fut.await) })
        });
        Ok(self.insert(binding, handler))
    }
}

fn typed_input<I: DeserializeOwned>(input: Option<Validated>) -> Result<I, RpcError> {
    let validated =
        input.ok_or_else(|| RpcError::Internal("input schema declared but no input".into()))?;
    validated.deserialize::<I>().map_err(|err| {
        RpcError::Internal(format!(
            "validated input does not match the handler type: {err}"
        ))
    })
}

fn settle<O: Serialize, E: IntoResponse>(result: Result<O, E>) -> Outcome {
    match result {
        Ok(output) => match serde_json::to_value(&output) {
            Ok(content) => Outcome::Content(content),
            Err(err) => Outcome::Failed(RpcError::Internal(format!(
                "return value could not be serialized: {err}"
            ))),
        },
        Err(err) => Outcome::Passthrough(err.into_response()),
    }
}

/// Decode a request body and validate it against `schema`.
pub fn decode_and_validate(schema: &SchemaDescriptor, body: &[u8]) -> Result<Validated, RpcError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RpcError::Decode("request body is missing".into()));
    }
    let raw: Value =
        serde_json::from_slice(body).map_err(|err| RpcError::Decode(err.to_string()))?;
    Ok(validate(schema, &raw)?)
}

/// Serve one request for `endpoint`.
pub(crate) async fn dispatch(endpoint: &Endpoint, body: Bytes) -> Response {
    let path = endpoint.binding.path();

    let input = match endpoint.binding.input() {
        Some(schema) => match decode_and_validate(schema, &body) {
            Ok(validated) => Some(validated),
            Err(err) => {
                record(path, err.outcome());
                return err.into_response();
            }
        },
        None => None,
    };

    tracing::debug!(path, "dispatching rpc");
    match (endpoint.handler)(input).await {
        Outcome::Content(content) => {
            record(path, "ok");
            envelope::ok(content).into_response()
        }
        Outcome::Failed(err) => {
            record(path, err.outcome());
            err.into_response()
        }
        Outcome::Passthrough(response) => {
            record(path, "passthrough");
            tracing::debug!(path, status = %response.status(), "passing through handler error");
            response
        }
    }
}

fn record(path: &str, outcome: &'static str) {
    metrics::counter!(
        "srpc_requests_total",
        "path" => path.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
