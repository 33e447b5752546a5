//! # Echo Endpoints
//!
//! Endpoints declared entirely as data. Each entry in a schemas file binds a
//! path whose function returns the validated input unchanged, or `{}` when
//! the entry has no input schema. The output schema is therefore the input
//! schema; an `output` naming anything else is rejected. Paths must be
//! unique across the whole registry:
//!
//! ```json
//! {
//!   "schemas": [
//!     {"name": "Point", "fields": [{"name": "x", "type": "float"}, {"name": "y", "type": "float"}]}
//!   ],
//!   "endpoints": [
//!     {"path": "/point.json", "description": "echo a point", "input": "Point", "output": "Point"}
//!   ]
//! }
//! ```

use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use serde::Deserialize;
use serde_json::{json, Value};
use srpc_api::{Binding, EndpointRegistry};
use srpc_schema::{SchemaDefinition, SchemaDescriptor, SchemaSet};

/// Contents of a schemas file.
#[derive(Debug, Clone, Deserialize)]
pub struct EchoFile {
    #[serde(default)]
    pub endpoints: Vec<EchoEndpoint>,
    #[serde(default)]
    pub schemas: Vec<SchemaDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EchoEndpoint {
    pub path: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Name of the input schema.
    #[serde(default)]
    pub input: Option<String>,
    /// Name of the output schema.
    #[serde(default)]
    pub output: Option<String>,
}

impl EchoFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read schemas file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid schemas file {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Bind every endpoint in `file`, in file order.
pub fn register(registry: &mut EndpointRegistry, file: &EchoFile) -> anyhow::Result<()> {
    let schemas = SchemaSet::from_definitions(file.schemas.iter().cloned())?;

    for endpoint in &file.endpoints {
        let path = &endpoint.path;
        if !path.starts_with('/') {
            bail!("endpoint path must start with '/': {path}");
        }
        if registry.contains(path) {
            bail!("endpoint path {path} is bound more than once");
        }
        if let Some(output) = &endpoint.output {
            if endpoint.input.as_ref() != Some(output) {
                bail!(
                    "endpoint {path} echoes its input, so output {output} must match input {}",
                    endpoint.input.as_deref().unwrap_or("(none)")
                );
            }
        }

        let mut binding =
            Binding::new(path.clone()).with_description(endpoint.description.clone());
        if let Some(name) = &endpoint.input {
            let schema = lookup(&schemas, path, name)?;
            binding = binding.with_input(schema.clone()).with_output(schema);
        }
        registry.bind(binding, echo);
    }
    Ok(())
}

fn lookup(schemas: &SchemaSet, path: &str, name: &str) -> anyhow::Result<Arc<SchemaDescriptor>> {
    schemas
        .get(name)
        .with_context(|| format!("endpoint {path} references unknown schema {name}"))
}

async fn echo(input: Option<Value>) -> Result<Value, Infallible> {
    Ok(input.unwrap_or_else(|| json!({})))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = r#"{
        "schemas": [
            {"name": "Inner", "fields": [{"name": "flag", "type": "boolean"}]},
            {"name": "Outer", "fields": [
                {"name": "id", "type": "integer"},
                {"name": "inner", "type": "Inner", "required": false}
            ]}
        ],
        "endpoints": [
            {"path": "/outer.json", "description": "echo outer", "input": "Outer", "output": "Outer"},
            {"path": "/ping"}
        ]
    }"#;

    #[test]
    fn registers_entries_in_file_order() {
        let file = EchoFile::parse(FILE).unwrap();
        let mut registry = EndpointRegistry::new();
        register(&mut registry, &file).unwrap();
        let frozen = registry.freeze();

        let paths: Vec<&str> = frozen.iter().map(|e| e.binding().path()).collect();
        assert_eq!(paths, vec!["/outer.json", "/ping"]);

        let outer = frozen.get("/outer.json").unwrap().binding();
        assert_eq!(outer.description(), Some("echo outer"));
        assert_eq!(outer.input().map(|s| s.name()), Some("Outer"));
        assert!(frozen.get("/ping").unwrap().binding().input().is_none());
    }

    #[test]
    fn unknown_schema_is_rejected() {
        let file = EchoFile::parse(
            r#"{"endpoints": [{"path": "/x", "input": "Missing"}], "schemas": []}"#,
        )
        .unwrap();
        let mut registry = EndpointRegistry::new();
        let err = register(&mut registry, &file).unwrap_err();
        assert!(err.to_string().contains("Missing"), "{err}");
    }

    #[test]
    fn output_defaults_to_input() {
        let file = EchoFile::parse(
            r#"{"schemas": [{"name": "A", "fields": [{"name": "x", "type": "integer"}]}],
                "endpoints": [{"path": "/a", "input": "A"}]}"#,
        )
        .unwrap();
        let mut registry = EndpointRegistry::new();
        register(&mut registry, &file).unwrap();
        let frozen = registry.freeze();
        let binding = frozen.get("/a").unwrap().binding();
        assert_eq!(binding.output().map(|s| s.name()), Some("A"));
    }

    #[test]
    fn output_differing_from_input_is_rejected() {
        let schemas = r#"[{"name": "A", "fields": [{"name": "x", "type": "integer"}]},
                          {"name": "B", "fields": [{"name": "y", "type": "string"}]}]"#;
        for endpoint in [
            r#"{"path": "/ab", "input": "A", "output": "B"}"#,
            r#"{"path": "/b", "output": "B"}"#,
        ] {
            let file = EchoFile::parse(&format!(
                r#"{{"schemas": {schemas}, "endpoints": [{endpoint}]}}"#
            ))
            .unwrap();
            let mut registry = EndpointRegistry::new();
            let err = register(&mut registry, &file).unwrap_err();
            assert!(err.to_string().contains("must match input"), "{err}");
            assert!(registry.is_empty());
        }
    }

    #[test]
    fn duplicate_path_is_rejected() {
        let file = EchoFile::parse(r#"{"endpoints": [{"path": "/x"}, {"path": "/x"}]}"#).unwrap();
        let mut registry = EndpointRegistry::new();
        let err = register(&mut registry, &file).unwrap_err();
        assert!(err.to_string().contains("/x"), "{err}");
    }

    #[test]
    fn path_already_bound_elsewhere_is_rejected() {
        let mut registry = EndpointRegistry::new();
        crate::demo::register(&mut registry).unwrap();
        let file = EchoFile::parse(r#"{"endpoints": [{"path": "/ddd"}]}"#).unwrap();
        assert!(register(&mut registry, &file).is_err());
    }

    #[test]
    fn relative_path_is_rejected() {
        let file = EchoFile::parse(r#"{"endpoints": [{"path": "x.json"}]}"#).unwrap();
        let mut registry = EndpointRegistry::new();
        assert!(register(&mut registry, &file).is_err());
    }

    #[test]
    fn recursive_definitions_are_rejected() {
        let file = EchoFile::parse(
            r#"{"schemas": [{"name": "Node", "fields": [{"name": "next", "type": "Node"}]}]}"#,
        )
        .unwrap();
        let mut registry = EndpointRegistry::new();
        assert!(register(&mut registry, &file).is_err());
        assert!(registry.is_empty());
    }
}
