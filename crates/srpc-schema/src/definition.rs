//! # Declarative Schema Definitions
//!
//! Schemas declared as data rather than Rust types, e.g. loaded from a JSON
//! file:
//!
//! ```json
//! [
//!   {"name": "Req", "fields": [{"name": "id", "type": "integer"},
//!                              {"name": "name", "type": "string"}]},
//!   {"name": "Resp", "fields": [{"name": "reply", "type": "string"},
//!                               {"name": "req", "type": "Req", "required": false}]}
//! ]
//! ```
//!
//! A field type is a scalar kind name (`integer`, `string`, `boolean`,
//! `float`, or an alias) or the name of another definition in the same
//! set. Definitions may appear in any order; references are resolved
//! depth-first and cycles are rejected.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Deserialize;

use crate::descriptor::{ScalarKind, SchemaDescriptor};
use crate::error::SchemaError;

/// One schema declared as data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchemaDefinition {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

/// One field of a [`SchemaDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

/// A resolved set of named descriptors.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    schemas: BTreeMap<String, Arc<SchemaDescriptor>>,
}

impl SchemaSet {
    /// Resolve every definition into a descriptor.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = SchemaDefinition>,
    ) -> Result<Self, SchemaError> {
        let mut order = Vec::new();
        let mut by_name = HashMap::new();
        for def in definitions {
            if by_name.contains_key(&def.name) {
                return Err(SchemaError::DuplicateSchema(def.name));
            }
            order.push(def.name.clone());
            by_name.insert(def.name.clone(), def);
        }

        let mut resolver = Resolver {
            definitions: &by_name,
            resolved: BTreeMap::new(),
            visiting: Vec::new(),
        };
        for name in &order {
            resolver.resolve(name)?;
        }

        Ok(Self {
            schemas: resolver.resolved,
        })
    }

    pub fn get(&self, name: &str) -> Option<Arc<SchemaDescriptor>> {
        self.schemas.get(name).cloned()
    }

    /// Schema names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

struct Resolver<'a> {
    definitions: &'a HashMap<String, SchemaDefinition>,
    resolved: BTreeMap<String, Arc<SchemaDescriptor>>,
    visiting: Vec<String>,
}

impl Resolver<'_> {
    fn resolve(&mut self, name: &str) -> Result<Arc<SchemaDescriptor>, SchemaError> {
        if let Some(done) = self.resolved.get(name) {
            return Ok(done.clone());
        }
        if let Some(start) = self.visiting.iter().position(|v| v == name) {
            let mut path = self.visiting[start..].to_vec();
            path.push(name.to_string());
            return Err(SchemaError::Recursive {
                schema: name.to_string(),
                path,
            });
        }

        let definitions = self.definitions;
        let def = &definitions[name];
        self.visiting.push(name.to_string());

        let mut builder = SchemaDescriptor::builder(def.name.clone());
        for field in &def.fields {
            builder = if let Ok(kind) = field.type_name.parse::<ScalarKind>() {
                if field.required {
                    builder.field(field.name.clone(), kind)
                } else {
                    builder.optional(field.name.clone(), kind)
                }
            } else if definitions.contains_key(&field.type_name) {
                let nested = self.resolve(&field.type_name)?;
                builder.nested_descriptor(field.name.clone(), nested, field.required)
            } else {
                return Err(SchemaError::UnknownType {
                    schema: def.name.clone(),
                    field: field.name.clone(),
                    type_name: field.type_name.clone(),
                });
            };
        }

        self.visiting.pop();
        let descriptor = Arc::new(builder.build()?);
        self.resolved.insert(name.to_string(), descriptor.clone());
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldType;

    fn defs(json: serde_json::Value) -> Vec<SchemaDefinition> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn resolves_forward_references() {
        let set = SchemaSet::from_definitions(defs(serde_json::json!([
            {"name": "Resp", "fields": [
                {"name": "reply", "type": "string"},
                {"name": "req", "type": "Req", "required": false}
            ]},
            {"name": "Req", "fields": [
                {"name": "id", "type": "int"},
                {"name": "name", "type": "str"}
            ]}
        ])))
        .unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["Req", "Resp"]);
        let resp = set.get("Resp").unwrap();
        let req_field = resp.field("req").unwrap();
        assert!(!req_field.is_required());
        match req_field.ty() {
            FieldType::Schema(req) => assert!(Arc::ptr_eq(req, &set.get("Req").unwrap())),
            other => panic!("expected nested schema, got {other:?}"),
        }
        assert_eq!(
            set.get("Req").unwrap().field("id").unwrap().ty(),
            &FieldType::Scalar(ScalarKind::Integer)
        );
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = SchemaSet::from_definitions(defs(serde_json::json!([
            {"name": "Req", "fields": [{"name": "when", "type": "datetime"}]}
        ])))
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownType {
                schema: "Req".into(),
                field: "when".into(),
                type_name: "datetime".into()
            }
        );
    }

    #[test]
    fn cycles_are_rejected() {
        let err = SchemaSet::from_definitions(defs(serde_json::json!([
            {"name": "A", "fields": [{"name": "b", "type": "B"}]},
            {"name": "B", "fields": [{"name": "a", "type": "A", "required": false}]}
        ])))
        .unwrap_err();
        match err {
            SchemaError::Recursive { path, .. } => assert_eq!(path, vec!["A", "B", "A"]),
            other => panic!("expected recursion error, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_definitions_are_rejected() {
        let err = SchemaSet::from_definitions(defs(serde_json::json!([
            {"name": "A"},
            {"name": "A"}
        ])))
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateSchema("A".into()));
    }

    #[test]
    fn duplicate_fields_surface_from_the_builder() {
        let err = SchemaSet::from_definitions(defs(serde_json::json!([
            {"name": "A", "fields": [
                {"name": "x", "type": "bool"},
                {"name": "x", "type": "float"}
            ]}
        ])))
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }
}
