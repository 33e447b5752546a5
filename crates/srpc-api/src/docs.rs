//! # Documentation Generator
//!
//! Serializes the frozen registry into a documentation tree:
//!
//! ```json
//! {
//!   "name": "typing",
//!   "endpoints": [
//!     {
//!       "rule": "/index.json",
//!       "description": "index",
//!       "parameters": [{"name": "id", "type": "integer"}, {"name": "name", "type": "string"}],
//!       "return": {"type": "Resp", "fields": [
//!         {"name": "reply", "type": "string"},
//!         {"name": "req", "type": "Req", "required": false, "fields": [...]}
//!       ]}
//!     }
//!   ]
//! }
//! ```
//!
//! Only endpoints bound through the registry appear. Routes added straight
//! to the router (health probes, metrics, the documentation route itself)
//! are not listed. Output depends only on the registry, so regenerating it
//! yields identical JSON.

use serde::{Deserialize, Serialize};
use srpc_schema::{Field, FieldType, SchemaDescriptor};

use crate::registry::{Binding, Registry};

/// Documentation for an application's bound endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentationTree {
    pub name: String,
    pub endpoints: Vec<EndpointDoc>,
}

/// One endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointDoc {
    pub rule: String,
    pub description: Option<String>,
    /// Fields of the input schema; empty when there is no input.
    pub parameters: Vec<FieldDoc>,
    #[serde(rename = "return")]
    pub returns: Option<SchemaDoc>,
}

/// A whole schema: its name and fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDoc {
    #[serde(rename = "type")]
    pub type_name: String,
    pub fields: Vec<FieldDoc>,
}

/// One field. Nested schemas carry their own `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "required_default", skip_serializing_if = "is_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldDoc>>,
}

fn required_default() -> bool {
    true
}

fn is_required(required: &bool) -> bool {
    *required
}

pub fn field_doc(field: &Field) -> FieldDoc {
    let fields = match field.ty() {
        FieldType::Scalar(_) => None,
        FieldType::Schema(nested) => Some(nested.fields().iter().map(field_doc).collect()),
    };
    FieldDoc {
        name: field.name().to_string(),
        type_name: field.ty().type_name().to_string(),
        required: field.is_required(),
        fields,
    }
}

pub fn schema_doc(schema: &SchemaDescriptor) -> SchemaDoc {
    SchemaDoc {
        type_name: schema.name().to_string(),
        fields: schema.fields().iter().map(field_doc).collect(),
    }
}

pub fn endpoint_doc(binding: &Binding) -> EndpointDoc {
    EndpointDoc {
        rule: binding.path().to_string(),
        description: binding.description().map(str::to_string),
        parameters: binding
            .input()
            .map(|input| input.fields().iter().map(field_doc).collect())
            .unwrap_or_default(),
        returns: binding.output().map(schema_doc),
    }
}

/// Document every bound endpoint, in registration order.
pub fn generate_docs(name: &str, registry: &Registry) -> DocumentationTree {
    DocumentationTree {
        name: name.to_string(),
        endpoints: registry.iter().map(|e| endpoint_doc(e.binding())).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::EndpointRegistry;
    use serde_json::{json, Value};
    use srpc_schema::ScalarKind;
    use std::convert::Infallible;

    fn req() -> SchemaDescriptor {
        SchemaDescriptor::builder("Req")
            .field("id", ScalarKind::Integer)
            .field("name", ScalarKind::String)
            .build()
            .unwrap()
    }

    fn resp() -> SchemaDescriptor {
        SchemaDescriptor::builder("Resp")
            .field("reply", ScalarKind::String)
            .nested_descriptor("req", req(), false)
            .build()
            .unwrap()
    }

    async fn nothing(_: Option<Value>) -> Result<Value, Infallible> {
        Ok(Value::Null)
    }

    fn registry() -> Registry {
        let mut registry = EndpointRegistry::new();
        registry
            .bind(
                Binding::new("/index.json")
                    .with_description(Some("index"))
                    .with_input(req())
                    .with_output(resp()),
                nothing,
            )
            .bind(
                Binding::new("/ddd")
                    .with_description(Some("doc"))
                    .with_output(resp()),
                nothing,
            )
            .bind(Binding::new("/bare"), nothing);
        registry.freeze()
    }

    #[test]
    fn scalar_field_shape() {
        let doc = field_doc(&req().fields()[0]);
        assert_eq!(
            serde_json::to_value(doc).unwrap(),
            json!({"name": "id", "type": "integer"})
        );
    }

    #[test]
    fn nested_field_expands_recursively() {
        let schema = resp();
        let doc = field_doc(schema.field("req").unwrap());
        assert_eq!(
            serde_json::to_value(doc).unwrap(),
            json!({
                "name": "req",
                "type": "Req",
                "required": false,
                "fields": [
                    {"name": "id", "type": "integer"},
                    {"name": "name", "type": "string"}
                ]
            })
        );
    }

    #[test]
    fn tree_lists_endpoints_in_registration_order() {
        let tree = generate_docs("typing", &registry());
        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(value["name"], "typing");
        let rules: Vec<&str> = tree.endpoints.iter().map(|e| e.rule.as_str()).collect();
        assert_eq!(rules, vec!["/index.json", "/ddd", "/bare"]);

        let index = &value["endpoints"][0];
        assert_eq!(index["description"], "index");
        assert_eq!(
            index["parameters"],
            json!([{"name": "id", "type": "integer"}, {"name": "name", "type": "string"}])
        );
        assert_eq!(index["return"]["type"], "Resp");
        assert_eq!(index["return"]["fields"][1]["fields"][0]["name"], "id");

        let ddd = &value["endpoints"][1];
        assert_eq!(ddd["parameters"], json!([]));

        let bare = &value["endpoints"][2];
        assert_eq!(bare["description"], Value::Null);
        assert_eq!(bare["return"], Value::Null);
    }

    #[test]
    fn regeneration_is_stable() {
        let registry = registry();
        let a = serde_json::to_string(&generate_docs("app", &registry)).unwrap();
        let b = serde_json::to_string(&generate_docs("app", &registry)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn tree_round_trips_through_json() {
        let tree = generate_docs("app", &registry());
        let text = serde_json::to_string(&tree).unwrap();
        let back: DocumentationTree = serde_json::from_str(&text).unwrap();
        assert_eq!(back, tree);
    }
}
