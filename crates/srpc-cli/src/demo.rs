//! # Demo Endpoints
//!
//! Two endpoints that exercise both binding forms:
//!
//! - `index(Req) -> Resp` at `/index.json`
//! - `doc() -> Resp` at `/ddd`

use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use srpc_api::EndpointRegistry;
use srpc_schema::{ScalarKind, Schema, SchemaDescriptor, SchemaError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Req {
    pub id: i64,
    pub name: String,
}

impl Schema for Req {
    fn schema() -> Result<SchemaDescriptor, SchemaError> {
        SchemaDescriptor::builder("Req")
            .field("id", ScalarKind::Integer)
            .field("name", ScalarKind::String)
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resp {
    pub reply: String,
    pub req: Option<Req>,
}

impl Schema for Resp {
    fn schema() -> Result<SchemaDescriptor, SchemaError> {
        SchemaDescriptor::builder("Resp")
            .field("reply", ScalarKind::String)
            .optional_nested::<Req>("req")
            .build()
    }
}

pub async fn index(_req: Req) -> Result<Resp, Infallible> {
    Ok(Resp {
        reply: "1".to_string(),
        req: None,
    })
}

pub async fn doc() -> Result<Resp, Infallible> {
    Ok(Resp {
        reply: "1".to_string(),
        req: None,
    })
}

pub fn register(registry: &mut EndpointRegistry) -> Result<(), SchemaError> {
    registry
        .rpc("index", Some("index"), index)?
        .rpc_unit_route("/ddd", Some("doc"), doc)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use srpc_schema::descriptor_of;

    #[test]
    fn resp_nests_req_optionally() {
        let resp = descriptor_of::<Resp>().unwrap();
        let req = resp.field("req").unwrap();
        assert!(!req.is_required());
        assert_eq!(req.ty().type_name(), "Req");
    }

    #[test]
    fn register_binds_both_paths_in_order() {
        let mut registry = EndpointRegistry::new();
        register(&mut registry).unwrap();
        let frozen = registry.freeze();
        let paths: Vec<&str> = frozen.iter().map(|e| e.binding().path()).collect();
        assert_eq!(paths, vec!["/index.json", "/ddd"]);
    }
}
