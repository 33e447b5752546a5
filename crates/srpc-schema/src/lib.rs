//! # srpc-schema: Schema Descriptors & Validation
//!
//! Declares the shape of endpoint inputs and outputs and enforces it on
//! incoming JSON payloads.
//!
//! ## Descriptors (`descriptor`)
//!
//! A [`SchemaDescriptor`] is an ordered list of named fields, each either a
//! [`ScalarKind`] (integer, string, boolean, float) or a nested descriptor.
//! Rust types declare their descriptor by implementing [`Schema`], built
//! with [`SchemaBuilder`]. [`descriptor_of`] rejects self-referential types.
//!
//! ## Validation (`validate`)
//!
//! [`validate`] checks an untyped `serde_json::Value` against a descriptor,
//! coerces scalars permissively, drops undeclared fields, and reports all
//! failing fields at once as a [`ValidationFailure`].
//!
//! ## Definitions (`definition`)
//!
//! [`SchemaSet`] resolves schemas declared as data ([`SchemaDefinition`])
//! into descriptors, for endpoints configured from files.
//!
//! ## Crate Policy
//!
//! - No dependency on the HTTP layer.
//! - Descriptor construction errors ([`SchemaError`]) are startup errors;
//!   validation errors are per-request and never partial.

pub mod definition;
pub mod descriptor;
pub mod error;
pub mod validate;

pub use definition::{FieldDefinition, SchemaDefinition, SchemaSet};
pub use descriptor::{
    descriptor_of, Field, FieldType, ScalarKind, Schema, SchemaBuilder, SchemaDescriptor,
};
pub use error::SchemaError;
pub use validate::{
    coerce, validate, Expected, FailureKind, FieldError, Validated, ValidationFailure,
};
