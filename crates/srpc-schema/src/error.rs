//! # Schema Errors
//!
//! Startup-time failures raised while building a [`SchemaDescriptor`].
//! These are configuration errors: an endpoint whose schema cannot be
//! built must not be registered.
//!
//! [`SchemaDescriptor`]: crate::SchemaDescriptor

use thiserror::Error;

/// Error building a schema descriptor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two fields of one schema share a name.
    #[error("schema '{schema}' declares field '{field}' more than once")]
    DuplicateField {
        /// Schema being built.
        schema: String,
        /// The repeated field name.
        field: String,
    },

    /// A schema or field was declared with an empty name.
    #[error("schema '{schema}' has an empty schema or field name")]
    EmptyName {
        /// Schema being built (may itself be empty).
        schema: String,
    },

    /// A schema references itself, directly or through other schemas.
    #[error("schema '{schema}' is recursive: {}", path.join(" -> "))]
    Recursive {
        /// Schema at which the cycle was detected.
        schema: String,
        /// Chain of schema names forming the cycle.
        path: Vec<String>,
    },

    /// A field type is neither a scalar kind nor a known schema.
    #[error("field '{field}' of schema '{schema}' has unknown type '{type_name}'")]
    UnknownType {
        /// Schema containing the field.
        schema: String,
        /// Field with the unresolvable type.
        field: String,
        /// The declared type name.
        type_name: String,
    },

    /// Two definitions in one set share a schema name.
    #[error("schema '{0}' is defined more than once")]
    DuplicateSchema(String),
}
