//! # Schema Descriptors
//!
//! Declarative description of a value's fields. A field is either one of
//! four scalar kinds or another descriptor, so descriptors form a finite
//! tree. Descriptors are built once at registration time and are immutable
//! afterwards; nested descriptors are shared through [`Arc`].
//!
//! ## Building
//!
//! Types that appear in endpoint signatures implement [`Schema`], usually
//! with a [`SchemaBuilder`]:
//!
//! ```
//! use srpc_schema::{ScalarKind, Schema, SchemaDescriptor, SchemaError};
//!
//! struct Req;
//!
//! impl Schema for Req {
//!     fn schema() -> Result<SchemaDescriptor, SchemaError> {
//!         SchemaDescriptor::builder("Req")
//!             .field("id", ScalarKind::Integer)
//!             .field("name", ScalarKind::String)
//!             .build()
//!     }
//! }
//!
//! let descriptor = srpc_schema::descriptor_of::<Req>().unwrap();
//! assert_eq!(descriptor.fields().len(), 2);
//! ```
//!
//! ## Recursion
//!
//! [`descriptor_of`] keeps a per-thread stack of the types whose
//! descriptors are under construction. A type that asks for its own
//! descriptor while it is on that stack fails with
//! [`SchemaError::Recursive`] instead of overflowing the stack.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::SchemaError;

/// Primitive value types usable as a field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Integer,
    String,
    Boolean,
    Float,
}

impl ScalarKind {
    /// All scalar kinds, in documentation order.
    pub const ALL: [ScalarKind; 4] = [
        ScalarKind::Integer,
        ScalarKind::String,
        ScalarKind::Boolean,
        ScalarKind::Float,
    ];

    /// Canonical name, as used in documentation output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Float => "float",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScalarKind {
    type Err = ();

    /// Accepts canonical names and the common short aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "integer" | "int" => Ok(Self::Integer),
            "string" | "str" => Ok(Self::String),
            "boolean" | "bool" => Ok(Self::Boolean),
            "float" | "number" => Ok(Self::Float),
            _ => Err(()),
        }
    }
}

/// Type of a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Scalar(ScalarKind),
    Schema(Arc<SchemaDescriptor>),
}

impl FieldType {
    /// Name of the type: the scalar kind name or the nested schema name.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Scalar(kind) => kind.as_str(),
            Self::Schema(schema) => schema.name(),
        }
    }
}

/// A named, typed field of a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    ty: FieldType,
    required: bool,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    /// Whether validation fails when the field is absent.
    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// Ordered field list describing one composite value.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    name: String,
    fields: Vec<Field>,
}

impl SchemaDescriptor {
    /// Start building a descriptor named `name`.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// Schema name; shown as the `type` of nested fields in documentation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Types that declare the shape of their JSON representation.
///
/// The descriptor must list the fields the type's `serde` representation
/// reads and writes. Validated input is deserialized into the type, so a
/// descriptor that disagrees with the type surfaces as an internal error
/// at request time.
pub trait Schema {
    fn schema() -> Result<SchemaDescriptor, SchemaError>;
}

thread_local! {
    static UNDER_CONSTRUCTION: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
}

/// Pops the type pushed by [`descriptor_of`], even on unwind.
struct ConstructionGuard;

impl Drop for ConstructionGuard {
    fn drop(&mut self) {
        UNDER_CONSTRUCTION.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Build the descriptor of `T`, detecting self-referential types.
pub fn descriptor_of<T: Schema + ?Sized>() -> Result<SchemaDescriptor, SchemaError> {
    let type_name = std::any::type_name::<T>();
    let cycle = UNDER_CONSTRUCTION.with(|stack| {
        let stack = stack.borrow();
        stack.iter().position(|t| *t == type_name).map(|start| {
            let mut path: Vec<String> = stack[start..].iter().map(|t| short_name(t)).collect();
            path.push(short_name(type_name));
            path
        })
    });
    if let Some(path) = cycle {
        return Err(SchemaError::Recursive {
            schema: short_name(type_name),
            path,
        });
    }

    UNDER_CONSTRUCTION.with(|stack| stack.borrow_mut().push(type_name));
    let _guard = ConstructionGuard;
    T::schema()
}

/// `my_crate::module::Type` -> `Type`.
fn short_name(type_name: &str) -> String {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// Chain of schema names from `descriptor` down to one named `name`.
fn path_to(descriptor: &SchemaDescriptor, name: &str) -> Option<Vec<String>> {
    if descriptor.name == name {
        return Some(vec![descriptor.name.clone()]);
    }
    descriptor.fields.iter().find_map(|field| match &field.ty {
        FieldType::Schema(nested) => path_to(nested, name).map(|mut path| {
            path.insert(0, descriptor.name.clone());
            path
        }),
        FieldType::Scalar(_) => None,
    })
}

/// Incremental builder for [`SchemaDescriptor`].
///
/// Errors are deferred: the first failure is remembered and returned by
/// [`SchemaBuilder::build`], so declarations can be chained.
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<Field>,
    seen: HashSet<String>,
    error: Option<SchemaError>,
}

impl SchemaBuilder {
    fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let error = name.is_empty().then(|| SchemaError::EmptyName {
            schema: String::new(),
        });
        Self {
            name,
            fields: Vec::new(),
            seen: HashSet::new(),
            error,
        }
    }

    /// Required scalar field.
    pub fn field(self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.push(name.into(), FieldType::Scalar(kind), true)
    }

    /// Optional scalar field: absent or `null` validates to `null`.
    pub fn optional(self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.push(name.into(), FieldType::Scalar(kind), false)
    }

    /// Required field whose type is the schema of `T`.
    pub fn nested<T: Schema + ?Sized>(self, name: impl Into<String>) -> Self {
        self.push_nested::<T>(name.into(), true)
    }

    /// Optional field whose type is the schema of `T`.
    pub fn optional_nested<T: Schema + ?Sized>(self, name: impl Into<String>) -> Self {
        self.push_nested::<T>(name.into(), false)
    }

    /// Field typed by an already-built descriptor.
    ///
    /// Fails with [`SchemaError::Recursive`] if the descriptor, or any
    /// schema nested in it, carries the name of the schema being built.
    pub fn nested_descriptor(
        mut self,
        name: impl Into<String>,
        descriptor: impl Into<Arc<SchemaDescriptor>>,
        required: bool,
    ) -> Self {
        let descriptor = descriptor.into();
        if self.error.is_none() {
            if let Some(mut path) = path_to(&descriptor, &self.name) {
                path.insert(0, self.name.clone());
                self.error = Some(SchemaError::Recursive {
                    schema: self.name.clone(),
                    path,
                });
                return self;
            }
        }
        self.push(name.into(), FieldType::Schema(descriptor), required)
    }

    /// Finish the descriptor, or return the first declaration error.
    pub fn build(self) -> Result<SchemaDescriptor, SchemaError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(SchemaDescriptor {
            name: self.name,
            fields: self.fields,
        })
    }

    fn push_nested<T: Schema + ?Sized>(mut self, name: String, required: bool) -> Self {
        if self.error.is_some() {
            return self;
        }
        match descriptor_of::<T>() {
            Ok(descriptor) => self.push(name, FieldType::Schema(Arc::new(descriptor)), required),
            Err(err) => {
                self.error = Some(err);
                self
            }
        }
    }

    fn push(mut self, name: String, ty: FieldType, required: bool) -> Self {
        if self.error.is_some() {
            return self;
        }
        if name.is_empty() {
            self.error = Some(SchemaError::EmptyName {
                schema: self.name.clone(),
            });
            return self;
        }
        if !self.seen.insert(name.clone()) {
            self.error = Some(SchemaError::DuplicateField {
                schema: self.name.clone(),
                field: name,
            });
            return self;
        }
        self.fields.push(Field { name, ty, required });
        self
    }
}
