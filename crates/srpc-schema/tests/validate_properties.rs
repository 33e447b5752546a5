//! # Validation Properties
//!
//! Property tests over the validator: conforming values round-trip, a
//! missing required field always fails naming that field, and undeclared
//! fields never reach the validated value.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use srpc_schema::{
    descriptor_of, validate, FailureKind, ScalarKind, Schema, SchemaDescriptor, SchemaError,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Sample {
    id: i64,
    name: String,
    active: bool,
    score: f64,
}

impl Schema for Sample {
    fn schema() -> Result<SchemaDescriptor, SchemaError> {
        SchemaDescriptor::builder("Sample")
            .field("id", ScalarKind::Integer)
            .field("name", ScalarKind::String)
            .field("active", ScalarKind::Boolean)
            .field("score", ScalarKind::Float)
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Wrapper {
    label: String,
    sample: Sample,
}

impl Schema for Wrapper {
    fn schema() -> Result<SchemaDescriptor, SchemaError> {
        SchemaDescriptor::builder("Wrapper")
            .field("label", ScalarKind::String)
            .nested::<Sample>("sample")
            .build()
    }
}

const SAMPLE_FIELDS: [&str; 4] = ["id", "name", "active", "score"];

fn sample() -> impl Strategy<Value = Sample> {
    (
        any::<i64>(),
        "[a-zA-Z0-9 _-]{0,24}",
        any::<bool>(),
        -1.0e12f64..1.0e12f64,
    )
        .prop_map(|(id, name, active, score)| Sample {
            id,
            name,
            active,
            score,
        })
}

fn wrapper() -> impl Strategy<Value = Wrapper> {
    ("[a-z]{0,12}", sample()).prop_map(|(label, sample)| Wrapper { label, sample })
}

proptest! {
    /// A value encoded from a conforming struct validates back to the same struct.
    #[test]
    fn conforming_values_round_trip(value in sample()) {
        let descriptor = descriptor_of::<Sample>().unwrap();
        let raw = serde_json::to_value(&value).unwrap();
        let validated = validate(&descriptor, &raw).unwrap();
        prop_assert_eq!(validated.deserialize::<Sample>().unwrap(), value);
    }

    /// Nested schemas round-trip the same way.
    #[test]
    fn nested_values_round_trip(value in wrapper()) {
        let descriptor = descriptor_of::<Wrapper>().unwrap();
        let raw = serde_json::to_value(&value).unwrap();
        let validated = validate(&descriptor, &raw).unwrap();
        prop_assert_eq!(validated.deserialize::<Wrapper>().unwrap(), value);
    }

    /// Removing any required field fails with MissingField naming it.
    #[test]
    fn missing_required_field_is_reported(value in sample(), idx in 0usize..SAMPLE_FIELDS.len()) {
        let descriptor = descriptor_of::<Sample>().unwrap();
        let mut raw = serde_json::to_value(&value).unwrap();
        let field = SAMPLE_FIELDS[idx];
        raw.as_object_mut().unwrap().remove(field);

        let failure = validate(&descriptor, &raw).unwrap_err();
        prop_assert!(failure.is_missing(field));
        prop_assert_eq!(failure.errors().len(), 1);
        prop_assert_eq!(failure.errors()[0].kind, FailureKind::MissingField);
    }

    /// Undeclared fields are accepted and dropped.
    #[test]
    fn extra_fields_are_ignored(
        value in sample(),
        extras in prop::collection::btree_map("x_[a-z]{1,8}", any::<i32>(), 1..6),
    ) {
        let descriptor = descriptor_of::<Sample>().unwrap();
        let mut raw = serde_json::to_value(&value).unwrap();
        let object = raw.as_object_mut().unwrap();
        for (k, v) in &extras {
            object.insert(k.clone(), Value::from(*v));
        }

        let validated = validate(&descriptor, &raw).unwrap();
        for k in extras.keys() {
            prop_assert!(validated.get(k).is_none());
        }
        prop_assert_eq!(validated.as_map().len(), SAMPLE_FIELDS.len());
        prop_assert_eq!(validated.deserialize::<Sample>().unwrap(), value);
    }
}
