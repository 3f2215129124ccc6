//! Parameter value model.
//!
//! Fixture parameters are arbitrary nested JSON, but the shape is decided
//! once at load time: every node is a scalar, an ordered sequence, or an
//! ordered mapping. Downstream code (the flattener) matches on the variant
//! instead of re-inspecting dynamic types.
//!
//! Mapping entries keep their declaration order from the fixture file;
//! that order is what makes flattened output deterministic.

use indexmap::IndexMap;
use serde::Deserialize;

/// A nested parameter value from a fixture step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Scalar(Scalar),
    Sequence(Vec<ParamValue>),
    Mapping(IndexMap<String, ParamValue>),
}

/// A leaf value.
///
/// Variant order matters for untagged deserialization: whole JSON numbers
/// become `Int`, anything with a fractional part becomes `Float`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Null,
}
