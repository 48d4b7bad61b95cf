//! Module: wire
//! Responsibility: the flat node-stream vocabulary exchanged with the host and
//! its single-pass reconstruction into filters.
//! Does not own: the columnar transport that carries the nodes, or any SQL
//! rendering.

mod decode;

#[cfg(test)]
mod tests;

use crate::{expr::OperatorKind, types::DataType, value::Value};

pub use decode::{DecodeError, DecodeErrorKind, FilterDecoder, decode};

///
/// CONSTANTS
///
/// Leaf and sentinel tags. Operator tags live on `OperatorKind`.
///

pub const COLUMN_REF_TAG: &str = "column_ref";
pub const CONST_VALUE_TAG: &str = "const_value";
pub const PLACEHOLDER_TAG: &str = "question_mark";
pub const NULL_TAG: &str = "null";
pub const END_OF_FILTER_TAG: &str = "filter";

///
/// WireNode
///
/// One tagged node of the host's flattened predicate stream.
///

#[derive(Clone, Debug, PartialEq)]
pub struct WireNode {
    pub tag: String,
    pub payload: WirePayload,
}

impl WireNode {
    #[must_use]
    pub fn new(tag: impl Into<String>, payload: WirePayload) -> Self {
        Self {
            tag: tag.into(),
            payload,
        }
    }

    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::new(COLUMN_REF_TAG, WirePayload::Scalar(Value::Text(name.into())))
    }

    #[must_use]
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::new(CONST_VALUE_TAG, WirePayload::Scalar(value.into()))
    }

    #[must_use]
    pub fn null() -> Self {
        Self::new(NULL_TAG, WirePayload::Empty)
    }

    #[must_use]
    pub fn placeholder(value_type: DataType, index: i64) -> Self {
        Self::new(PLACEHOLDER_TAG, WirePayload::Placeholder { value_type, index })
    }

    #[must_use]
    pub fn operator(op: OperatorKind, indices: impl IntoIterator<Item = i32>) -> Self {
        Self::new(
            op.wire_tag(),
            WirePayload::Indices(indices.into_iter().collect()),
        )
    }

    #[must_use]
    pub fn end_of_filter() -> Self {
        Self::new(END_OF_FILTER_TAG, WirePayload::Empty)
    }
}

///
/// WirePayload
///
/// The single value a wire node carries. Which shape is legal depends on the
/// node's tag.
///

#[derive(Clone, Debug, PartialEq)]
pub enum WirePayload {
    Empty,
    /// Backward indices into the nodes decoded so far for the current filter.
    Indices(Vec<i32>),
    /// Declared type of the runtime value and its slot in the parameter store.
    Placeholder {
        value_type: DataType,
        index: i64,
    },
    Scalar(Value),
}

impl WirePayload {
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Indices(_) => "index list",
            Self::Placeholder { .. } => "placeholder pair",
            Self::Scalar(_) => "scalar",
        }
    }
}

///
/// NodeTag
///
/// Resolved meaning of a wire tag string.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NodeTag {
    ColumnRef,
    ConstValue,
    EndOfFilter,
    Null,
    Operator(OperatorKind),
    Placeholder,
}

impl NodeTag {
    /// Resolve a tag string; `None` means the tag is outside the vocabulary.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        let resolved = match tag {
            COLUMN_REF_TAG => Self::ColumnRef,
            CONST_VALUE_TAG => Self::ConstValue,
            PLACEHOLDER_TAG => Self::Placeholder,
            NULL_TAG => Self::Null,
            END_OF_FILTER_TAG => Self::EndOfFilter,
            other => Self::Operator(OperatorKind::from_wire_tag(other)?),
        };

        Some(resolved)
    }
}
