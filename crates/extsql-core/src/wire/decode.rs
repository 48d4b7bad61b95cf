use crate::{
    expr::{ExprNode, Filter, OperatorKind},
    wire::{NodeTag, WireNode, WirePayload},
};
use std::{fmt, sync::Arc};
use thiserror::Error as ThisError;
use tracing::debug;

///
/// DecodeError
///
/// Malformed wire stream. Fatal to the whole decode call; the same stream will
/// fail the same way if retried.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DecodeError {
    #[error("node {position}: unknown wire tag '{tag}'")]
    UnknownTag { position: usize, tag: String },

    #[error("node {position}: tag '{tag}' expects a {expected} payload, found {found}")]
    PayloadMismatch {
        position: usize,
        tag: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("node {position}: column reference must be text, found {found}")]
    ColumnNameNotText { position: usize, found: &'static str },

    #[error("node {position}: placeholder index {index} is negative")]
    NegativePlaceholderIndex { position: usize, index: i64 },

    #[error("node {position}: child index {index} out of range for {len} decoded nodes")]
    ChildIndexOutOfRange {
        position: usize,
        index: i32,
        len: usize,
    },

    #[error("node {position}: '{op}' needs at least {expected} children, found {found}")]
    ArityBelowMinimum {
        position: usize,
        op: OperatorKind,
        expected: usize,
        found: usize,
    },

    #[error("node {position}: end of filter with no decoded nodes")]
    EmptyFilter { position: usize },

    #[error("node {position}: filter root must be a predicate, found {label}")]
    RootNotPredicate {
        position: usize,
        label: &'static str,
    },

    #[error("stream ended with {pending} nodes outside a terminated filter")]
    Unterminated { pending: usize },
}

impl DecodeError {
    /// Return a stable error kind independent of message text.
    #[must_use]
    pub const fn kind(&self) -> DecodeErrorKind {
        match self {
            Self::UnknownTag { .. } => DecodeErrorKind::UnknownTag,
            Self::PayloadMismatch { .. } | Self::ColumnNameNotText { .. } => {
                DecodeErrorKind::PayloadMismatch
            }
            Self::NegativePlaceholderIndex { .. } | Self::ChildIndexOutOfRange { .. } => {
                DecodeErrorKind::IndexOutOfRange
            }
            Self::ArityBelowMinimum { .. } => DecodeErrorKind::Arity,
            Self::EmptyFilter { .. } | Self::RootNotPredicate { .. } => {
                DecodeErrorKind::MalformedFilter
            }
            Self::Unterminated { .. } => DecodeErrorKind::Unterminated,
        }
    }
}

///
/// DecodeErrorKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeErrorKind {
    Arity,
    IndexOutOfRange,
    MalformedFilter,
    PayloadMismatch,
    UnknownTag,
    Unterminated,
}

impl DecodeErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arity => "arity",
            Self::IndexOutOfRange => "index_out_of_range",
            Self::MalformedFilter => "malformed_filter",
            Self::PayloadMismatch => "payload_mismatch",
            Self::UnknownTag => "unknown_tag",
            Self::Unterminated => "unterminated",
        }
    }
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// FilterDecoder
///
/// Incremental decoder over one wire stream. Nodes are fed in stream order;
/// each end-of-filter sentinel yields one completed filter.
///
/// Operator nodes refer to children by position in the buffer of nodes decoded
/// since the last sentinel. The host emits children before parents, so every
/// reference points backwards and one left-to-right pass suffices.
///

#[derive(Debug, Default)]
pub struct FilterDecoder {
    buffer: Vec<Arc<ExprNode>>,
    position: usize,
}

impl FilterDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next node. Returns a filter when `node` closes one.
    pub fn push(&mut self, node: &WireNode) -> Result<Option<Filter>, DecodeError> {
        let position = self.position;
        self.position += 1;

        let tag = NodeTag::parse(&node.tag).ok_or_else(|| DecodeError::UnknownTag {
            position,
            tag: node.tag.clone(),
        })?;

        if tag == NodeTag::EndOfFilter {
            return self.close_filter(position).map(Some);
        }

        let expr = self.decode_node(position, tag, node)?;
        self.buffer.push(Arc::new(expr));

        Ok(None)
    }

    /// End the stream. Every filter must have been closed by its sentinel.
    pub fn finish(self) -> Result<(), DecodeError> {
        if self.buffer.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::Unterminated {
                pending: self.buffer.len(),
            })
        }
    }

    // Move the last decoded node out as a filter and reset the buffer.
    fn close_filter(&mut self, position: usize) -> Result<Filter, DecodeError> {
        let root = self
            .buffer
            .pop()
            .ok_or(DecodeError::EmptyFilter { position })?;
        self.buffer.clear();

        Filter::from_shared(root).map_err(|err| DecodeError::RootNotPredicate {
            position,
            label: err.label,
        })
    }

    fn decode_node(
        &self,
        position: usize,
        tag: NodeTag,
        node: &WireNode,
    ) -> Result<ExprNode, DecodeError> {
        match (tag, &node.payload) {
            (NodeTag::Null, _) => Ok(ExprNode::null()),

            (NodeTag::ColumnRef, WirePayload::Scalar(value)) => value
                .as_text()
                .map(ExprNode::column)
                .ok_or_else(|| DecodeError::ColumnNameNotText {
                    position,
                    found: value.kind().label(),
                }),

            (NodeTag::ConstValue, WirePayload::Scalar(value)) => Ok(ExprNode::ConstValue {
                value: value.clone(),
            }),

            (NodeTag::Placeholder, WirePayload::Placeholder { value_type, index }) => {
                let param_index = u64::try_from(*index).map_err(|_| {
                    DecodeError::NegativePlaceholderIndex {
                        position,
                        index: *index,
                    }
                })?;

                Ok(ExprNode::placeholder(*value_type, param_index))
            }

            (NodeTag::Operator(op), WirePayload::Indices(indices)) => {
                self.decode_predicate(position, op, indices)
            }

            (tag, payload) => Err(DecodeError::PayloadMismatch {
                position,
                tag: node.tag.clone(),
                expected: expected_shape(tag),
                found: payload.shape(),
            }),
        }
    }

    // Resolve backward references against the buffer as it is right now.
    fn decode_predicate(
        &self,
        position: usize,
        op: OperatorKind,
        indices: &[i32],
    ) -> Result<ExprNode, DecodeError> {
        if indices.len() < op.min_arity() {
            return Err(DecodeError::ArityBelowMinimum {
                position,
                op,
                expected: op.min_arity(),
                found: indices.len(),
            });
        }

        let children = indices
            .iter()
            .map(|&index| {
                usize::try_from(index)
                    .ok()
                    .and_then(|slot| self.buffer.get(slot))
                    .cloned()
                    .ok_or(DecodeError::ChildIndexOutOfRange {
                        position,
                        index,
                        len: self.buffer.len(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ExprNode::Predicate { op, children })
    }
}

// Payload shape each tag requires, for diagnostics.
const fn expected_shape(tag: NodeTag) -> &'static str {
    match tag {
        NodeTag::ColumnRef | NodeTag::ConstValue => "scalar",
        NodeTag::Placeholder => "placeholder pair",
        NodeTag::Operator(_) => "index list",
        NodeTag::Null | NodeTag::EndOfFilter => "empty",
    }
}

/// Decode a complete wire stream into its filters, in stream order.
pub fn decode<'a>(
    nodes: impl IntoIterator<Item = &'a WireNode>,
) -> Result<Vec<Filter>, DecodeError> {
    let mut decoder = FilterDecoder::new();
    let mut filters = Vec::new();

    for node in nodes {
        if let Some(filter) = decoder.push(node)? {
            filters.push(filter);
        }
    }
    decoder.finish()?;

    debug!(filters = filters.len(), "decoded filter stream");

    Ok(filters)
}
