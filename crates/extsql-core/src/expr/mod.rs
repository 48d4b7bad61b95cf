//! Module: expr
//! Responsibility: the closed predicate-tree model shared by decoding and
//! compilation.
//! Does not own: wire layout, SQL spelling, or arity policy beyond the
//! per-operator minimums the wire format guarantees.

mod operator;


use crate::{types::DataType, value::Value};
use derive_more::Deref;
use std::sync::Arc;
use thiserror::Error as ThisError;

pub use operator::OperatorKind;

///
/// ExprNode
///
/// One node of a predicate tree. Leaves reference a source column, carry a
/// literal, or stand in for a runtime parameter; internal nodes apply an
/// operator to an ordered child list.
///
/// Children are reference counted so a decoded tree can be shared by several
/// scans without copying. Trees are immutable once built.
///

#[derive(Clone, Debug, PartialEq)]
pub enum ExprNode {
    ColumnRef {
        name: String,
    },
    ConstValue {
        value: Value,
    },
    /// Value is supplied at execution time from the parameter store;
    /// only its declared type is known while compiling.
    Placeholder {
        declared_type: DataType,
        param_index: u64,
    },
    /// Child order is significant, e.g. `[target, lower, upper]` for BETWEEN.
    Predicate {
        op: OperatorKind,
        children: Vec<Arc<Self>>,
    },
}

impl ExprNode {
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::ColumnRef { name: name.into() }
    }

    #[must_use]
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::ConstValue {
            value: value.into(),
        }
    }

    #[must_use]
    pub const fn null() -> Self {
        Self::ConstValue { value: Value::Null }
    }

    #[must_use]
    pub const fn placeholder(declared_type: DataType, param_index: u64) -> Self {
        Self::Placeholder {
            declared_type,
            param_index,
        }
    }

    #[must_use]
    pub fn predicate(op: OperatorKind, children: impl IntoIterator<Item = Self>) -> Self {
        Self::Predicate {
            op,
            children: children.into_iter().map(Arc::new).collect(),
        }
    }

    #[must_use]
    pub fn equal(left: Self, right: Self) -> Self {
        Self::predicate(OperatorKind::Equal, [left, right])
    }

    #[must_use]
    pub fn and(children: impl IntoIterator<Item = Self>) -> Self {
        Self::predicate(OperatorKind::And, children)
    }

    #[must_use]
    pub fn or(children: impl IntoIterator<Item = Self>) -> Self {
        Self::predicate(OperatorKind::Or, children)
    }

    #[must_use]
    pub const fn is_predicate(&self) -> bool {
        matches!(self, Self::Predicate { .. })
    }

    /// Operator of an internal node; `None` for leaves.
    #[must_use]
    pub const fn op(&self) -> Option<OperatorKind> {
        match self {
            Self::Predicate { op, .. } => Some(*op),
            _ => None,
        }
    }

    /// Short label for diagnostics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ColumnRef { .. } => "column_ref",
            Self::ConstValue { .. } => "const_value",
            Self::Placeholder { .. } => "placeholder",
            Self::Predicate { op, .. } => op.wire_tag(),
        }
    }
}

///
/// Filter
///
/// One complete top-level predicate offered for pushdown. The root is always
/// a `Predicate` node; a bare leaf can never be a filter.
///

#[derive(Clone, Debug, Deref, PartialEq)]
#[deref(forward)]
pub struct Filter {
    root: Arc<ExprNode>,
}

impl Filter {
    /// Wrap a predicate tree as a filter.
    pub fn new(root: ExprNode) -> Result<Self, FilterRootError> {
        Self::from_shared(Arc::new(root))
    }

    /// Wrap an already shared predicate tree as a filter.
    pub fn from_shared(root: Arc<ExprNode>) -> Result<Self, FilterRootError> {
        if root.is_predicate() {
            Ok(Self { root })
        } else {
            Err(FilterRootError {
                label: root.label(),
            })
        }
    }

    #[must_use]
    pub fn root(&self) -> &ExprNode {
        &self.root
    }

    /// Operator at the root of this filter.
    #[must_use]
    pub fn operator(&self) -> OperatorKind {
        match self.root.as_ref() {
            ExprNode::Predicate { op, .. } => *op,
            // constructors reject non-predicate roots
            _ => OperatorKind::Invalid,
        }
    }
}

///
/// FilterRootError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("filter root must be a predicate, found {label}")]
pub struct FilterRootError {
    pub label: &'static str,
}
