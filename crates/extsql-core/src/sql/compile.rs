use crate::{
    expr::{ExprNode, Filter, OperatorKind},
    obs::{MetricsEvent, PushdownOutcome, sink::record},
    sql::{
        CompileError, Dialect,
        literal::{LiteralError, render_literal},
    },
    types::DataType,
};
use derive_more::{Deref, Display};
use std::{fmt::Write as _, sync::Arc};
use thiserror::Error as ThisError;
use tracing::{debug, warn};

///
/// SqlFragment
///
/// Boolean SQL expression for one accepted filter, ready to be joined into a
/// WHERE clause. May still contain `{N}` placeholder markers.
///

#[derive(Clone, Debug, Deref, Display, Eq, PartialEq)]
#[deref(forward)]
pub struct SqlFragment(String);

impl SqlFragment {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for SqlFragment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

///
/// DeclineReason
///
/// Why a recognised filter was not pushed down. Declining is not an error:
/// the host keeps evaluating the filter itself.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DeclineReason {
    #[error("operator '{0}' is not pushed down")]
    UnsupportedOperator(OperatorKind),

    #[error("operator '{op}' cannot take {found} children")]
    Arity { op: OperatorKind, found: usize },

    #[error(transparent)]
    Literal(#[from] LiteralError),

    #[error("placeholder {param_index} of type {declared_type} has no literal form")]
    PlaceholderType {
        declared_type: DataType,
        param_index: u64,
    },

    #[error("column name '{name}' is not a bare identifier")]
    Identifier { name: String },
}

///
/// Pushdown
///
/// Per-filter compilation result. Only `Accepted` filters are evaluated
/// remotely.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Pushdown {
    Accepted(SqlFragment),
    Declined(DeclineReason),
    Failed(CompileError),
}

impl Pushdown {
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    #[must_use]
    pub const fn fragment(&self) -> Option<&SqlFragment> {
        match self {
            Self::Accepted(fragment) => Some(fragment),
            Self::Declined(_) | Self::Failed(_) => None,
        }
    }

    /// Host-facing encoding: the fragment text, or the empty string when the
    /// filter stays with the host.
    #[must_use]
    pub fn to_wire(&self) -> String {
        self.fragment()
            .map(|fragment| fragment.as_str().to_string())
            .unwrap_or_default()
    }

    #[must_use]
    pub const fn outcome(&self) -> PushdownOutcome {
        match self {
            Self::Accepted(_) => PushdownOutcome::Accepted,
            Self::Declined(_) => PushdownOutcome::Declined,
            Self::Failed(_) => PushdownOutcome::Failed,
        }
    }
}

// Internal short-circuit carrier for one filter.
enum Reject {
    Declined(DeclineReason),
    Failed(CompileError),
}

impl From<DeclineReason> for Reject {
    fn from(reason: DeclineReason) -> Self {
        Self::Declined(reason)
    }
}

impl From<LiteralError> for Reject {
    fn from(err: LiteralError) -> Self {
        Self::Declined(DeclineReason::Literal(err))
    }
}

///
/// SqlCompiler
///
/// Compiles filters into boolean expressions of one dialect. Each filter is
/// compiled independently; declining one never affects its siblings.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct SqlCompiler {
    dialect: Dialect,
}

impl SqlCompiler {
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Compile every filter, preserving order.
    #[must_use]
    pub fn compile_all(&self, filters: &[Filter]) -> Vec<Pushdown> {
        filters.iter().map(|filter| self.compile(filter)).collect()
    }

    /// Compile one filter.
    #[must_use]
    pub fn compile(&self, filter: &Filter) -> Pushdown {
        let op = filter.operator();
        let mut out = String::new();

        let pushdown = match self.render(filter.root(), &mut out) {
            Ok(()) => {
                debug!(dialect = self.dialect.name(), %op, fragment = %out, "filter accepted");
                Pushdown::Accepted(SqlFragment(out))
            }
            Err(Reject::Declined(reason)) => {
                debug!(dialect = self.dialect.name(), %op, %reason, "filter declined");
                Pushdown::Declined(reason)
            }
            Err(Reject::Failed(err)) => {
                warn!(
                    dialect = self.dialect.name(),
                    %op,
                    error = %err,
                    "filter compilation failed"
                );
                Pushdown::Failed(err)
            }
        };

        record(MetricsEvent::Pushdown {
            outcome: pushdown.outcome(),
        });

        pushdown
    }

    fn render(&self, node: &ExprNode, out: &mut String) -> Result<(), Reject> {
        match node {
            ExprNode::ColumnRef { name } => {
                if !self.dialect.accepts_identifier(name) {
                    return Err(DeclineReason::Identifier { name: name.clone() }.into());
                }
                out.push_str(&self.dialect.quote_identifier(name));
            }
            ExprNode::ConstValue { value } => {
                out.push_str(&render_literal(value, self.dialect)?);
            }
            ExprNode::Placeholder {
                declared_type,
                param_index,
            } => {
                if !declared_type.has_literal_form() {
                    return Err(DeclineReason::PlaceholderType {
                        declared_type: *declared_type,
                        param_index: *param_index,
                    }
                    .into());
                }
                write!(out, "{{{param_index}}}").map_err(|_| {
                    Reject::Failed(CompileError::Format {
                        context: "placeholder marker",
                    })
                })?;
            }
            ExprNode::Predicate { op, children } => self.render_predicate(*op, children, out)?,
        }

        Ok(())
    }

    fn render_predicate(
        &self,
        op: OperatorKind,
        children: &[Arc<ExprNode>],
        out: &mut String,
    ) -> Result<(), Reject> {
        let arity = || DeclineReason::Arity {
            op,
            found: children.len(),
        };

        match op {
            OperatorKind::Invalid => return Err(DeclineReason::UnsupportedOperator(op).into()),

            OperatorKind::Between | OperatorKind::NotBetween => {
                let [target, lower, upper] = children else {
                    return Err(arity().into());
                };
                self.render_operand(target, out)?;
                out.push_str(if op == OperatorKind::Between {
                    " BETWEEN "
                } else {
                    " NOT BETWEEN "
                });
                self.render_operand(lower, out)?;
                out.push_str(" AND ");
                self.render_operand(upper, out)?;
            }

            OperatorKind::In | OperatorKind::NotIn => {
                let [first, rest @ ..] = children else {
                    return Err(arity().into());
                };
                if rest.is_empty() {
                    return Err(arity().into());
                }
                self.render_operand(first, out)?;
                out.push_str(if op == OperatorKind::In {
                    " IN ("
                } else {
                    " NOT IN ("
                });
                for (i, item) in rest.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.render_operand(item, out)?;
                }
                out.push(')');
            }

            OperatorKind::And | OperatorKind::Or => {
                if children.len() < 2 {
                    return Err(arity().into());
                }
                let separator = if op == OperatorKind::And {
                    " AND "
                } else {
                    " OR "
                };
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        out.push_str(separator);
                    }
                    out.push('(');
                    self.render(child, out)?;
                    out.push(')');
                }
            }

            OperatorKind::Not => {
                let [child] = children else {
                    return Err(arity().into());
                };
                out.push_str("NOT (");
                self.render(child, out)?;
                out.push(')');
            }

            OperatorKind::Like | OperatorKind::NotLike => match children {
                [left, right] => self.render_infix(op, left, right, out)?,
                [left, right, escape] => {
                    self.render_infix(op, left, right, out)?;
                    out.push_str(" ESCAPE ");
                    self.render_operand(escape, out)?;
                }
                _ => return Err(arity().into()),
            },

            OperatorKind::Equal
            | OperatorKind::NotEqual
            | OperatorKind::Less
            | OperatorKind::LessEqual
            | OperatorKind::Greater
            | OperatorKind::GreaterEqual
            | OperatorKind::Is
            | OperatorKind::IsNot => {
                let [left, right] = children else {
                    return Err(arity().into());
                };
                self.render_infix(op, left, right, out)?;
            }
        }

        Ok(())
    }

    fn render_infix(
        &self,
        op: OperatorKind,
        left: &ExprNode,
        right: &ExprNode,
        out: &mut String,
    ) -> Result<(), Reject> {
        let infix = infix_spelling(op).ok_or(DeclineReason::UnsupportedOperator(op))?;

        self.render_operand(left, out)?;
        out.push_str(infix);
        self.render_operand(right, out)
    }

    // Operands that are predicates are parenthesized so the remote parser
    // cannot rebind them to the surrounding operator.
    fn render_operand(&self, node: &ExprNode, out: &mut String) -> Result<(), Reject> {
        if node.is_predicate() {
            out.push('(');
            self.render(node, out)?;
            out.push(')');

            Ok(())
        } else {
            self.render(node, out)
        }
    }
}

// Spelling of each two-operand operator between its operands.
const fn infix_spelling(op: OperatorKind) -> Option<&'static str> {
    let infix = match op {
        OperatorKind::Equal => "=",
        OperatorKind::NotEqual => "<>",
        OperatorKind::Less => "<",
        OperatorKind::LessEqual => "<=",
        OperatorKind::Greater => ">",
        OperatorKind::GreaterEqual => ">=",
        OperatorKind::Is => " IS ",
        OperatorKind::IsNot => " IS NOT ",
        OperatorKind::Like => " LIKE ",
        OperatorKind::NotLike => " NOT LIKE ",
        _ => return None,
    };

    Some(infix)
}

/// Compile one filter for `dialect`.
#[must_use]
pub fn compile(filter: &Filter, dialect: Dialect) -> Pushdown {
    SqlCompiler::new(dialect).compile(filter)
}
