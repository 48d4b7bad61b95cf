//! Module: sql
//! Responsibility: dialect rules, literal rendering, filter compilation,
//! placeholder binding and SELECT assembly.
//! Does not own: wire decoding or statement execution.

mod bind;
mod builder;
mod compile;
mod dialect;
mod literal;

#[cfg(test)]
mod tests;

use std::fmt;
use thiserror::Error as ThisError;

pub use bind::{bind_placeholders, has_top_level_or};
pub use builder::{QueryBuilder, QueryError, QueryErrorKind};
pub use compile::{DeclineReason, Pushdown, SqlCompiler, SqlFragment, compile};
pub use dialect::Dialect;
pub use literal::{LiteralError, render_literal};

///
/// CompileError
///
/// Hard failure while assembling one fragment. Affects only the filter or
/// statement being assembled, never its siblings.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CompileError {
    #[error("failed to format {context}")]
    Format { context: &'static str },

    #[error("placeholder {index} has no bound parameter ({available} supplied)")]
    MissingParameter { index: u64, available: usize },

    #[error("parameter {index} cannot be rendered: {source}")]
    UnrenderableParameter { index: u64, source: LiteralError },

    #[error("malformed placeholder marker at byte {offset}")]
    MalformedMarker { offset: usize },

    #[error("unterminated quoted section starting at byte {offset}")]
    UnterminatedQuote { offset: usize },
}

impl CompileError {
    #[must_use]
    pub const fn kind(&self) -> CompileErrorKind {
        match self {
            Self::Format { .. } => CompileErrorKind::Format,
            Self::MissingParameter { .. } => CompileErrorKind::MissingParameter,
            Self::UnrenderableParameter { .. } => CompileErrorKind::UnrenderableParameter,
            Self::MalformedMarker { .. } => CompileErrorKind::MalformedMarker,
            Self::UnterminatedQuote { .. } => CompileErrorKind::UnterminatedQuote,
        }
    }
}

///
/// CompileErrorKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompileErrorKind {
    Format,
    MissingParameter,
    UnrenderableParameter,
    MalformedMarker,
    UnterminatedQuote,
}

impl CompileErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::MissingParameter => "missing_parameter",
            Self::UnrenderableParameter => "unrenderable_parameter",
            Self::MalformedMarker => "malformed_marker",
            Self::UnterminatedQuote => "unterminated_quote",
        }
    }
}

impl fmt::Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
