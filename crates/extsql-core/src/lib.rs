//! Core engine for extsql: predicate wire decoding, dialect-aware SQL
//! compilation, SELECT assembly, and the pull-based scan executor that runs the
//! assembled statement against a remote SQL source.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod error;
pub mod expr;
pub mod obs;
pub mod scan;
pub mod sql;
pub mod types;
pub mod value;
pub mod wire;

pub use error::{Error, ErrorStage};

///
/// CONSTANTS
///

/// Row-batch target used when no projected column forces a smaller one.
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// A single materialized batch at or above this size is logged as unusual.
pub const LARGE_BATCH_WARN_BYTES: u64 = 2 * 1024 * 1024 * 1024;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, drivers, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        expr::{ExprNode, Filter, OperatorKind},
        scan::ScanRequest,
        sql::{Dialect, Pushdown, SqlFragment},
        types::{ColumnType, DataType},
        value::Value,
        wire::WireNode,
    };
}
