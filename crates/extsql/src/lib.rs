//! ## Crate layout
//! - `core`: wire decoding, SQL compilation, query assembly, scanning, and
//!   observability.
//! - `error`: the public error type with a stable kind taxonomy.
//! - `registry`: plugin lookup from host properties.
//! - `request`: host scan parameters.
//! - `source`: the data source surface and its plugins.
//!
//! The `prelude` module carries the types a host adaptor touches per call.

pub use extsql_core as core;

pub mod error;
pub mod registry;
pub mod request;
pub mod source;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{Error, ErrorKind};
pub use registry::{create_data_source, plugin_names};
pub use request::scan_request_from_json;
pub use source::DataSource;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        core::{
            config::{Properties, SourceConfig},
            expr::{ExprNode, Filter, OperatorKind},
            scan::{RecordBatch, ScanRequest, Scanner},
            sql::{Dialect, Pushdown, SqlFragment},
            value::Value,
            wire::WireNode,
        },
        registry::create_data_source,
        source::DataSource,
    };
}
