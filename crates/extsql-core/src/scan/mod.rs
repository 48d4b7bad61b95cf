//! Module: scan
//! Responsibility: opening the assembled statement on a remote driver and
//! exposing its rows as a pull-based sequence of columnar batches.
//! Does not own: SQL text assembly (sql) or value-type mapping (types).

mod batch;
mod driver;
mod policy;
mod scanner;


use crate::value::Value;

pub use batch::{ByteCount, Field, RecordBatch, Schema};
pub use driver::{
    ConnectOptions, Connection, Cursor, Driver, DriverError, DriverErrorKind, Statement,
};
pub use policy::{LARGE_OBJECT_BATCH_SIZE, batch_size_for};
pub use scanner::{ScanError, ScanErrorKind, Scanner};

///
/// ScanRequest
///
/// Everything one scan needs: the table, the projected columns (empty means
/// a constant projection), the accepted filter fragments, and the runtime
/// values their placeholder markers refer to, by index.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanRequest {
    pub table: String,
    pub columns: Vec<String>,
    pub filters: Vec<String>,
    pub params: Vec<Value>,
}

impl ScanRequest {
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters = filters.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: impl IntoIterator<Item = Value>) -> Self {
        self.params = params.into_iter().collect();
        self
    }
}
