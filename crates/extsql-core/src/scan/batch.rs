use crate::{types::DataType, value::Value};
use derive_more::{Add, AddAssign, Display, Sum};
use std::sync::Arc;

///
/// ByteCount
///
/// Materialized payload size. Reported for observability only.
///

#[derive(
    Add, AddAssign, Clone, Copy, Debug, Default, Display, Eq, Ord, PartialEq, PartialOrd, Sum,
)]
pub struct ByteCount(u64);

impl ByteCount {
    #[must_use]
    pub const fn new(bytes: u64) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

///
/// Field
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

///
/// Schema
///
/// Output columns of one scan, fixed for its whole lifetime.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    #[must_use]
    pub const fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

///
/// RecordBatch
///
/// Column-major block of rows sharing the scan schema.
///

#[derive(Clone, Debug, PartialEq)]
pub struct RecordBatch {
    schema: Arc<Schema>,
    columns: Vec<Vec<Value>>,
    num_rows: usize,
}

impl RecordBatch {
    // Callers guarantee one column per field, each `num_rows` long.
    pub(crate) const fn from_columns(
        schema: Arc<Schema>,
        columns: Vec<Vec<Value>>,
        num_rows: usize,
    ) -> Self {
        Self {
            schema,
            columns,
            num_rows,
        }
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub const fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[must_use]
    pub const fn num_columns(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn column(&self, index: usize) -> Option<&[Value]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    /// Row `index` rebuilt from the columns.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Vec<Value>> {
        if index >= self.num_rows {
            return None;
        }

        self.columns
            .iter()
            .map(|column| column.get(index).cloned())
            .collect()
    }

    /// Payload size of every value in the batch.
    #[must_use]
    pub fn byte_len(&self) -> ByteCount {
        self.columns
            .iter()
            .flatten()
            .map(|value| ByteCount::new(value.byte_len()))
            .sum()
    }
}
