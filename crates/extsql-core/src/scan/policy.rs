use crate::{DEFAULT_BATCH_SIZE, types::ColumnMeta};

/// Row-batch target when a single row may carry an unbounded payload.
pub const LARGE_OBJECT_BATCH_SIZE: usize = 1;

/// Row-batch target for a projection.
///
/// Any large-object column forces one row per batch; the check stops at the
/// first such column.
#[must_use]
pub fn batch_size_for(columns: &[ColumnMeta]) -> usize {
    if columns
        .iter()
        .any(|column| column.column_type.is_large_object())
    {
        LARGE_OBJECT_BATCH_SIZE
    } else {
        DEFAULT_BATCH_SIZE
    }
}
