use crate::{
    LARGE_BATCH_WARN_BYTES,
    obs::{MetricsEvent, sink::record},
    scan::{
        ScanRequest,
        batch::{ByteCount, Field, RecordBatch, Schema},
        driver::{ConnectOptions, Connection, Cursor, Driver, DriverError, Statement},
        policy::batch_size_for,
    },
    sql::{QueryBuilder, QueryError},
    types::{ColumnMeta, ColumnType, DataType, conform_value, output_type},
    value::{Value, ValueKind},
};
use std::{fmt, sync::Arc};
use thiserror::Error as ThisError;
use tracing::{debug, info, warn};

type CursorOf<C> = <<C as Connection>::Statement as Statement>::Cursor;

///
/// ScanError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ScanError {
    #[error("failed to build scan statement: {0}")]
    Query(#[from] QueryError),

    #[error("failed to open remote cursor: {source}")]
    Open { source: DriverError },

    #[error("failed to fetch from remote cursor: {source}")]
    Fetch { source: DriverError },

    #[error("column '{name}' has unsupported remote type {column_type:?}")]
    UnsupportedColumn {
        name: String,
        column_type: ColumnType,
    },

    #[error("row has {found} values, schema has {expected} columns")]
    RowWidth { expected: usize, found: usize },

    #[error("column '{column}' cannot hold a {kind} value as {data_type}")]
    Conversion {
        column: String,
        kind: ValueKind,
        data_type: DataType,
    },

    #[error("failed to release remote resources: {source}")]
    Close { source: DriverError },
}

impl ScanError {
    #[must_use]
    pub const fn kind(&self) -> ScanErrorKind {
        match self {
            Self::Query(_) => ScanErrorKind::Query,
            Self::Open { .. } | Self::Fetch { .. } => ScanErrorKind::Execution,
            Self::UnsupportedColumn { .. } | Self::RowWidth { .. } | Self::Conversion { .. } => {
                ScanErrorKind::Schema
            }
            Self::Close { .. } => ScanErrorKind::Close,
        }
    }
}

///
/// ScanErrorKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScanErrorKind {
    Query,
    Execution,
    Schema,
    Close,
}

impl ScanErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Execution => "execution",
            Self::Schema => "schema",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for ScanErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// Resources
///
/// Remote handles owned by one scan, released cursor first, connection last.
///

struct Resources<C: Connection> {
    connection: Option<C>,
    statement: Option<C::Statement>,
    cursor: Option<CursorOf<C>>,
}

impl<C: Connection> Resources<C> {
    const fn empty() -> Self {
        Self {
            connection: None,
            statement: None,
            cursor: None,
        }
    }

    fn acquire<D>(
        &mut self,
        driver: &D,
        options: &ConnectOptions,
        sql: &str,
    ) -> Result<Vec<ColumnMeta>, DriverError>
    where
        D: Driver<Connection = C>,
    {
        let connection = self.connection.insert(driver.connect(options)?);
        let statement = self.statement.insert(connection.create_statement()?);
        let cursor = self.cursor.insert(statement.execute_query(sql)?);

        Ok(cursor.columns().to_vec())
    }

    const fn is_released(&self) -> bool {
        self.connection.is_none() && self.statement.is_none() && self.cursor.is_none()
    }

    // Every handle is attempted even when an earlier one fails; the first
    // failure is returned.
    fn release(&mut self) -> Result<(), DriverError> {
        let mut first_error = None;

        if let Some(mut cursor) = self.cursor.take()
            && !cursor.is_closed()
            && let Err(err) = cursor.close()
        {
            first_error.get_or_insert(err);
        }
        if let Some(mut statement) = self.statement.take()
            && !statement.is_closed()
            && let Err(err) = statement.close()
        {
            first_error.get_or_insert(err);
        }
        if let Some(mut connection) = self.connection.take()
            && !connection.is_closed()
            && let Err(err) = connection.close()
        {
            first_error.get_or_insert(err);
        }

        first_error.map_or(Ok(()), Err)
    }
}

///
/// Scanner
///
/// Pull-based batch sequence over one remote query. The next batch is fetched
/// only when requested. Exhaustion, a fetch failure, `close`, or drop release
/// the cursor, statement and connection exactly once.
///

pub struct Scanner<C: Connection> {
    table: String,
    sql: String,
    schema: Arc<Schema>,
    batch_size: usize,
    resources: Resources<C>,
    bytes_read: ByteCount,
    rows_read: u64,
    drained: bool,
    finished: bool,
}

impl<C: Connection> Scanner<C> {
    /// Build the statement for `request`, open the remote cursor, and fix the
    /// output schema and batch size from the cursor's metadata.
    ///
    /// On any failure every handle acquired so far is released before the
    /// error is returned.
    pub fn open<D>(
        driver: &D,
        options: &ConnectOptions,
        builder: QueryBuilder,
        request: &ScanRequest,
    ) -> Result<Self, ScanError>
    where
        D: Driver<Connection = C>,
    {
        let sql = builder.build_bound(
            &request.table,
            &request.columns,
            &request.filters,
            &request.params,
        )?;
        info!(table = %request.table, %sql, "remote query");

        let mut resources = Resources::empty();
        let opened = resources
            .acquire(driver, options, &sql)
            .map_err(|source| ScanError::Open { source })
            .and_then(|columns| Self::output_schema(&columns).map(|schema| (columns, schema)));

        let (columns, schema) = match opened {
            Ok(opened) => opened,
            Err(err) => {
                warn!(table = %request.table, error = %err, "scan open failed");
                record(MetricsEvent::ScanFailed {
                    table: &request.table,
                });
                if let Err(close_err) = resources.release() {
                    warn!(
                        table = %request.table,
                        error = %close_err,
                        "release after open failure failed"
                    );
                }

                return Err(err);
            }
        };

        let batch_size = batch_size_for(&columns);
        info!(table = %request.table, batch_size, "scan opened");
        record(MetricsEvent::ScanOpened {
            table: &request.table,
            batch_size,
        });

        Ok(Self {
            table: request.table.clone(),
            sql,
            schema: Arc::new(schema),
            batch_size,
            resources,
            bytes_read: ByteCount::default(),
            rows_read: 0,
            drained: false,
            finished: false,
        })
    }

    fn output_schema(columns: &[ColumnMeta]) -> Result<Schema, ScanError> {
        let fields = columns
            .iter()
            .map(|meta| {
                output_type(meta)
                    .map(|data_type| Field {
                        name: meta.name.clone(),
                        data_type,
                        nullable: meta.nullable,
                    })
                    .ok_or_else(|| ScanError::UnsupportedColumn {
                        name: meta.name.clone(),
                        column_type: meta.column_type,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Schema::new(fields))
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The statement sent to the remote source.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Output schema, available before the first batch.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Cumulative payload bytes materialized so far.
    #[must_use]
    pub const fn bytes_read(&self) -> ByteCount {
        self.bytes_read
    }

    #[must_use]
    pub const fn rows_read(&self) -> u64 {
        self.rows_read
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.resources.is_released()
    }

    /// Release the cursor, statement and connection. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<(), ScanError> {
        self.finished = true;
        if self.resources.is_released() {
            return Ok(());
        }

        let result = self.resources.release();
        record(MetricsEvent::ScanClosed { table: &self.table });
        debug!(table = %self.table, rows = self.rows_read, bytes = %self.bytes_read, "scan closed");

        result.map_err(|source| ScanError::Close { source })
    }

    fn close_logged(&mut self) {
        if let Err(err) = self.close() {
            warn!(table = %self.table, error = %err, "scan close failed");
        }
    }

    fn fetch_batch(&mut self) -> Result<Option<RecordBatch>, ScanError> {
        if self.drained {
            return Ok(None);
        }
        let Some(cursor) = self.resources.cursor.as_mut() else {
            return Ok(None);
        };

        let mut rows = Vec::with_capacity(self.batch_size);
        while rows.len() < self.batch_size {
            match cursor
                .next_row()
                .map_err(|source| ScanError::Fetch { source })?
            {
                Some(row) => rows.push(row),
                None => {
                    self.drained = true;
                    break;
                }
            }
        }

        if rows.is_empty() {
            return Ok(None);
        }

        let batch = self.assemble(rows)?;
        let bytes = batch.byte_len();
        let row_count = u64::try_from(batch.num_rows()).unwrap_or(u64::MAX);

        self.bytes_read += bytes;
        self.rows_read = self.rows_read.saturating_add(row_count);

        if bytes.get() >= LARGE_BATCH_WARN_BYTES {
            warn!(table = %self.table, %bytes, "single batch of at least 2 GiB");
        }
        record(MetricsEvent::BatchFetched {
            table: &self.table,
            rows: row_count,
            bytes: bytes.get(),
        });

        Ok(Some(batch))
    }

    // Transpose driver rows into columns, conforming each value to its field.
    fn assemble(&self, rows: Vec<Vec<Value>>) -> Result<RecordBatch, ScanError> {
        let fields = self.schema.fields();
        let num_rows = rows.len();
        let mut columns: Vec<Vec<Value>> = fields
            .iter()
            .map(|_| Vec::with_capacity(num_rows))
            .collect();

        for row in rows {
            if row.len() != fields.len() {
                return Err(ScanError::RowWidth {
                    expected: fields.len(),
                    found: row.len(),
                });
            }

            for ((value, field), column) in row.into_iter().zip(fields).zip(&mut columns) {
                let kind = value.kind();
                let conformed = conform_value(value, field.data_type).ok_or_else(|| {
                    ScanError::Conversion {
                        column: field.name.clone(),
                        kind,
                        data_type: field.data_type,
                    }
                })?;
                column.push(conformed);
            }
        }

        Ok(RecordBatch::from_columns(
            Arc::clone(&self.schema),
            columns,
            num_rows,
        ))
    }
}

impl<C: Connection> Iterator for Scanner<C> {
    type Item = Result<RecordBatch, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.fetch_batch() {
            Ok(Some(batch)) => Some(Ok(batch)),
            Ok(None) => {
                self.close_logged();
                None
            }
            Err(err) => {
                warn!(table = %self.table, error = %err, "scan failed");
                record(MetricsEvent::ScanFailed { table: &self.table });
                self.close_logged();
                Some(Err(err))
            }
        }
    }
}

impl<C: Connection> Drop for Scanner<C> {
    fn drop(&mut self) {
        self.close_logged();
    }
}
