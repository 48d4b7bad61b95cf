use crate::{
    sql::{
        CompileError, Dialect,
        bind::{bind_placeholders, has_top_level_or},
    },
    value::Value,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// QueryError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error("table name is empty")]
    EmptyTable,

    #[error("failed to bind filter {position}: {source}")]
    Bind {
        position: usize,
        source: CompileError,
    },
}

impl QueryError {
    #[must_use]
    pub const fn kind(&self) -> QueryErrorKind {
        match self {
            Self::EmptyTable => QueryErrorKind::EmptyTable,
            Self::Bind { .. } => QueryErrorKind::Bind,
        }
    }
}

///
/// QueryErrorKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryErrorKind {
    EmptyTable,
    Bind,
}

impl QueryErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyTable => "empty_table",
            Self::Bind => "bind",
        }
    }
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// QueryBuilder
///
/// Assembles `SELECT <projection> FROM <table> [WHERE <filters>]` for one
/// dialect. Filters are taken in the order given.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct QueryBuilder {
    dialect: Dialect,
}

impl QueryBuilder {
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Build the statement from already-bound fragments.
    ///
    /// An empty projection selects the constant `1`. Empty fragments are
    /// skipped. When two or more fragments are joined, any fragment with a
    /// top-level `OR` is parenthesized so the joining `AND` cannot rebind it.
    pub fn build<C, F>(
        &self,
        table: &str,
        columns: &[C],
        fragments: &[F],
    ) -> Result<String, QueryError>
    where
        C: AsRef<str>,
        F: AsRef<str>,
    {
        if table.is_empty() {
            return Err(QueryError::EmptyTable);
        }

        let projection = if columns.is_empty() {
            "1".to_string()
        } else {
            columns
                .iter()
                .map(|column| self.dialect.quote_identifier(column.as_ref()))
                .collect::<Vec<_>>()
                .join(",")
        };

        let mut sql = format!(
            "SELECT {projection} FROM {}",
            self.dialect.quote_identifier(table)
        );

        let filters: Vec<&str> = fragments
            .iter()
            .map(AsRef::as_ref)
            .filter(|fragment| !fragment.trim().is_empty())
            .collect();

        if !filters.is_empty() {
            let grouped = filters.len() > 1;
            let clause = filters
                .iter()
                .map(|fragment| {
                    if grouped && has_top_level_or(fragment, self.dialect) {
                        format!("({fragment})")
                    } else {
                        (*fragment).to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" AND ");

            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }

        Ok(sql)
    }

    /// Bind runtime parameters into each fragment, then build the statement.
    pub fn build_bound<C, F>(
        &self,
        table: &str,
        columns: &[C],
        fragments: &[F],
        params: &[Value],
    ) -> Result<String, QueryError>
    where
        C: AsRef<str>,
        F: AsRef<str>,
    {
        let bound = fragments
            .iter()
            .enumerate()
            .map(|(position, fragment)| {
                bind_placeholders(fragment.as_ref(), params, self.dialect)
                    .map_err(|source| QueryError::Bind { position, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.build(table, columns, &bound)
    }
}
