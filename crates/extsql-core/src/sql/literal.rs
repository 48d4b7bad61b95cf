use crate::{
    sql::Dialect,
    value::{Value, ValueKind},
};
use thiserror::Error as ThisError;

///
/// LiteralError
///
/// A value with no safe literal spelling. Rendering fails closed instead of
/// emitting text the remote parser might read differently.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
pub enum LiteralError {
    #[error("{kind} values have no portable SQL literal form")]
    Unsupported { kind: ValueKind },

    #[error("non-finite float has no SQL literal form")]
    NonFinite,
}

/// Render one value as a SQL literal in `dialect`.
///
/// Numbers use their plain textual form with no grouping or exponent, text is
/// single-quoted with embedded quotes doubled.
pub fn render_literal(value: &Value, dialect: Dialect) -> Result<String, LiteralError> {
    let literal = match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Int(v) => v.to_string(),
        Value::Uint(v) => v.to_string(),
        Value::Decimal(v) => v.to_string(),
        Value::Float32(v) if v.is_finite() => v.to_string(),
        Value::Float64(v) if v.is_finite() => v.to_string(),
        Value::Float32(_) | Value::Float64(_) => return Err(LiteralError::NonFinite),
        Value::Text(text) => quote_text(text, dialect),
        Value::Binary(_)
        | Value::Date(_)
        | Value::Time(_)
        | Value::Timestamp(_)
        | Value::List(_) => {
            return Err(LiteralError::Unsupported { kind: value.kind() });
        }
    };

    Ok(literal)
}

// Single-quote text, doubling quotes and, where the dialect treats `\` as an
// escape, doubling backslashes too.
fn quote_text(text: &str, dialect: Dialect) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        match ch {
            '\'' => out.push_str("''"),
            '\\' if dialect.backslash_escapes() => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out.push('\'');

    out
}
