//! Placeholder binding over compiled fragments.
//!
//! Fragments are scanned as SQL text, not as a template: quoted literals and
//! quoted identifiers are copied through untouched, and only `{N}` markers
//! outside them are replaced. Substituted text is never rescanned.

use crate::{
    sql::{CompileError, Dialect, literal::render_literal},
    value::Value,
};

/// Replace every `{N}` marker in `fragment` with the literal form of
/// `params[N]`.
pub fn bind_placeholders(
    fragment: &str,
    params: &[Value],
    dialect: Dialect,
) -> Result<String, CompileError> {
    let bytes = fragment.as_bytes();
    let ident_quote = ident_quote_byte(dialect);

    let mut out = String::with_capacity(fragment.len());
    let mut copied_from = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => i = skip_quoted(bytes, i, b'\'', dialect.backslash_escapes())?,
            b if Some(b) == ident_quote => i = skip_quoted(bytes, i, b, false)?,
            b'{' => {
                out.push_str(&fragment[copied_from..i]);

                let (index, end) = parse_marker(fragment, i)?;
                out.push_str(&render_param(index, params, dialect)?);

                i = end;
                copied_from = end;
            }
            _ => i += 1,
        }
    }
    out.push_str(&fragment[copied_from..]);

    Ok(out)
}

/// Whether `fragment` contains an `OR` outside every parenthesis and quote.
///
/// Text that cannot be scanned is reported as containing one, so callers
/// err towards grouping.
#[must_use]
pub fn has_top_level_or(fragment: &str, dialect: Dialect) -> bool {
    let bytes = fragment.as_bytes();
    let ident_quote = ident_quote_byte(dialect);

    let mut depth: usize = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => match skip_quoted(bytes, i, b'\'', dialect.backslash_escapes()) {
                Ok(end) => i = end,
                Err(_) => return true,
            },
            b if Some(b) == ident_quote => match skip_quoted(bytes, i, b, false) {
                Ok(end) => i = end,
                Err(_) => return true,
            },
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            _ => {
                if depth == 0 && bytes[i..].starts_with(b" OR ") {
                    return true;
                }
                i += 1;
            }
        }
    }

    false
}

fn ident_quote_byte(dialect: Dialect) -> Option<u8> {
    dialect
        .identifier_quote()
        .and_then(|quote| u8::try_from(quote).ok())
        .filter(|quote| *quote != b'\'')
}

// Returns the index just past the closing quote. A doubled quote stays inside
// the section; with backslash escapes, `\` protects the next byte.
fn skip_quoted(
    bytes: &[u8],
    start: usize,
    quote: u8,
    backslash_escapes: bool,
) -> Result<usize, CompileError> {
    let mut i = start + 1;

    loop {
        let Some(&b) = bytes.get(i) else {
            return Err(CompileError::UnterminatedQuote { offset: start });
        };

        if backslash_escapes && b == b'\\' {
            i += 2;
            continue;
        }
        if b == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return Ok(i + 1);
        }
        i += 1;
    }
}

// Parses `{digits}` at `start`; returns the index and the byte after `}`.
fn parse_marker(fragment: &str, start: usize) -> Result<(u64, usize), CompileError> {
    let bytes = fragment.as_bytes();
    let digits_start = start + 1;
    let mut end = digits_start;

    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }

    if end == digits_start || bytes.get(end) != Some(&b'}') {
        return Err(CompileError::MalformedMarker { offset: start });
    }

    let index = fragment[digits_start..end]
        .parse::<u64>()
        .map_err(|_| CompileError::MalformedMarker { offset: start })?;

    Ok((index, end + 1))
}

fn render_param(index: u64, params: &[Value], dialect: Dialect) -> Result<String, CompileError> {
    let value = usize::try_from(index)
        .ok()
        .and_then(|i| params.get(i))
        .ok_or(CompileError::MissingParameter {
            index,
            available: params.len(),
        })?;

    render_literal(value, dialect)
        .map_err(|source| CompileError::UnrenderableParameter { index, source })
}
