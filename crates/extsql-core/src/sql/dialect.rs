///
/// Dialect
///
/// Identifier-quoting and literal-escaping rules of one remote SQL variant.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Dialect {
    name: &'static str,
    identifier_quote: Option<char>,
    backslash_escapes: bool,
}

impl Dialect {
    /// Plain ANSI-style dialect: identifiers are emitted unquoted.
    pub const GENERIC: Self = Self::new("generic", None);

    /// MySQL family: backtick identifiers, and `\` is an escape inside literals.
    pub const MYSQL: Self = Self::new("mysql", Some('`')).with_backslash_escapes(true);

    #[must_use]
    pub const fn new(name: &'static str, identifier_quote: Option<char>) -> Self {
        Self {
            name,
            identifier_quote,
            backslash_escapes: false,
        }
    }

    #[must_use]
    pub const fn with_backslash_escapes(mut self, enabled: bool) -> Self {
        self.backslash_escapes = enabled;
        self
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn identifier_quote(self) -> Option<char> {
        self.identifier_quote
    }

    #[must_use]
    pub const fn backslash_escapes(self) -> bool {
        self.backslash_escapes
    }

    /// Quote an identifier. An embedded quote character is doubled; in the
    /// unquoted dialect the identifier is emitted as given.
    #[must_use]
    pub fn quote_identifier(self, ident: &str) -> String {
        match self.identifier_quote {
            Some(quote) => {
                let mut out = String::with_capacity(ident.len() + 2);
                out.push(quote);
                for ch in ident.chars() {
                    if ch == quote {
                        out.push(quote);
                    }
                    out.push(ch);
                }
                out.push(quote);
                out
            }
            None => ident.to_string(),
        }
    }

    /// Whether `ident` can be emitted into a predicate without ambiguity.
    ///
    /// Quoted dialects accept anything. The unquoted dialect only accepts bare
    /// identifiers, optionally qualified with `.`.
    #[must_use]
    pub fn accepts_identifier(self, ident: &str) -> bool {
        if self.identifier_quote.is_some() {
            return true;
        }

        !ident.is_empty()
            && ident
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '$' | '.'))
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::GENERIC
    }
}
