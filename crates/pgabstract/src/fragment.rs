//! SQL text paired with its binds.
//!
//! Clause compilers return a [`Fragment`]; statement entry points return a
//! [`BuiltQuery`]. In both, `binds[i]` belongs to the `i`-th `?` of `sql`.

use crate::bind::Bind;

/// A compiled piece of SQL and the binds for its placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub sql: String,
    pub binds: Vec<Bind>,
}

impl Fragment {
    /// Create an empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// SQL text without binds.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            binds: Vec::new(),
        }
    }

    /// SQL text with its binds.
    pub fn with_binds(sql: impl Into<String>, binds: Vec<Bind>) -> Self {
        Self {
            sql: sql.into(),
            binds,
        }
    }

    /// A single `?` placeholder.
    pub fn placeholder(bind: Bind) -> Self {
        Self {
            sql: "?".to_string(),
            binds: vec![bind],
        }
    }

    /// Check whether nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty() && self.binds.is_empty()
    }

    /// Append raw SQL.
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Append a `?` placeholder and its bind.
    pub fn push_bind(&mut self, bind: Bind) -> &mut Self {
        self.sql.push('?');
        self.binds.push(bind);
        self
    }

    /// Append another fragment, keeping its binds after ours.
    pub fn push_fragment(&mut self, other: Fragment) -> &mut Self {
        self.sql.push_str(&other.sql);
        self.binds.extend(other.binds);
        self
    }

    /// Join fragments with `sep`, concatenating binds in order.
    pub fn join(parts: impl IntoIterator<Item = Fragment>, sep: &str) -> Fragment {
        let mut out = Fragment::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                out.push(sep);
            }
            out.push_fragment(part);
        }
        out
    }

    /// Wrap the SQL text in parentheses.
    pub fn parenthesized(mut self) -> Self {
        self.sql = format!("({})", self.sql);
        self
    }

    /// Split into SQL text and binds.
    pub fn into_parts(self) -> (String, Vec<Bind>) {
        (self.sql, self.binds)
    }
}

/// The result of compiling a whole statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub binds: Vec<Bind>,
}

impl BuiltQuery {
    /// Create a new built query.
    pub fn new(sql: String, binds: Vec<Bind>) -> Self {
        Self { sql, binds }
    }

    /// Split into SQL text and binds.
    pub fn into_parts(self) -> (String, Vec<Bind>) {
        (self.sql, self.binds)
    }

    /// Rewrite `?` placeholders as `$1, $2, ...`.
    ///
    /// Question marks are left alone inside quoted strings (`'...'`,
    /// `E'...'` with backslash escapes), double-quoted identifiers,
    /// dollar-quoted bodies (`$tag$...$tag$`) and comments (`--`, `/* */`).
    pub fn to_numbered_sql(&self) -> String {
        let sql = self.sql.as_str();
        let bytes = sql.as_bytes();
        let mut out = String::with_capacity(sql.len() + self.binds.len() * 2);
        let mut idx = 0;
        let mut copied = 0;
        let mut i = 0;
        while i < bytes.len() {
            let skip_to = match bytes[i] {
                b'\'' => {
                    let escapes = i > 0
                        && matches!(bytes[i - 1], b'E' | b'e')
                        && (i == 1 || !is_word_byte(bytes[i - 2]));
                    Some(quoted_end(bytes, i + 1, b'\'', escapes))
                }
                b'"' => Some(quoted_end(bytes, i + 1, b'"', false)),
                b'-' if bytes.get(i + 1) == Some(&b'-') => Some(
                    sql[i..]
                        .find('\n')
                        .map_or(bytes.len(), |pos| i + pos + 1),
                ),
                b'/' if bytes.get(i + 1) == Some(&b'*') => Some(
                    sql[i + 2..]
                        .find("*/")
                        .map_or(bytes.len(), |pos| i + 2 + pos + 2),
                ),
                b'$' => dollar_tag(sql, i).map(|tag| {
                    let body = i + tag.len();
                    sql[body..]
                        .find(tag)
                        .map_or(bytes.len(), |pos| body + pos + tag.len())
                }),
                b'?' => {
                    out.push_str(&sql[copied..i]);
                    idx += 1;
                    out.push('$');
                    out.push_str(&idx.to_string());
                    copied = i + 1;
                    None
                }
                _ => None,
            };
            i = skip_to.unwrap_or(i + 1);
        }
        out.push_str(&sql[copied..]);
        out
    }

    /// Get binds as references for tokio-postgres.
    #[cfg(feature = "postgres")]
    pub fn params_ref(&self) -> Vec<&(dyn tokio_postgres::types::ToSql + Sync)> {
        self.binds
            .iter()
            .map(|b| b as &(dyn tokio_postgres::types::ToSql + Sync))
            .collect()
    }
}

/// Index just past the closing `quote` of a literal whose body starts at
/// `from`. A doubled quote stays inside; with `escapes`, so does `\x`.
fn quoted_end(bytes: &[u8], from: usize, quote: u8, escapes: bool) -> usize {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if escapes => i += 2,
            c if c == quote => {
                if bytes.get(i + 1) == Some(&quote) {
                    i += 2;
                } else {
                    return i + 1;
                }
            }
            _ => i += 1,
        }
    }
    bytes.len()
}

/// The opening `$tag$` at `start`, if one begins there.
///
/// `$1`-style positional parameters and `$` inside identifiers are not tags.
fn dollar_tag(sql: &str, start: usize) -> Option<&str> {
    let bytes = sql.as_bytes();
    if start > 0 && is_word_byte(bytes[start - 1]) {
        return None;
    }
    let rest = &sql[start + 1..];
    let len = rest.find('$')?;
    let tag = &rest[..len];
    let valid = tag
        .bytes()
        .enumerate()
        .all(|(n, c)| c == b'_' || c.is_ascii_alphabetic() || (n > 0 && c.is_ascii_digit()));
    valid.then(|| &sql[start..start + len + 2])
}

fn is_word_byte(c: u8) -> bool {
    c == b'_' || c == b'$' || c.is_ascii_alphanumeric()
}

impl From<Fragment> for BuiltQuery {
    fn from(fragment: Fragment) -> Self {
        Self::new(fragment.sql, fragment.binds)
    }
}
