//! Identifier quoting.
//!
//! [`Ident`] splits a name on the configured separator and renders every part
//! wrapped in the quote character:
//!
//! - `users` → `"users"`
//! - `public.users` → `"public"."users"`
//! - `users.*` → `"users".*` (a bare `*` part is never quoted)
//! - `has"quote` → `"has""quote"` (embedded quote characters are doubled)
//!
//! # Example
//! ```
//! use pgabstract::Ident;
//!
//! let t = Ident::parse("public.users", Some('.'))?;
//! assert_eq!(t.to_sql(Some('"'), Some('.')), r#""public"."users""#);
//! # Ok::<(), pgabstract::SqlError>(())
//! ```

use crate::error::{SqlError, SqlResult};

/// A part of a SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    /// A name, quoted on output.
    Name(String),
    /// `*`, never quoted.
    Star,
}

/// A SQL identifier (column, table, or schema name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

impl Ident {
    /// Split `s` on `sep` into identifier parts.
    ///
    /// Without a separator the whole string is a single part.
    pub fn parse(s: &str, sep: Option<char>) -> SqlResult<Self> {
        if s.is_empty() {
            return Err(SqlError::invalid_identifier("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(SqlError::invalid_identifier(
                "Identifier cannot contain NUL character",
            ));
        }

        let raw_parts: Vec<&str> = match sep {
            Some(sep) => s.split(sep).collect(),
            None => vec![s],
        };

        let mut parts = Vec::with_capacity(raw_parts.len());
        for part in raw_parts {
            match part {
                "" => {
                    return Err(SqlError::invalid_identifier(format!(
                        "Empty identifier segment in '{s}'"
                    )));
                }
                "*" => parts.push(IdentPart::Star),
                name => parts.push(IdentPart::Name(name.to_string())),
            }
        }

        Ok(Self { parts })
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self, quote: Option<char>, sep: Option<char>) -> String {
        let mut cap = self.parts.len().saturating_sub(1); // separators
        for part in &self.parts {
            match part {
                IdentPart::Name(s) => cap += s.len() + 2, // surrounding quotes (escapes may add more)
                IdentPart::Star => cap += 1,
            }
        }
        let mut out = String::with_capacity(cap);
        self.write_sql(&mut out, quote, sep);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String, quote: Option<char>, sep: Option<char>) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push(sep.unwrap_or('.'));
            }
            match (part, quote) {
                (IdentPart::Star, _) => out.push('*'),
                (IdentPart::Name(s), None) => out.push_str(s),
                (IdentPart::Name(s), Some(q)) => {
                    out.push(q);
                    for ch in s.chars() {
                        if ch == q {
                            out.push(q);
                            out.push(q);
                        } else {
                            out.push(ch);
                        }
                    }
                    out.push(q);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const Q: Option<char> = Some('"');
    const SEP: Option<char> = Some('.');

    fn quote(s: &str) -> String {
        Ident::parse(s, SEP).unwrap().to_sql(Q, SEP)
    }

    #[test]
    fn ident_simple() {
        assert_eq!(quote("users"), r#""users""#);
    }

    #[test]
    fn ident_dotted() {
        assert_eq!(quote("public.users"), r#""public"."users""#);
    }

    #[test]
    fn ident_three_parts() {
        assert_eq!(quote("schema.table.column"), r#""schema"."table"."column""#);
    }

    #[test]
    fn ident_star_unquoted() {
        assert_eq!(quote("*"), "*");
        assert_eq!(quote("users.*"), r#""users".*"#);
    }

    #[test]
    fn ident_escapes_quote_char() {
        assert_eq!(quote(r#"has"quote"#), r#""has""quote""#);
    }

    #[test]
    fn ident_without_quote_char() {
        let ident = Ident::parse("public.users", SEP).unwrap();
        assert_eq!(ident.to_sql(None, SEP), "public.users");
    }

    #[test]
    fn ident_without_separator_is_one_part() {
        let ident = Ident::parse("public.users", None).unwrap();
        assert_eq!(ident.to_sql(Q, None), r#""public.users""#);
    }

    #[test]
    fn ident_rejects_empty() {
        assert!(Ident::parse("", SEP).is_err());
    }

    #[test]
    fn ident_rejects_nul() {
        assert!(Ident::parse("a\0b", SEP).is_err());
    }

    #[test]
    fn ident_rejects_double_dot() {
        assert!(Ident::parse("schema..table", SEP).is_err());
    }

    #[test]
    fn ident_rejects_trailing_dot() {
        assert!(Ident::parse("schema.", SEP).is_err());
    }
}
