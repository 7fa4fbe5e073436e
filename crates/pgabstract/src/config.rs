use serde::{Deserialize, Serialize};

/// Case used for emitted SQL keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordCase {
    /// `SELECT`, `ON CONFLICT`, ... (default)
    #[default]
    Upper,
    /// `select`, `on conflict`, ...
    Lower,
}

/// Quoting and casing configuration.
///
/// Captured once when a builder is constructed and never mutated afterwards,
/// so a builder can be shared across threads freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identifier quote character. `None` emits names verbatim.
    pub quote_char: Option<char>,
    /// Separator between schema, table and column parts.
    pub name_sep: Option<char>,
    /// Keyword case.
    pub keyword_case: KeywordCase,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quote_char: Some('"'),
            name_sep: Some('.'),
            keyword_case: KeywordCase::Upper,
        }
    }
}

impl Config {
    /// Create a configuration with PostgreSQL defaults (`"` quoting, `.` separator).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identifier quote character.
    pub fn with_quote_char(mut self, quote_char: Option<char>) -> Self {
        self.quote_char = quote_char;
        self
    }

    /// Set the name separator.
    pub fn with_name_sep(mut self, name_sep: Option<char>) -> Self {
        self.name_sep = name_sep;
        self
    }

    /// Set the keyword case.
    pub fn with_keyword_case(mut self, keyword_case: KeywordCase) -> Self {
        self.keyword_case = keyword_case;
        self
    }

    /// Emit lower-case keywords.
    pub fn lowercase_keywords(self) -> Self {
        self.with_keyword_case(KeywordCase::Lower)
    }

    /// Separator used when qualifying a column with a table name.
    pub(crate) fn separator(&self) -> char {
        self.name_sep.unwrap_or('.')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_postgres() {
        let config = Config::new();
        assert_eq!(config.quote_char, Some('"'));
        assert_eq!(config.name_sep, Some('.'));
        assert_eq!(config.keyword_case, KeywordCase::Upper);
    }

    #[test]
    fn deserialize_fills_missing_fields() {
        let config: Config = serde_json::from_str(r#"{"keyword_case": "lower"}"#).unwrap();
        assert_eq!(config, Config::new().lowercase_keywords());
    }

    #[test]
    fn deserialize_without_quoting() {
        let config: Config = serde_json::from_str(r#"{"quote_char": null}"#).unwrap();
        assert_eq!(config.quote_char, None);
        assert_eq!(config.separator(), '.');
    }
}
