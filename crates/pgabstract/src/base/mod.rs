//! Generic statement builder.
//!
//! [`BaseBuilder`] knows identifier quoting, keyword casing, the boolean
//! expression grammar shared by `WHERE` and `HAVING`, set lists, `ORDER BY`,
//! plain `FROM` lists and `RETURNING`. The PostgreSQL clause compilers in
//! [`crate::pg`] build on top of it and fall back to it whenever a value does
//! not use one of their extended shapes.

mod order;
mod where_clause;

use crate::bind::{Bind, BindValue};
use crate::config::{Config, KeywordCase};
use crate::error::{SqlError, SqlResult};
use crate::fragment::{BuiltQuery, Fragment};
use crate::ident::Ident;
use crate::value::ValueNode;
use std::collections::BTreeMap;
use std::fmt;

/// A table in a `FROM` list or a join target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRef {
    /// Quoted on output.
    Name(String),
    /// Emitted verbatim.
    Literal(String),
}

impl TableRef {
    /// Create a literal table expression (e.g. a subquery with alias).
    pub fn literal(sql: impl Into<String>) -> Self {
        TableRef::Literal(sql.into())
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRef::Name(name) => f.write_str(name),
            TableRef::Literal(sql) => f.write_str(sql),
        }
    }
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        TableRef::Name(name.to_string())
    }
}

impl From<String> for TableRef {
    fn from(name: String) -> Self {
        TableRef::Name(name)
    }
}

/// Generic SQL builder: quoting, casing and the shared clause grammars.
#[derive(Debug, Clone, Default)]
pub struct BaseBuilder {
    config: Config,
}

impl BaseBuilder {
    /// Create a builder with the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Quote a (possibly dotted) name.
    pub fn quote(&self, name: &str) -> SqlResult<String> {
        let sep = self.config.name_sep;
        Ok(Ident::parse(name, sep)?.to_sql(self.config.quote_char, sep))
    }

    /// Apply the configured keyword case.
    pub fn keyword(&self, keyword: &str) -> String {
        match self.config.keyword_case {
            KeywordCase::Upper => keyword.to_ascii_uppercase(),
            KeywordCase::Lower => keyword.to_ascii_lowercase(),
        }
    }

    /// Append ` KEYWORD ` to a fragment.
    pub(crate) fn push_keyword(&self, out: &mut Fragment, keyword: &str) {
        out.push(" ");
        out.push(&self.keyword(keyword));
        out.push(" ");
    }

    /// Render a table reference.
    pub fn table_ref(&self, table: &TableRef) -> SqlResult<String> {
        match table {
            TableRef::Name(name) => self.quote(name),
            TableRef::Literal(sql) => Ok(sql.clone()),
        }
    }

    /// Render a plain `FROM` list.
    pub fn from_list(&self, tables: &[TableRef]) -> SqlResult<String> {
        let rendered = tables
            .iter()
            .map(|t| self.table_ref(t))
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(rendered.join(", "))
    }

    /// Render a select field list.
    ///
    /// A sequence is a list of names; anything else is an opaque expression.
    pub fn fields(&self, fields: &ValueNode) -> SqlResult<Fragment> {
        match fields {
            ValueNode::Absent => Ok(Fragment::raw("*")),
            ValueNode::Sequence(items) => {
                let names = items
                    .iter()
                    .map(|item| match item.as_name() {
                        Some(name) => self.quote(name).map(Fragment::raw),
                        None => Err(SqlError::unsupported("fields", item.shape())),
                    })
                    .collect::<SqlResult<Vec<_>>>()?;
                Ok(Fragment::join(names, ", "))
            }
            ValueNode::Identifier(name) => self.quote(name).map(Fragment::raw),
            ValueNode::PlainScalar(bind) => match bind.value().as_text() {
                Some(expr) if !bind.is_json() => Ok(Fragment::raw(expr)),
                _ => Err(SqlError::unsupported("fields", fields.shape())),
            },
            ValueNode::LiteralSql(sql) => Ok(Fragment::raw(sql.as_str())),
            ValueNode::LiteralSqlWithBinds(sql, binds) => {
                Ok(Fragment::with_binds(sql.as_str(), binds.clone()))
            }
            other => Err(SqlError::unsupported("fields", other.shape())),
        }
    }

    /// Render a value position (insert values, set lists, comparisons).
    pub fn value(&self, value: &ValueNode, context: &str) -> SqlResult<Fragment> {
        match value {
            ValueNode::PlainScalar(bind) => Ok(Fragment::placeholder(bind.clone())),
            ValueNode::JsonScalar(doc) => Ok(Fragment::placeholder(Bind::json(doc.clone()))),
            ValueNode::Absent => Ok(Fragment::placeholder(Bind::null())),
            ValueNode::Identifier(name) => self.quote(name).map(Fragment::raw),
            ValueNode::LiteralSql(sql) => Ok(Fragment::raw(sql.as_str())),
            ValueNode::LiteralSqlWithBinds(sql, binds) => {
                Ok(Fragment::with_binds(sql.as_str(), binds.clone()))
            }
            ValueNode::Sequence(items) => {
                let elements = items
                    .iter()
                    .map(|item| match item {
                        ValueNode::PlainScalar(bind) if !bind.is_json() => Ok(bind.value().clone()),
                        ValueNode::Absent => Ok(BindValue::Null),
                        other => Err(SqlError::unsupported(
                            context,
                            format!("{} inside an array value", other.shape()),
                        )),
                    })
                    .collect::<SqlResult<Vec<_>>>()?;
                Ok(Fragment::placeholder(Bind::new(BindValue::Array(elements))))
            }
            other => Err(SqlError::unsupported(context, other.shape())),
        }
    }

    /// Render `"col" = value, ...` from a mapping, in key order.
    pub fn set_list(&self, set: &ValueNode, context: &str) -> SqlResult<Fragment> {
        let ValueNode::AssignmentMap(map) = set else {
            return Err(SqlError::unsupported(context, set.shape()));
        };
        self.set_entries(map, context)
    }

    /// Render `"col" = value, ...` from map entries.
    pub(crate) fn set_entries(
        &self,
        map: &BTreeMap<String, ValueNode>,
        context: &str,
    ) -> SqlResult<Fragment> {
        if map.is_empty() {
            return Err(SqlError::unsupported(context, "empty mapping"));
        }
        let parts = map
            .iter()
            .map(|(column, value)| -> SqlResult<Fragment> {
                let mut part = Fragment::raw(self.quote(column)?);
                part.push(" = ");
                part.push_fragment(self.value(value, context)?);
                Ok(part)
            })
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(Fragment::join(parts, ", "))
    }

    /// Render the body of a `RETURNING` clause.
    pub fn returning(&self, returning: &ValueNode) -> SqlResult<Fragment> {
        match returning {
            ValueNode::Sequence(items) => {
                let parts = items
                    .iter()
                    .map(|item| self.returning_item(item))
                    .collect::<SqlResult<Vec<_>>>()?;
                Ok(Fragment::join(parts, ", "))
            }
            other => self.returning_item(other),
        }
    }

    fn returning_item(&self, item: &ValueNode) -> SqlResult<Fragment> {
        if let Some(name) = item.as_name() {
            return self.quote(name).map(Fragment::raw);
        }
        match item {
            ValueNode::LiteralSql(sql) => Ok(Fragment::raw(sql.as_str())),
            ValueNode::LiteralSqlWithBinds(sql, binds) => {
                Ok(Fragment::with_binds(sql.as_str(), binds.clone()))
            }
            other => Err(SqlError::unsupported("returning", other.shape())),
        }
    }

    /// Render `INSERT INTO "t" (...) VALUES (...)`.
    ///
    /// A mapping gives columns in key order; a sequence gives positional values;
    /// an absent or empty mapping inserts `DEFAULT VALUES`.
    pub fn insert_head(&self, table: &str, values: &ValueNode) -> SqlResult<Fragment> {
        let mut out = Fragment::raw(self.keyword("INSERT INTO"));
        out.push(" ");
        out.push(&self.quote(table)?);

        match values {
            ValueNode::AssignmentMap(map) if !map.is_empty() => {
                let columns = map
                    .keys()
                    .map(|c| self.quote(c))
                    .collect::<SqlResult<Vec<_>>>()?;
                let values = map
                    .values()
                    .map(|v| self.value(v, "values"))
                    .collect::<SqlResult<Vec<_>>>()?;
                out.push(" (");
                out.push(&columns.join(", "));
                out.push(") ");
                out.push(&self.keyword("VALUES"));
                out.push(" (");
                out.push_fragment(Fragment::join(values, ", "));
                out.push(")");
            }
            ValueNode::Sequence(items) if !items.is_empty() => {
                let values = items
                    .iter()
                    .map(|v| self.value(v, "values"))
                    .collect::<SqlResult<Vec<_>>>()?;
                out.push(" ");
                out.push(&self.keyword("VALUES"));
                out.push(" (");
                out.push_fragment(Fragment::join(values, ", "));
                out.push(")");
            }
            ValueNode::Absent | ValueNode::AssignmentMap(_) | ValueNode::Sequence(_) => {
                out.push(" ");
                out.push(&self.keyword("DEFAULT VALUES"));
            }
            other => return Err(SqlError::unsupported("values", other.shape())),
        }

        Ok(out)
    }

    /// Assemble `SELECT <fields> FROM <from> [WHERE ...]<tail>`.
    ///
    /// `tail` is appended as is and must bring its own leading space.
    pub fn select_statement(
        &self,
        fields: Fragment,
        from: &str,
        where_clause: Fragment,
        tail: Fragment,
    ) -> BuiltQuery {
        let mut out = Fragment::raw(self.keyword("SELECT"));
        out.push(" ");
        out.push_fragment(fields);
        self.push_keyword(&mut out, "FROM");
        out.push(from);
        if !where_clause.is_empty() {
            self.push_keyword(&mut out, "WHERE");
            out.push_fragment(where_clause);
        }
        out.push_fragment(tail);
        out.into()
    }

    /// Build `UPDATE "t" SET ... [WHERE ...] [RETURNING ...]`.
    pub fn update(
        &self,
        table: &str,
        set: &ValueNode,
        where_clause: &ValueNode,
        returning: Option<&ValueNode>,
    ) -> SqlResult<BuiltQuery> {
        let mut out = Fragment::raw(self.keyword("UPDATE"));
        out.push(" ");
        out.push(&self.quote(table)?);
        self.push_keyword(&mut out, "SET");
        out.push_fragment(self.set_list(set, "set")?);
        self.push_where(&mut out, where_clause)?;
        self.push_returning(&mut out, returning)?;
        Ok(out.into())
    }

    /// Build `DELETE FROM "t" [WHERE ...] [RETURNING ...]`.
    pub fn delete(
        &self,
        table: &str,
        where_clause: &ValueNode,
        returning: Option<&ValueNode>,
    ) -> SqlResult<BuiltQuery> {
        let mut out = Fragment::raw(self.keyword("DELETE FROM"));
        out.push(" ");
        out.push(&self.quote(table)?);
        self.push_where(&mut out, where_clause)?;
        self.push_returning(&mut out, returning)?;
        Ok(out.into())
    }

    fn push_where(&self, out: &mut Fragment, where_clause: &ValueNode) -> SqlResult<()> {
        let body = self.where_clause(where_clause, "where")?;
        if !body.is_empty() {
            self.push_keyword(out, "WHERE");
            out.push_fragment(body);
        }
        Ok(())
    }

    /// Append ` RETURNING ...` when a non-absent returning spec is given.
    pub(crate) fn push_returning(
        &self,
        out: &mut Fragment,
        returning: Option<&ValueNode>,
    ) -> SqlResult<()> {
        if let Some(returning) = returning.filter(|r| !r.is_absent()) {
            self.push_keyword(out, "RETURNING");
            out.push_fragment(self.returning(returning)?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
