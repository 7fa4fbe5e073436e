//! `FROM` lists with joins.
//!
//! A join descriptor names its target and the key pairs to join on:
//!
//! ```text
//! ["foo", ["bar", "foo_id", "id"]]
//!   → "foo" JOIN "bar" ON ("bar"."foo_id" = "foo"."id")
//! ["foo", ["-left", "bar", "foo_id", "id", "bar.kind", "foo.kind"]]
//!   → "foo" LEFT JOIN "bar" ON ("bar"."foo_id" = "foo"."id" AND "bar"."kind" = "foo"."kind")
//! ```
//!
//! Unqualified foreign keys are qualified with the join target, unqualified
//! primary keys with the first base table.

use super::PgAbstract;
use crate::base::TableRef;
use crate::error::{SqlError, SqlResult};
use crate::value::ValueNode;

/// Join flavor; rendered as `<KIND> JOIN`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JoinKind {
    /// Bare `JOIN`.
    #[default]
    Plain,
    Inner,
    Left,
    Right,
    Full,
    /// Any other word, e.g. `left_outer` → `LEFT OUTER JOIN`.
    Other(String),
}

impl JoinKind {
    /// Parse a kind word without its leading `-`.
    pub fn from_word(word: &str) -> Self {
        match word.to_ascii_lowercase().as_str() {
            "" => JoinKind::Plain,
            "inner" => JoinKind::Inner,
            "left" => JoinKind::Left,
            "right" => JoinKind::Right,
            "full" => JoinKind::Full,
            _ => JoinKind::Other(word.to_string()),
        }
    }

    /// Keyword placed before `JOIN`, if any.
    fn prefix(&self) -> Option<String> {
        match self {
            JoinKind::Plain => None,
            JoinKind::Inner => Some("INNER".to_string()),
            JoinKind::Left => Some("LEFT".to_string()),
            JoinKind::Right => Some("RIGHT".to_string()),
            JoinKind::Full => Some("FULL".to_string()),
            JoinKind::Other(word) => Some(word.replace('_', " ")),
        }
    }
}

/// One `JOIN <target> ON (...)` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    pub kind: JoinKind,
    pub target: TableRef,
    /// `(foreign key, primary key)` pairs; at least one is required.
    pub key_pairs: Vec<(String, String)>,
}

impl JoinSpec {
    /// Create a plain join without key pairs yet.
    pub fn new(target: impl Into<TableRef>) -> Self {
        Self {
            kind: JoinKind::Plain,
            target: target.into(),
            key_pairs: Vec::new(),
        }
    }

    pub fn left(target: impl Into<TableRef>) -> Self {
        Self::new(target).kind(JoinKind::Left)
    }

    pub fn inner(target: impl Into<TableRef>) -> Self {
        Self::new(target).kind(JoinKind::Inner)
    }

    pub fn right(target: impl Into<TableRef>) -> Self {
        Self::new(target).kind(JoinKind::Right)
    }

    /// Set the join kind.
    pub fn kind(mut self, kind: JoinKind) -> Self {
        self.kind = kind;
        self
    }

    /// Add a `foreign = primary` key pair.
    pub fn on(mut self, foreign: impl Into<String>, primary: impl Into<String>) -> Self {
        self.key_pairs.push((foreign.into(), primary.into()));
        self
    }

    /// Parse a `[-kind?, target, fk, pk, ...]` descriptor.
    fn from_descriptor(items: &[ValueNode]) -> SqlResult<Self> {
        let (kind, rest) = match items.split_first() {
            Some((first, rest)) => match first.as_name().and_then(|n| n.strip_prefix('-')) {
                Some(word) => (JoinKind::from_word(word), rest),
                None => (JoinKind::Plain, items),
            },
            None => (JoinKind::Plain, items),
        };

        if rest.len() < 3 {
            return Err(SqlError::malformed_join(format!(
                "expected [target, foreign key, primary key, ...], got {} element(s)",
                rest.len()
            )));
        }

        let target = match &rest[0] {
            ValueNode::LiteralSql(sql) => TableRef::Literal(sql.clone()),
            other => match other.as_name() {
                Some(name) => TableRef::Name(name.to_string()),
                None => {
                    return Err(SqlError::malformed_join(format!(
                        "join target must be a table name, got {}",
                        other.shape()
                    )));
                }
            },
        };

        let keys = &rest[1..];
        if keys.len() % 2 != 0 {
            return Err(SqlError::malformed_join(format!(
                "join to {target} has a foreign key without a primary key"
            )));
        }

        let key_pairs = keys
            .chunks(2)
            .map(|pair| match (pair[0].as_name(), pair[1].as_name()) {
                (Some(fk), Some(pk)) => Ok((fk.to_string(), pk.to_string())),
                _ => Err(SqlError::malformed_join(format!(
                    "join keys of {target} must be column names"
                ))),
            })
            .collect::<SqlResult<Vec<_>>>()?;

        Ok(Self {
            kind,
            target,
            key_pairs,
        })
    }
}

/// The input of a `FROM` clause: base tables followed by joins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Source {
    tables: Vec<TableRef>,
    joins: Vec<JoinSpec>,
}

impl Source {
    /// A single table.
    pub fn table(table: impl Into<TableRef>) -> Self {
        Self {
            tables: vec![table.into()],
            joins: Vec::new(),
        }
    }

    /// A single literal table expression.
    pub fn literal(sql: impl Into<String>) -> Self {
        Self::table(TableRef::literal(sql))
    }

    /// Add another base table.
    pub fn and_table(mut self, table: impl Into<TableRef>) -> Self {
        self.tables.push(table.into());
        self
    }

    /// Add a join.
    pub fn join(mut self, join: JoinSpec) -> Self {
        self.joins.push(join);
        self
    }

    pub fn tables(&self) -> &[TableRef] {
        &self.tables
    }

    pub fn joins(&self) -> &[JoinSpec] {
        &self.joins
    }
}

impl From<&str> for Source {
    fn from(table: &str) -> Self {
        Source::table(table)
    }
}

impl From<TableRef> for Source {
    fn from(table: TableRef) -> Self {
        Source::table(table)
    }
}

impl TryFrom<&ValueNode> for Source {
    type Error = SqlError;

    fn try_from(node: &ValueNode) -> SqlResult<Self> {
        let mut source = Source::default();
        match node {
            ValueNode::Sequence(items) if !items.is_empty() => {
                for item in items {
                    match item {
                        ValueNode::Sequence(descriptor) => {
                            source.joins.push(JoinSpec::from_descriptor(descriptor)?);
                        }
                        other => source.tables.push(table_ref(other)?),
                    }
                }
            }
            ValueNode::Sequence(_) => return Err(SqlError::unsupported("from", "empty sequence")),
            other => source.tables.push(table_ref(other)?),
        }
        Ok(source)
    }
}

fn table_ref(node: &ValueNode) -> SqlResult<TableRef> {
    match node {
        ValueNode::LiteralSql(sql) => Ok(TableRef::Literal(sql.clone())),
        other => other
            .as_name()
            .map(|name| TableRef::Name(name.to_string()))
            .ok_or_else(|| SqlError::unsupported("from", other.shape())),
    }
}

impl PgAbstract {
    /// Compile a `FROM` list (without the keyword). Joins carry no binds.
    pub fn compile_from(&self, source: &Source) -> SqlResult<String> {
        let Some(first) = source.tables.first() else {
            return Err(if source.joins.is_empty() {
                SqlError::unsupported("from", "empty source")
            } else {
                SqlError::malformed_join("join without a base table")
            });
        };

        let mut sql = self.base.from_list(&source.tables)?;
        let primary = table_name(first);
        for join in &source.joins {
            sql.push_str(&self.compile_join(join, primary)?);
        }
        Ok(sql)
    }

    fn compile_join(&self, join: &JoinSpec, primary: Option<&str>) -> SqlResult<String> {
        if join.key_pairs.is_empty() {
            return Err(SqlError::malformed_join(format!(
                "join to {} has no key pairs",
                join.target
            )));
        }

        let foreign = table_name(&join.target);
        let conditions = join
            .key_pairs
            .iter()
            .map(|(fk, pk)| -> SqlResult<String> {
                Ok(format!(
                    "{} = {}",
                    self.qualify(fk, foreign)?,
                    self.qualify(pk, primary)?
                ))
            })
            .collect::<SqlResult<Vec<_>>>()?;

        let b = &self.base;
        let mut sql = String::from(" ");
        if let Some(prefix) = join.kind.prefix() {
            sql.push_str(&b.keyword(&prefix));
            sql.push(' ');
        }
        sql.push_str(&b.keyword("JOIN"));
        sql.push(' ');
        sql.push_str(&b.table_ref(&join.target)?);
        sql.push(' ');
        sql.push_str(&b.keyword("ON"));
        sql.push_str(" (");
        sql.push_str(&conditions.join(&format!(" {} ", b.keyword("AND"))));
        sql.push(')');
        Ok(sql)
    }

    /// Quote a join column, prefixing `table` unless it is already qualified.
    ///
    /// Without a configured separator no column counts as qualified.
    fn qualify(&self, column: &str, table: Option<&str>) -> SqlResult<String> {
        let sep = self.config().separator();
        let qualified = self
            .config()
            .name_sep
            .and_then(|sep| column.find(sep))
            .is_some_and(|pos| pos > 0);
        match table {
            Some(table) if !qualified => Ok(format!(
                "{}{sep}{}",
                self.base.quote(table)?,
                self.base.quote(column)?
            )),
            _ => self.base.quote(column),
        }
    }
}

/// Name usable as a qualifier; literal tables have none.
fn table_name(table: &TableRef) -> Option<&str> {
    match table {
        TableRef::Name(name) => Some(name),
        TableRef::Literal(_) => None,
    }
}
