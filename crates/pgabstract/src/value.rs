//! The value tree every clause compiler walks.
//!
//! A [`ValueNode`] is built either directly through its constructors or by
//! classifying a `serde_json::Value` once with [`ValueNode::classify`]. Clause
//! compilers then match the closed set of variants; a variant a clause has no
//! rule for is reported as [`SqlError::UnsupportedShape`] naming the clause.
//!
//! # JSON markers
//!
//! Plain JSON cannot express literal SQL or the JSON marker, so single-key
//! objects with these keys are classified specially:
//!
//! | object                              | node                    |
//! |-------------------------------------|-------------------------|
//! | `{"-json": v}`                      | `JsonScalar(v)`         |
//! | `{"-ident": "name"}`                | `Identifier`            |
//! | `{"-literal": "sql"}`               | `LiteralSql`            |
//! | `{"-literal": ["sql", b1, b2]}`     | `LiteralSqlWithBinds`   |
//! | `{"-value": v}`                     | `PlainScalar(v)`        |

use crate::bind::{Bind, BindValue};
use crate::error::{SqlError, SqlResult};
use std::collections::BTreeMap;
use std::fmt;

/// Structural category of a [`ValueNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Absent,
    Identifier,
    Sequence,
    AliasPair,
    LiteralSql,
    LiteralSqlWithBinds,
    AssignmentMap,
    PlainScalar,
    JsonScalar,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shape::Absent => "absent value",
            Shape::Identifier => "identifier",
            Shape::Sequence => "sequence",
            Shape::AliasPair => "alias pair",
            Shape::LiteralSql => "literal SQL",
            Shape::LiteralSqlWithBinds => "literal SQL with binds",
            Shape::AssignmentMap => "mapping",
            Shape::PlainScalar => "plain scalar",
            Shape::JsonScalar => "JSON scalar",
        })
    }
}

/// A caller-supplied value, tagged by shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ValueNode {
    /// A name to be quoted.
    Identifier(String),
    Sequence(Vec<ValueNode>),
    /// `name AS alias` in a field list.
    AliasPair(String, String),
    /// Trusted SQL text, emitted verbatim.
    LiteralSql(String),
    /// Trusted SQL text with binds for its `?` placeholders.
    LiteralSqlWithBinds(String, Vec<Bind>),
    /// Name → value pairs, iterated in key order.
    AssignmentMap(BTreeMap<String, ValueNode>),
    PlainScalar(Bind),
    /// Bound with the JSON flag set.
    JsonScalar(serde_json::Value),
    #[default]
    Absent,
}

impl ValueNode {
    /// Create an identifier.
    pub fn ident(name: impl Into<String>) -> Self {
        ValueNode::Identifier(name.into())
    }

    /// Create a `name AS alias` pair.
    pub fn alias(name: impl Into<String>, alias: impl Into<String>) -> Self {
        ValueNode::AliasPair(name.into(), alias.into())
    }

    /// Create a literal SQL fragment.
    pub fn sql(sql: impl Into<String>) -> Self {
        ValueNode::LiteralSql(sql.into())
    }

    /// Create a literal SQL fragment with binds.
    pub fn sql_with_binds(sql: impl Into<String>, binds: impl IntoIterator<Item = Bind>) -> Self {
        ValueNode::LiteralSqlWithBinds(sql.into(), binds.into_iter().collect())
    }

    /// Mark a value for JSON encoding.
    pub fn json(value: serde_json::Value) -> Self {
        ValueNode::JsonScalar(value)
    }

    /// Create a plain scalar.
    pub fn scalar(value: impl Into<Bind>) -> Self {
        ValueNode::PlainScalar(value.into())
    }

    /// Create a sequence.
    pub fn seq<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ValueNode>,
    {
        ValueNode::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Create a mapping.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ValueNode>,
    {
        ValueNode::AssignmentMap(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// The structural category of this node.
    pub fn shape(&self) -> Shape {
        match self {
            ValueNode::Identifier(_) => Shape::Identifier,
            ValueNode::Sequence(_) => Shape::Sequence,
            ValueNode::AliasPair(..) => Shape::AliasPair,
            ValueNode::LiteralSql(_) => Shape::LiteralSql,
            ValueNode::LiteralSqlWithBinds(..) => Shape::LiteralSqlWithBinds,
            ValueNode::AssignmentMap(_) => Shape::AssignmentMap,
            ValueNode::PlainScalar(_) => Shape::PlainScalar,
            ValueNode::JsonScalar(_) => Shape::JsonScalar,
            ValueNode::Absent => Shape::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ValueNode::Absent)
    }

    /// The name this node denotes, if it can stand for an identifier.
    ///
    /// Identifiers and text scalars both qualify; classification cannot tell
    /// them apart, only the clause can.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            ValueNode::Identifier(name) => Some(name),
            ValueNode::PlainScalar(bind) if !bind.is_json() => bind.value().as_text(),
            _ => None,
        }
    }

    /// Classify a dynamic JSON value.
    ///
    /// `null` is [`ValueNode::Absent`], scalars are plain scalars, arrays are
    /// sequences and objects are mappings unless they are one of the markers
    /// listed in the module docs.
    pub fn classify(value: serde_json::Value) -> SqlResult<Self> {
        match value {
            serde_json::Value::Null => Ok(ValueNode::Absent),
            scalar @ (serde_json::Value::Bool(_)
            | serde_json::Value::Number(_)
            | serde_json::Value::String(_)) => {
                Ok(ValueNode::PlainScalar(Bind::new(BindValue::from_json(scalar))))
            }
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(Self::classify)
                .collect::<SqlResult<Vec<_>>>()
                .map(ValueNode::Sequence),
            serde_json::Value::Object(mut map) => {
                if map.len() == 1 {
                    if let Some(marker) = map.keys().next().and_then(|k| Marker::parse(k)) {
                        let payload = map.remove(marker.key()).unwrap_or_default();
                        return marker.classify(payload);
                    }
                }
                map.into_iter()
                    .map(|(k, v)| -> SqlResult<(String, ValueNode)> {
                        Ok((k, Self::classify(v)?))
                    })
                    .collect::<SqlResult<BTreeMap<_, _>>>()
                    .map(ValueNode::AssignmentMap)
            }
        }
    }
}

impl TryFrom<serde_json::Value> for ValueNode {
    type Error = SqlError;

    fn try_from(value: serde_json::Value) -> SqlResult<Self> {
        Self::classify(value)
    }
}

/// Single-key objects with a special meaning.
#[derive(Debug, Clone, Copy)]
enum Marker {
    Json,
    Ident,
    Literal,
    Value,
}

impl Marker {
    fn parse(key: &str) -> Option<Self> {
        match key {
            "-json" => Some(Marker::Json),
            "-ident" => Some(Marker::Ident),
            "-literal" => Some(Marker::Literal),
            "-value" => Some(Marker::Value),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Marker::Json => "-json",
            Marker::Ident => "-ident",
            Marker::Literal => "-literal",
            Marker::Value => "-value",
        }
    }

    fn classify(self, payload: serde_json::Value) -> SqlResult<ValueNode> {
        match (self, payload) {
            (Marker::Json, payload) => Ok(ValueNode::JsonScalar(payload)),
            (Marker::Value, payload) => Ok(ValueNode::PlainScalar(Bind::new(
                BindValue::from_json(payload),
            ))),
            (Marker::Ident, serde_json::Value::String(name)) => Ok(ValueNode::Identifier(name)),
            (Marker::Literal, serde_json::Value::String(sql)) => Ok(ValueNode::LiteralSql(sql)),
            (Marker::Literal, serde_json::Value::Array(items)) => {
                let mut items = items.into_iter();
                match items.next() {
                    Some(serde_json::Value::String(sql)) => Ok(ValueNode::LiteralSqlWithBinds(
                        sql,
                        items.map(|v| Bind::new(BindValue::from_json(v))).collect(),
                    )),
                    Some(other) => Err(SqlError::unsupported(self.key(), json_kind(&other))),
                    None => Err(SqlError::unsupported(self.key(), "empty array")),
                }
            }
            (_, other) => Err(SqlError::unsupported(self.key(), json_kind(&other))),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl From<&str> for ValueNode {
    fn from(v: &str) -> Self {
        ValueNode::PlainScalar(Bind::from(v))
    }
}

impl From<String> for ValueNode {
    fn from(v: String) -> Self {
        ValueNode::PlainScalar(Bind::from(v))
    }
}

impl From<Bind> for ValueNode {
    fn from(v: Bind) -> Self {
        ValueNode::PlainScalar(v)
    }
}

impl From<BindValue> for ValueNode {
    fn from(v: BindValue) -> Self {
        ValueNode::PlainScalar(Bind::new(v))
    }
}

macro_rules! impl_from_bind {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ValueNode {
                fn from(v: $ty) -> Self {
                    ValueNode::PlainScalar(Bind::from(v))
                }
            }
        )*
    };
}

impl_from_bind!(
    bool,
    i16,
    i32,
    i64,
    u32,
    f32,
    f64,
    uuid::Uuid,
    chrono::DateTime<chrono::Utc>,
    chrono::NaiveDateTime,
    chrono::NaiveDate,
);

impl<T: Into<ValueNode>> From<Option<T>> for ValueNode {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ValueNode::Absent)
    }
}

impl<T: Into<ValueNode>> From<Vec<T>> for ValueNode {
    fn from(v: Vec<T>) -> Self {
        ValueNode::seq(v)
    }
}

impl<T: Into<ValueNode>, const N: usize> From<[T; N]> for ValueNode {
    fn from(v: [T; N]) -> Self {
        ValueNode::seq(v)
    }
}

impl From<BTreeMap<String, ValueNode>> for ValueNode {
    fn from(v: BTreeMap<String, ValueNode>) -> Self {
        ValueNode::AssignmentMap(v)
    }
}
