//! Bind values.
//!
//! A [`Bind`] is the value destined for one `?` placeholder. It carries a
//! `json` flag set by the JSON marker; how a flagged value is serialized is up
//! to the execution layer (with the `postgres` feature, `ToSql` encodes it as
//! `json`/`jsonb`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Number;
use std::fmt;
use uuid::Uuid;

#[cfg(feature = "postgres")]
mod to_sql;

/// Scalar payload of a bind.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    LocalTimestamp(NaiveDateTime),
    Date(NaiveDate),
    /// Array value (bound as a single Postgres array parameter).
    Array(Vec<BindValue>),
    /// Structured document; always encoded as JSON.
    Document(serde_json::Value),
}

impl BindValue {
    /// Convert a JSON value into a bind payload.
    ///
    /// Integers that fit in `i64` stay integers, other numbers become floats,
    /// arrays become [`BindValue::Array`] and objects [`BindValue::Document`].
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => BindValue::Null,
            serde_json::Value::Bool(b) => BindValue::Bool(b),
            serde_json::Value::Number(n) => Self::from_number(&n),
            serde_json::Value::String(s) => BindValue::Text(s),
            serde_json::Value::Array(items) => {
                BindValue::Array(items.into_iter().map(Self::from_json).collect())
            }
            object @ serde_json::Value::Object(_) => BindValue::Document(object),
        }
    }

    fn from_number(n: &Number) -> Self {
        match n.as_i64() {
            Some(i) => BindValue::Int(i),
            None => BindValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        }
    }

    /// Render the payload as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            BindValue::Null => serde_json::Value::Null,
            BindValue::Bool(b) => serde_json::Value::Bool(*b),
            BindValue::Int(i) => serde_json::Value::from(*i),
            BindValue::Float(f) => Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            BindValue::Text(s) => serde_json::Value::String(s.clone()),
            BindValue::Uuid(u) => serde_json::Value::String(u.to_string()),
            BindValue::Timestamp(t) => serde_json::Value::String(t.to_rfc3339()),
            BindValue::LocalTimestamp(t) => serde_json::Value::String(t.to_string()),
            BindValue::Date(d) => serde_json::Value::String(d.to_string()),
            BindValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(BindValue::to_json).collect())
            }
            BindValue::Document(doc) => doc.clone(),
        }
    }

    /// The text of a `Text` payload.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            BindValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The value of an `Int` payload.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            BindValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for BindValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindValue::Null => f.write_str("NULL"),
            BindValue::Bool(b) => write!(f, "{b}"),
            BindValue::Int(i) => write!(f, "{i}"),
            BindValue::Float(x) => write!(f, "{x}"),
            BindValue::Text(s) => f.write_str(s),
            BindValue::Uuid(u) => write!(f, "{u}"),
            BindValue::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            BindValue::LocalTimestamp(t) => write!(f, "{t}"),
            BindValue::Date(d) => write!(f, "{d}"),
            BindValue::Array(_) | BindValue::Document(_) => write!(f, "{}", self.to_json()),
        }
    }
}

/// A positional parameter paired with one `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Bind {
    value: BindValue,
    json: bool,
}

impl Bind {
    /// Create a plain bind.
    pub fn new(value: impl Into<BindValue>) -> Self {
        Self {
            value: value.into(),
            json: false,
        }
    }

    /// Create a bind flagged for JSON encoding.
    pub fn json(value: serde_json::Value) -> Self {
        Self {
            value: BindValue::Document(value),
            json: true,
        }
    }

    /// A `NULL` bind.
    pub fn null() -> Self {
        Self::new(BindValue::Null)
    }

    /// The bound payload.
    pub fn value(&self) -> &BindValue {
        &self.value
    }

    /// Whether the JSON marker produced this bind.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for BindValue {
                fn from(v: $ty) -> Self {
                    BindValue::$variant(v $(as $cast)?)
                }
            }

            impl From<$ty> for Bind {
                fn from(v: $ty) -> Self {
                    Bind::new(v)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int,
    u32 => Int as i64,
    f32 => Float as f64,
    f64 => Float,
    String => Text,
    Uuid => Uuid,
    DateTime<Utc> => Timestamp,
    NaiveDateTime => LocalTimestamp,
    NaiveDate => Date,
}

impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        BindValue::Text(v.to_string())
    }
}

impl From<&str> for Bind {
    fn from(v: &str) -> Self {
        Bind::new(v)
    }
}

impl From<BindValue> for Bind {
    fn from(value: BindValue) -> Self {
        Bind::new(value)
    }
}

impl<T: Into<BindValue>> From<Option<T>> for BindValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(BindValue::Null)
    }
}

impl<T: Into<BindValue>> From<Vec<T>> for BindValue {
    fn from(v: Vec<T>) -> Self {
        BindValue::Array(v.into_iter().map(Into::into).collect())
    }
}
