//! `tokio_postgres` parameter encoding for binds.
//!
//! Bind payloads are dynamically typed, so encoding follows the parameter
//! type the server reports for each placeholder. Every delegation goes through
//! `to_sql_checked`, which rejects payloads that do not fit the column type.

use super::{Bind, BindValue};
use bytes::BytesMut;
use std::error::Error;
use tokio_postgres::types::{IsNull, Json, Kind, ToSql, Type, to_sql_checked};

type BoxError = Box<dyn Error + Sync + Send>;

impl ToSql for Bind {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        if self.json {
            return Json(self.value.to_json()).to_sql_checked(ty, out);
        }
        self.value.to_sql(ty, out)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

impl ToSql for BindValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            BindValue::Null => Ok(IsNull::Yes),
            BindValue::Bool(b) => b.to_sql_checked(ty, out),
            BindValue::Int(i) => int_to_sql(*i, ty, out),
            BindValue::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql_checked(ty, out),
                _ => f.to_sql_checked(ty, out),
            },
            BindValue::Text(s) => match *ty {
                Type::JSON | Type::JSONB => Json(s).to_sql_checked(ty, out),
                _ => s.as_str().to_sql_checked(ty, out),
            },
            BindValue::Uuid(u) => u.to_sql_checked(ty, out),
            BindValue::Timestamp(t) => t.to_sql_checked(ty, out),
            BindValue::LocalTimestamp(t) => t.to_sql_checked(ty, out),
            BindValue::Date(d) => d.to_sql_checked(ty, out),
            BindValue::Array(items) => array_to_sql(items, ty, out),
            BindValue::Document(doc) => Json(doc).to_sql_checked(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn int_to_sql(i: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(i)?.to_sql_checked(ty, out),
        Type::INT4 => i32::try_from(i)?.to_sql_checked(ty, out),
        Type::OID => u32::try_from(i)?.to_sql_checked(ty, out),
        Type::FLOAT4 => (i as f32).to_sql_checked(ty, out),
        Type::FLOAT8 => (i as f64).to_sql_checked(ty, out),
        _ => i.to_sql_checked(ty, out),
    }
}

fn array_to_sql(items: &[BindValue], ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    let member = match ty.kind() {
        Kind::Array(member) => member,
        _ if matches!(*ty, Type::JSON | Type::JSONB) => {
            let doc = serde_json::Value::Array(items.iter().map(BindValue::to_json).collect());
            return Json(doc).to_sql_checked(ty, out);
        }
        _ => return Err(format!("cannot bind an array to a parameter of type {ty}").into()),
    };

    match *member {
        Type::BOOL => elements(items, member, |v| match v {
            BindValue::Bool(b) => Some(*b),
            _ => None,
        })?
        .to_sql_checked(ty, out),
        Type::INT2 => elements(items, member, |v| v.as_int().and_then(|i| i16::try_from(i).ok()))?
            .to_sql_checked(ty, out),
        Type::INT4 => elements(items, member, |v| v.as_int().and_then(|i| i32::try_from(i).ok()))?
            .to_sql_checked(ty, out),
        Type::INT8 => elements(items, member, BindValue::as_int)?.to_sql_checked(ty, out),
        Type::FLOAT4 => elements(items, member, |v| match v {
            BindValue::Float(f) => Some(*f as f32),
            BindValue::Int(i) => Some(*i as f32),
            _ => None,
        })?
        .to_sql_checked(ty, out),
        Type::FLOAT8 => elements(items, member, |v| match v {
            BindValue::Float(f) => Some(*f),
            BindValue::Int(i) => Some(*i as f64),
            _ => None,
        })?
        .to_sql_checked(ty, out),
        Type::UUID => elements(items, member, |v| match v {
            BindValue::Uuid(u) => Some(*u),
            _ => None,
        })?
        .to_sql_checked(ty, out),
        Type::TIMESTAMPTZ => elements(items, member, |v| match v {
            BindValue::Timestamp(t) => Some(*t),
            _ => None,
        })?
        .to_sql_checked(ty, out),
        Type::JSON | Type::JSONB => elements(items, member, |v| Some(Json(v.to_json())))?
            .to_sql_checked(ty, out),
        _ => elements(items, member, |v| v.as_text().map(str::to_string))?.to_sql_checked(ty, out),
    }
}

/// Convert array items to one element type; `Null` items become SQL `NULL`.
fn elements<T>(
    items: &[BindValue],
    member: &Type,
    convert: impl Fn(&BindValue) -> Option<T>,
) -> Result<Vec<Option<T>>, BoxError> {
    items
        .iter()
        .map(|item| match item {
            BindValue::Null => Ok(None),
            other => convert(other).map(Some).ok_or_else(|| -> BoxError {
                format!("array element {other} does not fit type {member}").into()
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode(bind: &Bind, ty: &Type) -> Result<BytesMut, BoxError> {
        let mut buf = BytesMut::new();
        bind.to_sql_checked(ty, &mut buf)?;
        Ok(buf)
    }

    #[test]
    fn int_follows_column_width() {
        let bind = Bind::from(5i64);
        assert_eq!(&encode(&bind, &Type::INT4).unwrap()[..], &5i32.to_be_bytes());
        assert_eq!(&encode(&bind, &Type::INT8).unwrap()[..], &5i64.to_be_bytes());
    }

    #[test]
    fn int_overflow_is_rejected() {
        assert!(encode(&Bind::from(70_000i64), &Type::INT2).is_err());
    }

    #[test]
    fn text_into_bool_is_rejected() {
        assert!(encode(&Bind::from("yes"), &Type::BOOL).is_err());
    }

    #[test]
    fn json_flag_encodes_jsonb() {
        let buf = encode(&Bind::json(json!({"a": 1})), &Type::JSONB).unwrap();
        // jsonb binary format: version byte then the text
        assert_eq!(buf[0], 1);
        assert_eq!(&buf[1..], br#"{"a":1}"#);
    }

    #[test]
    fn null_is_sql_null() {
        let mut buf = BytesMut::new();
        let is_null = Bind::null().to_sql_checked(&Type::TEXT, &mut buf).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
    }

    #[test]
    fn text_array_binds_as_array() {
        let bind = Bind::new(vec!["a", "b"]);
        assert!(encode(&bind, &Type::TEXT_ARRAY).is_ok());
        assert!(encode(&bind, &Type::INT4_ARRAY).is_err());
    }
}
