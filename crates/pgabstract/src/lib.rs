//! # pgabstract
//!
//! A PostgreSQL clause compiler: structured query descriptions in, SQL text
//! with `?` placeholders and an ordered bind list out.
//!
//! ## Features
//!
//! - **PostgreSQL clauses**: `ON CONFLICT`, `RETURNING`, `JOIN ... ON (...)`,
//!   `GROUP BY`/`HAVING`/`LIMIT`/`OFFSET`/`FOR UPDATE`
//! - **Closed value tree**: every input is a [`ValueNode`], built directly or
//!   classified once from `serde_json::Value`
//! - **JSON marker**: [`ValueNode::JsonScalar`] binds a value flagged for JSON
//!   encoding
//! - **Bind order**: `binds[i]` always belongs to the `i`-th `?`
//! - **tokio-postgres bridge** (feature `postgres`): `ToSql` for [`Bind`] and
//!   `$n` placeholder numbering
//!
//! ## Example
//!
//! ```
//! use pgabstract::prelude::*;
//! use serde_json::json;
//!
//! let pg = PgAbstract::new();
//!
//! // INSERT ... ON CONFLICT
//! let values = ValueNode::classify(json!({"a": "b"})).unwrap();
//! let options = InsertOptions::try_from(
//!     &ValueNode::classify(json!({"on_conflict": [["a"], {"a": "c"}]})).unwrap(),
//! )
//! .unwrap();
//! let q = pg.insert("t", &values, &options).unwrap();
//! assert_eq!(
//!     q.sql,
//!     r#"INSERT INTO "t" ("a") VALUES (?) ON CONFLICT ("a") DO UPDATE SET "a" = ?"#
//! );
//! assert_eq!(q.binds, vec![Bind::from("b"), Bind::from("c")]);
//!
//! // SELECT ... JOIN ... GROUP BY ... HAVING
//! let source = Source::table("foo").join(JoinSpec::new("bar").on("foo_id", "id"));
//! let tail: SelectTail = SelectOptions::new()
//!     .group_by(ValueNode::seq(["bar.kind"]))
//!     .having(ValueNode::map([("bar.kind", "x")]))
//!     .into();
//! let q = pg
//!     .select(&source, &ValueNode::seq(["bar.kind"]), &ValueNode::Absent, Some(&tail))
//!     .unwrap();
//! assert_eq!(
//!     q.sql,
//!     r#"SELECT "bar"."kind" FROM "foo" JOIN "bar" ON ("bar"."foo_id" = "foo"."id") GROUP BY "bar"."kind" HAVING "bar"."kind" = ?"#
//! );
//! ```

pub mod base;
pub mod bind;
pub mod config;
pub mod error;
pub mod fragment;
pub mod ident;
pub mod pg;
pub mod prelude;
pub mod value;

pub use base::{BaseBuilder, TableRef};
pub use bind::{Bind, BindValue};
pub use config::{Config, KeywordCase};
pub use error::{SqlError, SqlResult};
pub use fragment::{BuiltQuery, Fragment};
pub use ident::{Ident, IdentPart};
pub use pg::{
    ConflictSpec, InsertOptions, JoinKind, JoinSpec, PgAbstract, SelectOptions, SelectTail,
    Source,
};
pub use value::{Shape, ValueNode};
