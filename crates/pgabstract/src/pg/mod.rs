//! PostgreSQL clause compilers and statement entry points.
//!
//! [`PgAbstract`] extends [`BaseBuilder`] with:
//!
//! - field lists with `name AS alias` pairs and literal SQL (`fields`)
//! - `FROM` lists with `JOIN ... ON (...)` descriptors (`join`)
//! - `INSERT ... ON CONFLICT` (`conflict`)
//! - `GROUP BY`, `HAVING`, `LIMIT`, `OFFSET` and `FOR` after a select (`tail`)
//!
//! Everything else is delegated to the base builder.
//!
//! # Example
//!
//! ```
//! use pgabstract::prelude::*;
//!
//! let pg = PgAbstract::new();
//! let q = pg
//!     .insert(
//!         "t",
//!         &ValueNode::map([("a", "b")]),
//!         &InsertOptions::new().do_nothing(),
//!     )
//!     .unwrap();
//! assert_eq!(q.sql, r#"INSERT INTO "t" ("a") VALUES (?) ON CONFLICT DO NOTHING"#);
//! ```

mod conflict;
mod fields;
mod join;
mod tail;

pub use conflict::{ConflictSpec, InsertOptions};
pub use join::{JoinKind, JoinSpec, Source};
pub use tail::{SelectOptions, SelectTail};

use crate::base::BaseBuilder;
use crate::config::Config;
use crate::error::SqlResult;
use crate::fragment::{BuiltQuery, Fragment};
use crate::value::ValueNode;

/// PostgreSQL statement builder.
///
/// Holds only an immutable [`Config`]; cloning is cheap and a shared
/// reference can be used from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct PgAbstract {
    base: BaseBuilder,
}

impl PgAbstract {
    /// Create a builder with PostgreSQL defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with a custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            base: BaseBuilder::new(config),
        }
    }

    /// The underlying generic builder.
    pub fn base(&self) -> &BaseBuilder {
        &self.base
    }

    pub fn config(&self) -> &Config {
        self.base.config()
    }

    /// Build an `INSERT` statement.
    ///
    /// `RETURNING` is only emitted when [`InsertOptions::returning`] is set,
    /// with or without a conflict clause.
    pub fn insert(
        &self,
        table: &str,
        values: &ValueNode,
        options: &InsertOptions,
    ) -> SqlResult<BuiltQuery> {
        let mut out = self.base.insert_head(table, values)?;

        let conflict = self.compile_conflict(options.on_conflict.as_ref())?;
        if !conflict.is_empty() {
            self.base.push_keyword(&mut out, "ON CONFLICT");
            out.push_fragment(conflict);
        }

        self.base.push_returning(&mut out, options.returning.as_ref())?;
        Ok(finish("insert", out.into()))
    }

    /// Build a `SELECT` statement.
    ///
    /// `tail` is either a legacy order-by value or a set of [`SelectOptions`].
    pub fn select(
        &self,
        source: &Source,
        fields: &ValueNode,
        where_clause: &ValueNode,
        tail: Option<&SelectTail>,
    ) -> SqlResult<BuiltQuery> {
        let fields = self.compile_fields(fields)?;
        let from = self.compile_from(source)?;
        let where_clause = self.base.where_clause(where_clause, "where")?;
        let tail = match tail {
            None => Fragment::new(),
            Some(SelectTail::OrderBy(order)) => self.legacy_order_by(order)?,
            Some(SelectTail::Options(options)) => self.compile_tail(options)?,
        };
        Ok(finish(
            "select",
            self.base.select_statement(fields, &from, where_clause, tail),
        ))
    }

    /// Build an `UPDATE` statement.
    pub fn update(
        &self,
        table: &str,
        set: &ValueNode,
        where_clause: &ValueNode,
        returning: Option<&ValueNode>,
    ) -> SqlResult<BuiltQuery> {
        let query = self.base.update(table, set, where_clause, returning)?;
        Ok(finish("update", query))
    }

    /// Build a `DELETE` statement.
    pub fn delete(
        &self,
        table: &str,
        where_clause: &ValueNode,
        returning: Option<&ValueNode>,
    ) -> SqlResult<BuiltQuery> {
        let query = self.base.delete(table, where_clause, returning)?;
        Ok(finish("delete", query))
    }

    fn legacy_order_by(&self, order: &ValueNode) -> SqlResult<Fragment> {
        let body = self.base.order_by(order)?;
        let mut out = Fragment::new();
        if !body.is_empty() {
            self.base.push_keyword(&mut out, "ORDER BY");
            out.push_fragment(body);
        }
        Ok(out)
    }
}

fn finish(statement: &'static str, query: BuiltQuery) -> BuiltQuery {
    #[cfg(feature = "tracing")]
    tracing::debug!(
        target: "pgabstract.sql",
        statement,
        sql = %query.sql,
        binds = query.binds.len(),
        "compiled statement"
    );
    #[cfg(not(feature = "tracing"))]
    let _ = statement;
    query
}
