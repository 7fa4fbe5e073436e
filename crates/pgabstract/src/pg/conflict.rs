use super::PgAbstract;
use crate::bind::Bind;
use crate::error::{SqlError, SqlResult};
use crate::fragment::Fragment;
use crate::value::ValueNode;
use std::collections::BTreeMap;

/// What to do when an insert hits a unique violation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictSpec {
    /// `ON CONFLICT DO NOTHING`
    DoNothing,
    /// `ON CONFLICT (<target>) DO UPDATE SET <assignments>`
    DoUpdate {
        target: Vec<String>,
        assignments: BTreeMap<String, ValueNode>,
    },
    /// `ON CONFLICT <sql>`
    Literal(String),
    /// `ON CONFLICT <sql>` with binds for its placeholders.
    LiteralWithBinds(String, Vec<Bind>),
}

impl ConflictSpec {
    /// Create a `DO UPDATE` action.
    pub fn do_update<T, S, I, K, V>(target: T, assignments: I) -> Self
    where
        T: IntoIterator<Item = S>,
        S: Into<String>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ValueNode>,
    {
        ConflictSpec::DoUpdate {
            target: target.into_iter().map(Into::into).collect(),
            assignments: assignments
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Create a literal conflict clause.
    pub fn literal(sql: impl Into<String>) -> Self {
        ConflictSpec::Literal(sql.into())
    }
}

impl TryFrom<&ValueNode> for ConflictSpec {
    type Error = SqlError;

    /// `null` means `DO NOTHING`; `[target, {set}]` means `DO UPDATE`.
    ///
    /// Elements after the mapping are ignored.
    fn try_from(node: &ValueNode) -> SqlResult<Self> {
        match node {
            ValueNode::Absent => Ok(ConflictSpec::DoNothing),
            ValueNode::Sequence(items) => {
                let [target, set, ..] = items.as_slice() else {
                    return Err(SqlError::malformed_conflict(format!(
                        "expected [target, {{set}}], got {} element(s)",
                        items.len()
                    )));
                };
                let ValueNode::AssignmentMap(assignments) = set else {
                    return Err(SqlError::malformed_conflict(format!(
                        "second element must be a mapping, got {}",
                        set.shape()
                    )));
                };
                Ok(ConflictSpec::DoUpdate {
                    target: conflict_target(target)?,
                    assignments: assignments.clone(),
                })
            }
            ValueNode::LiteralSql(sql) => Ok(ConflictSpec::Literal(sql.clone())),
            ValueNode::LiteralSqlWithBinds(sql, binds) => {
                Ok(ConflictSpec::LiteralWithBinds(sql.clone(), binds.clone()))
            }
            other => Err(SqlError::unsupported("on_conflict", other.shape())),
        }
    }
}

/// A single column is treated as a one-element list.
fn conflict_target(target: &ValueNode) -> SqlResult<Vec<String>> {
    let names: Option<Vec<&str>> = match target {
        ValueNode::Sequence(items) => items.iter().map(ValueNode::as_name).collect(),
        other => other.as_name().map(|name| vec![name]),
    };
    names
        .map(|names| names.into_iter().map(str::to_string).collect())
        .ok_or_else(|| SqlError::malformed_conflict("conflict target must be column names"))
}

/// Options of an `INSERT` statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertOptions {
    /// `None` means no `ON CONFLICT` clause at all.
    pub on_conflict: Option<ConflictSpec>,
    /// Emitted as `RETURNING ...` only when set.
    pub returning: Option<ValueNode>,
}

impl InsertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the conflict action.
    pub fn on_conflict(mut self, spec: ConflictSpec) -> Self {
        self.on_conflict = Some(spec);
        self
    }

    /// Shorthand for `ON CONFLICT DO NOTHING`.
    pub fn do_nothing(self) -> Self {
        self.on_conflict(ConflictSpec::DoNothing)
    }

    /// Request a `RETURNING` clause.
    pub fn returning(mut self, returning: impl Into<ValueNode>) -> Self {
        self.returning = Some(returning.into());
        self
    }
}

impl TryFrom<&ValueNode> for InsertOptions {
    type Error = SqlError;

    /// Reads the `on_conflict` and `returning` keys of a mapping.
    ///
    /// A present `on_conflict` key holding `null` is `DO NOTHING`; a missing
    /// key is no conflict clause.
    fn try_from(node: &ValueNode) -> SqlResult<Self> {
        match node {
            ValueNode::Absent => Ok(Self::default()),
            ValueNode::AssignmentMap(map) => Ok(Self {
                on_conflict: map
                    .get("on_conflict")
                    .map(ConflictSpec::try_from)
                    .transpose()?,
                returning: map.get("returning").cloned(),
            }),
            other => Err(SqlError::unsupported("insert options", other.shape())),
        }
    }
}

impl PgAbstract {
    /// Compile the body of an `ON CONFLICT` clause (without the keyword).
    pub fn compile_conflict(&self, spec: Option<&ConflictSpec>) -> SqlResult<Fragment> {
        let b = &self.base;
        match spec {
            None => Ok(Fragment::new()),
            Some(ConflictSpec::DoNothing) => Ok(Fragment::raw(b.keyword("DO NOTHING"))),
            Some(ConflictSpec::Literal(sql)) => Ok(Fragment::raw(sql.as_str())),
            Some(ConflictSpec::LiteralWithBinds(sql, binds)) => {
                Ok(Fragment::with_binds(sql.as_str(), binds.clone()))
            }
            Some(ConflictSpec::DoUpdate {
                target,
                assignments,
            }) => {
                if target.is_empty() {
                    return Err(SqlError::malformed_conflict("empty conflict target"));
                }
                if assignments.is_empty() {
                    return Err(SqlError::malformed_conflict("empty DO UPDATE assignments"));
                }
                let columns = target
                    .iter()
                    .map(|c| b.quote(c))
                    .collect::<SqlResult<Vec<_>>>()?;
                let mut out = Fragment::raw(format!("({})", columns.join(", ")));
                b.push_keyword(&mut out, "DO UPDATE SET");
                out.push_fragment(b.set_entries(assignments, "on_conflict")?);
                Ok(out)
            }
        }
    }
}
