use super::PgAbstract;
use crate::bind::Bind;
use crate::error::{SqlError, SqlResult};
use crate::fragment::Fragment;
use crate::value::ValueNode;

/// Clauses that may follow the `WHERE` of a select.
///
/// [`ValueNode::Absent`] and `None` leave a clause out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectOptions {
    pub group_by: ValueNode,
    pub having: ValueNode,
    pub order_by: ValueNode,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub for_clause: ValueNode,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `GROUP BY`: a sequence of columns or literal SQL.
    pub fn group_by(mut self, group_by: impl Into<ValueNode>) -> Self {
        self.group_by = group_by.into();
        self
    }

    /// Set `HAVING`, using the `WHERE` grammar.
    pub fn having(mut self, having: impl Into<ValueNode>) -> Self {
        self.having = having.into();
        self
    }

    pub fn order_by(mut self, order_by: impl Into<ValueNode>) -> Self {
        self.order_by = order_by.into();
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set `FOR`: the scalar `"update"` or literal SQL.
    pub fn for_clause(mut self, for_clause: impl Into<ValueNode>) -> Self {
        self.for_clause = for_clause.into();
        self
    }

    /// Shorthand for `FOR UPDATE`.
    pub fn for_update(self) -> Self {
        self.for_clause("update")
    }

    /// Check whether no clause is set.
    pub fn is_empty(&self) -> bool {
        self.group_by.is_absent()
            && self.having.is_absent()
            && self.order_by.is_absent()
            && self.limit.is_none()
            && self.offset.is_none()
            && self.for_clause.is_absent()
    }
}

impl TryFrom<&ValueNode> for SelectOptions {
    type Error = SqlError;

    /// Reads `group_by`, `having`, `order_by`, `limit`, `offset` and `for`;
    /// other keys are ignored.
    fn try_from(node: &ValueNode) -> SqlResult<Self> {
        let ValueNode::AssignmentMap(map) = node else {
            return Err(SqlError::unsupported("select options", node.shape()));
        };
        let get = |key: &str| map.get(key).cloned().unwrap_or_default();
        Ok(Self {
            group_by: get("group_by"),
            having: get("having"),
            order_by: get("order_by"),
            limit: integer(map.get("limit"), "limit")?,
            offset: integer(map.get("offset"), "offset")?,
            for_clause: get("for"),
        })
    }
}

fn integer(node: Option<&ValueNode>, context: &str) -> SqlResult<Option<i64>> {
    match node {
        None | Some(ValueNode::Absent) => Ok(None),
        Some(ValueNode::PlainScalar(bind)) if !bind.is_json() => bind
            .value()
            .as_int()
            .map(Some)
            .ok_or_else(|| SqlError::unsupported(context, format!("non-integer {}", bind.value()))),
        Some(other) => Err(SqlError::unsupported(context, other.shape())),
    }
}

/// The trailing argument of a select.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectTail {
    /// Passed straight to the base `ORDER BY` compiler.
    OrderBy(ValueNode),
    Options(SelectOptions),
}

impl From<SelectOptions> for SelectTail {
    fn from(options: SelectOptions) -> Self {
        SelectTail::Options(options)
    }
}

impl TryFrom<&ValueNode> for SelectTail {
    type Error = SqlError;

    /// A mapping is an options set unless one of its keys starts with `-asc`
    /// or `-desc`, which marks a legacy order-by value.
    fn try_from(node: &ValueNode) -> SqlResult<Self> {
        match node {
            ValueNode::AssignmentMap(map) if !map.keys().any(|k| is_direction(k)) => {
                SelectOptions::try_from(node).map(SelectTail::Options)
            }
            other => Ok(SelectTail::OrderBy(other.clone())),
        }
    }
}

fn is_direction(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("-asc") || key.starts_with("-desc")
}

impl PgAbstract {
    /// Compile the clauses after `WHERE`, in the order `GROUP BY`, `HAVING`,
    /// `ORDER BY`, `LIMIT`, `OFFSET`, `FOR`.
    ///
    /// The result starts with a space unless it is empty.
    pub fn compile_tail(&self, options: &SelectOptions) -> SqlResult<Fragment> {
        let b = &self.base;
        let mut out = Fragment::new();

        if let Some(group_by) = self.group_by(&options.group_by)? {
            b.push_keyword(&mut out, "GROUP BY");
            out.push(&group_by);
        }

        let having = b.where_clause(&options.having, "having")?;
        if !having.is_empty() {
            b.push_keyword(&mut out, "HAVING");
            out.push_fragment(having);
        }

        let order_by = b.order_by(&options.order_by)?;
        if !order_by.is_empty() {
            b.push_keyword(&mut out, "ORDER BY");
            out.push_fragment(order_by);
        }

        if let Some(limit) = options.limit {
            b.push_keyword(&mut out, "LIMIT");
            out.push_bind(Bind::from(limit));
        }
        if let Some(offset) = options.offset {
            b.push_keyword(&mut out, "OFFSET");
            out.push_bind(Bind::from(offset));
        }

        if let Some(lock) = self.for_clause(&options.for_clause)? {
            b.push_keyword(&mut out, "FOR");
            out.push(&lock);
        }

        Ok(out)
    }

    fn group_by(&self, group_by: &ValueNode) -> SqlResult<Option<String>> {
        match group_by {
            ValueNode::Absent => Ok(None),
            ValueNode::Sequence(items) if items.is_empty() => {
                Err(SqlError::unsupported("group_by", "empty sequence"))
            }
            ValueNode::Sequence(items) => {
                let columns = items
                    .iter()
                    .map(|item| match item.as_name() {
                        Some(name) => self.base.quote(name),
                        None => Err(SqlError::unsupported("group_by", item.shape())),
                    })
                    .collect::<SqlResult<Vec<_>>>()?;
                Ok(Some(columns.join(", ")))
            }
            ValueNode::LiteralSql(sql) => Ok(Some(sql.clone())),
            other => Err(SqlError::unsupported("group_by", other.shape())),
        }
    }

    fn for_clause(&self, for_clause: &ValueNode) -> SqlResult<Option<String>> {
        match for_clause {
            ValueNode::Absent => Ok(None),
            ValueNode::LiteralSql(sql) => Ok(Some(sql.clone())),
            ValueNode::Identifier(word) if word == "update" => {
                Ok(Some(self.base.keyword("UPDATE")))
            }
            ValueNode::Identifier(word) => Err(SqlError::DisallowedForValue(word.clone())),
            ValueNode::PlainScalar(bind) if !bind.is_json() => {
                match bind.value().as_text() {
                    Some("update") => Ok(Some(self.base.keyword("UPDATE"))),
                    _ => Err(SqlError::DisallowedForValue(bind.value().to_string())),
                }
            }
            other => Err(SqlError::unsupported("for", other.shape())),
        }
    }
}
