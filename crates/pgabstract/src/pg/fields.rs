use super::PgAbstract;
use crate::error::{SqlError, SqlResult};
use crate::fragment::Fragment;
use crate::value::ValueNode;

impl PgAbstract {
    /// Compile a select field list.
    ///
    /// In a sequence, every element is a name, an alias pair (`["name", "alias"]`
    /// or [`ValueNode::AliasPair`]) or literal SQL whose binds are kept in order.
    /// Any other value is an opaque field expression handled by the base
    /// builder, e.g. `"*"`.
    pub fn compile_fields(&self, fields: &ValueNode) -> SqlResult<Fragment> {
        match fields {
            ValueNode::Sequence(items) => {
                let parts = items
                    .iter()
                    .map(|item| self.field(item))
                    .collect::<SqlResult<Vec<_>>>()?;
                Ok(Fragment::join(parts, ", "))
            }
            ValueNode::AliasPair(name, alias) => self.aliased(name, alias),
            other => self.base.fields(other),
        }
    }

    fn field(&self, item: &ValueNode) -> SqlResult<Fragment> {
        match item {
            ValueNode::AliasPair(name, alias) => self.aliased(name, alias),
            ValueNode::Sequence(pair) => match pair.as_slice() {
                [name, alias, ..] => match (name.as_name(), alias.as_name()) {
                    (Some(name), Some(alias)) => self.aliased(name, alias),
                    _ => Err(SqlError::MalformedAlias(format!(
                        "expected [name, alias], got [{}, {}]",
                        name.shape(),
                        alias.shape()
                    ))),
                },
                _ => Err(SqlError::MalformedAlias(format!(
                    "expected [name, alias], got {} element(s)",
                    pair.len()
                ))),
            },
            ValueNode::LiteralSql(sql) => Ok(Fragment::raw(sql.as_str())),
            ValueNode::LiteralSqlWithBinds(sql, binds) => {
                Ok(Fragment::with_binds(sql.as_str(), binds.clone()))
            }
            other => match other.as_name() {
                Some(name) => self.base.quote(name).map(Fragment::raw),
                None => Err(SqlError::unsupported("fields", other.shape())),
            },
        }
    }

    fn aliased(&self, name: &str, alias: &str) -> SqlResult<Fragment> {
        Ok(Fragment::raw(format!(
            "{} {} {}",
            self.base.quote(name)?,
            self.base.keyword("AS"),
            self.base.quote(alias)?
        )))
    }
}
