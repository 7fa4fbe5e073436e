use super::BaseBuilder;
use crate::error::{SqlError, SqlResult};
use crate::fragment::Fragment;
use crate::value::ValueNode;

#[derive(Debug, Clone, Copy)]
enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn parse(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "-asc" => Some(Direction::Asc),
            "-desc" => Some(Direction::Desc),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl BaseBuilder {
    /// Compile an `ORDER BY` body (without the keyword).
    ///
    /// Names are quoted, literals pass through, sequences are comma-joined and
    /// `{"-asc": x}` / `{"-desc": x}` add a direction to every item of `x`.
    pub fn order_by(&self, node: &ValueNode) -> SqlResult<Fragment> {
        self.order_items(node, None)
    }

    fn order_items(&self, node: &ValueNode, direction: Option<Direction>) -> SqlResult<Fragment> {
        match node {
            ValueNode::Absent => Ok(Fragment::new()),
            ValueNode::Sequence(items) => {
                let parts = items
                    .iter()
                    .map(|item| self.order_items(item, direction))
                    .collect::<SqlResult<Vec<_>>>()?;
                Ok(Fragment::join(parts.into_iter().filter(|p| !p.is_empty()), ", "))
            }
            ValueNode::AssignmentMap(map) => {
                let mut entries = map.iter();
                let (Some((key, inner)), None) = (entries.next(), entries.next()) else {
                    return Err(SqlError::unsupported("order_by", "mapping without exactly one key"));
                };
                match (Direction::parse(key), direction) {
                    (Some(dir), None) => self.order_items(inner, Some(dir)),
                    (Some(_), Some(_)) => {
                        Err(SqlError::unsupported("order_by", "nested direction"))
                    }
                    (None, _) => Err(SqlError::unsupported("order_by", format!("key {key}"))),
                }
            }
            item => {
                let mut out = self.order_item(item)?;
                if let Some(dir) = direction {
                    out.push(" ");
                    out.push(&self.keyword(dir.keyword()));
                }
                Ok(out)
            }
        }
    }

    fn order_item(&self, item: &ValueNode) -> SqlResult<Fragment> {
        if let Some(name) = item.as_name() {
            return self.quote(name).map(Fragment::raw);
        }
        match item {
            ValueNode::LiteralSql(sql) => Ok(Fragment::raw(sql.as_str())),
            ValueNode::LiteralSqlWithBinds(sql, binds) => {
                Ok(Fragment::with_binds(sql.as_str(), binds.clone()))
            }
            other => Err(SqlError::unsupported("order_by", other.shape())),
        }
    }
}
