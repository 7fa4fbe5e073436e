//! Boolean expression compiler shared by `WHERE` and `HAVING`.
//!
//! - mapping: every entry is a condition, joined with `AND` in key order
//! - nested groups are parenthesized when they hold more than one condition
//! - sequence: every element is a condition, joined with `OR`
//! - `-and` / `-or` keys: explicit groups over a sequence or mapping
//! - `-not` key: negation of the nested condition
//! - column values:
//!   - scalar → `"c" = ?`
//!   - absent → `"c" IS NULL`
//!   - sequence → `("c" = ? OR "c" = ?)`
//!   - literal → `"c" <literal>`
//!   - operator map → `{"<": 5, "-in": [1, 2]}`

use super::BaseBuilder;
use crate::error::{SqlError, SqlResult};
use crate::fragment::Fragment;
use crate::value::ValueNode;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Logic {
    And,
    Or,
}

impl Logic {
    fn keyword(self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }
}

impl BaseBuilder {
    /// Compile a boolean expression (without the `WHERE` keyword).
    ///
    /// `context` names the clause in errors (`"where"`, `"having"`). An absent
    /// value or empty mapping compiles to an empty fragment.
    pub fn where_clause(&self, node: &ValueNode, context: &str) -> SqlResult<Fragment> {
        match node {
            ValueNode::Absent => Ok(Fragment::new()),
            ValueNode::AssignmentMap(map) => self.map_conditions(map, Logic::And, false, context),
            ValueNode::Sequence(items) => self.sequence_conditions(items, Logic::Or, false, context),
            ValueNode::LiteralSql(sql) => Ok(Fragment::raw(sql.as_str())),
            ValueNode::LiteralSqlWithBinds(sql, binds) => {
                Ok(Fragment::with_binds(sql.as_str(), binds.clone()))
            }
            other => Err(SqlError::unsupported(context, other.shape())),
        }
    }

    /// Conditions of an explicit group.
    fn nested(&self, node: &ValueNode, logic: Logic, wrap: bool, context: &str) -> SqlResult<Fragment> {
        match node {
            ValueNode::AssignmentMap(map) => self.map_conditions(map, logic, wrap, context),
            ValueNode::Sequence(items) => self.sequence_conditions(items, logic, wrap, context),
            other => self.where_clause(other, context),
        }
    }

    fn map_conditions(
        &self,
        map: &BTreeMap<String, ValueNode>,
        logic: Logic,
        wrap: bool,
        context: &str,
    ) -> SqlResult<Fragment> {
        let parts = map
            .iter()
            .map(|(key, value)| self.entry(key, value, context))
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(self.combine(parts, logic, wrap))
    }

    fn sequence_conditions(
        &self,
        items: &[ValueNode],
        logic: Logic,
        wrap: bool,
        context: &str,
    ) -> SqlResult<Fragment> {
        let parts = items
            .iter()
            .map(|item| match item {
                // A mapping inside a sequence is one AND group.
                ValueNode::AssignmentMap(map) => self.map_conditions(map, Logic::And, true, context),
                ValueNode::Sequence(inner) => {
                    self.sequence_conditions(inner, Logic::Or, true, context)
                }
                other => self.where_clause(other, context),
            })
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(self.combine(parts, logic, wrap))
    }

    /// Join non-empty parts. With `wrap`, two or more parts are parenthesized.
    fn combine(&self, parts: Vec<Fragment>, logic: Logic, wrap: bool) -> Fragment {
        let parts: Vec<Fragment> = parts.into_iter().filter(|p| !p.is_empty()).collect();
        let several = parts.len() > 1;
        let sep = format!(" {} ", self.keyword(logic.keyword()));
        let joined = Fragment::join(parts, &sep);
        if wrap && several {
            joined.parenthesized()
        } else {
            joined
        }
    }

    fn entry(&self, key: &str, value: &ValueNode, context: &str) -> SqlResult<Fragment> {
        if let Some(op) = key.strip_prefix('-') {
            return match op.to_ascii_lowercase().as_str() {
                "and" => self.nested(value, Logic::And, true, context),
                "or" => self.nested(value, Logic::Or, true, context),
                "not" => {
                    let inner = self.nested(value, Logic::And, false, context)?;
                    if inner.is_empty() {
                        return Ok(inner);
                    }
                    let mut out = Fragment::raw(self.keyword("NOT"));
                    out.push(" ");
                    out.push_fragment(inner.parenthesized());
                    Ok(out)
                }
                _ => Err(SqlError::unsupported(context, format!("operator {key}"))),
            };
        }
        self.column_condition(key, value, context)
    }

    fn column_condition(&self, column: &str, value: &ValueNode, context: &str) -> SqlResult<Fragment> {
        let quoted = self.quote(column)?;
        match value {
            ValueNode::Absent => Ok(Fragment::raw(format!(
                "{quoted} {}",
                self.keyword("IS NULL")
            ))),
            ValueNode::LiteralSql(sql) => Ok(Fragment::raw(format!("{quoted} {sql}"))),
            ValueNode::LiteralSqlWithBinds(sql, binds) => {
                Ok(Fragment::with_binds(format!("{quoted} {sql}"), binds.clone()))
            }
            ValueNode::Sequence(items) => {
                if items.is_empty() {
                    return Ok(Fragment::raw("0=1"));
                }
                let parts = items
                    .iter()
                    .map(|item| self.column_condition(column, item, context))
                    .collect::<SqlResult<Vec<_>>>()?;
                Ok(self.combine(parts, Logic::Or, true))
            }
            ValueNode::AssignmentMap(ops) => {
                let parts = ops
                    .iter()
                    .map(|(op, operand)| self.operator(&quoted, op, operand, context))
                    .collect::<SqlResult<Vec<_>>>()?;
                Ok(self.combine(parts, Logic::And, true))
            }
            ValueNode::AliasPair(..) => Err(SqlError::unsupported(context, value.shape())),
            scalar => self.binary(&quoted, "=", scalar, context),
        }
    }

    fn binary(&self, quoted: &str, op: &str, operand: &ValueNode, context: &str) -> SqlResult<Fragment> {
        let mut out = Fragment::raw(format!("{quoted} {} ", self.keyword(op)));
        out.push_fragment(self.value(operand, context)?);
        Ok(out)
    }

    fn operator(&self, quoted: &str, op: &str, operand: &ValueNode, context: &str) -> SqlResult<Fragment> {
        let normalized = op.trim_start_matches('-').to_ascii_lowercase().replace('_', " ");
        match normalized.as_str() {
            "=" | "eq" if operand.is_absent() => {
                Ok(Fragment::raw(format!("{quoted} {}", self.keyword("IS NULL"))))
            }
            "!=" | "<>" | "ne" if operand.is_absent() => {
                Ok(Fragment::raw(format!("{quoted} {}", self.keyword("IS NOT NULL"))))
            }
            "=" | "eq" => self.binary(quoted, "=", operand, context),
            "!=" | "<>" | "ne" => self.binary(quoted, "!=", operand, context),
            "<" | ">" | "<=" | ">=" | "like" | "ilike" | "not like" | "not ilike" => {
                self.binary(quoted, &normalized, operand, context)
            }
            "in" | "not in" => self.in_list(quoted, &normalized, operand, context),
            "between" | "not between" => self.between(quoted, &normalized, operand, context),
            _ => Err(SqlError::unsupported(context, format!("operator {op}"))),
        }
    }

    fn in_list(&self, quoted: &str, op: &str, operand: &ValueNode, context: &str) -> SqlResult<Fragment> {
        let negated = op == "not in";
        let values = match operand {
            ValueNode::Sequence(items) if items.is_empty() => {
                return Ok(Fragment::raw(if negated { "1=1" } else { "0=1" }));
            }
            ValueNode::Sequence(items) => items
                .iter()
                .map(|item| match item {
                    ValueNode::Sequence(_) => Err(SqlError::unsupported(context, "nested sequence")),
                    other => self.value(other, context),
                })
                .collect::<SqlResult<Vec<_>>>()
                .map(|parts| Fragment::join(parts, ", "))?,
            ValueNode::LiteralSql(_) | ValueNode::LiteralSqlWithBinds(..) | ValueNode::PlainScalar(_) => {
                self.value(operand, context)?
            }
            other => return Err(SqlError::unsupported(context, other.shape())),
        };
        let mut out = Fragment::raw(format!("{quoted} {} (", self.keyword(op)));
        out.push_fragment(values);
        out.push(")");
        Ok(out)
    }

    fn between(&self, quoted: &str, op: &str, operand: &ValueNode, context: &str) -> SqlResult<Fragment> {
        let mut out = Fragment::raw(format!("{quoted} {} ", self.keyword(op)));
        match operand {
            ValueNode::Sequence(items) if items.len() == 2 => {
                out.push_fragment(self.value(&items[0], context)?);
                out.push(&format!(" {} ", self.keyword("AND")));
                out.push_fragment(self.value(&items[1], context)?);
            }
            ValueNode::LiteralSql(_) | ValueNode::LiteralSqlWithBinds(..) => {
                out.push_fragment(self.value(operand, context)?);
            }
            other => {
                return Err(SqlError::unsupported(
                    context,
                    format!("{} as between bounds", other.shape()),
                ));
            }
        }
        Ok(out)
    }
}
