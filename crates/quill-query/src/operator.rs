use bson::Bson;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::expression::ExpressionNode;
use crate::wildcard;

/// Comparison operator of a compiled filter node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
}

impl CompareOp {
    /// The `$`-prefixed key this operator compiles to.
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "$eq",
            CompareOp::Ne => "$ne",
            CompareOp::Gt => "$gt",
            CompareOp::Gte => "$gte",
            CompareOp::Lt => "$lt",
            CompareOp::Lte => "$lte",
            CompareOp::In => "$in",
            CompareOp::Nin => "$nin",
        }
    }
}

/// SQL-flavored operator token as written at the end of a composite key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlOperator {
    Lt,
    Lte,
    Gt,
    Gte,
    /// `!=` or `<>`
    NotEqual,
    Equal,
    In,
    Like,
}

impl SqlOperator {
    /// Recognize a trailing operator token. Tokens are case-sensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "<" => SqlOperator::Lt,
            "<=" => SqlOperator::Lte,
            ">" => SqlOperator::Gt,
            ">=" => SqlOperator::Gte,
            "!=" | "<>" => SqlOperator::NotEqual,
            "=" => SqlOperator::Equal,
            "IN" => SqlOperator::In,
            "LIKE" => SqlOperator::Like,
            _ => return None,
        };
        Some(op)
    }
}

/// A logical-grouping key (`OR` / `AND`, any case).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Or,
    And,
}

/// Classification of a single condition-map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKey<'a> {
    /// Plain field name: implicit equality.
    Field(&'a str),
    /// `"<field> <op>"` or `"<field> NOT <op>"`.
    Composite {
        field: &'a str,
        operator: SqlOperator,
        negated: bool,
    },
    Group(GroupKey),
}

impl<'a> OperatorKey<'a> {
    /// Split a key into its field / operator / negation parts.
    ///
    /// The operator is the last space-delimited token; everything before it
    /// is the field. A field ending in the token `NOT` is stripped and the
    /// key is marked negated. Grouping keys must match the whole key.
    pub fn tokenize(key: &'a str) -> Self {
        if key.eq_ignore_ascii_case("or") {
            return OperatorKey::Group(GroupKey::Or);
        }
        if key.eq_ignore_ascii_case("and") {
            return OperatorKey::Group(GroupKey::And);
        }

        let Some((head, tail)) = key.rsplit_once(' ') else {
            return OperatorKey::Field(key);
        };
        if head.is_empty() {
            return OperatorKey::Field(key);
        }
        let Some(operator) = SqlOperator::from_token(tail) else {
            return OperatorKey::Field(key);
        };

        match head.strip_suffix(" NOT") {
            Some(field) => OperatorKey::Composite {
                field,
                operator,
                negated: true,
            },
            None => OperatorKey::Composite {
                field: head,
                operator,
                negated: false,
            },
        }
    }
}

/// Build the expression node for an operator token and its right-hand value.
///
/// Negation is only meaningful for `IN` and `LIKE`; any other negated
/// operator falls back to equality, as does `=`.
pub fn create_expression(
    operator: SqlOperator,
    negated: bool,
    value: Bson,
) -> Result<ExpressionNode, QueryError> {
    let node = match (operator, negated) {
        (SqlOperator::Lt, false) => ExpressionNode::lt(value),
        (SqlOperator::Lte, false) => ExpressionNode::lte(value),
        (SqlOperator::Gt, false) => ExpressionNode::gt(value),
        (SqlOperator::Gte, false) => ExpressionNode::gte(value),
        (SqlOperator::NotEqual, false) => ExpressionNode::ne(value),
        (SqlOperator::In, false) => ExpressionNode::is_in(value),
        (SqlOperator::In, true) => ExpressionNode::not_in(value),
        (SqlOperator::Like, false) => ExpressionNode::Regex(wildcard::to_regex(
            like_pattern(&value)?,
            false,
        )),
        (SqlOperator::Like, true) => ExpressionNode::not(ExpressionNode::Regex(
            wildcard::to_regex(like_pattern(&value)?, true),
        )),
        _ => ExpressionNode::eq(value),
    };
    Ok(node)
}

fn like_pattern(value: &Bson) -> Result<&str, QueryError> {
    match value {
        Bson::String(s) => Ok(s),
        other => Err(QueryError::InvalidOperand {
            operator: "LIKE",
            reason: format!("pattern must be a string, got {:?}", other.element_type()),
        }),
    }
}
