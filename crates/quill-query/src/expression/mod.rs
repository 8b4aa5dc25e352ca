mod base;

use bson::{Bson, Document, doc};
use serde::{Deserialize, Serialize};

use crate::operator::CompareOp;

pub use base::BaseExpression;

/// Logical connective of a [`LogicalGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    And,
    Or,
    Nor,
}

impl LogicalOp {
    /// The reserved key this connective compiles to (`$and`, `$or`, `$nor`).
    pub fn key(self) -> &'static str {
        match self {
            LogicalOp::And => "$and",
            LogicalOp::Or => "$or",
            LogicalOp::Nor => "$nor",
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonValue {
    Literal(Bson),
    /// Compiled in place instead of compared literally.
    Expression(Box<ExpressionNode>),
}

impl From<Bson> for ComparisonValue {
    fn from(value: Bson) -> Self {
        ComparisonValue::Literal(value)
    }
}

impl From<ExpressionNode> for ComparisonValue {
    fn from(node: ExpressionNode) -> Self {
        ComparisonValue::Expression(Box::new(node))
    }
}

/// A regex and its flags, compiled as `$regex` / `$options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexPattern {
    pub pattern: String,
    pub options: String,
}

impl RegexPattern {
    pub fn new(pattern: impl Into<String>, options: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            options: options.into(),
        }
    }
}

/// Ordered children joined by one logical connective.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalGroup {
    pub op: LogicalOp,
    pub children: Vec<BaseExpression>,
}

impl LogicalGroup {
    pub fn new(op: LogicalOp) -> Self {
        Self {
            op,
            children: Vec::new(),
        }
    }

    pub fn push(&mut self, child: BaseExpression) {
        self.children.push(child);
    }

    /// Compile the children into the array stored under the connective key.
    pub(crate) fn compile_children(&self) -> Bson {
        Bson::Array(
            self.children
                .iter()
                .map(|child| Bson::Document(child.compile()))
                .collect(),
        )
    }
}

/// A compiled filter or update node.
///
/// Each variant compiles to a `$`-keyed document; the match in
/// [`ExpressionNode::compile`] is exhaustive so a new operator cannot be
/// added without deciding its document shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    Comparison {
        op: CompareOp,
        value: ComparisonValue,
    },
    Regex(RegexPattern),
    Not(Box<ExpressionNode>),
    Exists(bool),
    Group(LogicalGroup),
    /// Update-only: `{$set: fields}`.
    Set(Document),
}

impl ExpressionNode {
    pub fn compare(op: CompareOp, value: impl Into<ComparisonValue>) -> Self {
        ExpressionNode::Comparison {
            op,
            value: value.into(),
        }
    }

    pub fn eq(value: impl Into<Bson>) -> Self {
        Self::compare(CompareOp::Eq, value.into())
    }

    /// Not-equal. Accepts either a literal or another node via
    /// [`ComparisonValue`].
    pub fn ne(value: impl Into<ComparisonValue>) -> Self {
        Self::compare(CompareOp::Ne, value)
    }

    pub fn gt(value: impl Into<Bson>) -> Self {
        Self::compare(CompareOp::Gt, value.into())
    }

    pub fn gte(value: impl Into<Bson>) -> Self {
        Self::compare(CompareOp::Gte, value.into())
    }

    pub fn lt(value: impl Into<Bson>) -> Self {
        Self::compare(CompareOp::Lt, value.into())
    }

    pub fn lte(value: impl Into<Bson>) -> Self {
        Self::compare(CompareOp::Lte, value.into())
    }

    pub fn is_in(values: impl Into<Bson>) -> Self {
        Self::compare(CompareOp::In, values.into())
    }

    pub fn not_in(values: impl Into<Bson>) -> Self {
        Self::compare(CompareOp::Nin, values.into())
    }

    /// `LIKE` pattern with `%` / `?` wildcards.
    pub fn like(pattern: &str) -> Self {
        ExpressionNode::Regex(crate::wildcard::to_regex(pattern, false))
    }

    pub fn not_like(pattern: &str) -> Self {
        Self::not(ExpressionNode::Regex(crate::wildcard::to_regex(pattern, true)))
    }

    pub fn not(child: ExpressionNode) -> Self {
        ExpressionNode::Not(Box::new(child))
    }

    pub fn exists(should_exist: bool) -> Self {
        ExpressionNode::Exists(should_exist)
    }

    pub fn and(children: Vec<BaseExpression>) -> Self {
        ExpressionNode::Group(LogicalGroup {
            op: LogicalOp::And,
            children,
        })
    }

    pub fn or(children: Vec<BaseExpression>) -> Self {
        ExpressionNode::Group(LogicalGroup {
            op: LogicalOp::Or,
            children,
        })
    }

    pub fn nor(children: Vec<BaseExpression>) -> Self {
        ExpressionNode::Group(LogicalGroup {
            op: LogicalOp::Nor,
            children,
        })
    }

    pub fn set(fields: Document) -> Self {
        ExpressionNode::Set(fields)
    }

    pub fn compile(&self) -> Document {
        match self {
            ExpressionNode::Comparison { op, value } => {
                let value = match value {
                    ComparisonValue::Literal(v) => v.clone(),
                    ComparisonValue::Expression(node) => Bson::Document(node.compile()),
                };
                let mut doc = Document::new();
                doc.insert(op.symbol(), value);
                doc
            }
            ExpressionNode::Regex(re) => {
                let mut doc = doc! { "$regex": re.pattern.as_str() };
                if !re.options.is_empty() {
                    doc.insert("$options", re.options.as_str());
                }
                doc
            }
            ExpressionNode::Not(child) => doc! { "$not": child.compile() },
            ExpressionNode::Exists(b) => doc! { "$exists": *b },
            ExpressionNode::Group(group) => {
                let mut doc = Document::new();
                doc.insert(group.op.key(), group.compile_children());
                doc
            }
            ExpressionNode::Set(fields) => doc! { "$set": fields.clone() },
        }
    }
}
