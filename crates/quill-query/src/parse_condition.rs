use bson::Bson;
use tracing::trace;

use crate::condition::{ConditionEntry, ConditionMap, Operand, RawCondition};
use crate::config::ParserConfig;
use crate::error::QueryError;
use crate::expression::{BaseExpression, ExpressionNode, LogicalGroup};
use crate::operator::{OperatorKey, create_expression};

/// Parse conditions with the default configuration.
///
/// See [`ConditionParser::parse`].
pub fn parse_conditions(conditions: impl Into<RawCondition>) -> Result<BaseExpression, QueryError> {
    ConditionParser::default().parse(conditions)
}

/// Turns SQL-flavored condition maps into a [`BaseExpression`] tree.
///
/// Key grammar, checked in this order:
/// - positional entry: parsed recursively, added to the `$and` group
/// - pre-built node: stored verbatim under its key
/// - `OR` / `AND` (whole key, any case): nested conditions added to a logical
///   group, mapped through [`crate::GroupKeyPolicy`]
/// - `"<field> <op>"` / `"<field> NOT <op>"`: operator comparison
/// - anything else: implicit `$eq`
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionParser {
    config: ParserConfig,
}

impl ConditionParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn parse(&self, conditions: impl Into<RawCondition>) -> Result<BaseExpression, QueryError> {
        match conditions.into() {
            RawCondition::Built(expr) => Ok(expr),
            RawCondition::Map(map) => self.parse_map(map),
        }
    }

    fn parse_map(&self, map: ConditionMap) -> Result<BaseExpression, QueryError> {
        let mut base = BaseExpression::new();

        for entry in map.into_entries() {
            let (key, operand) = match entry {
                ConditionEntry::Nested(sub) => {
                    base.add_to_and(self.parse(sub)?);
                    continue;
                }
                ConditionEntry::Keyed(key, Operand::Node(node)) => {
                    base.add(key, node);
                    continue;
                }
                ConditionEntry::Keyed(key, Operand::Value(value)) => (key, KeyedValue::Value(value)),
                ConditionEntry::Keyed(key, Operand::Conditions(conditions)) => {
                    (key, KeyedValue::Conditions(conditions))
                }
            };

            let token = OperatorKey::tokenize(&key);
            trace!(key = %key, token = ?token, "condition key");

            match token {
                OperatorKey::Group(group_key) => {
                    let op = self.config.group_keys.resolve(group_key);
                    let children = self.parse_group(&key, operand)?;
                    base.merge_group(LogicalGroup { op, children });
                }
                OperatorKey::Composite {
                    field,
                    operator,
                    negated,
                } => {
                    let value = operand.into_value(&key)?;
                    base.add(field, create_expression(operator, negated, value)?);
                }
                OperatorKey::Field(field) => {
                    let value = operand.into_value(&key)?;
                    base.add(field, ExpressionNode::eq(value));
                }
            }
        }

        Ok(base)
    }

    /// Parse the value of a grouping key into the group's children.
    ///
    /// A single document is accepted as one nested condition.
    fn parse_group(
        &self,
        key: &str,
        operand: KeyedValue,
    ) -> Result<Vec<BaseExpression>, QueryError> {
        let children = match operand {
            KeyedValue::Conditions(conditions) => conditions
                .into_iter()
                .map(|c| self.parse(c))
                .collect::<Result<Vec<_>, _>>()?,
            KeyedValue::Value(Bson::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Bson::Document(doc) => self.parse(doc),
                    other => Err(QueryError::InvalidGroup {
                        key: key.to_string(),
                        reason: format!(
                            "elements must be condition documents, got {:?}",
                            other.element_type()
                        ),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?,
            KeyedValue::Value(Bson::Document(doc)) => vec![self.parse(doc)?],
            KeyedValue::Value(other) => {
                return Err(QueryError::InvalidGroup {
                    key: key.to_string(),
                    reason: format!("expected an array of conditions, got {:?}", other.element_type()),
                });
            }
        };

        if children.is_empty() {
            return Err(QueryError::InvalidGroup {
                key: key.to_string(),
                reason: "group must not be empty".into(),
            });
        }
        Ok(children)
    }
}

/// The operand of a key that still needs classifying. Pre-built nodes are
/// stored before this point.
enum KeyedValue {
    Value(Bson),
    Conditions(Vec<RawCondition>),
}

impl KeyedValue {
    fn into_value(self, key: &str) -> Result<Bson, QueryError> {
        match self {
            KeyedValue::Value(value) => Ok(value),
            KeyedValue::Conditions(_) => Err(QueryError::InvalidCondition {
                key: key.to_string(),
                reason: "nested conditions require an OR / AND key".into(),
            }),
        }
    }
}
