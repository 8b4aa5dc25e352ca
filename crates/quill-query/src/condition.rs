use bson::{Bson, Document};

use crate::expression::{BaseExpression, ExpressionNode};

/// Input accepted by the condition parser: either an expression that was
/// already built, or a condition map still to be parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCondition {
    Built(BaseExpression),
    Map(ConditionMap),
}

/// Ordered condition entries, as written by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionMap {
    entries: Vec<ConditionEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConditionEntry {
    /// Positional (integer-keyed) sub-condition, joined by implicit AND.
    Nested(RawCondition),
    Keyed(String, Operand),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Bson),
    /// Pre-built node, stored verbatim under its key.
    Node(ExpressionNode),
    /// Children of an `OR` / `AND` grouping key.
    Conditions(Vec<RawCondition>),
}

impl ConditionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// `key` may be a field name or a composite key such as `"age >="`.
    pub fn value(mut self, key: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.entries
            .push(ConditionEntry::Keyed(key.into(), Operand::Value(value.into())));
        self
    }

    pub fn node(mut self, key: impl Into<String>, node: ExpressionNode) -> Self {
        self.entries
            .push(ConditionEntry::Keyed(key.into(), Operand::Node(node)));
        self
    }

    /// Add a grouping key (`"OR"` / `"AND"`) with its nested conditions.
    pub fn group<I, C>(mut self, key: impl Into<String>, conditions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<RawCondition>,
    {
        let conditions = conditions.into_iter().map(Into::into).collect();
        self.entries
            .push(ConditionEntry::Keyed(key.into(), Operand::Conditions(conditions)));
        self
    }

    pub fn nested(mut self, condition: impl Into<RawCondition>) -> Self {
        self.entries.push(ConditionEntry::Nested(condition.into()));
        self
    }

    pub fn entries(&self) -> &[ConditionEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<ConditionEntry> {
        self.entries
    }
}

/// Keys made only of ASCII digits holding a document become positional
/// sub-conditions; everything else is a keyed value.
impl From<Document> for ConditionMap {
    fn from(doc: Document) -> Self {
        let entries = doc
            .into_iter()
            .map(|(key, value)| match value {
                Bson::Document(sub) if is_positional(&key) => {
                    ConditionEntry::Nested(RawCondition::Map(ConditionMap::from(sub)))
                }
                value => ConditionEntry::Keyed(key, Operand::Value(value)),
            })
            .collect();
        Self { entries }
    }
}

fn is_positional(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

impl From<Document> for RawCondition {
    fn from(doc: Document) -> Self {
        RawCondition::Map(ConditionMap::from(doc))
    }
}

impl From<ConditionMap> for RawCondition {
    fn from(map: ConditionMap) -> Self {
        RawCondition::Map(map)
    }
}

impl From<BaseExpression> for RawCondition {
    fn from(expr: BaseExpression) -> Self {
        RawCondition::Built(expr)
    }
}
