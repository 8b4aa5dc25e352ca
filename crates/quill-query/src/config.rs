use serde::{Deserialize, Serialize};

use crate::expression::LogicalOp;
use crate::operator::GroupKey;
use crate::sort::Order;

/// How the `OR` / `AND` grouping keys map onto logical groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKeyPolicy {
    /// `OR` builds `$or`, `AND` builds `$and`.
    #[default]
    Natural,
    /// `OR` builds `$and`, `AND` builds `$or`. Matches legacy call sites
    /// written against the swapped mapping.
    Inverted,
}

impl GroupKeyPolicy {
    pub fn resolve(self, key: GroupKey) -> LogicalOp {
        match (self, key) {
            (GroupKeyPolicy::Natural, GroupKey::Or) | (GroupKeyPolicy::Inverted, GroupKey::And) => {
                LogicalOp::Or
            }
            (GroupKeyPolicy::Natural, GroupKey::And) | (GroupKeyPolicy::Inverted, GroupKey::Or) => {
                LogicalOp::And
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    #[serde(default)]
    pub group_keys: GroupKeyPolicy,
}

/// Builder-level defaults for a [`crate::QueryBuilder`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default)]
    pub group_keys: GroupKeyPolicy,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub order: Option<Order>,
}

impl QueryConfig {
    pub fn parser(&self) -> ParserConfig {
        ParserConfig {
            group_keys: self.group_keys,
        }
    }
}
