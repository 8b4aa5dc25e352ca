//! Compiles SQL-flavored condition maps into document-database filter,
//! update and option documents.

mod condition;
mod config;
mod error;
mod expression;
mod operator;
mod options;
mod parse_condition;
mod query;
mod sort;
mod store;
mod values;
mod wildcard;

pub use bson::{Bson, Document, doc};
pub use condition::{ConditionEntry, ConditionMap, Operand, RawCondition};
pub use config::{GroupKeyPolicy, ParserConfig, QueryConfig};
pub use error::QueryError;
pub use expression::{
    BaseExpression, ComparisonValue, ExpressionNode, LogicalGroup, LogicalOp, RegexPattern,
};
pub use operator::{CompareOp, GroupKey, OperatorKey, SqlOperator, create_expression};
pub use options::OptionsTranslator;
pub use parse_condition::{ConditionParser, parse_conditions};
pub use query::QueryBuilder;
pub use sort::{Order, Sort, SortDirection};
pub use store::{DocumentStore, UpdateResult};
pub use values::translate_values;
pub use wildcard::to_regex;
