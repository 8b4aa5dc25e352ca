use bson::oid::ObjectId;
use bson::{Bson, Document};
use tracing::debug;

use crate::condition::{ConditionMap, RawCondition};
use crate::config::QueryConfig;
use crate::error::QueryError;
use crate::expression::{BaseExpression, ExpressionNode, LogicalOp};
use crate::options::OptionsTranslator;
use crate::parse_condition::ConditionParser;
use crate::sort::Order;
use crate::store::{DocumentStore, UpdateResult};
use crate::values::translate_values;

/// Accumulates conditions for one collection and compiles them into filter,
/// update and option documents.
///
/// Combinators apply in call order. Repeating the same combinator appends to
/// one flat group; switching combinator wraps everything accumulated so far
/// as the first child of a new group.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    collection: String,
    parser: ConditionParser,
    expression: Option<BaseExpression>,
    options: OptionsTranslator,
}

impl QueryBuilder {
    pub fn new(collection: impl Into<String>) -> Self {
        Self::with_config(collection, QueryConfig::default())
    }

    pub fn with_config(collection: impl Into<String>, config: QueryConfig) -> Self {
        Self {
            collection: collection.into(),
            parser: ConditionParser::new(config.parser()),
            expression: None,
            options: OptionsTranslator {
                order: config.order,
                limit: config.limit,
                page: config.page,
            },
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Alias for [`QueryBuilder::and_where`].
    pub fn filter(&mut self, conditions: impl Into<RawCondition>) -> Result<&mut Self, QueryError> {
        self.and_where(conditions)
    }

    pub fn and_where(
        &mut self,
        conditions: impl Into<RawCondition>,
    ) -> Result<&mut Self, QueryError> {
        self.combine(LogicalOp::And, conditions.into())
    }

    pub fn or_where(
        &mut self,
        conditions: impl Into<RawCondition>,
    ) -> Result<&mut Self, QueryError> {
        self.combine(LogicalOp::Or, conditions.into())
    }

    fn combine(&mut self, op: LogicalOp, conditions: RawCondition) -> Result<&mut Self, QueryError> {
        let parsed = self.parser.parse(conditions)?;

        let combined = match self.expression.take() {
            None => parsed,
            Some(mut current) if current.group(op).is_some() => {
                push(&mut current, op, parsed);
                current
            }
            Some(current) => {
                let mut wrapper = BaseExpression::new();
                push(&mut wrapper, op, current);
                push(&mut wrapper, op, parsed);
                wrapper
            }
        };
        self.expression = Some(combined);
        Ok(self)
    }

    pub fn order_by(&mut self, order: impl Into<Order>) -> &mut Self {
        self.options.order = Some(order.into());
        self
    }

    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.options.limit = Some(limit);
        self
    }

    pub fn page(&mut self, page: i64) -> &mut Self {
        self.options.page = Some(page);
        self
    }

    pub fn expression(&self) -> Option<&BaseExpression> {
        self.expression.as_ref()
    }

    /// The filter document. Empty (match everything) without conditions.
    pub fn compile(&self) -> Document {
        self.expression
            .as_ref()
            .map(BaseExpression::compile)
            .unwrap_or_default()
    }

    pub fn translate_options(&self, requested: Document) -> Document {
        self.options.translate(requested)
    }

    /// The filter for a write. Unlike reads, an empty builder is an error
    /// here rather than a match-everything filter.
    fn constrained_filter(&self, operation: &'static str) -> Result<Document, QueryError> {
        match &self.expression {
            Some(expression) => Ok(expression.compile()),
            None => Err(QueryError::Unconstrained {
                operation,
                collection: self.collection.clone(),
            }),
        }
    }

    pub fn all<S: DocumentStore>(
        &self,
        store: &S,
        options: Document,
    ) -> Result<Vec<Document>, QueryError> {
        let filter = self.compile();
        let options = self.translate_options(options);
        debug!(collection = %self.collection, ?filter, ?options, "find");
        store
            .find(&self.collection, filter, options)
            .map_err(QueryError::store)
    }

    pub fn first<S: DocumentStore>(
        &self,
        store: &S,
        options: Document,
    ) -> Result<Option<Document>, QueryError> {
        let filter = self.compile();
        let options = self.translate_options(options);
        debug!(collection = %self.collection, ?filter, ?options, "find_one");
        store
            .find_one(&self.collection, filter, options)
            .map_err(QueryError::store)
    }

    pub fn first_or_fail<S: DocumentStore>(
        &self,
        store: &S,
        options: Document,
    ) -> Result<Document, QueryError> {
        self.first(store, options)?
            .ok_or_else(|| QueryError::NotFound {
                collection: self.collection.clone(),
            })
    }

    /// Update the first matching document with `$set` of `data`.
    ///
    /// Without `conditions`, a string `_id` in `data` becomes the filter,
    /// converted to an ObjectId when it parses as one. Fails with
    /// [`QueryError::Unconstrained`] when neither yields a condition.
    pub fn update_one<S: DocumentStore>(
        &mut self,
        store: &S,
        data: Document,
        conditions: Option<RawCondition>,
    ) -> Result<UpdateResult, QueryError> {
        self.target(conditions, &data, |id| {
            ObjectId::parse_str(id)
                .map(Bson::ObjectId)
                .unwrap_or_else(|_| Bson::String(id.to_string()))
        })?;

        let filter = self.constrained_filter("update_one")?;
        let update = set_document(data);
        debug!(collection = %self.collection, ?filter, ?update, "update_one");
        store
            .update_one(&self.collection, filter, update)
            .map_err(QueryError::store)
    }

    /// Like [`QueryBuilder::update_one`], but a string `_id` stays a string.
    pub fn update_many<S: DocumentStore>(
        &mut self,
        store: &S,
        data: Document,
        conditions: Option<RawCondition>,
    ) -> Result<UpdateResult, QueryError> {
        self.target(conditions, &data, |id| Bson::String(id.to_string()))?;

        let filter = self.constrained_filter("update_many")?;
        let update = set_document(data);
        debug!(collection = %self.collection, ?filter, ?update, "update_many");
        store
            .update_many(&self.collection, filter, update)
            .map_err(QueryError::store)
    }

    fn target(
        &mut self,
        conditions: Option<RawCondition>,
        data: &Document,
        id_value: impl Fn(&str) -> Bson,
    ) -> Result<(), QueryError> {
        match conditions {
            Some(conditions) => {
                self.filter(conditions)?;
            }
            None => {
                if let Some(Bson::String(id)) = data.get("_id") {
                    self.filter(ConditionMap::new().value("_id", id_value(id)))?;
                }
            }
        }
        Ok(())
    }

    pub fn insert_one<S: DocumentStore>(&self, store: &S, data: Document) -> Result<Bson, QueryError> {
        let doc = translate_values(data);
        debug!(collection = %self.collection, "insert_one");
        store
            .insert_one(&self.collection, doc)
            .map_err(QueryError::store)
    }

    pub fn insert_many<S: DocumentStore>(
        &self,
        store: &S,
        data: Vec<Document>,
    ) -> Result<Vec<Bson>, QueryError> {
        let docs: Vec<Document> = data.into_iter().map(translate_values).collect();
        debug!(collection = %self.collection, count = docs.len(), "insert_many");
        store
            .insert_many(&self.collection, docs)
            .map_err(QueryError::store)
    }

    pub fn delete_one<S: DocumentStore>(
        &mut self,
        store: &S,
        conditions: Option<RawCondition>,
        options: Document,
    ) -> Result<u64, QueryError> {
        if let Some(conditions) = conditions {
            self.filter(conditions)?;
        }
        let filter = self.constrained_filter("delete_one")?;
        let options = self.translate_options(options);
        debug!(collection = %self.collection, ?filter, ?options, "delete_one");
        store
            .delete_one(&self.collection, filter, options)
            .map_err(QueryError::store)
    }

    pub fn delete_many<S: DocumentStore>(
        &mut self,
        store: &S,
        conditions: Option<RawCondition>,
        options: Document,
    ) -> Result<u64, QueryError> {
        if let Some(conditions) = conditions {
            self.filter(conditions)?;
        }
        let filter = self.constrained_filter("delete_many")?;
        let options = self.translate_options(options);
        debug!(collection = %self.collection, ?filter, ?options, "delete_many");
        store
            .delete_many(&self.collection, filter, options)
            .map_err(QueryError::store)
    }
}

fn push(expr: &mut BaseExpression, op: LogicalOp, child: BaseExpression) {
    match op {
        LogicalOp::And => expr.add_to_and(child),
        LogicalOp::Or => expr.add_to_or(child),
        LogicalOp::Nor => expr.add_to_nor(child),
    }
}

/// `{"$set": data}` with values translated. `_id` is immutable in the store
/// and never part of the set.
fn set_document(data: Document) -> Document {
    let mut fields = translate_values(data);
    fields.remove("_id");
    ExpressionNode::set(fields).compile()
}
