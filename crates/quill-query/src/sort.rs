use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// `"desc"` in any case is descending; every other token (including a
    /// missing one) is ascending.
    ///
    /// Numeric directions are tokens too: `-1` reads as ascending. Pass
    /// `"desc"` rather than an already-normalized sort document.
    pub fn from_token(token: &Bson) -> Self {
        match token {
            Bson::String(s) if s.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

/// Ordered list of sort keys, one entry per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OrderSpec", into = "OrderSpec")]
pub struct Order {
    sorts: Vec<Sort>,
}

impl Order {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(self, field: impl Into<String>) -> Self {
        self.with(field, SortDirection::Asc)
    }

    pub fn desc(self, field: impl Into<String>) -> Self {
        self.with(field, SortDirection::Desc)
    }

    /// Set a field's direction, replacing an earlier entry for it in place.
    pub fn with(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.set(field.into(), direction);
        self
    }

    fn set(&mut self, field: String, direction: SortDirection) {
        match self.sorts.iter_mut().find(|s| s.field == field) {
            Some(s) => s.direction = direction,
            None => self.sorts.push(Sort { field, direction }),
        }
    }

    /// Read an order option: a document of `field → direction token`, or an
    /// array of field names (ascending). Anything else is an empty order.
    pub fn from_bson(value: &Bson) -> Self {
        let mut order = Order::new();
        match value {
            Bson::Document(doc) => order.extend_from_document(doc),
            Bson::Array(items) => {
                for item in items {
                    match item {
                        Bson::String(field) => order.set(field.clone(), SortDirection::Asc),
                        Bson::Document(doc) => order.extend_from_document(doc),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
        order
    }

    fn extend_from_document(&mut self, doc: &Document) {
        for (field, token) in doc {
            self.set(field.clone(), SortDirection::from_token(token));
        }
    }

    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    pub fn is_empty(&self) -> bool {
        self.sorts.is_empty()
    }

    /// Append the entries of `lower` whose field is not already present.
    pub(crate) fn union(&mut self, lower: &Order) {
        for sort in &lower.sorts {
            if !self.sorts.iter().any(|s| s.field == sort.field) {
                self.sorts.push(sort.clone());
            }
        }
    }

    /// `{field: 1 | -1, ...}`
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for sort in &self.sorts {
            doc.insert(sort.field.clone(), sort.direction.as_i32());
        }
        doc
    }
}

impl From<Document> for Order {
    fn from(doc: Document) -> Self {
        let mut order = Order::new();
        order.extend_from_document(&doc);
        order
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum OrderSpec {
    Fields(Vec<String>),
    Directions(Document),
}

impl From<OrderSpec> for Order {
    fn from(spec: OrderSpec) -> Self {
        match spec {
            OrderSpec::Fields(fields) => fields
                .into_iter()
                .fold(Order::new(), |order, field| order.asc(field)),
            OrderSpec::Directions(doc) => Order::from(doc),
        }
    }
}

impl From<Order> for OrderSpec {
    fn from(order: Order) -> Self {
        let mut doc = Document::new();
        for sort in order.sorts {
            doc.insert(sort.field, sort.direction.as_str());
        }
        OrderSpec::Directions(doc)
    }
}
