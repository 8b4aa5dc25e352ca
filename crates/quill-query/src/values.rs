use bson::{Bson, Document};

/// Prepare a document for insert or update.
///
/// Walks nested documents and arrays. Date/time values already arrive as
/// store-native `Bson::DateTime` (built with `DateTime::from_system_time` or
/// similar before the document exists), so they pass through.
/// `Bson::Timestamp` is a distinct replication type and is kept whole,
/// `increment` included.
pub fn translate_values(data: Document) -> Document {
    data.into_iter()
        .map(|(key, value)| (key, translate_value(value)))
        .collect()
}

fn translate_value(value: Bson) -> Bson {
    match value {
        Bson::Document(doc) => Bson::Document(translate_values(doc)),
        Bson::Array(items) => Bson::Array(items.into_iter().map(translate_value).collect()),
        other => other,
    }
}
