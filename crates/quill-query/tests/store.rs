mod common;
use common::*;

use bson::oid::ObjectId;
use bson::{Bson, DateTime, Timestamp, doc};
use quill_query::{Order, QueryBuilder, QueryError, RawCondition};

const COLLECTION: &str = "accounts";

#[test]
fn all_sends_filter_and_translated_options() {
    let store = RecordingStore::with_results(vec![doc! { "_id": "acct-1" }]);
    let mut q = QueryBuilder::new(COLLECTION);
    q.filter(doc! { "status": "active" }).unwrap();
    q.limit(10).page(3);

    let results = q.all(&store, doc! { "order": { "name": "DESC" } }).unwrap();
    assert_eq!(results.len(), 1);

    let call = store.last();
    assert_eq!(call.op, "find");
    assert_eq!(call.collection, COLLECTION);
    assert_eq!(call.filter, Some(doc! { "status": { "$eq": "active" } }));
    assert_eq!(
        call.options,
        Some(doc! { "sort": { "name": -1 }, "limit": 10_i64, "skip": 20_i64 })
    );
}

#[test]
fn all_without_conditions_matches_everything() {
    let store = RecordingStore::default();
    QueryBuilder::new(COLLECTION).all(&store, doc! {}).unwrap();
    assert_eq!(store.last().filter, Some(doc! {}));
    assert_eq!(store.last().options, Some(doc! {}));
}

#[test]
fn declared_order_reaches_store() {
    let store = RecordingStore::default();
    let mut q = QueryBuilder::new(COLLECTION);
    q.order_by(Order::new().asc("name"));
    q.first(&store, doc! { "sort": { "created": "desc" } }).unwrap();
    assert_eq!(
        store.last().options,
        Some(doc! { "sort": { "created": -1, "name": 1 } })
    );
}

#[test]
fn first_or_fail_reports_missing_document() {
    let store = RecordingStore::default();
    let err = QueryBuilder::new(COLLECTION)
        .first_or_fail(&store, doc! {})
        .unwrap_err();
    assert!(matches!(err, QueryError::NotFound { ref collection } if collection == COLLECTION));

    let store = RecordingStore::with_results(vec![doc! { "_id": "acct-1" }]);
    let found = QueryBuilder::new(COLLECTION)
        .first_or_fail(&store, doc! {})
        .unwrap();
    assert_eq!(found, doc! { "_id": "acct-1" });
}

#[test]
fn update_one_targets_object_id_from_data() {
    let store = RecordingStore::default();
    let oid = ObjectId::new();
    let mut q = QueryBuilder::new(COLLECTION);
    q.update_one(&store, doc! { "_id": oid.to_hex(), "name": "Globex" }, None)
        .unwrap();

    let call = store.last();
    assert_eq!(call.op, "update_one");
    assert_eq!(call.filter, Some(doc! { "_id": { "$eq": oid } }));
    assert_eq!(call.payload, Some(doc! { "$set": { "name": "Globex" } }));
}

#[test]
fn update_one_keeps_non_hex_id_as_string() {
    let store = RecordingStore::default();
    let mut q = QueryBuilder::new(COLLECTION);
    q.update_one(&store, doc! { "_id": "acct-9", "n": 1 }, None)
        .unwrap();
    assert_eq!(store.last().filter, Some(doc! { "_id": { "$eq": "acct-9" } }));
}

#[test]
fn update_many_keeps_id_as_string() {
    let store = RecordingStore::default();
    let oid = ObjectId::new();
    let mut q = QueryBuilder::new(COLLECTION);
    q.update_many(&store, doc! { "_id": oid.to_hex(), "active": false }, None)
        .unwrap();

    let call = store.last();
    assert_eq!(call.op, "update_many");
    assert_eq!(call.filter, Some(doc! { "_id": { "$eq": oid.to_hex() } }));
    assert_eq!(call.payload, Some(doc! { "$set": { "active": false } }));
}

#[test]
fn update_with_conditions_ignores_data_id() {
    let store = RecordingStore::default();
    let mut q = QueryBuilder::new(COLLECTION);
    let conditions = RawCondition::from(doc! { "revenue <": 1000 });
    q.update_many(&store, doc! { "_id": "x", "tier": "small" }, Some(conditions))
        .unwrap();
    assert_eq!(store.last().filter, Some(doc! { "revenue": { "$lt": 1000 } }));
}

#[test]
fn update_keeps_timestamp_increment() {
    let store = RecordingStore::default();
    let mut q = QueryBuilder::new(COLLECTION);
    q.filter(doc! { "status": "active" }).unwrap();
    let seen = Bson::Timestamp(Timestamp {
        time: 1_700_000_000,
        increment: 42,
    });
    q.update_many(&store, doc! { "seen": seen.clone() }, None)
        .unwrap();
    assert_eq!(
        store.last().payload,
        Some(doc! { "$set": { "seen": seen } })
    );
}

#[test]
fn inserts_translate_values_and_return_ids() {
    let store = RecordingStore::default();
    let q = QueryBuilder::new(COLLECTION);
    let at = DateTime::from_millis(10_000);
    let ts = Bson::Timestamp(Timestamp {
        time: 10,
        increment: 3,
    });

    let id = q
        .insert_one(&store, doc! { "_id": "acct-1", "at": at, "ts": ts.clone() })
        .unwrap();
    assert_eq!(id, Bson::String("acct-1".into()));
    assert_eq!(
        store.last().payload,
        Some(doc! { "_id": "acct-1", "at": at, "ts": ts.clone() })
    );

    let ids = q
        .insert_many(
            &store,
            vec![doc! { "_id": "a", "meta": { "ts": ts.clone() } }, doc! { "_id": "b" }],
        )
        .unwrap();
    assert_eq!(ids, vec![Bson::from("a"), Bson::from("b")]);
    assert_eq!(store.calls.borrow().len(), 3);
    assert_eq!(
        store.calls.borrow()[1].payload,
        Some(doc! { "_id": "a", "meta": { "ts": ts } })
    );
}

#[test]
fn delete_adds_conditions_and_options() {
    let store = RecordingStore::default();
    let mut q = QueryBuilder::new(COLLECTION);
    q.filter(doc! { "status": "rejected" }).unwrap();
    q.delete_many(
        &store,
        Some(doc! { "revenue <": 100 }.into()),
        doc! { "order": ["name"] },
    )
    .unwrap();

    let call = store.last();
    assert_eq!(call.op, "delete_many");
    assert_eq!(
        call.filter,
        Some(doc! {
            "$and": [{ "status": { "$eq": "rejected" } }, { "revenue": { "$lt": 100 } }]
        })
    );
    assert_eq!(call.options, Some(doc! { "sort": { "name": 1 } }));

}

#[test]
fn writes_without_conditions_are_refused() {
    let store = RecordingStore::with_results(vec![doc! { "_id": "acct-1" }]);

    let err = QueryBuilder::new(COLLECTION)
        .delete_one(&store, None, doc! {})
        .unwrap_err();
    assert!(matches!(err, QueryError::Unconstrained { operation: "delete_one", .. }));

    let err = QueryBuilder::new(COLLECTION)
        .delete_many(&store, None, doc! {})
        .unwrap_err();
    assert!(matches!(err, QueryError::Unconstrained { operation: "delete_many", .. }));
    assert_eq!(
        err.to_string(),
        "refusing delete_many on accounts without conditions"
    );

    // No `_id` in the data, so nothing narrows the update.
    let err = QueryBuilder::new(COLLECTION)
        .update_one(&store, doc! { "tier": "small" }, None)
        .unwrap_err();
    assert!(matches!(err, QueryError::Unconstrained { operation: "update_one", .. }));

    let err = QueryBuilder::new(COLLECTION)
        .update_many(&store, doc! { "_id": 7, "tier": "small" }, None)
        .unwrap_err();
    assert!(matches!(err, QueryError::Unconstrained { operation: "update_many", .. }));

    assert!(store.calls.borrow().is_empty());
}

#[test]
fn huge_page_reaches_store_without_skip() {
    let store = RecordingStore::default();
    let mut q = QueryBuilder::new(COLLECTION);
    q.limit(10).page(i64::MAX);
    q.all(&store, doc! {}).unwrap();
    assert_eq!(store.last().options, Some(doc! { "limit": 10_i64 }));
}

#[test]
fn store_errors_are_wrapped() {
    let store = RecordingStore::failing();
    let err = QueryBuilder::new(COLLECTION).all(&store, doc! {}).unwrap_err();
    assert!(matches!(err, QueryError::Store(_)));
    assert_eq!(err.to_string(), "store error: store unavailable");
}
