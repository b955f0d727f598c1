//! Tokens from one combined issuance drive the dispatcher directly.

use crudcap_capabilities::{CombinedOptions, RecordId};
use crudcap_dispatch::{ErrorKind, Params};
use crudcap_test::seeded_dispatcher;
use serde_json::json;

#[test]
fn test_combined_tokens_work_per_record() {
    let (dispatcher, ids) = seeded_dispatcher(&["one", "two"]);
    let tokens = dispatcher
        .issuer()
        .combined(&ids, &["title"], Some(&["comment"][..]), CombinedOptions::default())
        .unwrap();

    let read = tokens.read.unwrap();
    for (id, title) in ids.iter().zip(["one", "two"]) {
        let out = dispatcher.execute(&read[id], json!(["title"])).unwrap();
        assert_eq!(out["title"], title);
    }

    let update = tokens.update.unwrap();
    dispatcher
        .execute(&update[&ids[1]], json!({"comment": "noted"}))
        .unwrap();
    let err = dispatcher
        .execute(&update[&ids[1]], json!({"title": "renamed"}))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Permission);

    let delete = tokens.delete.unwrap();
    dispatcher.execute(&delete[&ids[0]], Params::Absent).unwrap();
    assert_eq!(
        dispatcher
            .execute(&read[&ids[0]], json!(["title"]))
            .unwrap_err()
            .kind(),
        ErrorKind::DoesNotExist
    );
}

#[test]
fn test_tokens_do_not_cross_records() {
    let (dispatcher, ids) = seeded_dispatcher(&["one", "two"]);
    let tokens = dispatcher
        .issuer()
        .combined(&ids, &["title"], None, CombinedOptions::default())
        .unwrap();

    let update = tokens.update.unwrap();
    dispatcher
        .execute(&update[&ids[0]], json!({"title": "changed"}))
        .unwrap();
    assert_eq!(
        dispatcher.store().get(ids[1]).unwrap().get("title").unwrap(),
        "two"
    );
}

#[test]
fn test_create_token_only_when_requested() {
    let (dispatcher, ids) = seeded_dispatcher(&["one"]);
    let options = CombinedOptions {
        create: true,
        ..CombinedOptions::default()
    };
    let tokens = dispatcher
        .issuer()
        .combined(&ids, &["title"], None, options)
        .unwrap();
    let out = dispatcher
        .execute(&tokens.create.unwrap(), json!({"title": "fresh"}))
        .unwrap();
    assert_ne!(RecordId(out["id"].as_i64().unwrap()), ids[0]);

    let empty = dispatcher
        .issuer()
        .combined(&[] as &[RecordId], &["title"], None, CombinedOptions::default())
        .unwrap();
    assert!(empty.create.is_none());
    assert!(empty.read.unwrap().is_empty());
}
