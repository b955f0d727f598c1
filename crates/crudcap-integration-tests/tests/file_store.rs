//! Records written through tokens survive reopening the file store.

use std::sync::Arc;

use crudcap_capabilities::RecordId;
use crudcap_dispatch::{CommandDispatcher, Params};
use crudcap_storage::{EntityStore, JsonFileStore};
use crudcap_test::{init_test_logging, presentation_schema, temp_store_dir, test_codec};
use serde_json::json;

fn open(dir: &std::path::Path) -> CommandDispatcher {
    let store = JsonFileStore::open(dir, presentation_schema()).unwrap();
    CommandDispatcher::new(test_codec(), Arc::new(store))
}

#[test]
fn test_mutations_persist_across_reopen() {
    init_test_logging();
    let dir = temp_store_dir();

    let id = {
        let dispatcher = open(dir.path());
        let token = dispatcher.issuer().create_token(&["title"]).unwrap();
        let out = dispatcher.execute(&token, json!({"title": "saved"})).unwrap();
        RecordId(out["id"].as_i64().unwrap())
    };
    assert!(dir.path().join("Presentation.json").exists());

    let dispatcher = open(dir.path());
    let token = dispatcher.issuer().read_token(id, &["title"]).unwrap();
    let out = dispatcher.execute(&token, json!(["title"])).unwrap();
    assert_eq!(out["title"], "saved");

    // Tokens issued before the reopen still verify.
    let update = dispatcher.issuer().update_token(id, &["title"]).unwrap();
    dispatcher.execute(&update, json!({"title": "edited"})).unwrap();

    let reopened = open(dir.path());
    assert_eq!(reopened.store().get(id).unwrap().get("title").unwrap(), "edited");
}

#[test]
fn test_ids_not_reused_after_delete_and_reopen() {
    init_test_logging();
    let dir = temp_store_dir();
    let dispatcher = open(dir.path());
    let create = dispatcher.issuer().create_token(&["title"]).unwrap();

    let first = dispatcher.execute(&create, json!({"title": "a"})).unwrap();
    let first = RecordId(first["id"].as_i64().unwrap());
    let delete = dispatcher.issuer().delete_token(first).unwrap();
    dispatcher.execute(&delete, Params::Absent).unwrap();
    drop(dispatcher);

    let dispatcher = open(dir.path());
    let second = dispatcher.execute(&create, json!({"title": "b"})).unwrap();
    assert_ne!(second["id"].as_i64().unwrap(), first.get());

    // The old delete token must not hit the new record.
    assert!(dispatcher.execute(&delete, Params::Absent).is_err());
}
