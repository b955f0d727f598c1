//! JSON requests in, JSON responses out.

use crudcap_capabilities::RecordId;
use crudcap_dispatch::{ApiResponse, CrudApi, STATUS_FAILED, STATUS_OK};
use crudcap_test::{seeded_dispatcher, test_dispatcher};
use serde_json::{Value, json};

fn post(api: &CrudApi, body: &Value) -> ApiResponse {
    api.handle("POST", body.to_string().as_bytes())
}

#[test]
fn test_create_read_delete_over_requests() {
    let api = CrudApi::new(test_dispatcher());
    let issuer = api.dispatcher().issuer();

    let resp = post(
        &api,
        &json!({"token": issuer.create_token(&["title"]).unwrap(), "params": {"title": "Demo"}}),
    );
    assert_eq!(resp.status, STATUS_OK);
    let id = RecordId(resp.body["id"].as_i64().unwrap());

    let resp = post(
        &api,
        &json!({"token": issuer.read_token(id, &["title"]).unwrap(), "params": "title"}),
    );
    assert_eq!(resp.body, json!({"title": "Demo", "id": id.get(), "success": true}));

    let delete = issuer.delete_token(id).unwrap();
    let resp = post(&api, &json!({"token": delete}));
    assert_eq!(resp.body, json!({"success": true}));

    let resp = post(&api, &json!({"token": delete}));
    assert_eq!(resp.status, STATUS_FAILED);
    assert_eq!(
        resp.errmsg(),
        Some(format!("item does not exist [Presentation with id={id} does not exist]").as_str())
    );
}

#[test]
fn test_tampered_token_is_signature_error() {
    let (dispatcher, ids) = seeded_dispatcher(&["x"]);
    let api = CrudApi::new(dispatcher);
    let token = api
        .dispatcher()
        .issuer()
        .read_token(ids[0], &["title"])
        .unwrap();

    // Widen the grant without re-signing.
    let forged = token.replacen("ALLOW::title", "ALLOW::title:comment", 1);
    let resp = post(&api, &json!({"token": forged, "params": ["comment"]}));
    assert!(!resp.is_success());
    assert!(resp.errmsg().unwrap().starts_with("token signature error"));
}

#[test]
fn test_params_as_json_text() {
    let (dispatcher, ids) = seeded_dispatcher(&["before"]);
    let api = CrudApi::new(dispatcher);
    let token = api
        .dispatcher()
        .issuer()
        .update_token(ids[0], &["title"])
        .unwrap();

    let resp = post(&api, &json!({"token": token, "params": "{\"title\": \"after\"}"}));
    assert_eq!(resp.body["title"], "after");

    let resp = post(&api, &json!({"token": token, "params": "not json"}));
    assert!(resp.errmsg().unwrap().starts_with("parameter error"));
}

#[test]
fn test_permission_error_names_field() {
    let (dispatcher, ids) = seeded_dispatcher(&["x"]);
    let api = CrudApi::new(dispatcher);
    let token = api
        .dispatcher()
        .issuer()
        .read_token(ids[0], &["title"])
        .unwrap();

    let resp = post(&api, &json!({"token": token, "params": ["title", "comment"]}));
    let msg = resp.errmsg().unwrap();
    assert!(msg.starts_with("token permission error"));
    assert!(msg.contains("comment"));
}

#[test]
fn test_envelope_errors() {
    let api = CrudApi::new(test_dispatcher());
    assert_eq!(
        api.handle("PUT", b"{}").errmsg(),
        Some("request must be POST")
    );
    assert!(
        api.handle("POST", &[0xff, 0x00])
            .errmsg()
            .unwrap()
            .starts_with("could not json-decode request body")
    );
    assert_eq!(
        post(&api, &json!({"token": 17})).errmsg(),
        Some("missing token")
    );
}
