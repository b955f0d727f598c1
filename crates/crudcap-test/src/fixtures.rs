//! Test fixtures for common types.

use std::sync::{Arc, Once};

use crudcap_capabilities::TokenCodec;
use crudcap_crypto::SigningSecret;
use crudcap_dispatch::CommandDispatcher;
use crudcap_storage::{EntitySchema, EntityStore, FieldMap, MemoryEntityStore, RecordId};
use serde_json::Value;

/// Secret shared by every fixture codec.
pub const TEST_SECRET: &str = "crudcap-test-secret";

/// Entity type used throughout the test suites.
pub const PRESENTATION: &str = "Presentation";

/// The fixture signing secret.
#[must_use]
pub fn test_secret() -> SigningSecret {
    SigningSecret::from_text(TEST_SECRET).expect("test secret is non-empty")
}

/// A codec keyed with [`TEST_SECRET`].
#[must_use]
pub fn test_codec() -> Arc<TokenCodec> {
    TokenCodec::shared(&test_secret()).expect("test codec")
}

/// `Presentation` with `title` and `comment` fields.
#[must_use]
pub fn presentation_schema() -> Arc<EntitySchema> {
    Arc::new(
        EntitySchema::new(PRESENTATION)
            .with_field("title")
            .with_field("comment"),
    )
}

/// Dispatcher over an empty in-memory `Presentation` store.
#[must_use]
pub fn test_dispatcher() -> CommandDispatcher {
    dispatcher_over(Arc::new(MemoryEntityStore::new(presentation_schema())))
}

/// Dispatcher over any store, using the fixture codec.
#[must_use]
pub fn dispatcher_over(store: Arc<dyn EntityStore>) -> CommandDispatcher {
    CommandDispatcher::new(test_codec(), store)
}

/// Dispatcher whose store already holds one record per title, with ids
/// returned in insertion order.
#[must_use]
pub fn seeded_dispatcher(titles: &[&str]) -> (CommandDispatcher, Vec<RecordId>) {
    let dispatcher = test_dispatcher();
    let ids = titles
        .iter()
        .map(|title| {
            let mut fields = FieldMap::new();
            fields.insert("title".to_owned(), Value::from(*title));
            dispatcher
                .store()
                .create(&fields)
                .expect("seed record")
                .id()
        })
        .collect();
    (dispatcher, ids)
}

/// Route `tracing` output through the test harness. Safe to call from
/// every test.
pub fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A temporary directory for file-store tests, removed on drop.
#[must_use]
pub fn temp_store_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create temp dir")
}
