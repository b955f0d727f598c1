//! Prelude module - commonly used test utilities.

pub use crate::fixtures::{
    PRESENTATION, TEST_SECRET, dispatcher_over, init_test_logging, presentation_schema,
    seeded_dispatcher, temp_store_dir, test_codec, test_dispatcher, test_secret,
};
pub use crate::mocks::{RecordingStore, StoreCall};
