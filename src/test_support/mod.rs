//! Test utilities shared across crate-level unit tests.

pub mod browser;

pub use browser::{FakeBrowser, RecordingRegistry, TEST_VAPID_KEY};
