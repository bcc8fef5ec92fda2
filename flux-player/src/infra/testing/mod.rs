//! Test doubles for the service boundaries
//!
//! Hand-written fakes that record what the controllers asked for. They are
//! part of the library so integration tests under `tests/` can use them too.

pub mod mocks;
pub mod time;

pub use mocks::{ApiCall, FakeMediaElement, FakeMediaState, RecordingApi, RecordingNotifier};
pub use time::ManualClock;
