//! Service abstractions over external systems

pub mod api;

pub use api::{ApiService, SharedApi};
