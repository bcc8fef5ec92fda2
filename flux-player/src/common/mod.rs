//! Common module containing shared utilities and types
//!
//! This module provides common functionality used across multiple domains

pub mod store;

pub use store::{ObservableStore, StoreState, Subscription};
