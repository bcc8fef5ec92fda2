//! Session domain: login status and the user's server-side configuration

pub mod store;

pub use store::{SessionField, SessionPatch, SessionState, SessionStore};
