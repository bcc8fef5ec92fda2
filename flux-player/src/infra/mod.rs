//! Infrastructure: server access, configuration, timing and test doubles

pub mod api_client;
pub mod config;
pub mod constants;
pub mod errors;
pub mod notifier;
pub mod services;
pub mod tasks;
pub mod testing;
pub mod time;
pub mod timing;
