//! Flux player library
//!
//! Client core of the flux media browser: observable stores, routing state
//! synchronized with session history, play order of records, and the
//! controllers that keep playback position, autoplay and control visibility
//! in step with the server.
//!
//! Notes
//! - Rendering and decoding belong to the host. It forwards media element
//!   callbacks and pointer events as [`WatchMessage`](domains::player::WatchMessage)s
//!   and drives the engine on a current-thread tokio runtime.
//! - The binary in `src/main.rs` is a small headless client used to inspect
//!   records from a terminal.

pub mod app;
pub mod common;
pub mod domains;
pub mod infra;
