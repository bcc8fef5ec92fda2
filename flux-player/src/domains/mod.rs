//! Domain modules for the flux player
//!
//! Each domain owns its state and the actions that write to it; the
//! [`AppContext`](crate::app::AppContext) wires them together.

pub mod location;
pub mod media;
pub mod player;
pub mod session;
