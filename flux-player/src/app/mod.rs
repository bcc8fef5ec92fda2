pub mod bootstrap;
pub mod context;

pub use bootstrap::bootstrap;
pub use context::AppContext;
