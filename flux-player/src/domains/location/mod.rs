//! Location domain: routing state, history boundary and query parameters

pub mod history;
pub mod search_params;
pub mod store;

pub use history::{BrowserHistory, MemoryHistory};
pub use search_params::SearchParams;
pub use store::{LocationChannel, LocationState, LocationStore, LocationWatcher};
