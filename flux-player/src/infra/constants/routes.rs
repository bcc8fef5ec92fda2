//! Client-side paths and search parameter names

pub const WATCH: &str = "/watch";
pub const BROWSE: &str = "/browse";

/// Search parameter carrying the active video id (or a record id to resolve)
pub const PARAM_ID: &str = "id";
/// Search parameter carrying the resume offset in seconds
pub const PARAM_TIME: &str = "t";
