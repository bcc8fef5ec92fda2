//! Media domain: play order of records and fetching of the active content

pub mod loader;
pub mod sequence;

pub use loader::ContentLoader;
