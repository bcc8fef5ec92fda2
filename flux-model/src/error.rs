use std::fmt::{self, Display};

use crate::record::RecordType;

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// The `type` tag of a record does not match the shape of its content.
    ContentMismatch {
        declared: RecordType,
        found: RecordType,
    },
    /// A record repeats a video identifier; sequencing needs them unique.
    DuplicateVideo(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::ContentMismatch { declared, found } => write!(
                f,
                "record declared as {declared} but content is shaped like {found}"
            ),
            ModelError::DuplicateVideo(id) => {
                write!(f, "duplicate video id in record: {id}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
