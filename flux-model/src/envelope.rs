//! The `{meta, content}` envelope every flux API response is wrapped in.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorBody {
    pub code: u16,
    pub short: String,
    pub long: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResponseMeta {
    pub ok: bool,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApiResponse<T> {
    pub meta: ResponseMeta,
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub content: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(content: T) -> Self {
        Self {
            meta: ResponseMeta {
                ok: true,
                error: None,
            },
            content: Some(content),
        }
    }

    pub fn empty() -> Self {
        Self {
            meta: ResponseMeta {
                ok: true,
                error: None,
            },
            content: None,
        }
    }

    pub fn error(code: u16, short: impl Into<String>, long: impl Into<String>) -> Self {
        Self {
            meta: ResponseMeta {
                ok: false,
                error: Some(ErrorBody {
                    code,
                    short: short.into(),
                    long: long.into(),
                }),
            },
            content: None,
        }
    }
}

/// Request bodies carry their payload under `content`, mirroring responses
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequestBody<T> {
    pub content: T,
}

impl<T> RequestBody<T> {
    pub fn new(content: T) -> Self {
        Self { content }
    }
}
