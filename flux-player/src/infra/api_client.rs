use std::time::Duration;

use async_trait::async_trait;
use flux_model::{
    ApiResponse, CurrentVideo, PlaybackUpdate, Record, RecordId, RequestBody,
    UserConfiguration, VideoId, VideoInfo,
};
use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned, de::IgnoredAny};

use crate::infra::config::Config;
use crate::infra::errors::{ApiError, ApiResult};
use crate::infra::services::api::ApiService;

const API_PREFIX: &str = "api/v0";

/// HTTP client for the flux server
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Add a scheme if missing and drop trailing slashes so joined paths never
/// contain `//`
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let with_scheme =
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("http://{}", trimmed)
        };
    if with_scheme != raw {
        warn!(
            "[ApiClient] Normalized base URL from '{}' to '{}'",
            raw, with_scheme
        );
    }
    with_scheme
}

/// Unwrap a `{meta, content}` envelope.
///
/// `Ok(None)` means the server reported success without content.
fn decode_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
) -> ApiResult<Option<T>> {
    if status == StatusCode::NO_CONTENT || (status.is_success() && body.trim().is_empty()) {
        return Ok(None);
    }

    match serde_json::from_str::<ApiResponse<T>>(body) {
        Ok(envelope) if envelope.meta.ok => Ok(envelope.content),
        Ok(envelope) => Err(match envelope.meta.error {
            Some(error) => ApiError::Api {
                code: error.code,
                short: error.short,
                long: error.long,
            },
            None => ApiError::Status {
                status: status.as_u16(),
                body: body.to_string(),
            },
        }),
        Err(_) if !status.is_success() => Err(ApiError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        }),
        Err(err) => Err(err.into()),
    }
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        info!("[ApiClient] Creating API client with base URL: {}", base_url);

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> ApiResult<Self> {
        Self::new(&config.server_url, config.request_timeout())
    }

    /// Build a versioned API URL; path segments must already be encoded
    pub fn build_url(&self, path: impl AsRef<str>) -> String {
        let path = path.as_ref().trim_start_matches('/');
        format!("{}/{}/{}", self.base_url, API_PREFIX, path)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> ApiResult<Option<T>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!("[ApiClient] {} response: {}", status, body);
        }
        decode_envelope(status, &body)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.build_url(path);
        self.execute(self.client.get(&url))
            .await?
            .ok_or(ApiError::MissingContent)
    }

    async fn send_body<B: Serialize + Sync>(
        &self,
        builder: RequestBuilder,
        body: &B,
    ) -> ApiResult<()> {
        self.execute::<IgnoredAny>(builder.json(&RequestBody::new(body)))
            .await
            .map(|_| ())
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let url = self.build_url(path);
        self.execute::<IgnoredAny>(self.client.delete(&url))
            .await
            .map(|_| ())
    }
}

fn segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}

#[async_trait]
impl ApiService for ApiClient {
    async fn fetch_record(&self, id: &str) -> ApiResult<Record> {
        self.get(&format!("index/record/{}", segment(id))).await
    }

    async fn fetch_video(&self, id: &VideoId) -> ApiResult<VideoInfo> {
        self.get(&format!("index/video/{}", segment(id.as_str())))
            .await
    }

    async fn fetch_current_video(
        &self,
        record_id: &RecordId,
    ) -> ApiResult<CurrentVideo> {
        self.get(&format!(
            "index/record/{}/current-video",
            segment(record_id.as_str())
        ))
        .await
    }

    async fn update_playback(
        &self,
        record_id: &RecordId,
        update: &PlaybackUpdate,
    ) -> ApiResult<()> {
        let url =
            self.build_url(format!("playback/{}", segment(record_id.as_str())));
        self.send_body(self.client.post(&url), update).await
    }

    async fn delete_playback(&self, record_id: &RecordId) -> ApiResult<()> {
        self.delete(&format!("playback/{}", segment(record_id.as_str())))
            .await
    }

    async fn fetch_user_configuration(&self) -> ApiResult<UserConfiguration> {
        self.get("user/configuration").await
    }

    async fn put_user_configuration(
        &self,
        configuration: &UserConfiguration,
    ) -> ApiResult<()> {
        let url = self.build_url("user/configuration");
        self.send_body(self.client.put(&url), configuration).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_scheme_and_loses_trailing_slash() {
        assert_eq!(normalize_base_url("localhost:8080/"), "http://localhost:8080");
        assert_eq!(
            normalize_base_url("https://media.example"),
            "https://media.example"
        );
    }

    #[test]
    fn urls_are_versioned_and_ids_encoded() {
        let client =
            ApiClient::new("http://host", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.build_url(format!("index/video/{}", segment("a b/c"))),
            "http://host/api/v0/index/video/a%20b%2Fc"
        );
    }

    #[test]
    fn envelope_content_is_unwrapped() {
        let body = r#"{"meta":{"ok":true},"content":{"id":"v1","name":"Pilot"}}"#;
        let video: Option<VideoInfo> =
            decode_envelope(StatusCode::OK, body).unwrap();
        assert_eq!(video.unwrap().name.as_deref(), Some("Pilot"));
    }

    #[test]
    fn envelope_error_becomes_api_error() {
        let body = r#"{"meta":{"ok":false,"error":{"code":404,"short":"Not Found","long":"No such video"}}}"#;
        let result: ApiResult<Option<VideoInfo>> =
            decode_envelope(StatusCode::NOT_FOUND, body);
        match result {
            Err(ApiError::Api { code, short, .. }) => {
                assert_eq!(code, 404);
                assert_eq!(short, "Not Found");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn non_envelope_failure_keeps_status() {
        let result: ApiResult<Option<VideoInfo>> =
            decode_envelope(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(
            result,
            Err(ApiError::Status { status: 502, .. })
        ));
    }

    #[test]
    fn empty_success_has_no_content() {
        let result: Option<IgnoredAny> =
            decode_envelope(StatusCode::NO_CONTENT, "").unwrap();
        assert!(result.is_none());
    }
}
