//! Blocking HTTP client for the Turbot API.
//!
//! Every authenticated call carries the API key as the `api_key` query
//! parameter. Successful responses wrap their payload in `{"data": ...}`;
//! non-2xx responses become [`ApiError`] with the body kept for message
//! extraction.

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response, multipart};
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::error::ApiError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One entry of `GET /api/bots`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BotSummary {
    pub bot_id: String,
}

/// What `POST /api/bots/:id/draft_data` tells us about the preview.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct DraftDataReceipt {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ApiClient {
    /// Client for `base_url` (scheme included), optionally authenticated.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(crate::user_agent())
            .build()
            .map_err(ApiError::from_transport)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `base_url` followed by `segments`, each one percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let invalid = || ApiError::Connect(format!("invalid API host {}", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.query(&[("api_key", key.as_str())]),
            None => request,
        }
    }

    fn send(&self, method: &str, url: &Url, request: RequestBuilder) -> Result<Value, ApiError> {
        debug!(method, path = url.path(), "api request");
        let response = self.authed(request).send().map_err(ApiError::from_transport)?;
        read_response(response)
    }

    fn data(value: Value) -> Value {
        match value {
            Value::Object(mut map) if map.contains_key("data") => {
                map.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        }
    }

    // === Bots ===

    pub fn list_bots(&self) -> Result<Vec<BotSummary>, ApiError> {
        let url = self.url(&["api", "bots"])?;
        let value = self.send("GET", &url, self.http.get(url.clone()))?;
        serde_json::from_value(Self::data(value)).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub fn show_bot(&self, bot_id: &str) -> Result<Map<String, Value>, ApiError> {
        let url = self.url(&["api", "bots", bot_id])?;
        let value = self.send("GET", &url, self.http.get(url.clone()))?;
        match Self::data(value) {
            Value::Object(map) => Ok(map),
            other => Err(ApiError::Decode(format!("expected a bot object, got {}", other))),
        }
    }

    /// Whether `bot_id` is already registered.
    pub fn bot_exists(&self, bot_id: &str) -> Result<bool, ApiError> {
        match self.show_bot(bot_id) {
            Ok(_) => Ok(true),
            Err(ApiError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn create_bot(&self, bot_id: &str, manifest: &Value) -> Result<Value, ApiError> {
        let url = self.url(&["api", "bots"])?;
        let body = json!({ "bot": { "bot_id": bot_id, "manifest": manifest } });
        let value = self.send("POST", &url, self.http.post(url.clone()).json(&body))?;
        Ok(Self::data(value))
    }

    pub fn update_bot(&self, bot_id: &str, manifest: &Value) -> Result<Value, ApiError> {
        let url = self.url(&["api", "bots", bot_id])?;
        let body = json!({ "bot": { "manifest": manifest } });
        let value = self.send("PUT", &url, self.http.put(url.clone()).json(&body))?;
        Ok(Self::data(value))
    }

    /// Upload a zip of the bot's code.
    pub fn update_code(&self, bot_id: &str, archive: &Path) -> Result<Value, ApiError> {
        let url = self.url(&["api", "bots", bot_id, "code"])?;
        let form = multipart::Form::new()
            .file("archive", archive)
            .map_err(|e| ApiError::Decode(format!("cannot read {}: {}", archive.display(), e)))?;
        let value = self.send("PUT", &url, self.http.put(url.clone()).multipart(form))?;
        Ok(Self::data(value))
    }

    pub fn destroy_draft_data(&self, bot_id: &str) -> Result<(), ApiError> {
        let url = self.url(&["api", "bots", bot_id, "draft_data"])?;
        self.send("DELETE", &url, self.http.delete(url.clone()))?;
        Ok(())
    }

    pub fn create_draft_data(
        &self,
        bot_id: &str,
        batch: &[Value],
    ) -> Result<DraftDataReceipt, ApiError> {
        let url = self.url(&["api", "bots", bot_id, "draft_data"])?;
        let body = json!({ "batch": batch });
        let value = self.send("POST", &url, self.http.post(url.clone()).json(&body))?;
        match Self::data(value) {
            Value::Null => Ok(DraftDataReceipt::default()),
            other => serde_json::from_value(other).map_err(|e| ApiError::Decode(e.to_string())),
        }
    }

    // === Account ===

    /// Exchange an email/password pair for an API key. Empty string when none was issued.
    pub fn get_api_key_for_credentials(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let url = self.url(&["api", "users", "api_key"])?;
        let body = json!({ "email": email, "password": password });
        let value = self.send("POST", &url, self.http.post(url.clone()).json(&body))?;
        let key = value
            .get("api_key")
            .or_else(|| value.get("data").and_then(|d| d.get("api_key")))
            .and_then(Value::as_str)
            .unwrap_or_default();
        Ok(key.to_string())
    }

    /// Platform status document.
    pub fn current_status(&self) -> Result<Value, ApiError> {
        let url = self.url(&["current-status.json"])?;
        self.send("GET", &url, self.http.get(url.clone()))
    }
}

fn read_response(response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text().map_err(ApiError::from_transport)?;
    debug!(status = status.as_u16(), bytes = body.len(), "api response");

    if !status.is_success() {
        return Err(ApiError::from_status(status.as_u16(), body, content_type));
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("invalid JSON: {}", e)))
}
