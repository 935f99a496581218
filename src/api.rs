//! Form transport: REST calls against the form backend.
//!
//! Three plain request/response operations. No retries, no caching and no
//! idempotency token; a failed call is reported to the caller and that is it.

use crate::config::Config;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Answers keyed by field identifier, as produced by the renderer.
pub type Draft = Map<String, Value>;

/// A form definition as served by `GET /forms/{key}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Render-ready document (pages/elements) handed to the renderer as is
    #[serde(default)]
    pub form_data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Any other backend-defined keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body returned by create and update calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubmissionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "deserialize_record_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SubmissionResponse {
    /// The redirect target, if the backend supplied a non-blank one.
    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Accept the record id as either a JSON string or a JSON number.
fn deserialize_record_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(id)) if !id.is_empty() => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResponseBody<'a> {
    form_data: &'a Draft,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("form '{0}' not found")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid backend url '{0}'")]
    InvalidUrl(String),
}

/// The three backend operations the lifecycle and shell depend on.
#[async_trait]
pub trait FormTransport: Send + Sync {
    async fn fetch_definition(&self, form_key: &str) -> Result<FormDefinition, TransportError>;

    async fn create_response(
        &self,
        form_key: &str,
        draft: &Draft,
    ) -> Result<SubmissionResponse, TransportError>;

    async fn update_response(
        &self,
        form_key: &str,
        record_id: &str,
        draft: &Draft,
        completed: bool,
    ) -> Result<SubmissionResponse, TransportError>;
}

/// `FormTransport` over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpFormApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFormApi {
    pub fn new(config: &Config) -> Self {
        Self::with_client(reqwest::Client::new(), &config.api_base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Append `segments` to the base url, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|_| TransportError::InvalidUrl(self.base_url.clone()))?;
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn form_url(&self, form_key: &str) -> Result<Url, TransportError> {
        self.endpoint(&["forms", form_key])
    }

    fn responses_url(&self, form_key: &str) -> Result<Url, TransportError> {
        self.endpoint(&["forms", form_key, "responses"])
    }

    fn response_url(&self, form_key: &str, record_id: &str) -> Result<Url, TransportError> {
        self.endpoint(&["forms", form_key, "responses", record_id])
    }
}

/// Turn a non-2xx status into an error, keeping the body for the log.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Status { status, body })
}

/// Parse a submission response; an empty 2xx body means "no id, no redirect".
async fn read_submission(response: reqwest::Response) -> Result<SubmissionResponse, TransportError> {
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(SubmissionResponse::default());
    }
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl FormTransport for HttpFormApi {
    async fn fetch_definition(&self, form_key: &str) -> Result<FormDefinition, TransportError> {
        let url = self.form_url(form_key)?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound(form_key.to_string()));
        }

        let body = check_status(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn create_response(
        &self,
        form_key: &str,
        draft: &Draft,
    ) -> Result<SubmissionResponse, TransportError> {
        let url = self.responses_url(form_key)?;
        debug!("POST {} ({} answers)", url, draft.len());

        let body = ResponseBody {
            form_data: draft,
            completed: None,
            timestamp: Utc::now(),
        };

        let response = self.client.post(url).json(&body).send().await?;
        read_submission(check_status(response).await?).await
    }

    async fn update_response(
        &self,
        form_key: &str,
        record_id: &str,
        draft: &Draft,
        completed: bool,
    ) -> Result<SubmissionResponse, TransportError> {
        let url = self.response_url(form_key, record_id)?;
        debug!("PUT {} ({} answers, completed={})", url, draft.len(), completed);

        let body = ResponseBody {
            form_data: draft,
            completed: Some(completed),
            timestamp: Utc::now(),
        };

        let response = self.client.put(url).json(&body).send().await?;
        read_submission(check_status(response).await?).await
    }
}
