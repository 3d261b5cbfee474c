//! Workers AI client for chat completions.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Anything that can turn a list of chat turns into a completion.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, Error>;
}

pub struct Client {
    api_token: String,
    model: String,
    run_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

impl Role {
    fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    success: Option<bool>,
    result: Option<RunResult>,
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Deserialize)]
struct RunResult {
    response: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl Client {
    /// `base_url` is the API root, e.g. `https://api.cloudflare.com/client/v4`.
    pub fn new(
        base_url: &str,
        account_id: &str,
        api_token: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        let run_url = format!(
            "{}/accounts/{}/ai/run/{}",
            base_url.trim_end_matches('/'),
            account_id,
            model
        );

        Ok(Self { api_token, model, run_url, http })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn run(&self, messages: &[Message]) -> Result<String, Error> {
        let request = ApiRequest {
            messages: messages
                .iter()
                .map(|m| ApiMessage { role: m.role.as_str(), content: &m.content })
                .collect(),
        };

        let response = self
            .http
            .post(&self.run_url)
            .bearer_auth(&self.api_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = response.status();
        debug!("Workers AI response status: {status}");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(200).collect();
            return Err(Error::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        if api_response.success == Some(false) {
            let reason = api_response
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::Api(reason));
        }

        api_response
            .result
            .and_then(|r| r.response)
            .filter(|text| !text.trim().is_empty())
            .ok_or(Error::Empty)
    }
}

#[async_trait]
impl InferenceBackend for Client {
    async fn complete(&self, messages: &[Message]) -> Result<String, Error> {
        self.run(messages).await
    }
}

#[derive(Debug)]
pub enum Error {
    Http(String),
    Api(String),
    Parse(String),
    Empty,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Api(e) => write!(f, "API error: {e}"),
            Error::Parse(e) => write!(f, "Parse error: {e}"),
            Error::Empty => write!(f, "Empty response"),
        }
    }
}

impl std::error::Error for Error {}
