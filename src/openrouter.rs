use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::UpstreamConfig;

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("request to chat completions failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat completions returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("chat completions format error: {0}")]
    Format(String),
}

impl CompletionError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CompletionError::Api { status, .. } => Some(*status),
            CompletionError::Http(err) => err.status(),
            CompletionError::Format(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            kind: "json_object".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// Chat-completions client for OpenRouter (or any API speaking the same
/// dialect). Holds one pooled `reqwest::Client` with the request timeout set.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    api_key: String,
    referrer_url: String,
    app_title: String,
}

impl OpenRouterClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, CompletionError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            referrer_url: config.referrer_url.clone(),
            app_title: config.app_title.clone(),
        })
    }

    /// Sends one completion request and returns the content of the first
    /// choice.
    pub async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<String, CompletionError> {
        #[derive(Deserialize)]
        struct CompletionResp {
            #[serde(default)]
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMessage,
        }

        #[derive(Deserialize)]
        struct ChoiceMessage {
            #[serde(default)]
            content: Option<String>,
        }

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referrer_url)
            .header("X-Title", &self.app_title)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status,
                body: normalize_err_body(&body),
            });
        }

        let response = response.json::<CompletionResp>().await?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::Format("response has no choices".to_string()))?;

        choice
            .message
            .content
            .ok_or_else(|| CompletionError::Format("first choice has no content".to_string()))
    }
}

fn normalize_err_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let error = json.get("error");
        if let Some(message) = error
            .and_then(|e| e.get("message"))
            .or(error)
            .and_then(|v| v.as_str())
        {
            return message.to_string();
        }
    }

    trimmed.to_string()
}
