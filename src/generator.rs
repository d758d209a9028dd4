use std::sync::Arc;

use reqwest::StatusCode;

use crate::catalog::{ModelCatalog, ModelEntry};
use crate::config::{AppConfig, Environment};
use crate::models::{ErrorDescriptor, ReuseIdea, IDEA_FIELDS};
use crate::normalize::normalize;
use crate::openrouter::{
    ChatCompletionRequest, ChatMessage, CompletionError, OpenRouterClient, ResponseFormat,
};

pub const SYSTEM_PROMPT: &str =
    "You are an environmental engineer skilled at turning waste into useful products.";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1000;

const FIELD_HINTS: [&str; 7] = [
    "A concise, creative title for the reuse idea.",
    "The functionality of the reuse idea.",
    "The method used for manufacturing the reuse idea.",
    "The environmental benefits.",
    "Safety considerations.",
    "The target users for this idea.",
    "The scenarios where this idea can be used.",
];

#[derive(Clone)]
pub struct IdeaGenerator {
    client: OpenRouterClient,
    catalog: Arc<ModelCatalog>,
    environment: Environment,
}

impl IdeaGenerator {
    pub fn new(config: &AppConfig, catalog: ModelCatalog) -> Result<Self, CompletionError> {
        Ok(Self {
            client: OpenRouterClient::new(&config.upstream)?,
            catalog: Arc::new(catalog),
            environment: config.environment,
        })
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Runs one completion for `materials` and normalizes the answer.
    /// Upstream failures come back as an `ErrorDescriptor`; nothing here
    /// retries.
    pub async fn generate(
        &self,
        materials: &str,
        model_alias: Option<&str>,
    ) -> Result<ReuseIdea, ErrorDescriptor> {
        let model = self.catalog.resolve(model_alias);
        let request = build_request(model, materials);

        match self.client.complete(&request).await {
            Ok(content) => {
                tracing::info!("raw model response from {}: {}", model.upstream_id, content);
                Ok(normalize(&content))
            }
            Err(err) => {
                tracing::error!("generation via {} failed: {}", model.upstream_id, err);
                Err(self.describe_failure(&err, model))
            }
        }
    }

    fn describe_failure(&self, err: &CompletionError, model: ModelEntry) -> ErrorDescriptor {
        let (code, message) = classify_status(err.status());
        ErrorDescriptor {
            code,
            message: message.to_string(),
            details: self
                .environment
                .is_development()
                .then(|| err.to_string()),
            model: model.upstream_id.to_string(),
        }
    }
}

/// Maps an upstream status to the code and message shown to callers.
pub fn classify_status(status: Option<StatusCode>) -> (u16, &'static str) {
    match status {
        Some(StatusCode::UNAUTHORIZED) => (401, "Invalid API key"),
        Some(StatusCode::PAYMENT_REQUIRED) => (402, "Payment required"),
        Some(StatusCode::TOO_MANY_REQUESTS) => (429, "Too many requests"),
        Some(StatusCode::SERVICE_UNAVAILABLE) => (503, "Model temporarily unavailable"),
        _ => (500, "Generation failed"),
    }
}

pub fn build_prompt(materials: &str) -> String {
    let mut prompt = format!(
        "Generate an innovative reuse plan based on the materials: {materials}. \
         Please include the following fields:\n"
    );
    for ((_, label), hint) in IDEA_FIELDS.iter().zip(FIELD_HINTS) {
        prompt.push_str(&format!("- {label}: {hint}\n"));
    }
    prompt.push_str(
        "\nMake sure to only provide content for each of these fields in the requested format, \
         and avoid extra information or unrelated text.",
    );
    prompt
}

pub fn build_request(model: ModelEntry, materials: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.upstream_id.to_string(),
        messages: vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_prompt(materials)),
        ],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
        response_format: Some(ResponseFormat::json_object()),
    }
}
