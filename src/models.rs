use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MAX_MATERIALS_CHARS: usize = 200;
pub const NO_DATA: &str = "No data provided";

/// Output key and the label the model is asked to use for it.
pub const IDEA_FIELDS: [(&str, &str); 7] = [
    ("title", "Title"),
    ("functionality", "Functionality"),
    ("manufacturing", "Manufacturing Method"),
    ("benefits", "Environmental Benefits"),
    ("safety", "Safety"),
    ("users", "Applicable Users"),
    ("scenarios", "Usage Scenarios"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReuseIdea {
    pub title: String,
    pub functionality: String,
    pub manufacturing: String,
    pub benefits: String,
    pub safety: String,
    pub users: String,
    pub scenarios: String,
}

impl ReuseIdea {
    /// Builds an idea by asking `value_for(key, label)` for each field in
    /// `IDEA_FIELDS` order.
    pub fn from_fields(mut value_for: impl FnMut(&str, &str) -> String) -> Self {
        let [title, functionality, manufacturing, benefits, safety, users, scenarios] =
            IDEA_FIELDS.map(|(key, label)| value_for(key, label));
        Self {
            title,
            functionality,
            manufacturing,
            benefits,
            safety,
            users,
            scenarios,
        }
    }
}

/// Failure of a generation attempt, already translated for the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDescriptor {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub model: String,
}

/// Body of `POST /generate`. Fields stay loosely typed so that a wrong JSON
/// type is reported as invalid input rather than an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub materials: Option<Value>,
    #[serde(default)]
    pub model: Option<Value>,
}

impl GenerateRequest {
    pub fn new(materials: impl Into<String>, model: Option<String>) -> Self {
        Self {
            materials: Some(Value::String(materials.into())),
            model: model.map(Value::String),
        }
    }

    /// Only JSON objects are accepted as request bodies.
    pub fn from_body(body: Value) -> Option<Self> {
        if !body.is_object() {
            return None;
        }
        serde_json::from_value(body).ok()
    }

    /// Returns the materials text when it is a non-empty string of at most
    /// `MAX_MATERIALS_CHARS` characters, counted in UTF-16 code units as
    /// browsers count them.
    pub fn valid_materials(&self) -> Option<&str> {
        let materials = self.materials.as_ref()?.as_str()?;
        if materials.is_empty() || materials.encode_utf16().count() > MAX_MATERIALS_CHARS {
            return None;
        }
        Some(materials)
    }

    /// A non-string `model` is treated the same as a missing one.
    pub fn model_alias(&self) -> Option<&str> {
        self.model.as_ref().and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub data: Option<ReuseIdea>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl GenerateResponse {
    pub fn success(idea: ReuseIdea) -> Self {
        Self {
            success: true,
            data: Some(idea),
            error: None,
            details: None,
        }
    }

    pub fn failure(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            details,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub alias: String,
    pub upstream_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub default: String,
    pub models: Vec<ModelInfo>,
}
