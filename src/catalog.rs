use crate::models::{ModelInfo, ModelsResponse};

pub const DEFAULT_ALIAS: &str = "claude-3-haiku";

const BUILTIN_MODELS: [(&str, &str); 4] = [
    ("claude-3-haiku", "anthropic/claude-3-haiku"),
    ("gpt-4", "openai/gpt-4"),
    ("llama3-70b", "meta-llama/llama-3-70b-instruct"),
    ("mixtral", "mistralai/mixtral-8x7b-instruct"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelEntry {
    pub alias: &'static str,
    pub upstream_id: &'static str,
}

/// Read-only alias table; cheap to clone and safe to share between requests.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    entries: Vec<ModelEntry>,
    default_alias: &'static str,
}

impl ModelCatalog {
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_MODELS
                .iter()
                .map(|&(alias, upstream_id)| ModelEntry { alias, upstream_id })
                .collect(),
            default_alias: DEFAULT_ALIAS,
        }
    }

    pub fn get(&self, alias: &str) -> Option<ModelEntry> {
        self.entries.iter().copied().find(|entry| entry.alias == alias)
    }

    pub fn default_entry(&self) -> ModelEntry {
        self.get(self.default_alias).unwrap_or(self.entries[0])
    }

    /// Unknown or missing aliases resolve to the default entry without error.
    pub fn resolve(&self, alias: Option<&str>) -> ModelEntry {
        match alias.and_then(|alias| self.get(alias)) {
            Some(entry) => entry,
            None => {
                if let Some(alias) = alias {
                    tracing::debug!(
                        "unknown model alias {:?}, using {}",
                        alias,
                        self.default_alias
                    );
                }
                self.default_entry()
            }
        }
    }

    pub fn describe(&self) -> ModelsResponse {
        ModelsResponse {
            default: self.default_alias.to_string(),
            models: self
                .entries
                .iter()
                .map(|entry| ModelInfo {
                    alias: entry.alias.to_string(),
                    upstream_id: entry.upstream_id.to_string(),
                })
                .collect(),
        }
    }
}
