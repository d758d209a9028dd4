use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::models::{ReuseIdea, IDEA_FIELDS, NO_DATA};

#[derive(Debug, thiserror::Error)]
pub enum StrictDecodeError {
    #[error("response is not JSON: {0}")]
    NotJson(#[from] serde_json::Error),
    #[error("response JSON is not an object")]
    NotAnObject,
    #[error("response JSON is missing field `{0}`")]
    MissingField(&'static str),
}

/// Start of the line after a labelled value: word characters and spaces up
/// to a colon.
static NEXT_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[0-9A-Za-z_\s]+:").expect("next-label pattern"));

static NEWLINE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n]+").expect("newline pattern"));

/// One way of locating a labelled value inside free-form model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPattern {
    /// `Label: value`, running until the next `Something:` line.
    LabeledLine,
    /// `"Label": "value"`
    QuotedJson,
    /// `【Label】value`, running until the next `【`.
    Bracketed,
}

/// Patterns are tried in this order; the first one that matches wins.
pub const EXTRACTION_ORDER: [FieldPattern; 3] = [
    FieldPattern::LabeledLine,
    FieldPattern::QuotedJson,
    FieldPattern::Bracketed,
];

impl FieldPattern {
    /// Returns the raw captured text for `label`, before any cleanup.
    pub fn capture<'t>(self, text: &'t str, label: &str) -> Option<&'t str> {
        match self {
            FieldPattern::LabeledLine => {
                let head = Regex::new(&format!(r"{}:\s*", regex::escape(label))).ok()?;
                let rest = &text[head.find(text)?.end()..];
                let end = NEXT_LABEL.find(rest).map_or(rest.len(), |m| m.start());
                Some(&rest[..end])
            }
            FieldPattern::QuotedJson => {
                let pattern = format!(r#""{}":\s*"([^"]*)""#, regex::escape(label));
                let re = Regex::new(&pattern).ok()?;
                re.captures(text)?.get(1).map(|m| m.as_str())
            }
            FieldPattern::Bracketed => {
                let marker = format!("【{label}】");
                let rest = &text[text.find(&marker)? + marker.len()..];
                let end = rest.find('【').unwrap_or(rest.len());
                Some(&rest[..end])
            }
        }
    }
}

/// Turns model output into a complete idea. Never fails: strict JSON is
/// preferred, labelled-text scraping is the fallback.
pub fn normalize(raw: &str) -> ReuseIdea {
    match decode_strict(raw) {
        Ok(idea) => idea,
        Err(err) => {
            tracing::warn!("strict decode failed, extracting fields from text: {err}");
            extract_fields(raw)
        }
    }
}

/// Accepts only a JSON object carrying all seven field keys. String values
/// are taken as-is.
pub fn decode_strict(raw: &str) -> Result<ReuseIdea, StrictDecodeError> {
    let value: Value = serde_json::from_str(raw)?;
    let object = value.as_object().ok_or(StrictDecodeError::NotAnObject)?;

    if let Some((missing, _)) = IDEA_FIELDS
        .iter()
        .find(|(key, _)| !object.contains_key(*key))
    {
        return Err(StrictDecodeError::MissingField(*missing));
    }

    Ok(ReuseIdea::from_fields(|key, _| {
        match object.get(key) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => NO_DATA.to_string(),
            Some(other) => other.to_string(),
        }
    }))
}

pub fn extract_fields(raw: &str) -> ReuseIdea {
    ReuseIdea::from_fields(|_, label| extract_field(raw, label))
}

pub fn extract_field(text: &str, label: &str) -> String {
    EXTRACTION_ORDER
        .iter()
        .find_map(|pattern| pattern.capture(text, label))
        .map(clean_capture)
        .unwrap_or_else(|| NO_DATA.to_string())
}

fn clean_capture(captured: &str) -> String {
    NEWLINE_RUNS.replace_all(captured.trim(), " ").into_owned()
}
