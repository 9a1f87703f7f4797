//! LLM integration for fair-value estimation.
//!
//! Defines the `ReasoningService` trait (one structured-output completion
//! per call) and provides Gemini and OpenRouter implementations. The
//! `fair_value` module builds prompts on top of it and owns the fallback.

pub mod fair_value;
pub mod gemini;
pub mod openrouter;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value};

/// Abstraction over natural-language reasoning services.
///
/// Implementors send a prompt with a response-schema constraint and return
/// the raw text of the model's reply, which should be a JSON document
/// matching the schema. Parsing and validation belong to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReasoningService: Send + Sync {
    async fn generate_structured(&self, prompt: &str, schema: &OutputSchema) -> Result<String>;

    /// Model identifier string.
    fn model_name(&self) -> String;
}

// ---------------------------------------------------------------------------
// Output schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
}

/// A flat object schema where every field is required.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: &'static str,
    pub fields: Vec<SchemaField>,
}

impl OutputSchema {
    /// Standard JSON Schema rendering (OpenAI-compatible `json_schema`).
    pub fn to_json_schema(&self) -> Value {
        self.render(|kind| match kind {
            FieldKind::Number => "number",
            FieldKind::String => "string",
        }, "object", true)
    }

    /// Gemini `responseSchema` rendering (OpenAPI subset, upper-case types).
    pub fn to_gemini_schema(&self) -> Value {
        self.render(|kind| match kind {
            FieldKind::Number => "NUMBER",
            FieldKind::String => "STRING",
        }, "OBJECT", false)
    }

    fn render(
        &self,
        type_name: impl Fn(FieldKind) -> &'static str,
        object_type: &str,
        closed: bool,
    ) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            properties.insert(
                field.name.to_string(),
                json!({ "type": type_name(field.kind), "description": field.description }),
            );
        }
        let required: Vec<&str> = self.fields.iter().map(|f| f.name).collect();

        let mut schema = json!({
            "type": object_type,
            "properties": properties,
            "required": required,
        });
        if closed {
            schema["additionalProperties"] = Value::Bool(false);
        }
        schema
    }
}

/// Strip a surrounding Markdown code fence (```json ... ```) if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.strip_suffix("```").unwrap_or(rest);
    // Drop the info string (e.g. "json") on the opening line.
    match body.find('\n') {
        Some(pos) if !body[..pos].trim_start().starts_with('{') => body[pos + 1..].trim(),
        _ => body.trim(),
    }
}
