//! Per-family request bodies and response text extraction.
//!
//! Each model family hosted on the runtime has its own JSON dialect. The
//! family is inferred from the provider model id prefix.

use super::ProviderError;
use serde_json::{json, Value};

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Nova,
    Claude,
    Llama,
    Titan,
    Cohere,
}

impl ModelFamily {
    pub fn from_model_id(model_id: &str) -> Result<Self, ProviderError> {
        if model_id.starts_with("amazon.nova") {
            Ok(ModelFamily::Nova)
        } else if model_id.starts_with("anthropic.claude") {
            Ok(ModelFamily::Claude)
        } else if model_id.starts_with("meta.llama") {
            Ok(ModelFamily::Llama)
        } else if model_id.starts_with("amazon.titan") {
            Ok(ModelFamily::Titan)
        } else if model_id.starts_with("cohere.command") {
            Ok(ModelFamily::Cohere)
        } else {
            Err(ProviderError::UnsupportedModel(model_id.to_string()))
        }
    }

    pub fn request_body(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Value {
        match self {
            ModelFamily::Nova => json!({
                "messages": [{ "role": "user", "content": [{ "text": prompt }] }],
                "inferenceConfig": { "maxTokens": max_tokens, "temperature": temperature },
            }),
            ModelFamily::Claude => json!({
                "messages": [{ "role": "user", "content": prompt }],
                "max_tokens": max_tokens,
                "temperature": temperature,
                "anthropic_version": ANTHROPIC_VERSION,
            }),
            ModelFamily::Llama => json!({
                "prompt": prompt,
                "max_gen_len": max_tokens,
                "temperature": temperature,
            }),
            ModelFamily::Titan => json!({
                "inputText": prompt,
                "textGenerationConfig": {
                    "maxTokenCount": max_tokens,
                    "temperature": temperature,
                    "topP": 0.9,
                },
            }),
            ModelFamily::Cohere => json!({
                "prompt": prompt,
                "max_tokens": max_tokens,
                "temperature": temperature,
                "p": 0.9,
            }),
        }
    }

    /// JSON pointer to the generated text in a response envelope.
    fn text_pointer(&self) -> &'static str {
        match self {
            ModelFamily::Nova => "/output/message/content/0/text",
            ModelFamily::Claude => "/content/0/text",
            ModelFamily::Llama => "/generation",
            ModelFamily::Titan => "/results/0/outputText",
            ModelFamily::Cohere => "/generations/0/text",
        }
    }

    pub fn extract_text(&self, body: &Value) -> Result<String, ProviderError> {
        body.pointer(self.text_pointer())
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::MalformedResponse(format!(
                    "missing text at '{}'",
                    self.text_pointer()
                ))
            })
    }
}
