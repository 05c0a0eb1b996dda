//! Parsing of the model's structured answer.
//!
//! The model is asked for a JSON object with `reasoning_trace` and
//! `optimized_prompt`. Models often wrap it in prose or a code fence, so the
//! outermost `{...}` span is tried. Anything that still does not fit the
//! shape degrades to "raw text is the answer".

use serde::Deserialize;
use tracing::debug;

pub const UNSTRUCTURED_NOTE: &str = "Model response was not in expected JSON format";

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub optimized_prompt: String,
    pub reasoning_trace: Vec<String>,
    /// False when the raw text was used as-is.
    pub structured: bool,
}

#[derive(Deserialize)]
struct Structured {
    #[serde(default)]
    reasoning_trace: Vec<String>,
    #[serde(default)]
    optimized_prompt: String,
}

fn json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

pub fn parse_response(raw: &str) -> ParsedResponse {
    let parsed = serde_json::from_str::<Structured>(raw.trim())
        .ok()
        .or_else(|| json_span(raw).and_then(|s| serde_json::from_str::<Structured>(s).ok()));

    match parsed {
        Some(s) if !s.optimized_prompt.trim().is_empty() => ParsedResponse {
            optimized_prompt: s.optimized_prompt.trim().to_string(),
            reasoning_trace: s.reasoning_trace,
            structured: true,
        },
        _ => {
            debug!("structured parse failed, using raw model text");
            ParsedResponse {
                optimized_prompt: raw.trim().to_string(),
                reasoning_trace: vec![UNSTRUCTURED_NOTE.to_string()],
                structured: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json() {
        let raw = r#"{"reasoning_trace": ["Step 1", "Step 2"], "optimized_prompt": "Do X"}"#;
        let p = parse_response(raw);
        assert!(p.structured);
        assert_eq!(p.optimized_prompt, "Do X");
        assert_eq!(p.reasoning_trace, vec!["Step 1", "Step 2"]);
    }

    #[test]
    fn fenced_json_with_preamble() {
        let raw = "Here is the result:\n```json\n{\"reasoning_trace\": [], \"optimized_prompt\": \"Do Y\"}\n```";
        let p = parse_response(raw);
        assert!(p.structured);
        assert_eq!(p.optimized_prompt, "Do Y");
        assert!(p.reasoning_trace.is_empty());
    }

    #[test]
    fn free_text_degrades() {
        let p = parse_response("  Act as a chef. Write a recipe.  ");
        assert!(!p.structured);
        assert_eq!(p.optimized_prompt, "Act as a chef. Write a recipe.");
        assert_eq!(p.reasoning_trace, vec![UNSTRUCTURED_NOTE]);
    }

    #[test]
    fn missing_answer_degrades() {
        let raw = r#"{"reasoning_trace": ["thinking"]}"#;
        let p = parse_response(raw);
        assert!(!p.structured);
        assert_eq!(p.optimized_prompt, raw);
    }

    #[test]
    fn wrong_field_types_degrade() {
        let raw = r#"{"reasoning_trace": "one string", "optimized_prompt": "Do Z"}"#;
        assert!(!parse_response(raw).structured);
    }
}
