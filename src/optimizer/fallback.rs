//! Rule-based fallback strategy.
//!
//! A deterministic, local rewrite of the input prompt used whenever the
//! remote model is unavailable. It never fails and never performs I/O.

use super::quality::{has_enumeration, has_role, mentions_format, Domain};

const SHORT_PROMPT_WORDS: usize = 10;

const QUALITY_DIRECTIVE: &str =
    "Ensure your response is professional, well-organized, and directly addresses all requirements.";
const SPECIFICITY_DIRECTIVE: &str =
    "Provide specific, detailed, and actionable information with concrete examples.";

fn role_for(domain: Domain) -> &'static str {
    match domain {
        Domain::Business => {
            "Act as a senior business strategist with 15+ years of experience in [INDUSTRY]"
        }
        Domain::Technical => "Act as a senior software engineer specializing in [TECHNOLOGY]",
        Domain::Creative => {
            "Act as a professional creative director with expertise in [DOMAIN]"
        }
        Domain::Analytical => "Act as a senior data scientist with expertise in [FIELD]",
        Domain::General => "Act as a seasoned subject-matter expert in [FIELD]",
    }
}

fn structure_for(domain: Domain) -> &'static str {
    match domain {
        Domain::Technical | Domain::Creative => {
            "1) Requirements gathering, 2) Concept development, 3) Detailed execution, 4) Quality review"
        }
        Domain::Business => {
            "1) Problem definition, 2) Root cause analysis, 3) Solution options, 4) Implementation plan"
        }
        Domain::Analytical | Domain::General => {
            "1) Current situation analysis, 2) Key findings, 3) Recommendations, 4) Implementation steps"
        }
    }
}

fn format_for(domain: Domain) -> &'static str {
    match domain {
        Domain::Technical => {
            "Format as technical specification with: Requirements, Architecture, Implementation, Testing"
        }
        Domain::Creative => {
            "Format as creative brief with: Objective, Target Audience, Key Messages, Deliverables"
        }
        _ => {
            "Format as executive summary with: Executive Overview, Key Findings, Recommendations, Next Steps"
        }
    }
}

/// Output of the rule-based rewrite.
#[derive(Debug, Clone, PartialEq)]
pub struct Enhancement {
    pub text: String,
    /// One entry per applied rule, in application order.
    pub steps: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedOptimizer;

impl RuleBasedOptimizer {
    pub fn new() -> Self {
        Self
    }

    pub fn enhance(&self, original: &str, domain: Domain) -> Enhancement {
        let original = original.trim();
        let mut text = original.to_string();
        let mut steps = Vec::new();

        if !has_role(&text) {
            text = if text.is_empty() {
                format!("{}.", role_for(domain))
            } else {
                format!("{}. {}", role_for(domain), text)
            };
            steps.push(format!("Added expert role context for the {} domain", domain));
        }

        if !has_enumeration(&text) {
            text.push_str("\n\nStructure your response with: ");
            text.push_str(structure_for(domain));
            steps.push("Added response structure".to_string());
        }

        text.push_str("\n\n");
        text.push_str(QUALITY_DIRECTIVE);
        steps.push("Added quality assurance guidelines".to_string());

        if !mentions_format(original) {
            text.push_str("\n\n");
            text.push_str(format_for(domain));
            steps.push("Added output format specification".to_string());
        }

        if original.split_whitespace().count() < SHORT_PROMPT_WORDS {
            text.push_str("\n\n");
            text.push_str(SPECIFICITY_DIRECTIVE);
            steps.push("Enhanced specificity and detail requirements".to_string());
        }

        Enhancement { text, steps }
    }
}
