//! Rendering of the instruction prompt sent to the remote model.

use super::quality::Domain;

pub const SYSTEM_PROMPT: &str = r#"You are an expert prompt engineer. Your task is to optimize prompts for maximum effectiveness while showing your reasoning process step by step.

When given a user's description of what they want to achieve, you should:

1. **Analyze** the user's intent and identify key requirements
2. **Consider** best practices for prompt engineering (clarity, specificity, examples, etc.)
3. **Structure** the prompt using proven techniques (role-playing, step-by-step instructions, etc.)
4. **Optimize** for the specific use case and model capabilities
5. **Validate** that the prompt addresses all requirements

Show your thinking process clearly in a "reasoning trace" format, then provide the final optimized prompt.

Format your response as JSON:
{
    "reasoning_trace": [
        "Step 1: Analysis - [your analysis]",
        "Step 2: Requirements - [key requirements identified]",
        "Step 3: Structure - [how you'll structure the prompt]",
        "Step 4: Optimization - [specific optimizations made]",
        "Step 5: Validation - [final checks and improvements]"
    ],
    "optimized_prompt": "[your final optimized prompt]"
}"#;

/// System instructions, domain framing, the user's request and optional context.
pub fn render(description: &str, context: &str, domain: Domain) -> String {
    let mut out = String::with_capacity(SYSTEM_PROMPT.len() + description.len() + context.len() + 128);
    out.push_str(SYSTEM_PROMPT);
    if domain != Domain::General {
        out.push_str("\n\nDomain Context: This request appears to be in the ");
        out.push_str(domain.as_str());
        out.push_str(" domain.");
    }
    out.push_str("\n\nUser Request: ");
    out.push_str(description);
    if !context.trim().is_empty() {
        out.push_str("\nContext: ");
        out.push_str(context);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_request_and_context() {
        let p = render("Write a cover letter", "Senior backend role", Domain::General);
        assert!(p.starts_with(SYSTEM_PROMPT));
        assert!(p.contains("\n\nUser Request: Write a cover letter\nContext: Senior backend role"));
        assert!(!p.contains("Domain Context"));
    }

    #[test]
    fn empty_context_is_omitted() {
        let p = render("Write a cover letter", "  ", Domain::General);
        assert!(p.ends_with("User Request: Write a cover letter"));
    }

    #[test]
    fn domain_framing_is_included() {
        let p = render("Refactor this code", "", Domain::Technical);
        assert!(p.contains("appears to be in the technical domain."));
    }
}
