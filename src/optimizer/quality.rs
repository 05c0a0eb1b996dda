//! Domain classification and prompt quality heuristics.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Business,
    Technical,
    Creative,
    Analytical,
    General,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Business => "business",
            Domain::Technical => "technical",
            Domain::Creative => "creative",
            Domain::Analytical => "analytical",
            Domain::General => "general",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Declaration order breaks ties.
const DOMAIN_KEYWORDS: [(Domain, &[&str]); 4] = [
    (
        Domain::Business,
        &["strategy", "marketing", "sales", "finance", "management"],
    ),
    (
        Domain::Technical,
        &["code", "programming", "software", "development", "engineering"],
    ),
    (
        Domain::Creative,
        &["design", "content", "writing", "creative", "brand"],
    ),
    (
        Domain::Analytical,
        &["data", "analysis", "research", "statistics", "insights"],
    ),
];

const ROLE_PHRASES: [&str; 3] = ["act as", "you are", "role of"];
const FORMAT_WORDS: [&str; 3] = ["format", "structure", "organize"];
const VAGUE_WORDS: [&str; 7] = ["good", "better", "nice", "some", "many", "few", "several"];
const SPECIFIC_WORDS: [&str; 5] = ["specific", "detailed", "exactly", "precisely", "step-by-step"];
const IDEAL_SENTENCE_WORDS: f64 = 17.5;

static ENUMERATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(?:^\s*(?:[-*•]|\d+[.)])\s)|(?:\b\d+\)\s)").expect("static regex")
});

pub fn classify_domain(text: &str) -> Domain {
    let lower = text.to_lowercase();
    let mut best = (Domain::General, 0usize);
    for (domain, keywords) in DOMAIN_KEYWORDS.iter() {
        let score = keywords.iter().filter(|k| lower.contains(*k)).count();
        if score > best.1 {
            best = (*domain, score);
        }
    }
    best.0
}

pub fn has_role(text: &str) -> bool {
    let lower = text.to_lowercase();
    ROLE_PHRASES.iter().any(|p| lower.contains(p))
}

/// True when the text already carries numbered steps or bullet points.
pub fn has_enumeration(text: &str) -> bool {
    ENUMERATION.is_match(text)
}

/// True when the text names an output format explicitly.
pub fn mentions_format(text: &str) -> bool {
    text.to_lowercase().contains("format")
}

pub fn has_format_spec(text: &str) -> bool {
    let lower = text.to_lowercase();
    FORMAT_WORDS.iter().any(|w| lower.contains(w))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub word_count: usize,
    pub has_role: bool,
    pub has_structure: bool,
    pub has_context: bool,
    pub has_format_spec: bool,
    pub specificity: f64,
    pub clarity: f64,
}

impl QualityReport {
    /// Mean of specificity and clarity on a 0–100 scale, one decimal.
    pub fn overall(&self) -> f64 {
        (((self.specificity + self.clarity) / 2.0) * 1000.0).round() / 10.0
    }
}

pub fn analyze_quality(text: &str) -> QualityReport {
    let word_count = text.split_whitespace().count();
    QualityReport {
        word_count,
        has_role: has_role(text),
        has_structure: has_enumeration(text),
        has_context: word_count > 10,
        has_format_spec: has_format_spec(text),
        specificity: specificity(text),
        clarity: clarity(text),
    }
}

fn normalize(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != '-')
        .to_lowercase()
}

fn specificity(text: &str) -> f64 {
    let words: Vec<String> = text.split_whitespace().map(normalize).collect();
    if words.is_empty() {
        return 0.0;
    }
    let vague = words.iter().filter(|w| VAGUE_WORDS.contains(&w.as_str())).count() as f64;
    let specific = words
        .iter()
        .filter(|w| SPECIFIC_WORDS.contains(&w.as_str()))
        .count() as f64;
    ((specific - vague) / words.len() as f64 + 0.5).clamp(0.0, 1.0)
}

fn clarity(text: &str) -> f64 {
    let sentences: Vec<&str> = text.split('.').collect();
    let total: usize = sentences.iter().map(|s| s.split_whitespace().count()).sum();
    let avg = total as f64 / sentences.len().max(1) as f64;
    (1.0 - (avg - IDEAL_SENTENCE_WORDS).abs() / IDEAL_SENTENCE_WORDS).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_picks_highest_keyword_count() {
        assert_eq!(
            classify_domain("Write software code for a data pipeline"),
            Domain::Technical
        );
        assert_eq!(
            classify_domain("Marketing strategy for a new brand"),
            Domain::Business
        );
        assert_eq!(classify_domain("Write a prompt for X"), Domain::General);
        assert_eq!(classify_domain(""), Domain::General);
    }

    #[test]
    fn ties_go_to_declaration_order() {
        // one business keyword, one analytical keyword
        assert_eq!(classify_domain("sales data"), Domain::Business);
    }

    #[test]
    fn enumeration_detection() {
        assert!(has_enumeration("Do this:\n1. gather\n2. write"));
        assert!(has_enumeration("Steps: 1) plan 2) act"));
        assert!(has_enumeration("- first\n- second"));
        assert!(!has_enumeration("Write a prompt for X"));
        assert!(!has_enumeration("a well-known approach"));
    }

    #[test]
    fn role_and_format_detection() {
        assert!(has_role("You are a tax advisor"));
        assert!(has_role("Please ACT AS a critic"));
        assert!(!has_role("Write a poem"));
        assert!(has_format_spec("Format the answer as JSON"));
        assert!(!has_format_spec("Write a poem"));
        assert!(has_format_spec("Organize the findings"));
        assert!(!mentions_format("Organize and structure the findings"));
        assert!(mentions_format("Use markdown FORMAT"));
    }

    #[test]
    fn specificity_is_clamped_and_safe_on_empty() {
        assert_eq!(specificity(""), 0.0);
        assert_eq!(specificity("good"), 0.0);
        assert_eq!(specificity("specific"), 1.0);
        assert_eq!(specificity("plain words only"), 0.5);
    }

    #[test]
    fn clarity_peaks_near_ideal_sentence_length() {
        let ideal = vec!["word"; 17].join(" ") + " end.";
        let terse = "Go.";
        assert!(clarity(&ideal) > clarity(terse));
        assert_eq!(clarity(""), 0.0);
    }

    #[test]
    fn report_for_short_prompt() {
        let report = analyze_quality("Write a prompt for X");
        assert_eq!(report.word_count, 5);
        assert!(!report.has_role);
        assert!(!report.has_structure);
        assert!(!report.has_context);
        assert!(!report.has_format_spec);
        assert!(report.overall() >= 0.0 && report.overall() <= 100.0);
    }
}
