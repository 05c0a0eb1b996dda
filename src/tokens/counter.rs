//! Token counter implementations.

pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// Whitespace-word heuristic: `words * tokens_per_word`, truncated.
#[derive(Debug, Clone)]
pub struct WordEstimator {
    tokens_per_word: f64,
}

impl WordEstimator {
    pub fn new() -> Self {
        Self::with_ratio(1.3)
    }
    pub fn with_ratio(r: f64) -> Self {
        Self { tokens_per_word: r }
    }
}

impl Default for WordEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCounter for WordEstimator {
    fn count(&self, text: &str) -> usize {
        (text.split_whitespace().count() as f64 * self.tokens_per_word) as usize
    }
}
