//! # Token Counting and Cost Estimation Module
//!
//! Cost estimates attached to optimization results are approximations for
//! display and ranking, not billing figures.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`TokenCounter`] | Trait for token counting implementations |
//! | [`WordEstimator`] | Word-based approximation (1 word ≈ 1.3 tokens) |
//! | [`ModelPricing`] | Per-1K-token input/output rates |
//! | [`CostEstimate`] | Estimated cost breakdown |
//!
//! ## Example
//!
//! ```rust
//! use prompt_tune::tokens::{ModelPricing, TokenCounter, WordEstimator};
//!
//! let counter = WordEstimator::new();
//! let input = counter.count("Write a product description for a standing desk") as u32;
//! let estimate = ModelPricing::new(0.00025, 0.00125).calculate_cost(input, 300);
//! assert!(estimate.total_cost > 0.0);
//! ```

mod counter;
mod pricing;

pub use counter::{TokenCounter, WordEstimator};
pub use pricing::{CostEstimate, ModelPricing};
