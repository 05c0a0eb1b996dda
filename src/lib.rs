//! # prompt-tune
//!
//! Prompt optimization runtime: rewrites a user's prompt description into a
//! production-ready prompt using a hosted language model, with a result cache
//! in front and a deterministic rule-based rewrite behind it.
//!
//! ## Overview
//!
//! A request flows through [`optimizer::OptimizationPipeline`]:
//!
//! 1. **Cache**: results are memoized per `(description, context, model)` for
//!    a configurable TTL ([`cache::ResultCache`]).
//! 2. **Primary strategy**: the remote model is asked for a reasoning trace
//!    and an optimized prompt ([`provider::ModelProvider`]).
//! 3. **Fallback strategy**: if the remote call fails for any reason, a local
//!    rule-based rewrite produces the result instead.
//!
//! The caller always gets a [`optimizer::PipelineResult`]; provider failures
//! are logged and counted, not returned.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prompt_tune::config::Settings;
//! use prompt_tune::optimizer::OptimizeRequest;
//!
//! #[tokio::main]
//! async fn main() -> prompt_tune::Result<()> {
//!     let pipeline = Settings::resolve(None)?.build_pipeline()?;
//!
//!     let request = OptimizeRequest::new("Write a prompt for summarizing support tickets")
//!         .with_context("Tickets are from a SaaS billing product");
//!     request.validate()?;
//!
//!     let result = pipeline.optimize(&request).await;
//!     println!("{}", result.optimized_prompt);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | TTL result cache and key derivation |
//! | [`optimizer`] | Cache-first, primary-then-fallback pipeline |
//! | [`provider`] | Remote model seam and HTTP implementation |
//! | [`models`] | Model aliases, provider ids and prices |
//! | [`tokens`] | Token estimation and cost calculation |
//! | [`analytics`] | In-process usage counters |
//! | [`library`] | Saved prompts with usage counts |
//! | [`config`] | YAML and environment settings |

pub mod analytics;
pub mod cache;
pub mod config;
pub mod library;
pub mod models;
pub mod optimizer;
pub mod provider;
pub mod tokens;

pub use optimizer::{
    OptimizationPipeline, OptimizeEvent, OptimizeRequest, PipelineResult, Strategy,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
