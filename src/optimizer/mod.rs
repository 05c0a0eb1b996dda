//! # Optimization Pipeline
//!
//! Turns a prompt description into an optimized prompt.
//!
//! ```text
//! request ──► cache ──hit──────────────────────────────────────► result
//!               │
//!              miss
//!               ▼
//!          primary (remote model) ──ok──► parse ──┐
//!               │                                 ├──► cache.set ──► result
//!              err ──► fallback (rule-based) ─────┘
//! ```
//!
//! The pipeline never reports failure to its caller. A provider error of any
//! kind (transport, HTTP status, unsupported model, empty or malformed
//! envelope) switches to the rule-based strategy, which cannot fail. A
//! completion that is not the expected JSON shape is used verbatim.
//!
//! ## Submodules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`prompt`] | Instruction prompt rendering |
//! | [`parse`] | Structured answer parsing with raw-text degrade |
//! | [`quality`] | Domain classification and prompt quality scoring |
//! | [`fallback`] | Deterministic rule-based rewrite |
//!
//! ## Example
//!
//! ```rust,no_run
//! use prompt_tune::optimizer::{OptimizationPipeline, OptimizeRequest};
//! use prompt_tune::provider::{HttpProvider, HttpProviderConfig};
//! use std::sync::Arc;
//!
//! # async fn run() -> prompt_tune::Result<()> {
//! let provider = HttpProvider::new(HttpProviderConfig::default())?;
//! let pipeline = OptimizationPipeline::builder()
//!     .provider(Arc::new(provider))
//!     .build();
//!
//! let request = OptimizeRequest::new("Write a product launch email").with_model("claude-sonnet");
//! request.validate()?;
//! let result = pipeline.optimize(&request).await;
//! println!("{} ({})", result.optimized_prompt, result.strategy);
//! # Ok(())
//! # }
//! ```

pub mod fallback;
pub mod parse;
pub mod prompt;
pub mod quality;
mod stream;

#[cfg(test)]
mod tests;

pub use stream::{EventStream, OptimizeEvent};

use crate::analytics::{Analytics, AnalyticsSnapshot, RequestRecord};
use crate::cache::{CacheStats, ResultCache};
use crate::models::{ModelCatalog, ModelSpec, DEFAULT_MODEL_ALIAS};
use crate::provider::{GenerationRequest, ModelProvider, OfflineProvider, ProviderError};
use crate::tokens::{TokenCounter, WordEstimator};
use crate::{Error, ErrorContext, Result};
use fallback::RuleBasedOptimizer;
use quality::{analyze_quality, classify_domain, Domain};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

const PRIMARY_SCORE: u8 = 95;
const FALLBACK_SCORE: u8 = 85;

/// Which strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Primary,
    Fallback,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Primary => f.write_str("primary"),
            Strategy::Fallback => f.write_str("fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub description: String,
    #[serde(default)]
    pub context: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

fn default_model() -> String {
    DEFAULT_MODEL_ALIAS.to_string()
}

impl OptimizeRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            context: String::new(),
            model: default_model(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Boundary-side validation. The pipeline does not call this itself.
    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(Error::validation_with_context(
                "description is required",
                ErrorContext::new()
                    .with_field_path("request.description")
                    .with_source("request_validator"),
            ));
        }
        if let Some(t) = self.temperature {
            if !(0.0..=1.0).contains(&t) {
                return Err(Error::validation_with_context(
                    "temperature must be between 0.0 and 1.0",
                    ErrorContext::new()
                        .with_field_path("request.temperature")
                        .with_details(format!("got {}", t))
                        .with_source("request_validator"),
                ));
            }
        }
        if self.max_tokens == Some(0) {
            return Err(Error::validation_with_context(
                "max_tokens must be positive",
                ErrorContext::new()
                    .with_field_path("request.max_tokens")
                    .with_source("request_validator"),
            ));
        }
        Ok(())
    }
}

/// Payload returned to callers and stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub optimized_prompt: String,
    pub reasoning_trace: Vec<String>,
    pub strategy: Strategy,
    /// Catalog alias that actually served the request.
    pub model_used: String,
    pub domain: Domain,
    pub cost_estimate: f64,
    pub optimization_score: u8,
    pub original_quality: f64,
    pub timestamp: f64,
}

pub type PromptCache = ResultCache<PipelineResult>;

fn timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Cost estimates carry six decimal places.
fn round_cost(cost: f64) -> f64 {
    (cost * 1e6).round() / 1e6
}

struct Outcome {
    optimized_prompt: String,
    reasoning_trace: Vec<String>,
    strategy: Strategy,
    /// False when the model's answer was used as raw text.
    structured: bool,
    cost: f64,
    score: u8,
}

/// Cache-first, primary-then-fallback prompt optimizer.
///
/// Cheap to clone; all state is shared behind `Arc`s.
#[derive(Clone)]
pub struct OptimizationPipeline {
    cache: Arc<PromptCache>,
    provider: Arc<dyn ModelProvider>,
    catalog: Arc<ModelCatalog>,
    analytics: Arc<Analytics>,
    rules: RuleBasedOptimizer,
    counter: WordEstimator,
    max_tokens: u32,
    temperature: f32,
}

impl OptimizationPipeline {
    pub fn builder() -> OptimizationPipelineBuilder {
        OptimizationPipelineBuilder::new()
    }

    pub async fn optimize(&self, request: &OptimizeRequest) -> PipelineResult {
        let started = Instant::now();

        if let Some(hit) = self
            .cache
            .get(&request.description, &request.context, &request.model)
        {
            info!(model = %hit.model_used, "returning cached result");
            self.analytics.record(&RequestRecord {
                model: hit.model_used.clone(),
                domain: hit.domain,
                cache_hit: true,
                strategy: hit.strategy,
                primary_error: None,
                model_substituted: false,
                unstructured: false,
                cost: hit.cost_estimate,
                latency: started.elapsed(),
            });
            return hit;
        }

        let resolution = self.catalog.resolve(&request.model);
        let spec = resolution.spec.clone();
        let model_substituted = resolution.substituted;
        let domain = classify_domain(&request.description);
        let quality = analyze_quality(&request.description);

        let (outcome, primary_error) = match self.run_primary(request, &spec, domain).await {
            Ok(outcome) => (outcome, None),
            Err(err) => {
                warn!(
                    error = %err,
                    kind = err.kind(),
                    provider = self.provider.name(),
                    model = %spec.alias,
                    "primary strategy failed, using rule-based fallback"
                );
                (self.run_fallback(request, domain), Some(err.kind()))
            }
        };

        let outcome_structured = outcome.structured;
        let result = PipelineResult {
            optimized_prompt: outcome.optimized_prompt,
            reasoning_trace: outcome.reasoning_trace,
            strategy: outcome.strategy,
            model_used: spec.alias.clone(),
            domain,
            cost_estimate: outcome.cost,
            optimization_score: outcome.score,
            original_quality: quality.overall(),
            timestamp: timestamp(),
        };

        self.cache.set(
            &request.description,
            &request.context,
            &request.model,
            result.clone(),
        );
        self.analytics.record(&RequestRecord {
            model: result.model_used.clone(),
            domain,
            cache_hit: false,
            strategy: result.strategy,
            primary_error,
            model_substituted,
            unstructured: !outcome_structured,
            cost: result.cost_estimate,
            latency: started.elapsed(),
        });
        info!(
            strategy = %result.strategy,
            model = %result.model_used,
            domain = %domain,
            "optimization complete"
        );
        result
    }

    /// Same result as [`optimize`](Self::optimize), delivered as a sequence of
    /// status, reasoning and result events.
    pub fn optimize_stream(&self, request: OptimizeRequest) -> EventStream {
        stream::events(self.clone(), request)
    }

    async fn run_primary(
        &self,
        request: &OptimizeRequest,
        spec: &ModelSpec,
        domain: Domain,
    ) -> std::result::Result<Outcome, ProviderError> {
        let prompt = prompt::render(&request.description, &request.context, domain);
        let generation_request = GenerationRequest {
            model_id: spec.model_id.clone(),
            prompt,
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
            temperature: request.temperature.unwrap_or(self.temperature),
        };

        // No cache lock is held here; concurrent misses may each reach the provider.
        let generation = self.provider.generate(&generation_request).await?;
        let parsed = parse::parse_response(&generation.text);

        let input_tokens = self.counter.count(&generation_request.prompt) as u32;
        let output_tokens = self.counter.count(&generation.text) as u32;
        let cost = round_cost(
            spec.pricing
                .calculate_cost(input_tokens, output_tokens)
                .total_cost,
        );

        Ok(Outcome {
            optimized_prompt: parsed.optimized_prompt,
            reasoning_trace: parsed.reasoning_trace,
            strategy: Strategy::Primary,
            structured: parsed.structured,
            cost,
            score: PRIMARY_SCORE,
        })
    }

    fn run_fallback(&self, request: &OptimizeRequest, domain: Domain) -> Outcome {
        let enhancement = self.rules.enhance(&request.description, domain);
        Outcome {
            optimized_prompt: enhancement.text,
            reasoning_trace: enhancement.steps,
            strategy: Strategy::Fallback,
            structured: true,
            cost: 0.0,
            score: FALLBACK_SCORE,
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn analytics(&self) -> AnalyticsSnapshot {
        self.analytics.snapshot()
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }
}

/// Builder for [`OptimizationPipeline`].
///
/// Every collaborator has a default: a 30 minute cache, the builtin model
/// catalog, fresh analytics, and an offline provider (fallback only).
pub struct OptimizationPipelineBuilder {
    cache: Option<Arc<PromptCache>>,
    provider: Arc<dyn ModelProvider>,
    catalog: ModelCatalog,
    analytics: Option<Arc<Analytics>>,
    max_tokens: u32,
    temperature: f32,
}

impl OptimizationPipelineBuilder {
    pub fn new() -> Self {
        Self {
            cache: None,
            provider: Arc::new(OfflineProvider),
            catalog: ModelCatalog::builtin(),
            analytics: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Share an existing cache, e.g. one owned by the enclosing service.
    pub fn cache(mut self, cache: Arc<PromptCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn ModelProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn analytics(mut self, analytics: Arc<Analytics>) -> Self {
        self.analytics = Some(analytics);
        self
    }

    /// Used when a request carries no `max_tokens`.
    pub fn default_max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = n.max(1);
        self
    }

    /// Used when a request carries no `temperature`.
    pub fn default_temperature(mut self, t: f32) -> Self {
        self.temperature = t;
        self
    }

    pub fn build(self) -> OptimizationPipeline {
        OptimizationPipeline {
            cache: self
                .cache
                .unwrap_or_else(|| Arc::new(ResultCache::new(DEFAULT_CACHE_TTL))),
            provider: self.provider,
            catalog: Arc::new(self.catalog),
            analytics: self.analytics.unwrap_or_default(),
            rules: RuleBasedOptimizer::new(),
            counter: WordEstimator::new(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

impl Default for OptimizationPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
