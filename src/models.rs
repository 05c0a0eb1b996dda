//! Model catalog: public aliases, provider model ids and unit prices.
//!
//! Callers address models by alias (`claude-haiku`). An alias the catalog does
//! not know resolves to the default model; the resolution reports which model
//! was actually used so results never claim a model that did not run.

use crate::tokens::ModelPricing;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_MODEL_ALIAS: &str = "claude-haiku";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub alias: String,
    pub model_id: String,
    #[serde(default = "ModelPricing::fallback_rates")]
    pub pricing: ModelPricing,
}

impl ModelSpec {
    pub fn new(alias: &str, model_id: &str, input: f64, output: f64) -> Self {
        Self {
            alias: alias.into(),
            model_id: model_id.into(),
            pricing: ModelPricing::new(input, output),
        }
    }
}

/// Outcome of looking up a requested alias.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    pub spec: &'a ModelSpec,
    /// True when the requested alias was unknown and the default was used.
    pub substituted: bool,
}

#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<ModelSpec>,
    default_alias: String,
}

impl ModelCatalog {
    /// Bedrock model ids with per-1K-token (input, output) USD rates.
    pub fn builtin() -> Self {
        Self {
            models: vec![
                ModelSpec::new(
                    "claude-haiku",
                    "anthropic.claude-3-haiku-20240307-v1:0",
                    0.00025,
                    0.00125,
                ),
                ModelSpec::new(
                    "claude-sonnet",
                    "anthropic.claude-3-sonnet-20240229-v1:0",
                    0.003,
                    0.015,
                ),
                ModelSpec::new(
                    "claude-3.5-sonnet",
                    "anthropic.claude-3-5-sonnet-20240620-v1:0",
                    0.003,
                    0.015,
                ),
                ModelSpec::new("nova-lite", "amazon.nova-lite-v1:0", 0.00006, 0.00024),
                ModelSpec::new("llama3-8b", "meta.llama3-8b-instruct-v1:0", 0.0003, 0.0006),
                ModelSpec::new("titan-express", "amazon.titan-text-express-v1", 0.0002, 0.0006),
                ModelSpec::new(
                    "cohere-light",
                    "cohere.command-light-text-v14",
                    0.0003,
                    0.0006,
                ),
            ],
            default_alias: DEFAULT_MODEL_ALIAS.into(),
        }
    }

    /// Add a model, replacing any existing entry with the same alias.
    pub fn with_model(mut self, spec: ModelSpec) -> Self {
        if let Some(existing) = self.models.iter_mut().find(|m| m.alias == spec.alias) {
            *existing = spec;
        } else {
            self.models.push(spec);
        }
        self
    }

    /// Change the default alias. Ignored if the alias is not in the catalog.
    pub fn with_default(mut self, alias: &str) -> Self {
        if self.get(alias).is_some() {
            self.default_alias = alias.into();
        } else {
            warn!(alias, "ignoring unknown default model alias");
        }
        self
    }

    pub fn default_alias(&self) -> &str {
        &self.default_alias
    }

    pub fn get(&self, alias: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|m| m.alias == alias)
    }

    pub fn resolve(&self, requested: &str) -> Resolution<'_> {
        if let Some(spec) = self.get(requested) {
            return Resolution {
                spec,
                substituted: false,
            };
        }
        warn!(
            requested,
            default = %self.default_alias,
            "unknown model alias, using default"
        );
        Resolution {
            spec: self.default_spec(),
            substituted: true,
        }
    }

    fn default_spec(&self) -> &ModelSpec {
        // `with_default` only accepts known aliases and `builtin` seeds the
        // default, so the lookup succeeds unless the catalog is empty.
        self.get(&self.default_alias)
            .or_else(|| self.models.first())
            .unwrap_or(&FALLBACK_SPEC)
    }

    pub fn list(&self) -> &[ModelSpec] {
        &self.models
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

static FALLBACK_SPEC: once_cell::sync::Lazy<ModelSpec> = once_cell::sync::Lazy::new(|| {
    ModelSpec::new(
        DEFAULT_MODEL_ALIAS,
        "anthropic.claude-3-haiku-20240307-v1:0",
        0.00025,
        0.00125,
    )
});
