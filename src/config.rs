//! Runtime settings.
//!
//! Settings come from an optional YAML file, then environment overrides:
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `PROMPT_TUNE_CACHE_TTL_MINUTES` | `cache_ttl_minutes` |
//! | `PROMPT_TUNE_CACHE_CLEANUP_THRESHOLD` | `cache_cleanup_threshold` |
//! | `PROMPT_TUNE_DEFAULT_MODEL` | `default_model` |
//! | `PROMPT_TUNE_MAX_TOKENS` | `max_tokens` |
//! | `PROMPT_TUNE_TEMPERATURE` | `temperature` |
//! | `PROMPT_TUNE_BASE_URL` | `provider.base_url` |
//! | `PROMPT_TUNE_HTTP_TIMEOUT_SECS` | `provider.timeout_secs` |
//! | `PROMPT_TUNE_LIBRARY_PATH` | `library_path` |
//!
//! Unparseable values are ignored and the previous value kept.

use crate::analytics::Analytics;
use crate::cache::{ResultCache, DEFAULT_CLEANUP_THRESHOLD};
use crate::library::PromptLibrary;
use crate::models::{ModelCatalog, ModelSpec, DEFAULT_MODEL_ALIAS};
use crate::optimizer::{OptimizationPipeline, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::provider::http::{validate_base_url, DEFAULT_BASE_URL};
use crate::provider::{HttpProvider, HttpProviderConfig, ModelProvider, OfflineProvider};
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    /// When false every request is served by the rule-based strategy.
    pub enabled: bool,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub cache_ttl_minutes: u64,
    pub cache_cleanup_threshold: usize,
    pub default_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub provider: ProviderSettings,
    /// Extra or overriding catalog entries.
    pub models: Vec<ModelSpec>,
    /// JSON file backing the prompt library.
    pub library_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_ttl_minutes: 30,
            cache_cleanup_threshold: DEFAULT_CLEANUP_THRESHOLD,
            default_model: DEFAULT_MODEL_ALIAS.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            provider: ProviderSettings::default(),
            models: Vec::new(),
            library_path: PathBuf::from("prompt-library.json"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}

impl Settings {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&raw)
    }

    /// Optional file, then environment overrides.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        settings.apply_env();
        settings.validate()?;
        Ok(settings)
    }

    pub fn apply_env(&mut self) {
        if let Some(v) = env_parse("PROMPT_TUNE_CACHE_TTL_MINUTES") {
            self.cache_ttl_minutes = v;
        }
        if let Some(v) = env_parse("PROMPT_TUNE_CACHE_CLEANUP_THRESHOLD") {
            self.cache_cleanup_threshold = v;
        }
        if let Ok(v) = env::var("PROMPT_TUNE_DEFAULT_MODEL") {
            if !v.trim().is_empty() {
                self.default_model = v.trim().to_string();
            }
        }
        if let Some(v) = env_parse("PROMPT_TUNE_MAX_TOKENS") {
            self.max_tokens = v;
        }
        if let Some(v) = env_parse("PROMPT_TUNE_TEMPERATURE") {
            self.temperature = v;
        }
        if let Ok(v) = env::var("PROMPT_TUNE_BASE_URL") {
            if !v.trim().is_empty() {
                self.provider.base_url = v.trim().to_string();
            }
        }
        if let Some(v) = env_parse("PROMPT_TUNE_HTTP_TIMEOUT_SECS") {
            self.provider.timeout_secs = v;
        }
        if let Ok(v) = env::var("PROMPT_TUNE_LIBRARY_PATH") {
            if !v.trim().is_empty() {
                self.library_path = PathBuf::from(v.trim());
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl_minutes == 0 {
            return Err(Error::configuration_with_context(
                "cache TTL must be at least one minute",
                ErrorContext::new()
                    .with_field_path("cache_ttl_minutes")
                    .with_source("settings"),
            ));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(Error::configuration_with_context(
                "default temperature must be between 0.0 and 1.0",
                ErrorContext::new()
                    .with_field_path("temperature")
                    .with_details(format!("got {}", self.temperature))
                    .with_source("settings"),
            ));
        }
        if self.max_tokens == 0 {
            return Err(Error::configuration_with_context(
                "default max_tokens must be positive",
                ErrorContext::new()
                    .with_field_path("max_tokens")
                    .with_source("settings"),
            ));
        }
        validate_base_url(&self.provider.base_url)
    }

    pub fn catalog(&self) -> ModelCatalog {
        self.models
            .iter()
            .cloned()
            .fold(ModelCatalog::builtin(), ModelCatalog::with_model)
            .with_default(&self.default_model)
    }

    pub fn cache(&self) -> ResultCache<crate::optimizer::PipelineResult> {
        ResultCache::with_ttl_minutes(self.cache_ttl_minutes)
            .with_cleanup_threshold(self.cache_cleanup_threshold)
    }

    pub fn provider(&self) -> Result<Arc<dyn ModelProvider>> {
        if !self.provider.enabled {
            info!("remote provider disabled; using rule-based optimization only");
            return Ok(Arc::new(OfflineProvider));
        }
        let provider = HttpProvider::new(HttpProviderConfig {
            base_url: self.provider.base_url.clone(),
            timeout: Duration::from_secs(self.provider.timeout_secs.max(1)),
            api_key: None,
        })?;
        if !provider.has_credentials() {
            warn!("no provider credentials found; using rule-based optimization only");
            return Ok(Arc::new(OfflineProvider));
        }
        Ok(Arc::new(provider))
    }

    pub fn library(&self) -> Result<PromptLibrary> {
        PromptLibrary::open(&self.library_path)
    }

    /// Wire a pipeline from these settings.
    pub fn build_pipeline(&self) -> Result<OptimizationPipeline> {
        Ok(OptimizationPipeline::builder()
            .cache(Arc::new(self.cache()))
            .provider(self.provider()?)
            .catalog(self.catalog())
            .analytics(Arc::new(Analytics::new()))
            .default_max_tokens(self.max_tokens)
            .default_temperature(self.temperature)
            .build())
    }
}
