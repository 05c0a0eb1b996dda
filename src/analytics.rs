//! In-process usage analytics.
//!
//! Counter aggregation only: request totals, cache effectiveness, strategy
//! mix, per-model and per-domain usage, primary failure kinds, estimated
//! spend and latency.
//! Nothing is persisted; counters reset with the process.

use crate::optimizer::quality::Domain;
use crate::optimizer::Strategy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One completed `optimize` call.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub model: String,
    pub domain: Domain,
    pub cache_hit: bool,
    pub strategy: Strategy,
    /// Set when the primary strategy was attempted and failed.
    pub primary_error: Option<&'static str>,
    /// The requested alias was unknown and the default model ran.
    pub model_substituted: bool,
    /// The model answered, but not in the structured shape.
    pub unstructured: bool,
    pub cost: f64,
    pub latency: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsSnapshot {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub primary_results: u64,
    pub fallback_results: u64,
    pub model_substitutions: u64,
    pub unstructured_completions: u64,
    pub model_usage: BTreeMap<String, u64>,
    pub domain_distribution: BTreeMap<String, u64>,
    pub primary_failures: BTreeMap<String, u64>,
    pub total_cost: f64,
    pub average_latency_ms: f64,
}

impl AnalyticsSnapshot {
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }

    pub fn error_rate(&self) -> f64 {
        let attempts = self.cache_misses;
        if attempts == 0 {
            0.0
        } else {
            self.primary_failures.values().sum::<u64>() as f64 / attempts as f64
        }
    }
}

#[derive(Default)]
struct Breakdown {
    model_usage: BTreeMap<String, u64>,
    domain_distribution: BTreeMap<String, u64>,
    primary_failures: BTreeMap<String, u64>,
    total_cost: f64,
}

#[derive(Default)]
pub struct Analytics {
    requests: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    primary: AtomicU64,
    fallback: AtomicU64,
    substitutions: AtomicU64,
    unstructured: AtomicU64,
    latency_micros: AtomicU64,
    breakdown: Mutex<Breakdown>,
}

impl Analytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, record: &RequestRecord) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if record.cache_hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        match record.strategy {
            Strategy::Primary => self.primary.fetch_add(1, Ordering::Relaxed),
            Strategy::Fallback => self.fallback.fetch_add(1, Ordering::Relaxed),
        };
        if record.model_substituted {
            self.substitutions.fetch_add(1, Ordering::Relaxed);
        }
        if record.unstructured {
            self.unstructured.fetch_add(1, Ordering::Relaxed);
        }
        self.latency_micros.fetch_add(
            u64::try_from(record.latency.as_micros()).unwrap_or(u64::MAX),
            Ordering::Relaxed,
        );

        let mut b = self.breakdown.lock().unwrap_or_else(|e| e.into_inner());
        *b.model_usage.entry(record.model.clone()).or_insert(0) += 1;
        *b.domain_distribution
            .entry(record.domain.to_string())
            .or_insert(0) += 1;
        if let Some(kind) = record.primary_error {
            *b.primary_failures.entry(kind.to_string()).or_insert(0) += 1;
        }
        if !record.cache_hit {
            b.total_cost += record.cost;
        }
    }

    pub fn snapshot(&self) -> AnalyticsSnapshot {
        let total_requests = self.requests.load(Ordering::Relaxed);
        let latency = self.latency_micros.load(Ordering::Relaxed);
        let b = self.breakdown.lock().unwrap_or_else(|e| e.into_inner());
        AnalyticsSnapshot {
            total_requests,
            cache_hits: self.hits.load(Ordering::Relaxed),
            cache_misses: self.misses.load(Ordering::Relaxed),
            primary_results: self.primary.load(Ordering::Relaxed),
            fallback_results: self.fallback.load(Ordering::Relaxed),
            model_substitutions: self.substitutions.load(Ordering::Relaxed),
            unstructured_completions: self.unstructured.load(Ordering::Relaxed),
            model_usage: b.model_usage.clone(),
            domain_distribution: b.domain_distribution.clone(),
            primary_failures: b.primary_failures.clone(),
            total_cost: b.total_cost,
            average_latency_ms: if total_requests == 0 {
                0.0
            } else {
                latency as f64 / total_requests as f64 / 1000.0
            },
        }
    }
}
