use super::*;
use crate::cache::ManualClock;
use crate::provider::Generation;
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Provider that replays a fixed script, then keeps failing.
struct ScriptedProvider {
    script: Mutex<VecDeque<std::result::Result<String, ProviderError>>>,
    calls: AtomicUsize,
    last: Mutex<Option<GenerationRequest>>,
}

impl ScriptedProvider {
    fn new(script: Vec<std::result::Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> Option<GenerationRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<Generation, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(request.clone());
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ProviderError::EmptyResponse));
        next.map(|text| Generation { text, usage: None })
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

fn structured(prompt: &str) -> String {
    serde_json::json!({
        "reasoning_trace": ["Step 1: Analysis - intent", "Step 2: Requirements - tone"],
        "optimized_prompt": prompt,
    })
    .to_string()
}

fn pipeline_with(provider: Arc<ScriptedProvider>) -> OptimizationPipeline {
    OptimizationPipeline::builder().provider(provider).build()
}

#[tokio::test]
async fn primary_success_is_parsed_and_cached() {
    let provider = ScriptedProvider::new(vec![Ok(structured("Act as an editor. Tighten this."))]);
    let pipeline = pipeline_with(provider.clone());
    let request = OptimizeRequest::new("Improve my essay intro");

    let result = pipeline.optimize(&request).await;
    assert_eq!(result.strategy, Strategy::Primary);
    assert_eq!(result.optimized_prompt, "Act as an editor. Tighten this.");
    assert_eq!(result.reasoning_trace.len(), 2);
    assert_eq!(result.model_used, "claude-haiku");
    assert_eq!(result.optimization_score, 95);
    assert!(result.cost_estimate > 0.0);

    let again = pipeline.optimize(&request).await;
    assert_eq!(again, result);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn caller_parameters_pass_through_and_defaults_fill_gaps() {
    let provider = ScriptedProvider::new(vec![Ok(structured("a")), Ok(structured("b"))]);
    let pipeline = OptimizationPipeline::builder()
        .provider(provider.clone())
        .default_max_tokens(321)
        .default_temperature(0.3)
        .build();

    pipeline
        .optimize(
            &OptimizeRequest::new("first")
                .with_model("claude-sonnet")
                .with_max_tokens(500)
                .with_temperature(0.9),
        )
        .await;
    let sent = provider.last_request().unwrap();
    assert_eq!(sent.model_id, "anthropic.claude-3-sonnet-20240229-v1:0");
    assert_eq!(sent.max_tokens, 500);
    assert_eq!(sent.temperature, 0.9);
    assert!(sent.prompt.contains("User Request: first"));

    pipeline.optimize(&OptimizeRequest::new("second")).await;
    let sent = provider.last_request().unwrap();
    assert_eq!(sent.max_tokens, 321);
    assert_eq!(sent.temperature, 0.3);
}

#[tokio::test]
async fn unstructured_completion_is_used_verbatim() {
    let provider = ScriptedProvider::new(vec![Ok("You are a poet. Write about rain.".into())]);
    let pipeline = pipeline_with(provider);
    let result = pipeline
        .optimize(&OptimizeRequest::new("poem about rain"))
        .await;
    assert_eq!(result.strategy, Strategy::Primary);
    assert_eq!(result.optimized_prompt, "You are a poet. Write about rain.");
    assert_eq!(result.reasoning_trace, vec![parse::UNSTRUCTURED_NOTE]);
    assert_eq!(pipeline.analytics().unstructured_completions, 1);
}

#[tokio::test]
async fn provider_failure_falls_back() {
    let provider = ScriptedProvider::new(vec![Err(ProviderError::Status {
        status: 429,
        message: "throttled".into(),
    })]);
    let pipeline = pipeline_with(provider);
    let result = pipeline
        .optimize(&OptimizeRequest::new("Write a prompt for X").with_max_tokens(500))
        .await;

    assert_eq!(result.strategy, Strategy::Fallback);
    assert_eq!(result.optimization_score, 85);
    assert_eq!(result.cost_estimate, 0.0);
    assert!(result.optimized_prompt.starts_with("Act as"));
    assert!(!result.reasoning_trace.is_empty());

    let stats = pipeline.analytics();
    assert_eq!(stats.fallback_results, 1);
    assert_eq!(stats.primary_failures.get("status"), Some(&1));
}

#[tokio::test]
async fn unknown_model_reports_the_model_used() {
    let provider = ScriptedProvider::new(vec![Ok(structured("x"))]);
    let pipeline = pipeline_with(provider.clone());
    let result = pipeline
        .optimize(&OptimizeRequest::new("anything").with_model("gpt-17"))
        .await;
    assert_eq!(result.model_used, "claude-haiku");
    assert_eq!(pipeline.analytics().model_substitutions, 1);
    assert_eq!(
        provider.last_request().unwrap().model_id,
        "anthropic.claude-3-haiku-20240307-v1:0"
    );
}

#[tokio::test]
async fn cost_is_rounded_to_six_decimals() {
    let long = "word ".repeat(333);
    let provider = ScriptedProvider::new(vec![Ok(structured(&long))]);
    let result = pipeline_with(provider)
        .optimize(&OptimizeRequest::new("Estimate the cost"))
        .await;

    assert!(result.cost_estimate > 0.0);
    let micros = result.cost_estimate * 1e6;
    assert!((micros - micros.round()).abs() < 1e-6);

    assert_eq!(round_cost(0.000_275_25), 0.000_275);
    assert_eq!(round_cost(0.000_000_6), 0.000_001);
}

#[tokio::test]
async fn domain_of_each_request_is_counted() {
    let provider = ScriptedProvider::new(vec![]);
    let pipeline = pipeline_with(provider);
    pipeline
        .optimize(&OptimizeRequest::new("Refactor this software code"))
        .await;
    pipeline
        .optimize(&OptimizeRequest::new("Refactor this software code"))
        .await;
    pipeline
        .optimize(&OptimizeRequest::new("Plan a marketing strategy"))
        .await;

    let stats = pipeline.analytics();
    assert_eq!(stats.domain_distribution.get("technical"), Some(&2));
    assert_eq!(stats.domain_distribution.get("business"), Some(&1));
}

#[tokio::test]
async fn fallback_result_is_cached_too() {
    let provider = ScriptedProvider::new(vec![Err(ProviderError::EmptyResponse), Ok(structured("late"))]);
    let pipeline = pipeline_with(provider.clone());
    let request = OptimizeRequest::new("Design a landing page");

    let first = pipeline.optimize(&request).await;
    let second = pipeline.optimize(&request).await;
    assert_eq!(first.strategy, Strategy::Fallback);
    assert_eq!(second, first);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn expired_entry_triggers_a_new_primary_call() {
    let clock = Arc::new(ManualClock::new());
    let cache = Arc::new(ResultCache::new(Duration::from_secs(60)).with_clock(clock.clone()));
    let provider = ScriptedProvider::new(vec![Ok(structured("one")), Ok(structured("two"))]);
    let pipeline = OptimizationPipeline::builder()
        .cache(cache.clone())
        .provider(provider.clone())
        .build();
    let request = OptimizeRequest::new("Summarize quarterly sales");

    assert_eq!(pipeline.optimize(&request).await.optimized_prompt, "one");
    clock.advance(Duration::from_secs(61));
    assert_eq!(pipeline.optimize(&request).await.optimized_prompt, "two");
    assert_eq!(provider.calls(), 2);
    assert_eq!(pipeline.cache_stats().total_entries, 1);
}

#[tokio::test]
async fn context_and_model_partition_the_cache() {
    let provider = ScriptedProvider::new(vec![
        Ok(structured("a")),
        Ok(structured("b")),
        Ok(structured("c")),
    ]);
    let pipeline = pipeline_with(provider.clone());
    pipeline.optimize(&OptimizeRequest::new("d")).await;
    pipeline
        .optimize(&OptimizeRequest::new("d").with_context("ctx"))
        .await;
    pipeline
        .optimize(&OptimizeRequest::new("d").with_model("claude-sonnet"))
        .await;
    assert_eq!(provider.calls(), 3);
    assert_eq!(pipeline.cache_stats().total_entries, 3);
}

#[tokio::test]
async fn clear_cache_forces_regeneration() {
    let provider = ScriptedProvider::new(vec![Ok(structured("a")), Ok(structured("b"))]);
    let pipeline = pipeline_with(provider.clone());
    let request = OptimizeRequest::new("d");
    pipeline.optimize(&request).await;
    pipeline.clear_cache();
    assert_eq!(pipeline.optimize(&request).await.optimized_prompt, "b");
}

#[tokio::test]
async fn stream_emits_reasoning_then_result() {
    let provider = ScriptedProvider::new(vec![Ok(structured("final"))]);
    let pipeline = pipeline_with(provider);
    let events: Vec<OptimizeEvent> = pipeline
        .optimize_stream(OptimizeRequest::new("stream me"))
        .collect()
        .await;

    assert_eq!(events.len(), 6);
    assert!(matches!(&events[0], OptimizeEvent::Status { message } if message == "Starting optimization..."));
    assert!(matches!(&events[1], OptimizeEvent::Status { message } if message.contains("claude-haiku")));
    assert!(matches!(&events[2], OptimizeEvent::Reasoning { step: 1, .. }));
    assert!(matches!(&events[3], OptimizeEvent::Reasoning { step: 2, .. }));
    assert!(matches!(&events[4], OptimizeEvent::Result(r) if r.optimized_prompt == "final"));
    assert_eq!(events[5], OptimizeEvent::Complete);
}

#[tokio::test]
async fn stream_announces_the_model_that_runs() {
    let provider = ScriptedProvider::new(vec![Ok(structured("final"))]);
    let events: Vec<OptimizeEvent> = pipeline_with(provider)
        .optimize_stream(OptimizeRequest::new("d").with_model("gpt-17"))
        .collect()
        .await;

    assert!(matches!(
        &events[1],
        OptimizeEvent::Status { message } if message == "Calling claude-haiku model..."
    ));
    assert!(matches!(
        &events[events.len() - 2],
        OptimizeEvent::Result(r) if r.model_used == "claude-haiku"
    ));
}

#[test]
fn sse_framing_is_tagged_json() {
    let line = OptimizeEvent::Reasoning {
        step: 1,
        content: "Step 1".into(),
    }
    .to_sse();
    assert_eq!(line, "data: {\"type\":\"reasoning\",\"step\":1,\"content\":\"Step 1\"}\n\n");
    assert_eq!(OptimizeEvent::Complete.to_sse(), "data: {\"type\":\"complete\"}\n\n");
}

#[test]
fn request_validation() {
    assert!(OptimizeRequest::new("ok").validate().is_ok());
    assert!(matches!(
        OptimizeRequest::new("   ").validate(),
        Err(Error::Validation { .. })
    ));
    assert!(OptimizeRequest::new("ok").with_temperature(1.5).validate().is_err());
    assert!(OptimizeRequest::new("ok").with_max_tokens(0).validate().is_err());
}

#[test]
fn request_deserializes_with_defaults() {
    let req: OptimizeRequest = serde_json::from_str(r#"{"description": "d"}"#).unwrap();
    assert_eq!(req, OptimizeRequest::new("d"));
}
