//! Event-stream delivery of an optimization result.

use super::{OptimizationPipeline, OptimizeRequest, PipelineResult};
use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use std::pin::Pin;

pub type EventStream = Pin<Box<dyn Stream<Item = OptimizeEvent> + Send + 'static>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OptimizeEvent {
    Status { message: String },
    /// One reasoning trace entry; `step` is 1-based.
    Reasoning { step: usize, content: String },
    Result(PipelineResult),
    Complete,
}

impl OptimizeEvent {
    /// Server-sent-events framing: `data: <json>\n\n`.
    pub fn to_sse(&self) -> String {
        format!(
            "data: {}\n\n",
            serde_json::to_string(self).unwrap_or_default()
        )
    }
}

fn result_events(result: PipelineResult) -> Vec<OptimizeEvent> {
    let mut events: Vec<OptimizeEvent> = result
        .reasoning_trace
        .iter()
        .enumerate()
        .map(|(i, step)| OptimizeEvent::Reasoning {
            step: i + 1,
            content: step.clone(),
        })
        .collect();
    events.push(OptimizeEvent::Result(result));
    events.push(OptimizeEvent::Complete);
    events
}

pub(super) fn events(pipeline: OptimizationPipeline, request: OptimizeRequest) -> EventStream {
    let model = pipeline
        .catalog()
        .resolve(&request.model)
        .spec
        .alias
        .clone();
    let head = stream::iter(vec![
        OptimizeEvent::Status {
            message: "Starting optimization...".to_string(),
        },
        OptimizeEvent::Status {
            message: format!("Calling {} model...", model),
        },
    ]);
    let tail = stream::once(async move { pipeline.optimize(&request).await })
        .flat_map(|result| stream::iter(result_events(result)));
    Box::pin(head.chain(tail))
}
