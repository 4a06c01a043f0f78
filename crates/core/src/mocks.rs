//! Mock implementations of core traits for testing.
//!
//! Scripted stand-ins for the generative capability, the capability
//! registry, the event sink, and collaborators, usable across the
//! workspace for unit and integration testing.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::events::PipelineEvent;
use crate::traits::{
    CapabilityRegistry, Collaborator, EventSink, GenerateOptions, Generation, TextGenerator,
};
use crate::types::CoordinationOutcome;

// =============================================================================
// Mock Text Generator
// =============================================================================

/// Scripted mock generator that returns predefined responses in order,
/// repeating the last one when the script runs out.
pub struct MockGenerator {
    responses: Mutex<Vec<String>>,
    confidence: Option<f64>,
    call_count: Mutex<usize>,
}

impl MockGenerator {
    /// Create a new mock with a queue of responses.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses),
            confidence: Some(0.92),
            call_count: Mutex::new(0),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn constant(response: &str) -> Self {
        Self::new(vec![response.to_string()])
    }

    /// Override the reported confidence (None simulates a backend that
    /// reports nothing).
    pub fn with_confidence(mut self, confidence: Option<f64>) -> Self {
        self.confidence = confidence;
        self
    }

    /// Number of generation calls made.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, _prompt: &str, _options: &GenerateOptions) -> Result<Generation> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        let responses = self.responses.lock().unwrap();
        let idx = (*count - 1).min(responses.len().saturating_sub(1));
        let text = responses
            .get(idx)
            .cloned()
            .ok_or_else(|| Error::generation("mock generator has no scripted responses"))?;

        Ok(Generation {
            text,
            confidence: self.confidence,
        })
    }
}

// =============================================================================
// Mock Capability Registry
// =============================================================================

type Outcome = std::result::Result<Value, String>;

/// Scriptable capability registry.
///
/// Each capability id carries a queue of outcomes consumed one per
/// invocation; when the queue is exhausted the last outcome repeats. Every
/// invocation is recorded for assertions.
#[derive(Default)]
pub struct MockCapabilityRegistry {
    scripts: Mutex<HashMap<String, VecDeque<Outcome>>>,
    default_response: Option<Value>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockCapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose unknown capabilities succeed with a fixed response
    /// instead of failing with `CapabilityNotFound`.
    pub fn with_default(response: Value) -> Self {
        Self {
            default_response: Some(response),
            ..Self::default()
        }
    }

    /// Script the outcomes for one capability.
    pub fn script(self, capability: &str, outcomes: Vec<Outcome>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(capability.to_string(), outcomes.into());
        self
    }

    /// Script a capability that fails `fail_times` times, then succeeds
    /// with `response`.
    pub fn flaky(self, capability: &str, fail_times: usize, response: Value) -> Self {
        let mut outcomes: Vec<Outcome> = (0..fail_times)
            .map(|i| Err(format!("transient failure {}", i + 1)))
            .collect();
        outcomes.push(Ok(response));
        self.script(capability, outcomes)
    }

    /// All recorded invocations, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of invocations of one capability.
    pub fn call_count(&self, capability: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == capability)
            .count()
    }
}

#[async_trait]
impl CapabilityRegistry for MockCapabilityRegistry {
    async fn invoke(&self, capability: &str, params: Value) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((capability.to_string(), params));

        let mut scripts = self.scripts.lock().unwrap();
        if let Some(queue) = scripts.get_mut(capability) {
            let outcome = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            };
            return match outcome {
                Some(Ok(value)) => Ok(value),
                Some(Err(msg)) => Err(Error::execution(msg)),
                None => Err(Error::capability_not_found(capability)),
            };
        }

        match &self.default_response {
            Some(value) => Ok(value.clone()),
            None => Err(Error::capability_not_found(capability)),
        }
    }
}

// =============================================================================
// Collecting Event Sink
// =============================================================================

/// Event sink that stores everything it receives.
#[derive(Default)]
pub struct CollectingEventSink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl CollectingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the received events.
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event: PipelineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// =============================================================================
// Mock Collaborators
// =============================================================================

/// Collaborator that records every outcome it observes.
pub struct RecordingCollaborator {
    name: String,
    seen: Mutex<Vec<Arc<CoordinationOutcome>>>,
}

impl RecordingCollaborator {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Number of outcomes observed.
    pub fn observed(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl Collaborator for RecordingCollaborator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn observe(&self, outcome: Arc<CoordinationOutcome>) -> Result<()> {
        self.seen.lock().unwrap().push(outcome);
        Ok(())
    }
}

/// Collaborator whose `observe` never resolves. Used to prove that
/// coordination does not await collaborator dispatch.
pub struct PendingCollaborator;

#[async_trait]
impl Collaborator for PendingCollaborator {
    fn name(&self) -> &str {
        "pending"
    }

    async fn observe(&self, _outcome: Arc<CoordinationOutcome>) -> Result<()> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Collaborator that always fails, for exercising the dispatch-site
/// error logging.
pub struct FailingCollaborator;

#[async_trait]
impl Collaborator for FailingCollaborator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn observe(&self, _outcome: Arc<CoordinationOutcome>) -> Result<()> {
        Err(Error::internal("collaborator exploded"))
    }
}
