//! Builder for TaskCoordinator.

use std::sync::Arc;

use taskflow_core::config::PipelineConfig;
use taskflow_core::traits::{
    CapabilityRegistry, Collaborator, EventSink, NoOpEventSink, TextGenerator,
};
use taskflow_core::{Error, Result};

use crate::coordinator::TaskCoordinator;
use crate::executor::RetryingExecutor;
use crate::planner::PlanGenerator;
use crate::verifier::{Evaluator, HeuristicEvaluator, ResultVerifier};

/// Builder for constructing a TaskCoordinator.
///
/// The generative capability and the capability registry are mandatory;
/// everything else has a working default (heuristic evaluator, no-op event
/// sink, no collaborators, default config).
pub struct CoordinatorBuilder {
    config: PipelineConfig,
    generator: Option<Arc<dyn TextGenerator>>,
    capabilities: Option<Arc<dyn CapabilityRegistry>>,
    evaluator: Arc<dyn Evaluator>,
    events: Arc<dyn EventSink>,
    collaborators: Vec<Arc<dyn Collaborator>>,
}

impl CoordinatorBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            generator: None,
            capabilities: None,
            evaluator: Arc::new(HeuristicEvaluator),
            events: Arc::new(NoOpEventSink),
            collaborators: Vec::new(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the generative capability used for planning.
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set the capability registry used for step execution.
    pub fn with_capabilities(mut self, capabilities: Arc<dyn CapabilityRegistry>) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Set the verification scoring backend.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Set the event sink for observation hooks.
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Add a post-coordination collaborator.
    pub fn with_collaborator(mut self, collaborator: Arc<dyn Collaborator>) -> Self {
        self.collaborators.push(collaborator);
        self
    }

    /// Build the TaskCoordinator.
    pub fn build(self) -> Result<TaskCoordinator> {
        let generator = self
            .generator
            .ok_or_else(|| Error::internal("text generator not configured"))?;
        let capabilities = self
            .capabilities
            .ok_or_else(|| Error::internal("capability registry not configured"))?;

        Ok(TaskCoordinator {
            planner: PlanGenerator::new(generator, self.config.planner),
            executor: RetryingExecutor::new(capabilities, self.config.executor, self.events.clone()),
            verifier: ResultVerifier::new(self.evaluator, self.config.verifier, self.events.clone()),
            collaborators: self.collaborators,
            events: self.events,
            config: self.config.coordinator,
        })
    }
}

impl Default for CoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
