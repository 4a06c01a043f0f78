//! Task coordination state machine.
//!
//! Sequences planning, execution, and verification in strict order for
//! one task, re-planning on verification failure up to a bounded retry
//! budget, then escalating. Written as an explicit loop carrying
//! `(retry_count, plan, verification)` so the termination condition is a
//! single visible check rather than recursion.

use std::sync::Arc;

use taskflow_core::config::CoordinatorConfig;
use taskflow_core::traits::{Collaborator, EventSink};
use taskflow_core::types::{
    CoordinationOutcome, ExecutionOutcome, ExecutionRecord, ExecutionStatus, Plan, Task,
    TaskResult, VerificationRecord,
};
use taskflow_core::{PipelineEvent, Result};

use crate::builder::CoordinatorBuilder;
use crate::detach::detach;
use crate::executor::RetryingExecutor;
use crate::planner::PlanGenerator;
use crate::verifier::ResultVerifier;

/// Coordination entry point over the three pipeline stages.
pub struct TaskCoordinator {
    pub(crate) planner: PlanGenerator,
    pub(crate) executor: RetryingExecutor,
    pub(crate) verifier: ResultVerifier,
    pub(crate) collaborators: Vec<Arc<dyn Collaborator>>,
    pub(crate) events: Arc<dyn EventSink>,
    pub(crate) config: CoordinatorConfig,
}

impl TaskCoordinator {
    /// Create a new builder for TaskCoordinator.
    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::new()
    }

    /// The executor, for cancellation and record lookup.
    pub fn executor(&self) -> &RetryingExecutor {
        &self.executor
    }

    /// Coordinate a task to a verified result.
    ///
    /// Planning failure is the only error that propagates; verification
    /// failure and escalation are conveyed in the returned `TaskResult`.
    pub async fn coordinate(&self, mut task: Task) -> Result<TaskResult> {
        tracing::info!(task_id = %task.id, "Coordinating task");

        let mut plan = self.planner.create(&task).await?;

        loop {
            // Strict stage sequence: execution starts only after planning,
            // verification only after execution. A failed execution still
            // reaches verification so the issue trail is meaningful.
            let execution = self.executor.run_plan(&task, &plan).await;
            apply_step_results(&mut plan, &execution.records);
            let verification = self.verifier.verify(&task, &execution).await;

            if verification.passed() {
                self.dispatch_collaborators(&task, &execution, &verification);

                let result = TaskResult {
                    success: true,
                    result: Some(execution.output.clone()),
                    verification: Some(verification),
                    plan: Some(plan),
                    error: None,
                    needs_human_intervention: false,
                    retry_count: task.retry_count,
                };
                tracing::info!(
                    task_id = %task.id,
                    retry_count = task.retry_count,
                    "Coordination completed"
                );
                self.events
                    .emit(PipelineEvent::CoordinationCompleted {
                        task_id: task.id.clone(),
                        result: result.clone(),
                    })
                    .await;
                return Ok(result);
            }

            if task.retry_count >= self.config.max_retries {
                tracing::warn!(
                    task_id = %task.id,
                    retry_count = task.retry_count,
                    "Retry budget exhausted; escalating for human intervention"
                );
                self.events
                    .emit(PipelineEvent::CoordinationEscalated {
                        task_id: task.id.clone(),
                        retry_count: task.retry_count,
                    })
                    .await;
                return Ok(TaskResult {
                    success: false,
                    result: None,
                    verification: Some(verification),
                    plan: Some(plan),
                    error: Some("Max retries exceeded".to_string()),
                    needs_human_intervention: true,
                    retry_count: task.retry_count,
                });
            }

            task.retry_count += 1;
            let reason = revision_reason(&verification);
            tracing::info!(
                task_id = %task.id,
                retry = task.retry_count,
                reason = %reason,
                "Verification failed; revising plan"
            );
            plan = self.planner.revise(&plan, &task, &reason).await?;
        }
    }

    /// Start collaborators on detached tasks, never awaited. A fault there
    /// can never fail or delay the coordination result.
    fn dispatch_collaborators(
        &self,
        task: &Task,
        execution: &ExecutionOutcome,
        verification: &VerificationRecord,
    ) {
        if self.collaborators.is_empty() {
            return;
        }

        let outcome = Arc::new(CoordinationOutcome {
            task: task.clone(),
            execution: execution.clone(),
            verification: verification.clone(),
        });

        for collaborator in &self.collaborators {
            tracing::debug!(
                task_id = %task.id,
                collaborator = collaborator.name(),
                "Dispatching collaborator"
            );
            let collaborator = collaborator.clone();
            let outcome = outcome.clone();
            detach(format!("collaborator:{}", collaborator.name()), async move {
                collaborator.observe(outcome).await
            });
        }
    }
}

/// Copy terminal execution results back onto the plan's step list, so the
/// plan returned to the caller reflects which steps completed and what
/// they produced. Non-terminal records leave their step untouched.
fn apply_step_results(plan: &mut Plan, records: &[ExecutionRecord]) {
    for record in records.iter().filter(|r| r.status.is_terminal()) {
        if let Some(step) = plan.steps.iter_mut().find(|s| s.id == record.step_id) {
            step.completed = record.status == ExecutionStatus::Completed;
            step.result = record.result.clone();
        }
    }
}

/// Summarize a failed verification into revision context for the planner.
fn revision_reason(verification: &VerificationRecord) -> String {
    if verification.issues.is_empty() {
        return "verification failed".to_string();
    }

    let mut parts: Vec<String> = verification
        .issues
        .iter()
        .take(5)
        .map(|issue| issue.message.clone())
        .collect();
    if verification.issues.len() > 5 {
        parts.push(format!("and {} more issues", verification.issues.len() - 5));
    }
    parts.join("; ")
}
