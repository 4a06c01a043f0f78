//! Retrying execution stage.
//!
//! Resolves a step to its strategy and attempts it with a bounded retry
//! budget and a fixed inter-attempt delay. Records live in an active set
//! while attempts are in flight and move to append-only history on
//! reaching a terminal status.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use futures::future::{join_all, BoxFuture};
use serde_json::Value;

use taskflow_core::config::ExecutorConfig;
use taskflow_core::traits::{CapabilityRegistry, EventSink};
use taskflow_core::types::{
    Condition, ExecutionOutcome, ExecutionRecord, ExecutionStatus, Plan, Step, Task,
};
use taskflow_core::{Error, PipelineEvent, Result};

use crate::resolver::{resolve, StepAction};

/// Execution stage: runs resolved strategies with bounded retries.
pub struct RetryingExecutor {
    capabilities: Arc<dyn CapabilityRegistry>,
    config: ExecutorConfig,
    events: Arc<dyn EventSink>,
    active: DashMap<String, ExecutionRecord>,
    history: DashMap<String, ExecutionRecord>,
}

impl RetryingExecutor {
    /// Create an executor over a capability registry.
    pub fn new(
        capabilities: Arc<dyn CapabilityRegistry>,
        config: ExecutorConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            capabilities,
            config,
            events,
            active: DashMap::new(),
            history: DashMap::new(),
        }
    }

    /// Number of executions currently in flight.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Ids of executions currently in flight.
    pub fn active_ids(&self) -> Vec<String> {
        self.active.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Look up a terminal record in history.
    pub fn record(&self, execution_id: &str) -> Option<ExecutionRecord> {
        self.history.get(execution_id).map(|r| r.clone())
    }

    /// Cancel an active execution.
    ///
    /// Bookkeeping only: the record moves to history as `Cancelled`
    /// immediately, but in-flight capability calls are not preempted;
    /// their eventual result is dropped when the run completes. Returns
    /// false when no active execution matches.
    pub async fn cancel(&self, execution_id: &str, reason: &str) -> bool {
        match self.active.remove(execution_id) {
            Some((_, mut record)) => {
                record.status = ExecutionStatus::Cancelled;
                record.error = Some(reason.to_string());
                record.finished_at = Some(Utc::now());
                self.history.insert(execution_id.to_string(), record.clone());
                tracing::info!(execution_id, reason, "Execution cancelled");
                self.events
                    .emit(PipelineEvent::ExecutionCancelled { record })
                    .await;
                true
            }
            None => false,
        }
    }

    /// Execute one step, retrying the resolved strategy up to
    /// `max_retries` times after the initial attempt.
    ///
    /// Never returns an error: exhaustion is encoded as a `Failed` record
    /// so the coordinator can feed it into verification.
    pub async fn run(&self, task: &Task, step: &Step) -> ExecutionRecord {
        let started = ExecutionRecord::start(&task.id, &step.id);
        let execution_id = started.id.clone();
        self.active.insert(execution_id.clone(), started);

        tracing::info!(
            task_id = %task.id,
            step = step.number,
            execution_id = %execution_id,
            "Executing step"
        );

        let action = resolve(step);
        let mut attempts = 0u32;
        let mut outcome: Result<Value> = Err(Error::execution("no attempts made"));
        for attempt in 0..=self.config.max_retries {
            attempts = attempt + 1;
            outcome = self.perform(&action).await;
            match &outcome {
                Ok(_) => break,
                Err(e) => {
                    tracing::warn!(
                        execution_id = %execution_id,
                        attempt = attempts,
                        error = %e,
                        "Step attempt failed"
                    );
                    if attempt < self.config.max_retries {
                        tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms))
                            .await;
                    }
                }
            }
        }

        // A cancel while attempts were in flight claims the record from the
        // active set and then writes the cancelled record to history; the
        // late result is dropped. The claim and the history write are not
        // one atomic step, so yield until the cancelled record is visible
        // rather than returning a record still marked `Executing`.
        let mut record = match self.active.remove(&execution_id) {
            Some((_, record)) => record,
            None => {
                tracing::debug!(
                    execution_id = %execution_id,
                    "Execution finished after cancellation; result dropped"
                );
                loop {
                    if let Some(record) = self.record(&execution_id) {
                        return record;
                    }
                    tokio::task::yield_now().await;
                }
            }
        };

        record.attempts = attempts;
        record.retries = attempts.saturating_sub(1);
        record.finished_at = Some(Utc::now());
        match outcome {
            Ok(value) => {
                record.status = ExecutionStatus::Completed;
                record.result = Some(value);
            }
            Err(e) => {
                record.status = ExecutionStatus::Failed;
                record.error = Some(e.to_string());
                tracing::warn!(
                    execution_id = %execution_id,
                    attempts,
                    "Step failed after exhausting retries"
                );
            }
        }

        self.history.insert(execution_id, record.clone());
        self.events
            .emit(PipelineEvent::StepExecutionCompleted {
                record: record.clone(),
            })
            .await;
        record
    }

    /// Execute a plan's steps in ordinal order, stopping at the first
    /// step that does not complete. Always yields an outcome suitable for
    /// verification.
    pub async fn run_plan(&self, task: &Task, plan: &Plan) -> ExecutionOutcome {
        let mut records = Vec::with_capacity(plan.steps.len());
        let mut outputs = Vec::new();

        for step in &plan.steps {
            let record = self.run(task, step).await;
            let completed = record.status == ExecutionStatus::Completed;
            let error = record.error.clone();
            if let Some(result) = &record.result {
                outputs.push(result.clone());
            }
            records.push(record);

            if !completed {
                return ExecutionOutcome {
                    records,
                    output: Value::Array(outputs),
                    success: false,
                    error: error.or_else(|| Some("step did not complete".to_string())),
                };
            }
        }

        ExecutionOutcome {
            records,
            output: Value::Array(outputs),
            success: true,
            error: None,
        }
    }

    /// Carry out one resolved strategy. Recurses through nested
    /// sequence/parallel/conditional structure.
    fn perform<'a>(&'a self, action: &'a StepAction) -> BoxFuture<'a, Result<Value>> {
        Box::pin(async move {
            match action {
                StepAction::Direct { capability, params } => {
                    self.invoke_direct(capability, params.clone()).await
                }

                StepAction::Sequence(actions) => {
                    let mut results = Vec::with_capacity(actions.len());
                    for sub_action in actions {
                        results.push(self.perform(sub_action).await?);
                    }
                    Ok(Value::Array(results))
                }

                StepAction::Parallel(branches) => {
                    // Fan-out/fan-in, not racing: every branch is awaited
                    // even when one fails, then the first branch error wins.
                    let settled =
                        join_all(branches.iter().map(|branch| self.perform(branch))).await;
                    let mut results = Vec::with_capacity(settled.len());
                    for result in settled {
                        results.push(result?);
                    }
                    Ok(Value::Array(results))
                }

                StepAction::Conditional {
                    condition,
                    then,
                    otherwise,
                } => {
                    if self.eval_condition(condition).await? {
                        self.perform(then).await
                    } else {
                        self.perform(otherwise).await
                    }
                }
            }
        })
    }

    /// Invoke a capability, under the configured deadline when set.
    async fn invoke_direct(&self, capability: &str, params: Value) -> Result<Value> {
        match self.config.step_timeout_ms {
            Some(ms) => tokio::time::timeout(
                Duration::from_millis(ms),
                self.capabilities.invoke(capability, params),
            )
            .await
            .map_err(|_| Error::timeout(format!("capability '{}' exceeded {}ms", capability, ms)))?,
            None => self.capabilities.invoke(capability, params).await,
        }
    }

    /// Evaluate a branch condition to a boolean.
    async fn eval_condition(&self, condition: &Condition) -> Result<bool> {
        match condition {
            Condition::Literal { value } => Ok(*value),
            Condition::Equals { left, right } => Ok(left == right),
            Condition::Contains { haystack, needle } => Ok(haystack.contains(needle.as_str())),
            Condition::Capability { capability, params } => {
                let value = self.invoke_direct(capability, params.clone()).await?;
                Ok(coerce_bool(&value))
            }
        }
    }
}

/// Coerce a capability result to a boolean.
///
/// Booleans pass through; null is false; numbers are true when non-zero;
/// strings are true only for "true"/"yes" (case-insensitive); arrays and
/// objects are true when non-empty.
fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => {
            let s = s.trim().to_ascii_lowercase();
            s == "true" || s == "yes"
        }
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_common_shapes() {
        assert!(coerce_bool(&json!(true)));
        assert!(!coerce_bool(&json!(false)));
        assert!(!coerce_bool(&json!(null)));
        assert!(coerce_bool(&json!(1)));
        assert!(!coerce_bool(&json!(0)));
        assert!(coerce_bool(&json!("TRUE")));
        assert!(coerce_bool(&json!("yes")));
        assert!(!coerce_bool(&json!("nope")));
        assert!(coerce_bool(&json!([1])));
        assert!(!coerce_bool(&json!([])));
    }
}
