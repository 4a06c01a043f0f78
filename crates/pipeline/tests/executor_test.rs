use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use taskflow_core::config::ExecutorConfig;
use taskflow_core::mocks::{CollectingEventSink, MockCapabilityRegistry};
use taskflow_core::traits::{CapabilityRegistry, NoOpEventSink};
use taskflow_core::types::{ActionSpec, Condition, ExecutionStatus, Step, Task};
use taskflow_core::{PipelineEvent, Result};
use taskflow_pipeline::RetryingExecutor;

fn executor_with(
    registry: Arc<dyn CapabilityRegistry>,
    config: ExecutorConfig,
) -> RetryingExecutor {
    RetryingExecutor::new(registry, config, Arc::new(NoOpEventSink))
}

fn invoke_step(capability: &str) -> Step {
    Step::new(1, capability).with_action(ActionSpec::Invoke {
        capability: capability.to_string(),
        params: json!({}),
    })
}

// --- Retry bounds ---

#[tokio::test(start_paused = true)]
async fn always_failing_capability_makes_max_retries_plus_one_attempts() {
    let registry = Arc::new(
        MockCapabilityRegistry::new().script("broken", vec![Err("boom".to_string())]),
    );
    let executor = executor_with(
        registry.clone(),
        ExecutorConfig {
            max_retries: 3,
            ..ExecutorConfig::default()
        },
    );

    let task = Task::new("use the broken capability");
    let record = executor.run(&task, &invoke_step("broken")).await;

    assert_eq!(record.status, ExecutionStatus::Failed);
    assert_eq!(record.attempts, 4);
    assert_eq!(record.retries, 3);
    assert!(record.error.as_deref().unwrap_or("").contains("boom"));
    assert_eq!(registry.call_count("broken"), 4);
    // Terminal record moved from the active set to history.
    assert_eq!(executor.active_count(), 0);
    assert_eq!(
        executor.record(&record.id).map(|r| r.status),
        Some(ExecutionStatus::Failed)
    );
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried_invisibly() {
    // Fails twice, then succeeds: completed with retries == 2.
    let registry =
        Arc::new(MockCapabilityRegistry::new().flaky("flaky", 2, json!({"status": "done"})));
    let executor = executor_with(
        registry,
        ExecutorConfig {
            max_retries: 3,
            ..ExecutorConfig::default()
        },
    );

    let task = Task::new("call the flaky capability");
    let record = executor.run(&task, &invoke_step("flaky")).await;

    assert_eq!(record.status, ExecutionStatus::Completed);
    assert_eq!(record.retries, 2);
    assert_eq!(record.attempts, 3);
    assert_eq!(record.result, Some(json!({"status": "done"})));
}

// --- Strategy shapes ---

#[tokio::test]
async fn bare_step_falls_back_to_generic_capability() {
    let registry = Arc::new(MockCapabilityRegistry::with_default(json!("generated")));
    let executor = executor_with(registry.clone(), ExecutorConfig::default());

    let task = Task::new("just do it");
    let record = executor.run(&task, &Step::new(1, "just do it")).await;

    assert_eq!(record.status, ExecutionStatus::Completed);
    let calls = registry.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "generate");
    assert_eq!(calls[0].1["input"], "just do it");
}

#[tokio::test]
async fn sequence_accumulates_results_in_order() {
    let registry = Arc::new(
        MockCapabilityRegistry::new()
            .script("first", vec![Ok(json!(1))])
            .script("second", vec![Ok(json!(2))]),
    );
    let executor = executor_with(registry, ExecutorConfig::default());

    let step = Step::new(1, "two in a row").with_action(ActionSpec::Sequence {
        actions: vec![
            ActionSpec::Invoke {
                capability: "first".to_string(),
                params: json!({}),
            },
            ActionSpec::Invoke {
                capability: "second".to_string(),
                params: json!({}),
            },
        ],
    });

    let record = executor.run(&Task::new("seq"), &step).await;
    assert_eq!(record.status, ExecutionStatus::Completed);
    assert_eq!(record.result, Some(json!([1, 2])));
}

#[tokio::test(start_paused = true)]
async fn parallel_fails_when_any_branch_fails() {
    let registry = Arc::new(
        MockCapabilityRegistry::new()
            .script("ok", vec![Ok(json!("fine"))])
            .script("bad", vec![Err("branch down".to_string())]),
    );
    let executor = executor_with(
        registry.clone(),
        ExecutorConfig {
            max_retries: 0,
            ..ExecutorConfig::default()
        },
    );

    let step = Step::new(1, "fan out").with_action(ActionSpec::Parallel {
        branches: vec![
            ActionSpec::Invoke {
                capability: "ok".to_string(),
                params: json!({}),
            },
            ActionSpec::Invoke {
                capability: "bad".to_string(),
                params: json!({}),
            },
        ],
    });

    let record = executor.run(&Task::new("par"), &step).await;
    assert_eq!(record.status, ExecutionStatus::Failed);
    assert!(record.error.as_deref().unwrap_or("").contains("branch down"));
    // Fan-in: the healthy branch still ran.
    assert_eq!(registry.call_count("ok"), 1);
}

#[tokio::test]
async fn conditional_runs_exactly_one_branch() {
    let registry = Arc::new(
        MockCapabilityRegistry::new()
            .script("check", vec![Ok(json!(true))])
            .script("then_branch", vec![Ok(json!("took then"))])
            .script("else_branch", vec![Ok(json!("took else"))]),
    );
    let executor = executor_with(registry.clone(), ExecutorConfig::default());

    let step = Step::new(1, "branch").with_action(ActionSpec::Branch {
        condition: Condition::Capability {
            capability: "check".to_string(),
            params: json!({}),
        },
        then: Box::new(ActionSpec::Invoke {
            capability: "then_branch".to_string(),
            params: json!({}),
        }),
        otherwise: Box::new(ActionSpec::Invoke {
            capability: "else_branch".to_string(),
            params: json!({}),
        }),
    });

    let record = executor.run(&Task::new("cond"), &step).await;
    assert_eq!(record.result, Some(json!("took then")));
    assert_eq!(registry.call_count("then_branch"), 1);
    assert_eq!(registry.call_count("else_branch"), 0);
}

#[tokio::test]
async fn unknown_capability_fails_with_not_found() {
    let registry = Arc::new(MockCapabilityRegistry::new());
    let executor = executor_with(
        registry,
        ExecutorConfig {
            max_retries: 0,
            retry_delay_ms: 1,
            ..ExecutorConfig::default()
        },
    );

    let record = executor
        .run(&Task::new("missing"), &invoke_step("no_such_capability"))
        .await;
    assert_eq!(record.status, ExecutionStatus::Failed);
    assert!(record
        .error
        .as_deref()
        .unwrap_or("")
        .contains("no_such_capability"));
}

// --- Timeouts ---

struct SlowRegistry {
    delay: Duration,
}

#[async_trait]
impl CapabilityRegistry for SlowRegistry {
    async fn invoke(&self, _capability: &str, _params: Value) -> Result<Value> {
        tokio::time::sleep(self.delay).await;
        Ok(json!("slow result"))
    }
}

#[tokio::test(start_paused = true)]
async fn direct_invocation_honors_step_deadline() {
    let registry = Arc::new(SlowRegistry {
        delay: Duration::from_millis(500),
    });
    let executor = executor_with(
        registry,
        ExecutorConfig {
            max_retries: 0,
            step_timeout_ms: Some(50),
            ..ExecutorConfig::default()
        },
    );

    let record = executor
        .run(&Task::new("slow"), &invoke_step("anything"))
        .await;
    assert_eq!(record.status, ExecutionStatus::Failed);
    assert!(record.error.as_deref().unwrap_or("").contains("exceeded"));
}

// --- Cancellation ---

#[tokio::test(start_paused = true)]
async fn cancel_is_bookkeeping_and_drops_the_late_result() {
    let registry = Arc::new(SlowRegistry {
        delay: Duration::from_millis(500),
    });
    let events = Arc::new(CollectingEventSink::new());
    let executor = Arc::new(RetryingExecutor::new(
        registry,
        ExecutorConfig {
            max_retries: 0,
            ..ExecutorConfig::default()
        },
        events.clone(),
    ));

    let task = Task::new("long running");
    let step = invoke_step("anything");
    let runner = {
        let executor = executor.clone();
        tokio::spawn(async move { executor.run(&task, &step).await })
    };

    // Let the run park an active record, then cancel it mid-flight.
    tokio::time::sleep(Duration::from_millis(10)).await;
    let active = executor.active_ids();
    assert_eq!(active.len(), 1);
    let execution_id = active[0].clone();
    assert!(executor.cancel(&execution_id, "caller gave up").await);

    // Second cancel is a no-op.
    assert!(!executor.cancel(&execution_id, "again").await);

    // The run completes later; its result is discarded and the record
    // stays cancelled.
    let record = runner.await.expect("runner panicked");
    assert_eq!(record.status, ExecutionStatus::Cancelled);
    assert!(record.status.is_terminal());
    assert_eq!(record.result, None);
    assert_eq!(record.error.as_deref(), Some("caller gave up"));
    assert!(events
        .events()
        .iter()
        .any(|e| matches!(e, PipelineEvent::ExecutionCancelled { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn run_never_returns_a_non_terminal_record_under_racing_cancels() {
    let registry = Arc::new(SlowRegistry {
        delay: Duration::from_millis(20),
    });
    let executor = Arc::new(RetryingExecutor::new(
        registry,
        ExecutorConfig {
            max_retries: 0,
            ..ExecutorConfig::default()
        },
        Arc::new(NoOpEventSink),
    ));

    let mut runners = Vec::new();
    for i in 0..8 {
        let executor = executor.clone();
        runners.push(tokio::spawn(async move {
            let task = Task::new("racy work");
            let step = invoke_step(&format!("cap_{}", i));
            executor.run(&task, &step).await
        }));
    }

    // Cancel whatever is active while the runs are mid-flight.
    let canceller = {
        let executor = executor.clone();
        tokio::spawn(async move {
            for _ in 0..50 {
                for id in executor.active_ids() {
                    executor.cancel(&id, "raced").await;
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
    };

    for runner in runners {
        let record = runner.await.expect("runner panicked");
        assert!(record.status.is_terminal(), "got {:?}", record.status);
    }
    canceller.await.expect("canceller panicked");
}
