use serde::{Deserialize, Serialize};

use crate::types::{ExecutionRecord, TaskResult, VerificationRecord};

/// Observation events emitted by the pipeline.
///
/// Each variant carries the corresponding record so consumers (monitoring,
/// optimization, learning) never need to query pipeline internals. Delivery
/// is explicit message passing to a typed sink; there is no implicit
/// emitter fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// A coordination call returned successfully.
    CoordinationCompleted {
        task_id: String,
        result: TaskResult,
    },

    /// Coordinator-level retries were exhausted; the task was escalated.
    CoordinationEscalated {
        task_id: String,
        retry_count: u32,
    },

    /// A step execution reached `Completed` or `Failed`.
    StepExecutionCompleted { record: ExecutionRecord },

    /// An active execution was cancelled.
    ExecutionCancelled { record: ExecutionRecord },

    /// A verification record was scored.
    VerificationCompleted { record: VerificationRecord },
}
