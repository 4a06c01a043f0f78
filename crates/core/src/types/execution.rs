use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Execution Types
// =============================================================================

/// Execution record status. Transitions exactly once to a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Attempts are in flight.
    Executing,
    /// Terminal: strategy succeeded.
    Completed,
    /// Terminal: retry budget exhausted.
    Failed,
    /// Terminal: cancelled by the caller. Bookkeeping only; in-flight
    /// capability calls are not preempted, their eventual result is dropped.
    Cancelled,
}

impl ExecutionStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Executing)
    }
}

/// Record of one attempt to carry out a Step.
///
/// Created at execution start in the executor's active set; moved to the
/// append-only history set on reaching a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Unique execution ID.
    pub id: String,

    /// Owning task ID.
    pub task_id: String,

    /// Owning step ID. Every record belongs to exactly one plan step.
    pub step_id: String,

    /// Current status.
    pub status: ExecutionStatus,

    /// Total attempts made (initial try plus retries).
    pub attempts: u32,

    /// Retries consumed (`attempts - 1` once any attempt has run).
    pub retries: u32,

    /// When execution started.
    pub started_at: DateTime<Utc>,

    /// When a terminal status was reached.
    pub finished_at: Option<DateTime<Utc>>,

    /// Result payload on success.
    pub result: Option<serde_json::Value>,

    /// Last error message on failure or the cancellation reason.
    pub error: Option<String>,
}

impl ExecutionRecord {
    /// Create a new record in `Executing` state.
    pub fn start(task_id: impl Into<String>, step_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id: task_id.into(),
            step_id: step_id.into(),
            status: ExecutionStatus::Executing,
            attempts: 0,
            retries: 0,
            started_at: Utc::now(),
            finished_at: None,
            result: None,
            error: None,
        }
    }
}

/// Plan-level execution aggregate handed to verification.
///
/// Always produced, even when a step exhausted its retries: a failed
/// execution is fed into verification rather than short-circuiting, so the
/// verifier can build a meaningful issue trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Per-step records, in plan order, up to and including the first
    /// failure.
    pub records: Vec<ExecutionRecord>,

    /// Combined output: one entry per completed step.
    pub output: serde_json::Value,

    /// Whether every step completed.
    pub success: bool,

    /// Error from the step that stopped execution, if any.
    pub error: Option<String>,
}
