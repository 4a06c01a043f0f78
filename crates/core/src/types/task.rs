use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan::Plan;
use super::verification::VerificationRecord;

// =============================================================================
// Task Types (Pipeline Input)
// =============================================================================

/// Unit of work submitted for coordination.
///
/// Owned by the coordinator for the duration of one `coordinate` call.
/// The only field mutated after creation is `retry_count`, incremented on
/// each verification-failure retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task ID.
    pub id: String,

    /// Free-text description of what needs to be done.
    pub description: String,

    /// Explicit requirements the result must satisfy. May be empty, in
    /// which case verification falls back to an implicit check against the
    /// description.
    #[serde(default)]
    pub requirements: Vec<String>,

    /// Optional constraints on how the task may be carried out.
    pub constraints: Option<String>,

    /// Free-form task type tag.
    pub task_type: Option<String>,

    /// Number of coordinator-level retries consumed so far.
    #[serde(default)]
    pub retry_count: u32,
}

impl Task {
    /// Create a new task from a description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            requirements: Vec::new(),
            constraints: None,
            task_type: None,
            retry_count: 0,
        }
    }

    /// Attach explicit requirements.
    pub fn with_requirements(mut self, requirements: Vec<String>) -> Self {
        self.requirements = requirements;
        self
    }

    /// Attach constraints.
    pub fn with_constraints(mut self, constraints: impl Into<String>) -> Self {
        self.constraints = Some(constraints.into());
        self
    }

    /// Tag the task with a type.
    pub fn with_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = Some(task_type.into());
        self
    }
}

// =============================================================================
// Coordination Result (Pipeline Output)
// =============================================================================

/// Result returned by the coordination entry point.
///
/// Escalation is conveyed in-band (`success: false` plus
/// `needs_human_intervention: true`), never as an error, so callers have a
/// uniform way to detect it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// Whether the task passed verification.
    pub success: bool,

    /// Combined execution output (one entry per completed step).
    pub result: Option<serde_json::Value>,

    /// The final verification record.
    pub verification: Option<VerificationRecord>,

    /// The plan the final execution ran against.
    pub plan: Option<Plan>,

    /// Error message on the failure path.
    pub error: Option<String>,

    /// Set when coordinator-level retries are exhausted; the task requires
    /// external intervention and is never retried automatically again.
    pub needs_human_intervention: bool,

    /// Coordinator-level retries consumed.
    pub retry_count: u32,
}
