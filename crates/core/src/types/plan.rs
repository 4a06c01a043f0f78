use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Plan & Step Types
// =============================================================================

/// Plan lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStatus {
    /// Steps are still being generated.
    Planning,
    /// Step list is final; only an explicit revision may replace it.
    Ready,
}

/// Ordered decomposition of a Task.
///
/// Immutable once `Ready` except through `PlanGenerator::revise`, which
/// produces a new value with a replaced step list and an appended revision
/// record. Steps are never edited in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Unique plan ID. Stable across revisions.
    pub id: String,

    /// Owning task ID.
    pub task_id: String,

    /// Ordered steps. Ordinals are strictly increasing and gapless.
    pub steps: Vec<Step>,

    /// Lifecycle status.
    pub status: PlanStatus,

    /// Confidence reported by the generation capability (0..1).
    pub confidence: f64,

    /// One record per revision, oldest first.
    #[serde(default)]
    pub revisions: Vec<PlanRevision>,
}

impl Plan {
    /// Create a new plan in `Planning` state for a task.
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id: task_id.into(),
            steps: Vec::new(),
            status: PlanStatus::Planning,
            confidence: 0.0,
            revisions: Vec::new(),
        }
    }
}

/// Record of one plan revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRevision {
    /// When the revision happened.
    pub revised_at: DateTime<Utc>,

    /// Human-readable reason (summarized verification failure context).
    pub reason: String,

    /// Snapshot of the step list that was replaced.
    pub previous_steps: Vec<Step>,
}

/// Atomic unit inside a Plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Unique step ID.
    pub id: String,

    /// Ordinal within the plan, starting at 1.
    pub number: usize,

    /// Free-text instruction.
    pub description: String,

    /// Optional structured action. When absent the step resolves to a
    /// direct invocation of the fallback capability.
    pub action: Option<ActionSpec>,

    /// Completion flag.
    #[serde(default)]
    pub completed: bool,

    /// Result payload, null until completed.
    pub result: Option<serde_json::Value>,
}

impl Step {
    /// Create a plain descriptive step.
    pub fn new(number: usize, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            number,
            description: description.into(),
            action: None,
            completed: false,
            result: None,
        }
    }

    /// Attach a structured action.
    pub fn with_action(mut self, action: ActionSpec) -> Self {
        self.action = Some(action);
        self
    }
}

// =============================================================================
// Structured Step Actions
// =============================================================================

/// Structured action carried by a step.
///
/// A closed set of shapes rather than a string-keyed lookup, so resolution
/// is an exhaustive match and cannot fail at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionSpec {
    /// Direct invocation of a named capability.
    Invoke {
        capability: String,
        #[serde(default)]
        params: serde_json::Value,
    },

    /// Ordered sequence of nested actions.
    Sequence { actions: Vec<ActionSpec> },

    /// Parallel fan-out over nested actions; all branches must succeed.
    Parallel { branches: Vec<ActionSpec> },

    /// Conditional branch: evaluate `condition`, then run exactly one arm.
    Branch {
        condition: Condition,
        then: Box<ActionSpec>,
        otherwise: Box<ActionSpec>,
    },
}

/// Condition forms accepted by a `Branch` action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Boolean literal.
    Literal { value: bool },

    /// Equality check between two JSON values.
    Equals {
        left: serde_json::Value,
        right: serde_json::Value,
    },

    /// Substring containment check.
    Contains { haystack: String, needle: String },

    /// Capability invocation whose result is coerced to a boolean.
    Capability {
        capability: String,
        #[serde(default)]
        params: serde_json::Value,
    },
}
