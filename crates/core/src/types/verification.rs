use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::execution::ExecutionOutcome;
use super::task::Task;

// =============================================================================
// Verification Types
// =============================================================================

/// Verification record status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    /// Checks are running.
    Verifying,
    /// Terminal: combined issue list is empty.
    Passed,
    /// Terminal: at least one issue was raised. Drives the coordinator's
    /// retry/escalation state machine; not an error.
    Failed,
}

/// Which sub-check raised an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Requirement,
    Quality,
    Security,
    Compliance,
}

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Minor,
    Major,
    Critical,
}

/// A single verification finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    pub message: String,
}

/// Suggestion priority, derived from the issue category it addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionPriority {
    Medium,
    High,
    Critical,
}

/// Remediation hint derived from the non-empty issue categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub priority: SuggestionPriority,
    pub message: String,
}

/// Scored outcome of an ExecutionOutcome. Immutable once terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Unique verification ID.
    pub id: String,

    /// Owning task ID.
    pub task_id: String,

    /// Status.
    pub status: VerificationStatus,

    /// Combined issues from all three sub-checks.
    pub issues: Vec<Issue>,

    /// Per-metric scores, recorded regardless of pass/fail.
    pub scores: BTreeMap<String, f64>,

    /// Arithmetic mean of the three sub-check confidences.
    pub confidence: f64,

    /// Remediation hints.
    pub suggestions: Vec<Suggestion>,
}

impl VerificationRecord {
    /// Create a new record in `Verifying` state.
    pub fn start(task_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id: task_id.into(),
            status: VerificationStatus::Verifying,
            issues: Vec::new(),
            scores: BTreeMap::new(),
            confidence: 0.0,
            suggestions: Vec::new(),
        }
    }

    /// Whether verification passed.
    pub fn passed(&self) -> bool {
        self.status == VerificationStatus::Passed
    }
}

// =============================================================================
// Collaborator Input
// =============================================================================

/// The (task, execution, verification) triple consumed by collaborators
/// after a successful coordination. Collaborators never feed back into the
/// coordination cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinationOutcome {
    pub task: Task,
    pub execution: ExecutionOutcome,
    pub verification: VerificationRecord,
}
