//! Result verification stage.
//!
//! Scores an execution outcome against three independent sub-checks
//! (requirement satisfaction, quality metrics, security/compliance) and
//! aggregates them into a confidence value and issue list. Verification
//! failure is a first-class outcome, never an error.
//!
//! Scoring itself sits behind the `Evaluator` seam: the default
//! `HeuristicEvaluator` is a deterministic stand-in for a real evaluation
//! capability.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use taskflow_core::config::VerifierConfig;
use taskflow_core::traits::EventSink;
use taskflow_core::types::{
    ExecutionOutcome, Issue, IssueKind, IssueSeverity, Suggestion, SuggestionPriority, Task,
    VerificationRecord, VerificationStatus,
};
use taskflow_core::PipelineEvent;

/// Below this, a failing metric is `Major` rather than `Minor`.
const MAJOR_SCORE_CUTOFF: f64 = 0.7;

/// Scoring backend for the three verification sub-checks.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Check one explicit requirement. Returns (satisfied, confidence).
    async fn check_requirement(
        &self,
        requirement: &str,
        task: &Task,
        outcome: &ExecutionOutcome,
    ) -> (bool, f64);

    /// Implicit check against the task description, used when the task
    /// carries no explicit requirements.
    async fn check_implicit(&self, task: &Task, outcome: &ExecutionOutcome) -> (bool, f64);

    /// Score one named quality metric in 0..1.
    async fn score_metric(&self, metric: &str, task: &Task, outcome: &ExecutionOutcome) -> f64;

    /// Security/compliance findings for the outcome.
    async fn security_findings(&self, task: &Task, outcome: &ExecutionOutcome) -> Vec<Issue>;
}

/// Deterministic placeholder evaluator.
///
/// Stands in for a real evaluation capability: scores track whether the
/// execution itself succeeded, nothing more.
pub struct HeuristicEvaluator;

#[async_trait]
impl Evaluator for HeuristicEvaluator {
    async fn check_requirement(
        &self,
        _requirement: &str,
        _task: &Task,
        outcome: &ExecutionOutcome,
    ) -> (bool, f64) {
        if outcome.success {
            (true, 0.9)
        } else {
            (false, 0.2)
        }
    }

    async fn check_implicit(&self, _task: &Task, outcome: &ExecutionOutcome) -> (bool, f64) {
        if outcome.success {
            (true, 0.85)
        } else {
            (false, 0.2)
        }
    }

    async fn score_metric(&self, _metric: &str, _task: &Task, outcome: &ExecutionOutcome) -> f64 {
        if outcome.success {
            0.95
        } else {
            0.45
        }
    }

    async fn security_findings(&self, _task: &Task, _outcome: &ExecutionOutcome) -> Vec<Issue> {
        Vec::new()
    }
}

/// Verification stage: runs the three sub-checks and combines them.
pub struct ResultVerifier {
    evaluator: Arc<dyn Evaluator>,
    config: VerifierConfig,
    events: Arc<dyn EventSink>,
}

impl ResultVerifier {
    /// Create a verifier over a scoring backend.
    pub fn new(
        evaluator: Arc<dyn Evaluator>,
        config: VerifierConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            evaluator,
            config,
            events,
        }
    }

    /// Score an execution outcome for a task.
    pub async fn verify(&self, task: &Task, outcome: &ExecutionOutcome) -> VerificationRecord {
        let mut record = VerificationRecord::start(&task.id);

        let (mut issues, requirement_confidence) = self.check_requirements(task, outcome).await;
        let (quality_issues, scores, quality_confidence) = self.check_quality(task, outcome).await;
        let (security_issues, security_confidence) = self.check_security(task, outcome).await;

        issues.extend(quality_issues);
        issues.extend(security_issues);

        record.scores = scores;
        record.confidence = aggregate_confidence(&[
            requirement_confidence,
            quality_confidence,
            security_confidence,
        ]);
        record.suggestions = derive_suggestions(&issues);
        record.status = if issues.is_empty() {
            VerificationStatus::Passed
        } else {
            VerificationStatus::Failed
        };
        record.issues = issues;

        tracing::info!(
            task_id = %task.id,
            status = ?record.status,
            issues = record.issues.len(),
            confidence = record.confidence,
            "Verification scored"
        );
        self.events
            .emit(PipelineEvent::VerificationCompleted {
                record: record.clone(),
            })
            .await;
        record
    }

    /// Requirements check: explicit per-requirement, or implicit against
    /// the description when none are given.
    async fn check_requirements(
        &self,
        task: &Task,
        outcome: &ExecutionOutcome,
    ) -> (Vec<Issue>, f64) {
        let mut issues = Vec::new();
        let mut confidences = Vec::new();

        if task.requirements.is_empty() {
            let (satisfied, confidence) = self.evaluator.check_implicit(task, outcome).await;
            confidences.push(confidence);
            if !satisfied {
                issues.push(Issue {
                    kind: IssueKind::Requirement,
                    severity: IssueSeverity::Major,
                    message: format!("task intent not satisfied: {}", task.description),
                });
            }
        } else {
            for requirement in &task.requirements {
                let (satisfied, confidence) = self
                    .evaluator
                    .check_requirement(requirement, task, outcome)
                    .await;
                confidences.push(confidence);
                if !satisfied {
                    issues.push(Issue {
                        kind: IssueKind::Requirement,
                        severity: IssueSeverity::Major,
                        message: format!("requirement not satisfied: {}", requirement),
                    });
                }
            }
        }

        (issues, mean(&confidences))
    }

    /// Quality check: every configured metric is scored and recorded; a
    /// metric below threshold becomes an issue.
    async fn check_quality(
        &self,
        task: &Task,
        outcome: &ExecutionOutcome,
    ) -> (Vec<Issue>, BTreeMap<String, f64>, f64) {
        let mut issues = Vec::new();
        let mut scores = BTreeMap::new();

        for metric in &self.config.metrics {
            let score = self.evaluator.score_metric(metric, task, outcome).await;
            scores.insert(metric.clone(), score);

            if score < self.config.threshold {
                let severity = if score < MAJOR_SCORE_CUTOFF {
                    IssueSeverity::Major
                } else {
                    IssueSeverity::Minor
                };
                issues.push(Issue {
                    kind: IssueKind::Quality,
                    severity,
                    message: format!(
                        "metric '{}' scored {:.2}, below threshold {:.2}",
                        metric, score, self.config.threshold
                    ),
                });
            }
        }

        let confidence = mean(&scores.values().copied().collect::<Vec<_>>());
        (issues, scores, confidence)
    }

    /// Security/compliance check. Confidence is fixed by outcome shape:
    /// 0.98 clean, 0.3 with any critical finding, 0.7 otherwise.
    async fn check_security(&self, task: &Task, outcome: &ExecutionOutcome) -> (Vec<Issue>, f64) {
        let findings = self.evaluator.security_findings(task, outcome).await;

        let confidence = if findings.is_empty() {
            0.98
        } else if findings
            .iter()
            .any(|issue| issue.severity == IssueSeverity::Critical)
        {
            0.3
        } else {
            0.7
        };

        (findings, confidence)
    }
}

/// Arithmetic mean of sub-check confidences.
pub fn aggregate_confidence(parts: &[f64]) -> f64 {
    mean(parts)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// One suggestion per non-empty issue category.
fn derive_suggestions(issues: &[Issue]) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    if issues
        .iter()
        .any(|i| matches!(i.kind, IssueKind::Security | IssueKind::Compliance))
    {
        suggestions.push(Suggestion {
            priority: SuggestionPriority::Critical,
            message: "Resolve security and compliance findings before accepting the result"
                .to_string(),
        });
    }
    if issues.iter().any(|i| i.kind == IssueKind::Requirement) {
        suggestions.push(Suggestion {
            priority: SuggestionPriority::High,
            message: "Revise the plan to address unmet requirements".to_string(),
        });
    }
    if issues.iter().any(|i| i.kind == IssueKind::Quality) {
        suggestions.push(Suggestion {
            priority: SuggestionPriority::Medium,
            message: "Improve result quality on the below-threshold metrics".to_string(),
        });
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_is_arithmetic_mean() {
        let confidence = aggregate_confidence(&[1.0, 0.5, 0.0]);
        assert!((confidence - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn aggregate_of_nothing_is_zero() {
        assert_eq!(aggregate_confidence(&[]), 0.0);
    }

    #[test]
    fn suggestions_follow_issue_categories() {
        let issues = vec![
            Issue {
                kind: IssueKind::Quality,
                severity: IssueSeverity::Minor,
                message: "m".into(),
            },
            Issue {
                kind: IssueKind::Security,
                severity: IssueSeverity::Critical,
                message: "s".into(),
            },
        ];
        let suggestions = derive_suggestions(&issues);
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].priority, SuggestionPriority::Critical);
        assert_eq!(suggestions[1].priority, SuggestionPriority::Medium);
    }
}
