//! Step action resolution.
//!
//! Pure decision logic mapping a plan step to exactly one execution
//! strategy. No I/O, deterministic: the same step always resolves to the
//! same strategy.

use serde_json::json;
use taskflow_core::types::{ActionSpec, Condition, Step};

/// Capability used when a step carries no structured action: the step
/// description is handed to the generative fallback as its input.
pub const FALLBACK_CAPABILITY: &str = "generate";

/// Resolved execution strategy for one step.
#[derive(Debug, Clone)]
pub enum StepAction {
    /// Direct capability invocation.
    Direct {
        capability: String,
        params: serde_json::Value,
    },
    /// Ordered sequence of sub-actions, results accumulated.
    Sequence(Vec<StepAction>),
    /// Parallel fan-out; all branches must succeed.
    Parallel(Vec<StepAction>),
    /// Conditional: evaluate the condition, run exactly one branch.
    Conditional {
        condition: Condition,
        then: Box<StepAction>,
        otherwise: Box<StepAction>,
    },
}

/// Resolve a step to its execution strategy.
pub fn resolve(step: &Step) -> StepAction {
    match &step.action {
        Some(spec) => lower(spec),
        None => StepAction::Direct {
            capability: FALLBACK_CAPABILITY.to_string(),
            params: json!({ "input": step.description }),
        },
    }
}

fn lower(spec: &ActionSpec) -> StepAction {
    match spec {
        ActionSpec::Invoke { capability, params } => StepAction::Direct {
            capability: capability.clone(),
            params: params.clone(),
        },
        ActionSpec::Sequence { actions } => {
            StepAction::Sequence(actions.iter().map(lower).collect())
        }
        ActionSpec::Parallel { branches } => {
            StepAction::Parallel(branches.iter().map(lower).collect())
        }
        ActionSpec::Branch {
            condition,
            then,
            otherwise,
        } => StepAction::Conditional {
            condition: condition.clone(),
            then: Box::new(lower(then)),
            otherwise: Box::new(lower(otherwise)),
        },
    }
}
