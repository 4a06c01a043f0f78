#![deny(unused)]
//! Coordination pipeline for Taskflow.
//!
//! This crate turns an incoming task into a verified result by sequencing
//! the planning, execution, and verification stages under a bounded
//! retry/escalation state machine:
//!
//! 1. `PlanGenerator` decomposes the task into ordered steps
//! 2. `RetryingExecutor` resolves each step to a strategy and runs it with
//!    bounded retries
//! 3. `ResultVerifier` scores the result; a failed verification drives a
//!    plan revision and a re-run, up to the coordinator's retry budget
//!
//! The two retry tiers never mix: an execution-level retry handles a
//! transient failure inside one step, a coordinator-level retry re-plans
//! after a verification failure.

pub mod builder;
pub mod coordinator;
pub mod detach;
pub mod executor;
pub mod planner;
pub mod resolver;
pub mod sink;
pub mod verifier;

pub use builder::CoordinatorBuilder;
pub use coordinator::TaskCoordinator;
pub use detach::detach;
pub use executor::RetryingExecutor;
pub use planner::PlanGenerator;
pub use resolver::{resolve, StepAction, FALLBACK_CAPABILITY};
pub use sink::ChannelEventSink;
pub use verifier::{Evaluator, HeuristicEvaluator, ResultVerifier};
