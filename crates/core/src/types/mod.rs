//! Core type definitions for Taskflow.
//!
//! This module contains the data model that flows through the coordination
//! pipeline: Task, Plan/Step, ExecutionRecord, VerificationRecord, and the
//! result/outcome aggregates.
//!
//! Broken down into submodules for better maintainability.

pub mod execution;
pub mod plan;
pub mod task;
pub mod verification;

// Re-export everything so callers can use `taskflow_core::types::Task` etc.
pub use execution::*;
pub use plan::*;
pub use task::*;
pub use verification::*;
