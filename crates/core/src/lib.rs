#![deny(unused)]
//! Core types, traits, and error definitions for Taskflow.
//!
//! This crate provides the foundational building blocks shared by every
//! stage of the coordination pipeline: the task/plan/execution/verification
//! data model, the narrow interfaces the pipeline consumes, and mock
//! implementations for testing.

pub mod config;
pub mod error;
pub mod events;
pub mod mocks;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use events::PipelineEvent;
pub use traits::*;
pub use types::*;
