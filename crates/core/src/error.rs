//! Error types for Taskflow.

use thiserror::Error;

/// Result type alias using Taskflow's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Taskflow.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Planning Errors
    // =========================================================================
    #[error("Plan generation failed: {0}")]
    PlanGeneration(String),

    // =========================================================================
    // Execution Errors
    // =========================================================================
    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Capability not found: {0}")]
    CapabilityNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    // =========================================================================
    // Generative Capability Errors
    // =========================================================================
    #[error("Generation error: {0}")]
    Generation(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a plan generation error.
    pub fn plan_generation(msg: impl Into<String>) -> Self {
        Self::PlanGeneration(msg.into())
    }

    /// Create an execution error.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Create a capability not found error.
    pub fn capability_not_found(name: impl Into<String>) -> Self {
        Self::CapabilityNotFound(name.into())
    }

    /// Create an invalid parameters error.
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }

    /// Create a generation error.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }
}
