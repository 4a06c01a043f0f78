//! Generative capability interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Narrow interface over the generative capability used for planning and
/// for condition evaluation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a prompt.
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<Generation>;
}

/// Options for a generation call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Maximum output units (tokens) to produce.
    pub max_output_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Markers at which generation should stop.
    #[serde(default)]
    pub stop_markers: Vec<String>,
}

/// Output of a generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    /// Generated text.
    pub text: String,

    /// Confidence reported by the backend, if any.
    pub confidence: Option<f64>,
}
