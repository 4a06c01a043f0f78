use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Top-level pipeline configuration.
///
/// Loaded from layered sources (`config/default`, an env-specific file,
/// `config/local`, then `APP__`-prefixed environment variables), or built
/// from `Default` for embedded use.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub planner: PlannerConfig,
    pub executor: ExecutorConfig,
    pub verifier: VerifierConfig,
    pub coordinator: CoordinatorConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PlannerConfig {
    /// Generation attempts before giving up on a plan.
    pub max_attempts: u32,
    /// Delay between generation attempts.
    pub retry_delay_ms: u64,
    /// Plans longer than this are truncated, not rejected.
    pub max_steps: usize,
    /// Optional deadline on each generation call. The source system
    /// declared but never enforced one; here it is enforced when set.
    pub generation_timeout_ms: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 1000,
            max_steps: 20,
            generation_timeout_ms: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Retries after the initial attempt of a resolved strategy.
    pub max_retries: u32,
    /// Fixed delay between attempts.
    pub retry_delay_ms: u64,
    /// Optional deadline on each direct capability invocation.
    pub step_timeout_ms: Option<u64>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1000,
            step_timeout_ms: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct VerifierConfig {
    /// Metrics scoring below this become issues.
    pub threshold: f64,
    /// Named quality metrics to evaluate.
    pub metrics: Vec<String>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            metrics: vec![
                "accuracy".into(),
                "completeness".into(),
                "consistency".into(),
                "relevance".into(),
                "security".into(),
            ],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Re-plan cycles allowed before escalation. Independent of the
    /// executor's per-attempt retry budget.
    pub max_retries: u32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

impl PipelineConfig {
    /// Load configuration from files and environment.
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("TASKFLOW_ENV").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map APP__EXECUTOR__MAX_RETRIES=5 to executor.max_retries
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
