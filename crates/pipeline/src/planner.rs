//! Plan generation stage.
//!
//! Turns a task description into an ordered, numbered step list via the
//! generative capability, and revises an existing plan given failure
//! context. Generation is retried on unparseable or empty output; a plan
//! that is merely too long is truncated, not rejected.

use std::sync::Arc;
use std::time::Duration;

use taskflow_core::config::PlannerConfig;
use taskflow_core::traits::{GenerateOptions, Generation, TextGenerator};
use taskflow_core::types::{Plan, PlanRevision, PlanStatus, Step, Task};
use taskflow_core::{Error, Result};

/// Marker opening the plan block in generated text.
const PLAN_MARKER: &str = "PLAN:";
/// Marker closing the plan block.
const END_MARKER: &str = "END_OF_PLAN";
/// Confidence assigned when the backend reports none.
const DEFAULT_CONFIDENCE: f64 = 0.9;

/// Planning stage: decomposes a task into ordered steps.
pub struct PlanGenerator {
    generator: Arc<dyn TextGenerator>,
    config: PlannerConfig,
}

impl PlanGenerator {
    /// Create a plan generator over a generative capability.
    pub fn new(generator: Arc<dyn TextGenerator>, config: PlannerConfig) -> Self {
        Self { generator, config }
    }

    /// Generate a fresh plan for a task.
    pub async fn create(&self, task: &Task) -> Result<Plan> {
        tracing::info!(task_id = %task.id, "Generating plan");

        let prompt = build_prompt(task, None);
        let (steps, confidence) = self.generate_steps(&prompt).await?;

        let mut plan = Plan::new(&task.id);
        plan.steps = steps;
        plan.confidence = confidence;
        plan.status = PlanStatus::Ready;

        tracing::info!(
            task_id = %task.id,
            plan_id = %plan.id,
            steps = plan.steps.len(),
            confidence = plan.confidence,
            "Plan ready"
        );
        Ok(plan)
    }

    /// Revise a plan given verification-failure context.
    ///
    /// Returns a new plan value with the step list replaced and a revision
    /// record appended; the input plan is never mutated, so execution
    /// against the old step list can still be in flight.
    pub async fn revise(&self, plan: &Plan, task: &Task, reason: &str) -> Result<Plan> {
        tracing::info!(
            task_id = %task.id,
            plan_id = %plan.id,
            revision = plan.revisions.len() + 1,
            "Revising plan"
        );

        let prompt = build_prompt(task, Some((&plan.steps, reason)));
        let (steps, confidence) = self.generate_steps(&prompt).await?;

        let mut revised = plan.clone();
        revised.revisions.push(PlanRevision {
            revised_at: chrono::Utc::now(),
            reason: reason.to_string(),
            previous_steps: plan.steps.clone(),
        });
        revised.steps = steps;
        revised.confidence = confidence;
        revised.status = PlanStatus::Ready;
        Ok(revised)
    }

    /// Run the generate-parse loop with the configured attempt budget.
    async fn generate_steps(&self, prompt: &str) -> Result<(Vec<Step>, f64)> {
        let options = GenerateOptions {
            max_output_tokens: Some(1024),
            temperature: Some(0.7),
            stop_markers: vec![END_MARKER.to_string()],
        };

        let mut last_error = String::new();
        for attempt in 1..=self.config.max_attempts {
            let generation = match self.generate_once(prompt, &options).await {
                Ok(g) => g,
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Plan generation call failed");
                    last_error = e.to_string();
                    self.pause_before_retry(attempt).await;
                    continue;
                }
            };

            let mut parsed = parse_numbered_steps(&generation.text);
            if parsed.is_empty() {
                tracing::warn!(attempt, "Generated text contained no parseable steps");
                last_error = "no parseable steps in generated text".to_string();
                self.pause_before_retry(attempt).await;
                continue;
            }

            // Out-of-order generation is tolerated: order by parsed ordinal,
            // then renumber so ordinals are gapless.
            parsed.sort_by_key(|(ordinal, _)| *ordinal);
            if parsed.len() > self.config.max_steps {
                tracing::debug!(
                    parsed = parsed.len(),
                    max_steps = self.config.max_steps,
                    "Truncating oversized plan"
                );
                parsed.truncate(self.config.max_steps);
            }

            let steps = parsed
                .into_iter()
                .enumerate()
                .map(|(i, (_, description))| Step::new(i + 1, description))
                .collect();
            let confidence = generation.confidence.unwrap_or(DEFAULT_CONFIDENCE);
            return Ok((steps, confidence));
        }

        Err(Error::plan_generation(format!(
            "exhausted {} attempts: {}",
            self.config.max_attempts, last_error
        )))
    }

    /// A single generation call, under the configured deadline when set.
    async fn generate_once(&self, prompt: &str, options: &GenerateOptions) -> Result<Generation> {
        match self.config.generation_timeout_ms {
            Some(ms) => {
                tokio::time::timeout(Duration::from_millis(ms), self.generator.generate(prompt, options))
                    .await
                    .map_err(|_| Error::timeout(format!("plan generation exceeded {}ms", ms)))?
            }
            None => self.generator.generate(prompt, options).await,
        }
    }

    async fn pause_before_retry(&self, attempt: u32) {
        if attempt < self.config.max_attempts {
            tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
        }
    }
}

/// Build the generation prompt, optionally with revision context.
fn build_prompt(task: &Task, revision: Option<(&[Step], &str)>) -> String {
    let mut prompt = format!(
        "You are an expert planner. Break the following task into a clear, \
         numbered list of steps.\nTask: {}\n",
        task.description
    );

    if !task.requirements.is_empty() {
        prompt.push_str("Requirements:\n");
        for requirement in &task.requirements {
            prompt.push_str(&format!("- {}\n", requirement));
        }
    }
    if let Some(constraints) = &task.constraints {
        prompt.push_str(&format!("Constraints: {}\n", constraints));
    }

    if let Some((previous_steps, reason)) = revision {
        prompt.push_str("\nA previous plan for this task failed verification.\n");
        prompt.push_str(&format!("Failure context: {}\n", reason));
        prompt.push_str("Previous plan:\n");
        for step in previous_steps {
            prompt.push_str(&format!("{}. {}\n", step.number, step.description));
        }
        prompt.push_str("Produce a revised plan that addresses the failure.\n");
    }

    prompt.push_str(&format!(
        "\nRespond with the steps between the markers, nothing else:\n\
         {PLAN_MARKER}\n1. First step\n2. Second step\n{END_MARKER}\n"
    ));
    prompt
}

/// Extract `(ordinal, description)` pairs from the delimited plan block.
///
/// A step is any line matching `<integer>. <text>` between `PLAN:` and
/// `END_OF_PLAN`. Lines outside the block and lines without an integer
/// prefix are ignored.
fn parse_numbered_steps(text: &str) -> Vec<(usize, String)> {
    let body = match text.split_once(PLAN_MARKER) {
        Some((_, rest)) => rest,
        None => return Vec::new(),
    };
    let body = body.split(END_MARKER).next().unwrap_or(body);

    body.lines()
        .filter_map(|line| {
            let line = line.trim();
            let (ordinal, description) = line.split_once('.')?;
            let ordinal: usize = ordinal.trim().parse().ok()?;
            let description = description.trim();
            if description.is_empty() {
                None
            } else {
                Some((ordinal, description.to_string()))
            }
        })
        .collect()
}
