use std::sync::Arc;

use taskflow_core::config::PlannerConfig;
use taskflow_core::mocks::MockGenerator;
use taskflow_core::types::{PlanStatus, Task};
use taskflow_core::Error;
use taskflow_pipeline::PlanGenerator;

const SIMPLE_PLAN: &str = "PLAN:\n1. Do X\n2. Do Y\nEND_OF_PLAN";

fn planner(generator: Arc<MockGenerator>, config: PlannerConfig) -> PlanGenerator {
    PlanGenerator::new(generator, config)
}

#[tokio::test]
async fn well_formed_output_becomes_a_ready_plan() {
    let generator = Arc::new(MockGenerator::constant(SIMPLE_PLAN));
    let planner = planner(generator.clone(), PlannerConfig::default());

    let task = Task::new("summarize the report");
    let plan = planner.create(&task).await.expect("plan");

    assert_eq!(plan.task_id, task.id);
    assert_eq!(plan.status, PlanStatus::Ready);
    assert_eq!(plan.steps.len(), 2);
    assert_eq!(plan.steps[0].number, 1);
    assert_eq!(plan.steps[0].description, "Do X");
    assert_eq!(plan.steps[1].number, 2);
    assert_eq!(plan.steps[1].description, "Do Y");
    assert!(plan.revisions.is_empty());
    assert_eq!(generator.call_count(), 1);
}

#[tokio::test]
async fn missing_backend_confidence_defaults() {
    let generator = Arc::new(MockGenerator::constant(SIMPLE_PLAN).with_confidence(None));
    let planner = planner(generator, PlannerConfig::default());

    let plan = planner.create(&Task::new("anything")).await.expect("plan");
    assert!((plan.confidence - 0.9).abs() < f64::EPSILON);
}

#[tokio::test]
async fn out_of_order_steps_are_sorted_and_renumbered() {
    let generator = Arc::new(MockGenerator::constant(
        "PLAN:\n5. Third thing\n1. First thing\n3. Second thing\nEND_OF_PLAN",
    ));
    let planner = planner(generator, PlannerConfig::default());

    let plan = planner.create(&Task::new("ordered work")).await.expect("plan");
    let numbered: Vec<_> = plan
        .steps
        .iter()
        .map(|s| (s.number, s.description.as_str()))
        .collect();
    assert_eq!(
        numbered,
        vec![(1, "First thing"), (2, "Second thing"), (3, "Third thing")]
    );
}

#[tokio::test]
async fn oversized_plans_are_truncated_not_rejected() {
    let mut text = String::from("PLAN:\n");
    for i in 1..=25 {
        text.push_str(&format!("{}. Step number {}\n", i, i));
    }
    text.push_str("END_OF_PLAN");

    let generator = Arc::new(MockGenerator::constant(&text));
    let planner = planner(
        generator,
        PlannerConfig {
            max_steps: 20,
            ..PlannerConfig::default()
        },
    );

    let plan = planner.create(&Task::new("big task")).await.expect("plan");
    assert_eq!(plan.steps.len(), 20);
    assert_eq!(plan.steps[19].description, "Step number 20");
}

#[tokio::test(start_paused = true)]
async fn unparseable_output_is_retried_then_succeeds() {
    let generator = Arc::new(MockGenerator::new(vec![
        "I cannot produce a plan right now.".to_string(),
        SIMPLE_PLAN.to_string(),
    ]));
    let planner = planner(generator.clone(), PlannerConfig::default());

    let plan = planner.create(&Task::new("flaky backend")).await.expect("plan");
    assert_eq!(plan.steps.len(), 2);
    assert_eq!(generator.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn attempt_exhaustion_is_a_plan_generation_error() {
    let generator = Arc::new(MockGenerator::constant("no markers here"));
    let planner = planner(
        generator.clone(),
        PlannerConfig {
            max_attempts: 2,
            ..PlannerConfig::default()
        },
    );

    let err = planner
        .create(&Task::new("hopeless"))
        .await
        .expect_err("should exhaust");
    assert!(matches!(err, Error::PlanGeneration(_)));
    assert!(err.to_string().contains("exhausted 2 attempts"));
    assert_eq!(generator.call_count(), 2);
}

#[tokio::test]
async fn revision_appends_a_record_and_leaves_the_input_plan_alone() {
    let generator = Arc::new(MockGenerator::new(vec![
        SIMPLE_PLAN.to_string(),
        "PLAN:\n1. Do X carefully\n2. Do Y\n3. Check the result\nEND_OF_PLAN".to_string(),
        "PLAN:\n1. Do everything twice\nEND_OF_PLAN".to_string(),
    ]));
    let planner = planner(generator, PlannerConfig::default());

    let task = Task::new("revisable work");
    let original = planner.create(&task).await.expect("plan");

    let first = planner
        .revise(&original, &task, "result was incomplete")
        .await
        .expect("first revision");
    let second = planner
        .revise(&first, &task, "still too shallow")
        .await
        .expect("second revision");

    // The input plans are values; revising never mutates them.
    assert!(original.revisions.is_empty());
    assert_eq!(original.steps.len(), 2);
    assert_eq!(first.revisions.len(), 1);
    assert_eq!(second.revisions.len(), 2);

    assert_eq!(first.revisions[0].reason, "result was incomplete");
    assert_eq!(first.revisions[0].previous_steps.len(), 2);
    assert_eq!(first.steps.len(), 3);

    assert_eq!(second.revisions[1].reason, "still too shallow");
    assert_eq!(second.revisions[1].previous_steps.len(), 3);
    assert_eq!(second.steps.len(), 1);
    assert_eq!(second.id, original.id);
}
