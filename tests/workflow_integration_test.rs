//! End-to-end workflow runs against the scripted mock substrate.

mod common;

use std::sync::Arc;

use masterclass::cli::commands::replay::{replay, ReplayArgs};
use masterclass::cli::commands::run::{run_workflow, RunArgs};
use masterclass::infrastructure::console::ScriptedOperator;
use masterclass::infrastructure::substrates::MockSubstrate;
use masterclass::services::NoopObserver;

use common::{output_path, read_output, temp_dir, test_config, test_context};

fn stubbed_crew() -> MockSubstrate {
    MockSubstrate::scripted([
        ("initial_outline", "STUB initial outline"),
        ("outline_review", "STUB outline review"),
        ("final_outline", "STUB final outline"),
        ("human_revision", "STUB outline with operator feedback"),
        ("professor_guide", "STUB professor guide"),
        ("slide_deck", "STUB slides"),
        ("student_handout", "STUB handout"),
    ])
}

#[tokio::test]
async fn test_outline_phase_writes_stubbed_answers() {
    let dir = temp_dir();
    let config = test_config(dir.path());
    let mock = stubbed_crew();
    let ctx = test_context(&config, &mock);

    let args = RunArgs {
        auto_approve: true,
        concept: None,
    };
    let output = run_workflow(&ctx, &args, Arc::new(ScriptedOperator::new(Vec::<String>::new())), &NoopObserver)
        .await
        .unwrap();

    assert_eq!(output.topic, "Generative AI for Beginners");
    assert_eq!(read_output(&config, "initial_outline.md"), "STUB initial outline");
    assert_eq!(read_output(&config, "outline_review.md"), "STUB outline review");
    assert_eq!(read_output(&config, "final_outline.md"), "STUB final outline");
    assert_eq!(read_output(&config, "slides.md"), "STUB slides");
    assert_eq!(output.artifacts.len(), 3);
}

#[tokio::test]
async fn test_concept_reaches_prompts_with_default_language() {
    let dir = temp_dir();
    let config = test_config(dir.path());
    let mock = stubbed_crew();
    let ctx = test_context(&config, &mock);

    let args = RunArgs {
        auto_approve: true,
        concept: None,
    };
    run_workflow(&ctx, &args, Arc::new(ScriptedOperator::new(Vec::<String>::new())), &NoopObserver)
        .await
        .unwrap();

    let requests = mock.requests().await;
    let first = &requests[0];
    assert_eq!(first.task_id, "initial_outline");
    assert!(first.prompt.contains("Generative AI for Beginners"));
    assert!(first.prompt.contains("Non-technical professionals"));
    assert!(!first.prompt.contains("{topic}"));
    assert!(requests.iter().any(|r| r.system_prompt.contains("English")));
}

#[tokio::test]
async fn test_immediate_approval_keeps_ai_revision() {
    let dir = temp_dir();
    let config = test_config(dir.path());
    let mock = stubbed_crew();
    let ctx = test_context(&config, &mock);
    let operator = ScriptedOperator::new(["approved"]);

    let output = run_workflow(&ctx, &RunArgs::default(), Arc::new(operator.clone()), &NoopObserver)
        .await
        .unwrap();

    assert_eq!(output.human_revisions, 0);
    assert_eq!(mock.call_count("final_outline").await, 1);
    assert_eq!(mock.call_count("human_revision").await, 0);
    assert_eq!(read_output(&config, "final_outline.md"), "STUB final outline");
    assert_eq!(operator.questions().len(), 1);

    let entries: Vec<String> = std::fs::read_dir(output_path(&config, ""))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert!(!entries.iter().any(|name| name.starts_with("human_feedback_")));
}

#[tokio::test]
async fn test_feedback_then_approval() {
    let dir = temp_dir();
    let config = test_config(dir.path());
    let mock = stubbed_crew();
    let ctx = test_context(&config, &mock);
    let operator = ScriptedOperator::new(["fix the timing section", "  Approved "]);

    let output = run_workflow(&ctx, &RunArgs::default(), Arc::new(operator.clone()), &NoopObserver)
        .await
        .unwrap();

    assert_eq!(output.human_revisions, 1);
    assert_eq!(mock.call_count("final_outline").await, 1);
    assert_eq!(mock.call_count("human_revision").await, 1);
    assert_eq!(read_output(&config, "human_feedback_1.md"), "fix the timing section");
    assert_eq!(
        read_output(&config, "final_outline.md"),
        "STUB outline with operator feedback"
    );
    assert_eq!(read_output(&config, "outline_revision_0.md"), "STUB final outline");

    // Materials are written from the approved outline.
    let requests = mock.requests().await;
    let guide = requests
        .iter()
        .find(|r| r.task_id == "professor_guide")
        .unwrap();
    assert!(guide.prompt.contains("STUB outline with operator feedback"));
    assert!(!guide.prompt.contains("STUB final outline"));
}

#[tokio::test]
async fn test_replay_after_run_reuses_approved_outline() {
    let dir = temp_dir();
    let config = test_config(dir.path());
    let mock = stubbed_crew();
    let ctx = test_context(&config, &mock);
    let operator = ScriptedOperator::new(["fix the timing section", "approved"]);

    let run = run_workflow(&ctx, &RunArgs::default(), Arc::new(operator), &NoopObserver)
        .await
        .unwrap();
    assert!(output_path(&config, ".runs/latest.json").exists());

    let replayed = replay(
        &ctx,
        &ReplayArgs {
            task_id: "slide_deck".to_string(),
        },
        &NoopObserver,
    )
    .await
    .unwrap();

    assert_eq!(replayed.replayed_run, run.run_id);
    assert_eq!(mock.call_count("final_outline").await, 1);
    assert_eq!(mock.call_count("human_revision").await, 1);
    assert_eq!(mock.call_count("professor_guide").await, 1);
    assert_eq!(mock.call_count("slide_deck").await, 2);
    assert_eq!(
        replayed.outputs.result_for("final_outline").unwrap(),
        "STUB outline with operator feedback"
    );

    let requests = mock.requests().await;
    let replayed_slides = requests
        .iter()
        .rev()
        .find(|r| r.task_id == "slide_deck")
        .unwrap();
    assert!(replayed_slides.prompt.contains("STUB outline with operator feedback"));
}

#[tokio::test]
async fn test_closed_operator_input_aborts_workflow() {
    let dir = temp_dir();
    let config = test_config(dir.path());
    let mock = stubbed_crew();
    let ctx = test_context(&config, &mock);

    let result = run_workflow(
        &ctx,
        &RunArgs::default(),
        Arc::new(ScriptedOperator::new(["", "make it longer"])),
        &NoopObserver,
    )
    .await;

    assert!(result.is_err());
    assert_eq!(mock.call_count("professor_guide").await, 0);
}

#[tokio::test]
async fn test_model_failure_stops_pipeline() {
    let dir = temp_dir();
    let config = test_config(dir.path());
    let mock = stubbed_crew();
    mock.fail_on("outline_review").await;
    let ctx = test_context(&config, &mock);

    let args = RunArgs {
        auto_approve: true,
        concept: None,
    };
    let err = run_workflow(&ctx, &args, Arc::new(ScriptedOperator::new(Vec::<String>::new())), &NoopObserver)
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("outline_review"));
    assert_eq!(mock.executed_tasks().await, vec!["initial_outline", "outline_review"]);
    assert!(!output_path(&config, "final_outline.md").exists());
}
