//! Property tests for pipeline ordering and the approval sentinel.

use masterclass::domain::models::{AgentPersona, OperatorDecision, TaskStep};
use masterclass::infrastructure::substrates::{MockSubstrate, SubstrateRegistry};
use masterclass::services::{AgentRegistry, CrewRunner, TaskBuilder};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::HashMap;
use std::sync::Arc;

/// Catalogue of `size` tasks where task i may depend on any earlier task.
fn catalogue(size: usize, edges: &[(usize, usize)]) -> TaskBuilder {
    let mut builder = TaskBuilder::new();
    for i in 0..size {
        let context: Vec<String> = edges
            .iter()
            .filter(|(from, to)| *from == i && to < from)
            .map(|(_, to)| format!("task_{to}"))
            .collect();
        let step = TaskStep::new(format!("task_{i}"), format!("step {i}"), "text", "writer")
            .with_context(context);
        builder.insert(step).unwrap();
    }
    builder
}

fn runner(mock: &MockSubstrate) -> CrewRunner {
    let agents = AgentRegistry::new()
        .with_persona(AgentPersona::new("writer", "Writer", "Write", "You write."))
        .unwrap();
    CrewRunner::new(
        Arc::new(SubstrateRegistry::with_substrate(Arc::new(mock.clone()))),
        Arc::new(agents),
    )
}

proptest! {
    /// Every context dependency precedes its dependant and nothing requested
    /// is dropped.
    #[test]
    fn prop_dependencies_precede_dependants(
        size in 1usize..12,
        edges in prop::collection::vec((0usize..12, 0usize..12), 0..30),
        requested in prop::collection::vec(0usize..12, 1..6),
    ) {
        let builder = catalogue(size, &edges);
        let ids: Vec<String> = requested.iter().map(|i| format!("task_{}", i % size)).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();

        let pipeline = builder
            .pipeline("prop", &id_refs)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let position: HashMap<&str, usize> = pipeline
            .steps
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.as_str(), i))
            .collect();
        prop_assert_eq!(position.len(), pipeline.len());

        for id in &id_refs {
            prop_assert!(position.contains_key(id));
        }
        for step in &pipeline.steps {
            for dependency in &step.context {
                let dep = position.get(dependency.as_str());
                prop_assert!(dep.is_some(), "missing dependency {}", dependency);
                prop_assert!(dep < position.get(step.id.as_str()));
            }
        }
    }

    /// The substrate sees tasks in exactly the pipeline's declaration order.
    #[test]
    fn prop_execution_order_matches_declaration(
        size in 1usize..8,
        edges in prop::collection::vec((0usize..8, 0usize..8), 0..16),
    ) {
        let builder = catalogue(size, &edges);
        let ids: Vec<String> = (0..size).rev().map(|i| format!("task_{i}")).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let pipeline = builder
            .pipeline("prop", &id_refs)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let mock = MockSubstrate::new();
        let crew = runner(&mock);
        let executed = tokio_test::block_on(async {
            crew.kickoff(&pipeline, &serde_json::json!({})).await.unwrap();
            mock.executed_tasks().await
        });

        prop_assert_eq!(executed, pipeline.step_ids());
    }

    /// Only the trimmed, case-folded sentinel approves.
    #[test]
    fn prop_approval_only_on_sentinel(input in "\\PC{0,20}") {
        let decision = OperatorDecision::parse(&input);
        let folded = input.trim().to_lowercase();
        if folded == "approved" {
            prop_assert_eq!(decision, OperatorDecision::Approve);
        } else if folded.is_empty() {
            prop_assert_eq!(decision, OperatorDecision::Empty);
        } else {
            prop_assert_eq!(decision, OperatorDecision::Revise(input.trim().to_string()));
        }
    }

    /// Whitespace and case around the sentinel never matter.
    #[test]
    fn prop_padded_sentinel_approves(
        left in "[ \\t\\n]{0,4}",
        right in "[ \\t\\n]{0,4}",
        upper in prop::collection::vec(any::<bool>(), 8),
    ) {
        let word: String = "approved"
            .chars()
            .zip(&upper)
            .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
            .collect();
        let input = format!("{left}{word}{right}");
        prop_assert_eq!(OperatorDecision::parse(&input), OperatorDecision::Approve);
    }
}
