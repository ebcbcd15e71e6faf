//! Service layer: registries, the crew runner and the workflows built on it.

pub mod agent_registry;
pub mod approval_loop;
pub mod crew_runner;
pub mod evaluation;
pub mod masterclass;
pub mod task_builder;
pub mod training;

pub use agent_registry::AgentRegistry;
pub use approval_loop::{ApprovalError, ApprovalLoop, ApprovalOutcome, FINAL_OUTLINE_FILE};
pub use crew_runner::{
    CrewError, CrewRunner, NoopObserver, ObserverSet, PersistingObserver, StepObserver,
};
pub use evaluation::{parse_score, EvaluationService, EVALUATION_TASK};
pub use masterclass::{
    MasterclassOutcome, MasterclassWorkflow, WorkflowError, OUTLINE_TASK, REVISION_TASK,
};
pub use task_builder::TaskBuilder;
pub use training::{feedback_addendum, TrainingService};
