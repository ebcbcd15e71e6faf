pub mod approval;
pub mod concept;
pub mod config;
pub mod crew_output;
pub mod persona;
pub mod pipeline;
pub mod run_record;
pub mod task_step;

pub use approval::{ApprovalState, OperatorDecision, APPROVAL_SENTINEL};
pub use concept::CourseConcept;
pub use config::{Config, LlmConfig, LoggingConfig, WorkflowConfig};
pub use crew_output::{CrewOutput, TaskOutput};
pub use persona::AgentPersona;
pub use pipeline::Pipeline;
pub use run_record::{RunRecord, TestReport, TrainingEntry, TrainingRecord};
pub use task_step::TaskStep;
