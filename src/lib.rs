//! Masterclass - sequential agent crews for course material
//!
//! A course concept goes through an outline crew (draft, review, final
//! outline), an optional human approval loop, and a materials crew that
//! writes the professor guide, the slide deck and the student handout.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models and the ports for LLM substrates and operators
//! - **Service Layer** (`services`): registries, the crew runner and the workflows built on it
//! - **Infrastructure Layer** (`infrastructure`): Anthropic client, config, logging, YAML sources, artifacts
//! - **CLI Layer** (`cli`): `run`, `kickoff`, `train`, `replay` and `test`
//!
//! # Example
//!
//! ```ignore
//! use masterclass::infrastructure::config::ConfigLoader;
//! use masterclass::cli::commands::AppContext;
//!
//! let config = ConfigLoader::load()?;
//! let ctx = AppContext::from_config(&config)?;
//! let pipeline = ctx.crew_pipeline()?;
//! let outputs = ctx.runner.kickoff(&pipeline, &ctx.concept(None)?.variables()).await?;
//! println!("{}", outputs.result_for("slide_deck")?);
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AgentPersona, Config, CourseConcept, CrewOutput, Pipeline, TaskOutput, TaskStep,
};
pub use domain::ports::{LlmSubstrate, Operator};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AgentRegistry, CrewRunner, MasterclassWorkflow, TaskBuilder};
