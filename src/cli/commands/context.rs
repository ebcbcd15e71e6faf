//! Shared setup for commands: catalogues, substrates, runner and writer.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::domain::models::{Config, CourseConcept, Pipeline};
use crate::infrastructure::output::{ArtifactWriter, RunJournal};
use crate::infrastructure::substrates::SubstrateRegistry;
use crate::infrastructure::templates::ConceptLoader;
use crate::services::{AgentRegistry, CrewRunner, TaskBuilder};

/// Everything a command needs, built once from the configuration
pub struct AppContext {
    pub config: Config,
    pub agents: Arc<AgentRegistry>,
    pub tasks: TaskBuilder,
    pub runner: CrewRunner,
    pub writer: ArtifactWriter,
}

impl AppContext {
    /// Build the context with the substrates named in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let substrates =
            SubstrateRegistry::from_config(config).context("Failed to set up the LLM substrate")?;
        Self::with_substrates(config, Arc::new(substrates))
    }

    /// Build the context around an existing substrate registry.
    pub fn with_substrates(config: &Config, substrates: Arc<SubstrateRegistry>) -> Result<Self> {
        let agents = Arc::new(AgentRegistry::load(&config.agents_path)?);
        let tasks = TaskBuilder::load(&config.tasks_path)?;
        debug!(agents = agents.len(), tasks = tasks.ids().len(), "catalogues loaded");

        Ok(Self {
            config: config.clone(),
            runner: CrewRunner::new(substrates, agents.clone()),
            agents,
            tasks,
            writer: ArtifactWriter::new(&config.output_dir),
        })
    }

    /// Concept from `path`, or from the configured concept file.
    pub fn concept(&self, path: Option<&Path>) -> Result<CourseConcept> {
        let path = path.unwrap_or_else(|| Path::new(&self.config.concept_path));
        ConceptLoader::load(path)
            .with_context(|| format!("Failed to load course concept from {}", path.display()))
    }

    /// Concept from the configured file, falling back to the built-in one.
    pub fn concept_or_default(&self) -> Result<CourseConcept> {
        ConceptLoader::load_or_default(&self.config.concept_path)
            .with_context(|| format!("Failed to load course concept from {}", self.config.concept_path))
    }

    /// The crew over `workflow.crew_tasks`, dependencies first.
    pub fn crew_pipeline(&self) -> Result<Pipeline> {
        let ids: Vec<&str> = self
            .config
            .workflow
            .crew_tasks
            .iter()
            .map(String::as_str)
            .collect();
        self.tasks
            .pipeline("crew", &ids)
            .context("Failed to assemble the crew pipeline")
    }

    pub fn journal(&self) -> RunJournal {
        RunJournal::new(self.writer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::substrates::MockSubstrate;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> AppContext {
        let mut config = Config::default();
        config.output_dir = dir.path().join("out").display().to_string();
        config.agents_path = dir.path().join("missing-agents.yaml").display().to_string();
        config.tasks_path = dir.path().join("missing-tasks.yaml").display().to_string();
        config.concept_path = dir.path().join("concept.yaml").display().to_string();
        let substrates = SubstrateRegistry::with_substrate(Arc::new(MockSubstrate::new()));
        AppContext::with_substrates(&config, Arc::new(substrates)).unwrap()
    }

    #[test]
    fn test_builtin_catalogues_build_crew() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let pipeline = ctx.crew_pipeline().unwrap();
        assert_eq!(
            pipeline.step_ids(),
            vec![
                "initial_outline",
                "outline_review",
                "final_outline",
                "professor_guide",
                "slide_deck",
                "student_handout"
            ]
        );
    }

    #[test]
    fn test_concept_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        assert!(ctx.concept(None).is_err());
        assert!(ctx.concept_or_default().is_ok());
    }
}
