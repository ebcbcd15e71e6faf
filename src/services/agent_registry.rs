//! Agent registry
//!
//! Materialises the named personas from the agent catalogue. The registry is
//! pure configuration: building it performs no I/O beyond reading the file.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AgentPersona, Pipeline};
use crate::infrastructure::templates::{read_catalogue, BUILTIN_AGENTS_YAML};

/// Personas keyed by id, in catalogue order
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    personas: Vec<AgentPersona>,
    index: HashMap<String, usize>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalogue: a YAML mapping of persona id to role/goal/backstory.
    pub fn from_yaml(yaml: &str) -> DomainResult<Self> {
        let mapping: serde_yaml::Mapping = serde_yaml::from_str(yaml)?;
        let mut registry = Self::new();

        for (key, value) in mapping {
            let id = key.as_str().ok_or_else(|| {
                DomainError::ValidationFailed(format!("agent key must be a string: {key:?}"))
            })?;
            let mut persona: AgentPersona = serde_yaml::from_value(value).map_err(|e| {
                DomainError::SerializationError(format!("agent '{id}': {e}"))
            })?;
            persona.id = id.to_string();
            registry.insert(persona)?;
        }

        debug!(count = registry.len(), "agent registry built");
        Ok(registry)
    }

    /// Load the catalogue at `path`, or the built-in one if it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let (yaml, _source) = read_catalogue(path, BUILTIN_AGENTS_YAML)?;
        Self::from_yaml(&yaml)
            .with_context(|| format!("Invalid agent catalogue: {}", path.display()))
    }

    /// Add a persona; ids must be unique.
    pub fn insert(&mut self, persona: AgentPersona) -> DomainResult<()> {
        if persona.id.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "agent id cannot be empty".to_string(),
            ));
        }
        if self.index.contains_key(&persona.id) {
            return Err(DomainError::ValidationFailed(format!(
                "duplicate agent id: {}",
                persona.id
            )));
        }
        self.index.insert(persona.id.clone(), self.personas.len());
        self.personas.push(persona);
        Ok(())
    }

    pub fn with_persona(mut self, persona: AgentPersona) -> DomainResult<Self> {
        self.insert(persona)?;
        Ok(self)
    }

    pub fn get(&self, id: &str) -> DomainResult<&AgentPersona> {
        self.index
            .get(id)
            .map(|&i| &self.personas[i])
            .ok_or_else(|| DomainError::AgentNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.personas.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    /// Check that every step of `pipeline` names a known persona.
    pub fn check_pipeline(&self, pipeline: &Pipeline) -> DomainResult<()> {
        for step in &pipeline.steps {
            self.get(&step.agent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::TaskStep;

    const AGENTS: &str = r"
content_developer:
  role: Course Content Developer
  goal: Design outlines
  backstory: You design courses.
feedback_agent:
  role: Reviewer
  goal: Review outlines
  backstory: You review courses.
  llm: claude-opus-4-1
";

    #[test]
    fn test_from_yaml_keeps_order_and_ids() {
        let registry = AgentRegistry::from_yaml(AGENTS).unwrap();
        assert_eq!(registry.ids(), vec!["content_developer", "feedback_agent"]);
        let reviewer = registry.get("feedback_agent").unwrap();
        assert_eq!(reviewer.id, "feedback_agent");
        assert_eq!(reviewer.llm.as_deref(), Some("claude-opus-4-1"));
        assert!(registry.get("content_developer").unwrap().llm.is_none());
    }

    #[test]
    fn test_unknown_agent() {
        let registry = AgentRegistry::from_yaml(AGENTS).unwrap();
        assert_eq!(
            registry.get("coordinator").unwrap_err(),
            DomainError::AgentNotFound("coordinator".to_string())
        );
    }

    #[test]
    fn test_missing_field_is_error() {
        let result = AgentRegistry::from_yaml("writer:\n  role: Writer\n  goal: Write\n");
        assert!(matches!(result, Err(DomainError::SerializationError(_))));
    }

    #[test]
    fn test_builtin_catalogue() {
        let registry = AgentRegistry::from_yaml(BUILTIN_AGENTS_YAML).unwrap();
        for id in [
            "content_developer",
            "feedback_agent",
            "materials_creator",
            "slide_designer",
            "handout_writer",
            "evaluator",
        ] {
            assert!(registry.contains(id), "missing persona {id}");
        }
    }

    #[test]
    fn test_check_pipeline() {
        let registry = AgentRegistry::from_yaml(AGENTS).unwrap();
        let ok = Pipeline::new("p").with_step(TaskStep::new("a", "d", "e", "content_developer"));
        assert!(registry.check_pipeline(&ok).is_ok());

        let bad = Pipeline::new("p").with_step(TaskStep::new("a", "d", "e", "ghost"));
        assert_eq!(
            registry.check_pipeline(&bad).unwrap_err(),
            DomainError::AgentNotFound("ghost".to_string())
        );
    }
}
