//! Task builder
//!
//! Holds the task catalogue and assembles pipelines from it. A pipeline built
//! here always lists every context dependency before the step that reads it.

use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Pipeline, TaskStep};
use crate::infrastructure::templates::{read_catalogue, BUILTIN_TASKS_YAML};

/// Task catalogue in declaration order
#[derive(Debug, Clone, Default)]
pub struct TaskBuilder {
    steps: Vec<TaskStep>,
    index: HashMap<String, usize>,
}

impl TaskBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalogue: a YAML mapping of task id to task template.
    pub fn from_yaml(yaml: &str) -> DomainResult<Self> {
        let mapping: serde_yaml::Mapping = serde_yaml::from_str(yaml)?;
        let mut builder = Self::new();

        for (key, value) in mapping {
            let id = key.as_str().ok_or_else(|| {
                DomainError::ValidationFailed(format!("task key must be a string: {key:?}"))
            })?;
            let mut step: TaskStep = serde_yaml::from_value(value).map_err(|e| {
                DomainError::SerializationError(format!("task '{id}': {e}"))
            })?;
            step.id = id.to_string();
            builder.insert(step)?;
        }

        debug!(count = builder.steps.len(), "task catalogue built");
        Ok(builder)
    }

    /// Load the catalogue at `path`, or the built-in one if it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let (yaml, _source) = read_catalogue(path, BUILTIN_TASKS_YAML)?;
        Self::from_yaml(&yaml)
            .with_context(|| format!("Invalid task catalogue: {}", path.display()))
    }

    pub fn insert(&mut self, step: TaskStep) -> DomainResult<()> {
        if self.index.contains_key(&step.id) {
            return Err(DomainError::DuplicateTask(step.id));
        }
        self.index.insert(step.id.clone(), self.steps.len());
        self.steps.push(step);
        Ok(())
    }

    pub fn with_step(mut self, step: TaskStep) -> DomainResult<Self> {
        self.insert(step)?;
        Ok(self)
    }

    /// A copy of the step named `id`.
    pub fn step(&self, id: &str) -> DomainResult<TaskStep> {
        self.index
            .get(id)
            .map(|&i| self.steps[i].clone())
            .ok_or_else(|| DomainError::TaskNotFound(id.to_string()))
    }

    pub fn ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id.as_str()).collect()
    }

    /// Build a pipeline from `ids`, pulling in transitive context
    /// dependencies. Each dependency is inserted before its first dependant;
    /// otherwise the requested order is kept and repeated ids are ignored.
    pub fn pipeline(&self, name: &str, ids: &[&str]) -> DomainResult<Pipeline> {
        let mut pipeline = Pipeline::new(name);
        let mut placed: HashSet<String> = HashSet::new();
        let mut path: Vec<String> = Vec::new();

        for id in ids {
            self.place(id, &mut pipeline, &mut placed, &mut path)?;
        }

        pipeline.validate()?;
        Ok(pipeline)
    }

    fn place(
        &self,
        id: &str,
        pipeline: &mut Pipeline,
        placed: &mut HashSet<String>,
        path: &mut Vec<String>,
    ) -> DomainResult<()> {
        if placed.contains(id) {
            return Ok(());
        }
        if let Some(start) = path.iter().position(|p| p == id) {
            let mut cycle = path[start..].to_vec();
            cycle.push(id.to_string());
            return Err(DomainError::DependencyCycle(cycle));
        }

        let step = self.step(id)?;
        path.push(id.to_string());
        for dependency in &step.context {
            self.place(dependency, pipeline, placed, path)?;
        }
        path.pop();

        placed.insert(id.to_string());
        pipeline.add_step(step);
        Ok(())
    }
}
