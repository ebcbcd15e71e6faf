//! Pipeline domain model.
//!
//! A pipeline is an ordered list of task steps executed strictly in
//! declaration order. A step may only read the outputs of steps declared
//! before it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::task_step::TaskStep;
use crate::domain::errors::{DomainError, DomainResult};

/// Ordered, sequential list of task steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Human-readable name, used in logs and the run journal
    pub name: String,

    /// Steps in execution order
    pub steps: Vec<TaskStep>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step. Ordering is checked by [`Pipeline::validate`].
    pub fn add_step(&mut self, step: TaskStep) {
        self.steps.push(step);
    }

    pub fn with_step(mut self, step: TaskStep) -> Self {
        self.add_step(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get_step(&self, step_id: &str) -> Option<&TaskStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    pub fn position(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == step_id)
    }

    pub fn step_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id.as_str()).collect()
    }

    /// Validate the pipeline structure.
    ///
    /// Every context reference must name a step declared earlier, which also
    /// rules out self references and cycles.
    pub fn validate(&self) -> DomainResult<()> {
        if self.steps.is_empty() {
            return Err(DomainError::EmptyPipeline(self.name.clone()));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for step in &self.steps {
            if step.id.trim().is_empty() {
                return Err(DomainError::ValidationFailed(format!(
                    "pipeline '{}' contains a step without an id",
                    self.name
                )));
            }

            for context_id in &step.context {
                if !seen.contains(context_id.as_str()) {
                    return Err(DomainError::ContextNotDeclaredEarlier {
                        task_id: step.id.clone(),
                        context_id: context_id.clone(),
                    });
                }
            }

            if !seen.insert(step.id.as_str()) {
                return Err(DomainError::DuplicateTask(step.id.clone()));
            }
        }

        Ok(())
    }
}
