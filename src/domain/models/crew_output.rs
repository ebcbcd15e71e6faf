//! Result collection produced by a crew run.
//!
//! `CrewOutput` is the one place task results are read from. Lookups by
//! position or by task id are O(1) and fail with a typed error instead of
//! degrading to a stringified blob.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::errors::{DomainError, DomainResult};

/// Text produced by one completed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub task_id: String,
    pub agent: String,
    /// Raw model answer, markdown by convention
    pub raw: String,
    pub output_file: String,
    pub completed_at: DateTime<Utc>,
    /// The model stopped at its token limit; `raw` is cut short
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl TaskOutput {
    pub fn new(
        task_id: impl Into<String>,
        agent: impl Into<String>,
        raw: impl Into<String>,
        output_file: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            agent: agent.into(),
            raw: raw.into(),
            output_file: output_file.into(),
            completed_at: Utc::now(),
            truncated: false,
        }
    }

    pub fn with_truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }
}

/// Ordered outputs of a crew run with constant-time lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TaskOutput>", into = "Vec<TaskOutput>")]
pub struct CrewOutput {
    outputs: Vec<TaskOutput>,
    index: HashMap<String, usize>,
}

impl CrewOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed task. A second output for the same task id
    /// replaces the first one in place.
    pub fn push(&mut self, output: TaskOutput) {
        if let Some(&i) = self.index.get(&output.task_id) {
            self.outputs[i] = output;
            return;
        }
        self.index.insert(output.task_id.clone(), self.outputs.len());
        self.outputs.push(output);
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Output of the task at `index` in execution order.
    pub fn output_at(&self, index: usize) -> DomainResult<&TaskOutput> {
        self.outputs.get(index).ok_or(DomainError::IndexOutOfRange {
            index,
            len: self.outputs.len(),
        })
    }

    /// Text result of the task at `index`.
    pub fn text_at(&self, index: usize) -> DomainResult<&str> {
        self.output_at(index).map(|o| o.raw.as_str())
    }

    /// Output of a task by id.
    pub fn get(&self, task_id: &str) -> DomainResult<&TaskOutput> {
        self.index
            .get(task_id)
            .map(|&i| &self.outputs[i])
            .ok_or_else(|| DomainError::TaskOutputNotFound(task_id.to_string()))
    }

    /// Text result of a task by id.
    pub fn result_for(&self, task_id: &str) -> DomainResult<&str> {
        self.get(task_id).map(|o| o.raw.as_str())
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.index.contains_key(task_id)
    }

    /// Text of the last completed task.
    pub fn final_output(&self) -> Option<&str> {
        self.outputs.last().map(|o| o.raw.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskOutput> {
        self.outputs.iter()
    }

    pub fn into_outputs(self) -> Vec<TaskOutput> {
        self.outputs
    }
}

impl From<Vec<TaskOutput>> for CrewOutput {
    fn from(outputs: Vec<TaskOutput>) -> Self {
        let mut crew_output = CrewOutput::new();
        for output in outputs {
            crew_output.push(output);
        }
        crew_output
    }
}

impl From<CrewOutput> for Vec<TaskOutput> {
    fn from(output: CrewOutput) -> Self {
        output.outputs
    }
}
