//! Records persisted by crew runs: the run journal used by `replay`, and
//! the training and test reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::crew_output::{CrewOutput, TaskOutput};
use super::pipeline::Pipeline;

/// Journal entry for one completed crew run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub pipeline: Pipeline,
    pub inputs: serde_json::Value,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outputs: Vec<TaskOutput>,
}

impl RunRecord {
    pub fn new(
        pipeline: Pipeline,
        inputs: serde_json::Value,
        started_at: DateTime<Utc>,
        output: &CrewOutput,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            pipeline,
            inputs,
            started_at,
            finished_at: Utc::now(),
            outputs: output.iter().cloned().collect(),
        }
    }

    pub fn crew_output(&self) -> CrewOutput {
        CrewOutput::from(self.outputs.clone())
    }
}

/// One piece of operator feedback collected during training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingEntry {
    pub iteration: u32,
    pub task_id: String,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Everything collected by a `train` session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub pipeline: String,
    pub iterations: u32,
    pub entries: Vec<TrainingEntry>,
}

impl TrainingRecord {
    pub fn new(pipeline: impl Into<String>) -> Self {
        Self {
            pipeline: pipeline.into(),
            iterations: 0,
            entries: Vec::new(),
        }
    }

    /// Feedback collected so far for `task_id`, oldest first.
    pub fn feedback_for(&self, task_id: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.task_id == task_id)
            .filter_map(|e| e.feedback.as_deref())
            .collect()
    }
}

/// Scores from a `test` session: task id -> one score per iteration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestReport {
    pub model: String,
    pub iterations: u32,
    pub task_order: Vec<String>,
    pub scores: BTreeMap<String, Vec<u8>>,
}

impl TestReport {
    pub fn new(model: impl Into<String>, iterations: u32) -> Self {
        Self {
            model: model.into(),
            iterations,
            task_order: Vec::new(),
            scores: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, task_id: &str, score: u8) {
        if !self.scores.contains_key(task_id) {
            self.task_order.push(task_id.to_string());
        }
        self.scores.entry(task_id.to_string()).or_default().push(score);
    }

    pub fn average(&self, task_id: &str) -> Option<f64> {
        let scores = self.scores.get(task_id)?;
        if scores.is_empty() {
            return None;
        }
        let total: u32 = scores.iter().map(|&s| u32::from(s)).sum();
        Some(f64::from(total) / scores.len() as f64)
    }

    pub fn overall_average(&self) -> Option<f64> {
        let all: Vec<u8> = self.scores.values().flatten().copied().collect();
        if all.is_empty() {
            return None;
        }
        let total: u32 = all.iter().map(|&s| u32::from(s)).sum();
        Some(f64::from(total) / all.len() as f64)
    }
}
