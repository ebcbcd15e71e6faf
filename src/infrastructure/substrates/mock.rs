//! Mock substrate for offline runs and tests.
//!
//! Answers are scripted per task id. Repeated calls for the same task pop
//! queued answers in order; the last one is reused once the queue is
//! drained. Tasks without a script get a deterministic echo answer.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::ports::{
    LlmSubstrate, StopReason, SubstrateError, SubstrateRequest, SubstrateResponse,
};

/// Mock substrate with scripted answers and a request log.
#[derive(Clone, Default)]
pub struct MockSubstrate {
    scripts: Arc<RwLock<HashMap<String, VecDeque<String>>>>,
    failures: Arc<RwLock<HashSet<String>>>,
    truncations: Arc<RwLock<HashSet<String>>>,
    requests: Arc<RwLock<Vec<SubstrateRequest>>>,
}

impl MockSubstrate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for `task_id`.
    pub async fn respond(&self, task_id: &str, answer: impl Into<String>) {
        let mut scripts = self.scripts.write().await;
        scripts
            .entry(task_id.to_string())
            .or_default()
            .push_back(answer.into());
    }

    /// Build a substrate with one queued answer per `(task_id, answer)` pair.
    pub fn scripted<I, K, V>(answers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut scripts: HashMap<String, VecDeque<String>> = HashMap::new();
        for (task_id, answer) in answers {
            scripts
                .entry(task_id.into())
                .or_default()
                .push_back(answer.into());
        }
        Self {
            scripts: Arc::new(RwLock::new(scripts)),
            ..Self::default()
        }
    }

    /// Make every call for `task_id` fail.
    pub async fn fail_on(&self, task_id: &str) {
        self.failures.write().await.insert(task_id.to_string());
    }

    /// Answer every call for `task_id` as if the token limit was hit.
    pub async fn truncate_on(&self, task_id: &str) {
        self.truncations.write().await.insert(task_id.to_string());
    }

    /// All requests received so far, in order.
    pub async fn requests(&self) -> Vec<SubstrateRequest> {
        self.requests.read().await.clone()
    }

    /// Task ids of all requests received so far, in order.
    pub async fn executed_tasks(&self) -> Vec<String> {
        self.requests
            .read()
            .await
            .iter()
            .map(|r| r.task_id.clone())
            .collect()
    }

    /// Number of requests received for `task_id`.
    pub async fn call_count(&self, task_id: &str) -> usize {
        self.requests
            .read()
            .await
            .iter()
            .filter(|r| r.task_id == task_id)
            .count()
    }

    async fn next_answer(&self, request: &SubstrateRequest) -> String {
        let mut scripts = self.scripts.write().await;
        match scripts.get_mut(&request.task_id) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => format!("[{}] mock answer from {}", request.task_id, request.agent),
        }
    }
}

#[async_trait]
impl LlmSubstrate for MockSubstrate {
    fn substrate_id(&self) -> &str {
        "mock"
    }

    async fn execute(&self, request: SubstrateRequest) -> Result<SubstrateResponse, SubstrateError> {
        self.requests.write().await.push(request.clone());

        if self.failures.read().await.contains(&request.task_id) {
            return Err(SubstrateError::ExecutionFailed(format!(
                "mock failure for task {}",
                request.task_id
            )));
        }

        let answer = self.next_answer(&request).await;
        let truncated = self.truncations.read().await.contains(&request.task_id);
        let mut response = SubstrateResponse::text(request.task_id, answer);
        if truncated {
            response.stop_reason = StopReason::MaxTokens;
        }
        Ok(response)
    }
}
