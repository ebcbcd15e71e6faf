//! Scripted operator for tests and unattended runs.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::ports::{Operator, OperatorError};

#[derive(Debug, Default)]
struct Transcript {
    answers: VecDeque<String>,
    presented: Vec<(String, String)>,
    questions: Vec<String>,
}

/// Operator that replays queued answers and records what it was shown.
///
/// Once the answers run out every `ask` returns `InputClosed`, like a closed
/// stdin.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOperator {
    inner: Arc<Mutex<Transcript>>,
}

impl ScriptedOperator {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let transcript = Transcript {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Transcript::default()
        };
        Self {
            inner: Arc::new(Mutex::new(transcript)),
        }
    }

    /// `(title, content)` of everything presented, in order.
    pub fn presented(&self) -> Vec<(String, String)> {
        self.lock().presented.clone()
    }

    /// Questions asked, in order.
    pub fn questions(&self) -> Vec<String> {
        self.lock().questions.clone()
    }

    /// Answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.lock().answers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Transcript> {
        // A poisoned transcript is still readable.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl Operator for ScriptedOperator {
    async fn present(&self, title: &str, content: &str) -> Result<(), OperatorError> {
        self.lock()
            .presented
            .push((title.to_string(), content.to_string()));
        Ok(())
    }

    async fn ask(&self, question: &str) -> Result<String, OperatorError> {
        let mut transcript = self.lock();
        transcript.questions.push(question.to_string());
        transcript.answers.pop_front().ok_or(OperatorError::InputClosed)
    }
}
