//! Console operator: shows content on stdout and reads answers from stdin.

use async_trait::async_trait;
use console::{style, Term};
use std::io::BufRead;

use crate::domain::ports::{Operator, OperatorError};

/// Operator backed by the terminal
#[derive(Debug, Clone)]
pub struct ConsoleOperator {
    term: Term,
}

impl Default for ConsoleOperator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleOperator {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

#[async_trait]
impl Operator for ConsoleOperator {
    async fn present(&self, title: &str, content: &str) -> Result<(), OperatorError> {
        let rule = "=".repeat(60);
        self.term.write_line("")?;
        self.term.write_line(&style(&rule).dim().to_string())?;
        self.term
            .write_line(&style(title).bold().cyan().to_string())?;
        self.term.write_line(&style(&rule).dim().to_string())?;
        self.term.write_line(content)?;
        self.term.write_line("")?;
        Ok(())
    }

    async fn ask(&self, question: &str) -> Result<String, OperatorError> {
        self.term
            .write_str(&format!("{} ", style(question).bold()))?;
        self.term.flush()?;

        // Blocking read on tokio's blocking pool, awaited immediately.
        let line = tokio::task::spawn_blocking(|| -> Result<Option<String>, std::io::Error> {
            let mut line = String::new();
            let read = std::io::stdin().lock().read_line(&mut line)?;
            Ok((read > 0).then_some(line))
        })
        .await
        .map_err(|e| OperatorError::Io(std::io::Error::other(e)))??;

        line.map(|l| l.trim_end_matches(['\r', '\n']).to_string())
            .ok_or(OperatorError::InputClosed)
    }
}
