//! Agent persona domain model.

use serde::{Deserialize, Serialize};

/// A named role description used to shape one generation step.
///
/// Personas carry no state between tasks; everything a task needs from an
/// earlier step reaches it through the task's context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPersona {
    /// Registry key, e.g. `content_developer`
    #[serde(default)]
    pub id: String,

    /// Role the model plays, e.g. "Course Content Developer"
    pub role: String,

    /// What the persona is trying to achieve
    pub goal: String,

    /// Background that shapes tone and expertise
    pub backstory: String,

    /// Pinned model name; falls back to the configured default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm: Option<String>,
}

impl AgentPersona {
    pub fn new(
        id: impl Into<String>,
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            llm: None,
        }
    }

    pub fn with_llm(mut self, model: impl Into<String>) -> Self {
        self.llm = Some(model.into());
        self
    }

    /// System prompt sent with every request made on behalf of this persona.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role.trim(),
            self.backstory.trim(),
            self.goal.trim()
        )
    }
}
