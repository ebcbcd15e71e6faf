//! Task step domain model.
//!
//! A task step is one prompted generation request: a description template,
//! an advisory expected-output contract, the persona that runs it, and the
//! earlier steps whose outputs are injected as context.

use serde::{Deserialize, Serialize};

/// Separator between context outputs inside a prompt.
pub const CONTEXT_SEPARATOR: &str = "\n\n----------\n\n";

/// One discrete generation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStep {
    /// Unique step identifier, e.g. `initial_outline`
    #[serde(default)]
    pub id: String,

    /// Prompt template with `{placeholder}` variables
    pub description: String,

    /// Natural-language contract for the answer; not machine-checked
    pub expected_output: String,

    /// Persona id from the agent registry
    pub agent: String,

    /// Ids of earlier steps whose outputs are injected into the prompt
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,

    /// Relative artifact path for this step's output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
}

impl TaskStep {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent: agent.into(),
            context: Vec::new(),
            output_file: None,
        }
    }

    pub fn with_context(mut self, context: Vec<String>) -> Self {
        self.context = context;
        self
    }

    pub fn with_output_file(mut self, path: impl Into<String>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// Artifact path, defaulting to `<id>.md`.
    pub fn artifact_path(&self) -> String {
        self.output_file
            .clone()
            .unwrap_or_else(|| format!("{}.md", self.id))
    }

    /// Build the prompt by replacing variables and appending context.
    ///
    /// Unknown placeholders are left verbatim. `context_outputs` must follow
    /// the order of `self.context`.
    pub fn build_prompt(&self, variables: &serde_json::Value, context_outputs: &[&str]) -> String {
        let mut prompt = interpolate(&self.description, variables);

        prompt.push_str("\n\nThis is the expected criteria for your final answer: ");
        prompt.push_str(&interpolate(&self.expected_output, variables));
        prompt.push_str(
            "\nYou MUST return the actual complete content as the final answer, not a summary.",
        );

        if !context_outputs.is_empty() {
            prompt.push_str("\n\nThis is the context you're working with:\n");
            prompt.push_str(&context_outputs.join(CONTEXT_SEPARATOR));
        }

        prompt
    }
}

/// Replace `{key}` placeholders with values from a JSON object.
///
/// The template is scanned once, left to right. Substituted values are
/// copied as-is, so braces inside them are never expanded. Unknown keys and
/// braces that do not enclose an identifier stay verbatim.
pub fn interpolate(template: &str, variables: &serde_json::Value) -> String {
    let vars = variables.as_object();
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let key_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let key = &after[..key_len];
        let closed = after[key_len..].starts_with('}');

        let value = vars
            .filter(|_| closed && !key.is_empty())
            .and_then(|v| v.get(key));
        match value {
            Some(serde_json::Value::String(s)) => {
                out.push_str(s);
                rest = &after[key_len + 1..];
            }
            Some(other) => {
                out.push_str(&other.to_string());
                rest = &after[key_len + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
