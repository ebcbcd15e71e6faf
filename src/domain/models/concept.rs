//! Course concept domain model.
//!
//! The concept is the static description of the course the crew is asked to
//! build. It is loaded once at startup and never changes during a run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Description of the desired course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseConcept {
    /// Course topic, e.g. "Generative AI for Beginners"
    pub topic: String,

    /// Intended audience
    pub audience: String,

    /// Course length, e.g. "One-day masterclass"
    pub duration: String,

    /// Emphasis of the course content
    #[serde(default)]
    pub focus: String,

    /// Language the materials are written in
    #[serde(default = "default_language")]
    pub language: String,

    /// Free-form fields, each available as a `{key}` placeholder in prompts
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, String>,
}

pub fn default_language() -> String {
    "English".to_string()
}

impl Default for CourseConcept {
    fn default() -> Self {
        Self {
            topic: "Generative AI for Beginners".to_string(),
            audience: "Non-technical professionals".to_string(),
            duration: "One-day masterclass".to_string(),
            focus: "Practical AI tools and productivity enhancement".to_string(),
            language: default_language(),
            extra: BTreeMap::new(),
        }
    }
}

impl CourseConcept {
    pub fn new(
        topic: impl Into<String>,
        audience: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            audience: audience.into(),
            duration: duration.into(),
            focus: String::new(),
            language: default_language(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_focus(mut self, focus: impl Into<String>) -> Self {
        self.focus = focus.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Template variables for prompt interpolation.
    ///
    /// Extra fields never shadow the named ones.
    pub fn variables(&self) -> serde_json::Value {
        let mut vars = serde_json::Map::new();
        for (key, value) in &self.extra {
            vars.insert(key.clone(), serde_json::Value::String(value.clone()));
        }
        vars.insert("topic".into(), self.topic.clone().into());
        vars.insert("audience".into(), self.audience.clone().into());
        vars.insert("duration".into(), self.duration.clone().into());
        vars.insert("focus".into(), self.focus.clone().into());
        vars.insert("language".into(), self.language.clone().into());
        serde_json::Value::Object(vars)
    }
}
