use std::fmt;

use serde::{Deserialize, Serialize};

/// The resolved, human-facing requirement for one flat check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckDescriptor {
    /// What imposes the check, e.g. `"Hidden"` or `"Stupefied 2"`.
    pub label: String,
    /// Difficulty class the d20 must meet or exceed.
    pub dc: u32,
    /// Optional secondary line (supplied by visibility providers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CheckDescriptor {
    /// Create a descriptor without a description.
    pub fn new(label: impl Into<String>, dc: u32) -> Self {
        Self {
            label: label.into(),
            dc,
            description: None,
        }
    }

    /// Attach a secondary description line (builder style).
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Display for CheckDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DC {} - {}", self.dc, self.label)
    }
}
