use std::fmt;

use serde::{Deserialize, Serialize};

/// An active status condition on an actor, identified by its slug.
///
/// Valued conditions (`stupefied 2`, `frightened 1`) carry their value;
/// everything else leaves it `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    /// Lowercase slug, e.g. `"grabbed"` or `"invisible"`.
    pub slug: String,
    /// Numeric value for valued conditions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
}

impl Condition {
    /// Create an unvalued condition. The slug is normalized to lowercase.
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into().trim().to_lowercase(),
            value: None,
        }
    }

    /// Create a valued condition such as `stupefied 2`.
    pub fn valued(slug: impl Into<String>, value: u32) -> Self {
        Self {
            value: Some(value),
            ..Self::new(slug)
        }
    }

    /// Parse `"slug"` or `"slug N"` / `"slug-N"` into a condition.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        let split = s
            .rsplit_once(' ')
            .or_else(|| s.rsplit_once('-'))
            .and_then(|(slug, n)| n.parse::<u32>().ok().map(|n| (slug, n)));
        match split {
            Some((slug, n)) => Some(Self::valued(slug, n)),
            None => Some(Self::new(s)),
        }
    }

    /// Returns true if this condition has the given slug.
    pub fn is(&self, slug: &str) -> bool {
        self.slug == slug
    }

    /// Human-facing label: the slug with its first letter capitalized.
    pub fn label(&self) -> String {
        capitalize(&self.slug)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(v) => write!(f, "{} {v}", self.slug),
            None => write!(f, "{}", self.slug),
        }
    }
}

/// Uppercase the first character of a slug, leaving the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
