//! Runtime configuration for flat checks.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A category of flat check that can be switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    /// Grabbed creature performing a manipulate action.
    Manipulate,
    /// Deafened creature performing an auditory action.
    Deafened,
    /// Deafened creature casting a non-subtle spell.
    DeafenedSpellcasting,
    /// Stupefied creature casting a spell.
    Stupefied,
    /// Visibility of the targeted creatures.
    Target,
}

impl CheckKind {
    /// Every check kind, in display order.
    pub const ALL: [CheckKind; 5] = [
        Self::Manipulate,
        Self::Deafened,
        Self::DeafenedSpellcasting,
        Self::Stupefied,
        Self::Target,
    ];

    /// The kebab-case name used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manipulate => "manipulate",
            Self::Deafened => "deafened",
            Self::DeafenedSpellcasting => "deafened-spellcasting",
            Self::Stupefied => "stupefied",
            Self::Target => "target",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckKind {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| CoreError::UnknownCheckKind(s.to_string()))
    }
}

/// Configuration for flat check detection and the target markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct FlatCheckConfig {
    /// Check kinds that are never populated.
    pub ignored: HashSet<CheckKind>,
    /// Coalescing window for marker redraws, in milliseconds.
    pub refresh_delay_ms: u64,
    /// Flag namespace under which check state is stored on records.
    pub namespace: String,
}

impl Default for FlatCheckConfig {
    fn default() -> Self {
        Self {
            ignored: HashSet::new(),
            refresh_delay_ms: 100,
            namespace: "flat-check".to_string(),
        }
    }
}

impl FlatCheckConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Ignore a check kind (builder style).
    pub fn with_ignored(mut self, kind: CheckKind) -> Self {
        self.ignored.insert(kind);
        self
    }

    /// Set the marker refresh delay in milliseconds.
    pub fn with_refresh_delay_ms(mut self, ms: u64) -> Self {
        self.refresh_delay_ms = ms;
        self
    }

    /// Returns true if the given check kind should be skipped.
    pub fn is_ignored(&self, kind: CheckKind) -> bool {
        self.ignored.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = FlatCheckConfig::default();
        assert!(cfg.ignored.is_empty());
        assert_eq!(cfg.refresh_delay_ms, 100);
        assert_eq!(cfg.namespace, "flat-check");
    }

    #[test]
    fn builder_methods() {
        let cfg = FlatCheckConfig::default()
            .with_ignored(CheckKind::Target)
            .with_refresh_delay_ms(250);
        assert!(cfg.is_ignored(CheckKind::Target));
        assert!(!cfg.is_ignored(CheckKind::Stupefied));
        assert_eq!(cfg.refresh_delay_ms, 250);
    }

    #[test]
    fn from_json_fills_defaults() {
        let cfg = FlatCheckConfig::from_json(r#"{"ignored": ["deafened-spellcasting"]}"#)
            .expect("valid config");
        assert!(cfg.is_ignored(CheckKind::DeafenedSpellcasting));
        assert_eq!(cfg.refresh_delay_ms, 100);
    }

    #[test]
    fn from_json_rejects_unknown_kind() {
        assert!(FlatCheckConfig::from_json(r#"{"ignored": ["sleepy"]}"#).is_err());
    }

    #[test]
    fn check_kind_round_trips_through_str() {
        for kind in CheckKind::ALL {
            assert_eq!(kind.as_str().parse::<CheckKind>().ok(), Some(kind));
        }
        assert!("nope".parse::<CheckKind>().is_err());
    }
}
