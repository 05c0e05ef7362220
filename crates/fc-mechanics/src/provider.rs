//! External visibility providers.
//!
//! A provider computes visibility between tokens with its own rules (light,
//! cover, senses). When one is installed and capable, its answer replaces
//! the built-in condition tables entirely.

use std::collections::HashMap;

use fc_core::{Token, TokenId};

/// Whose perspective a visibility query is asked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affects {
    /// How the target appears to the origin.
    Target,
    /// How the origin appears to the target.
    Origin,
}

/// The two-function contract of an external visibility provider.
pub trait VisibilityProvider {
    /// Whether the provider is installed and enabled.
    fn is_active(&self) -> bool {
        true
    }

    /// Whether the provider exposes the flat check DC query. Older provider
    /// versions only answer visibility questions.
    fn supports_flat_check_dc(&self) -> bool {
        true
    }

    /// Visibility slug of `target` as seen from `origin`, e.g. `"hidden"`.
    fn visibility_label(&self, target: &Token, origin: Option<&Token>, affects: Affects) -> String;

    /// Flat check DC for an action from `origin` against `target`. 0 means none.
    fn flat_check_dc(&self, origin: Option<&Token>, target: &Token) -> u32;

    /// Optional explanation shown under the requirement, e.g. the light level.
    fn description(&self, _origin: Option<&Token>, _target: &Token) -> Option<String> {
        None
    }
}

/// The state of the installed provider, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    /// No provider installed.
    Absent,
    /// Installed but disabled.
    Inactive,
    /// Active and answering flat check queries.
    Ready,
    /// Active but missing the flat check DC query.
    Outdated,
}

impl ProviderStatus {
    /// Probe a provider for its status.
    pub fn probe(provider: Option<&dyn VisibilityProvider>) -> Self {
        match provider {
            None => Self::Absent,
            Some(p) if !p.is_active() => Self::Inactive,
            Some(p) if !p.supports_flat_check_dc() => Self::Outdated,
            Some(_) => Self::Ready,
        }
    }

    /// Whether the rule engine should defer to the provider.
    pub fn is_usable(self) -> bool {
        self == Self::Ready
    }
}

/// Receives user-facing notices.
pub trait Notifier {
    /// Show a notice to the user.
    fn notify(&mut self, title: &str, message: &str);
}

/// Title used for every user-facing notice.
pub const NOTICE_TITLE: &str = "Flat Checks";

/// Message shown when the installed provider is too old.
pub const OUTDATED_PROVIDER_NOTICE: &str = "The visibility provider is outdated. Flat check \
     integration requires a version exposing getFlatCheckDc; falling back to condition tables.";

/// Shows the outdated-provider notice at most once.
#[derive(Debug, Clone, Default)]
pub struct AdvisoryGate {
    shown: bool,
}

impl AdvisoryGate {
    /// Create a gate that has not fired yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe the provider and, the first time it is found outdated, notify.
    pub fn check(
        &mut self,
        provider: Option<&dyn VisibilityProvider>,
        notifier: &mut dyn Notifier,
    ) -> ProviderStatus {
        let status = ProviderStatus::probe(provider);
        if status == ProviderStatus::Outdated && !self.shown {
            self.shown = true;
            tracing::warn!("visibility provider lacks flat check DC support");
            notifier.notify(NOTICE_TITLE, OUTDATED_PROVIDER_NOTICE);
        }
        status
    }

    /// Whether the notice has been shown.
    pub fn has_fired(&self) -> bool {
        self.shown
    }
}

/// A provider answering from a fixed per-target table.
///
/// Targets missing from the table are reported as `"observed"` with DC 0.
#[derive(Debug, Clone)]
pub struct FixedProvider {
    entries: HashMap<TokenId, (String, u32)>,
    notes: HashMap<TokenId, String>,
    /// Reported by [`VisibilityProvider::is_active`].
    pub active: bool,
    /// Reported by [`VisibilityProvider::supports_flat_check_dc`].
    pub supports_dc: bool,
}

impl Default for FixedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedProvider {
    /// Create an active, capable provider with no entries.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            notes: HashMap::new(),
            active: true,
            supports_dc: true,
        }
    }

    /// Record the visibility of a target (builder style).
    pub fn with(mut self, target: TokenId, label: impl Into<String>, dc: u32) -> Self {
        self.entries.insert(target, (label.into(), dc));
        self
    }

    /// Attach a description line to a target (builder style).
    pub fn with_note(mut self, target: TokenId, note: impl Into<String>) -> Self {
        self.notes.insert(target, note.into());
        self
    }
}

impl VisibilityProvider for FixedProvider {
    fn is_active(&self) -> bool {
        self.active
    }

    fn supports_flat_check_dc(&self) -> bool {
        self.supports_dc
    }

    fn visibility_label(&self, target: &Token, _origin: Option<&Token>, _affects: Affects) -> String {
        self.entries
            .get(&target.id)
            .map_or_else(|| "observed".to_string(), |(label, _)| label.clone())
    }

    fn flat_check_dc(&self, _origin: Option<&Token>, target: &Token) -> u32 {
        self.entries.get(&target.id).map_or(0, |(_, dc)| *dc)
    }

    fn description(&self, _origin: Option<&Token>, target: &Token) -> Option<String> {
        self.notes.get(&target.id).cloned()
    }
}
