//! The reroll choice prompt.
//!
//! Before a second roll the user picks which result to keep. The hero
//! point option is only offered, and preselected, when the actor has a
//! hero point to spend.

use crate::flags::KeepPolicy;

/// What the prompt asks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RerollRequest {
    /// Label of the slot being rerolled.
    pub label: String,
    /// DC of the slot.
    pub dc: u32,
    /// The roll that currently stands.
    pub old_roll: u32,
    /// The acting actor's hero point balance.
    pub hero_points: i32,
    /// Options in display order.
    pub options: Vec<KeepPolicy>,
    /// The preselected option.
    pub default: KeepPolicy,
}

impl RerollRequest {
    /// Build the request for a slot.
    pub fn new(label: impl Into<String>, dc: u32, old_roll: u32, hero_points: i32) -> Self {
        let mut options = Vec::with_capacity(4);
        if hero_points > 0 {
            options.push(KeepPolicy::Hero);
        }
        options.extend([KeepPolicy::New, KeepPolicy::Low, KeepPolicy::High]);
        let default = if hero_points > 0 {
            KeepPolicy::Hero
        } else {
            KeepPolicy::New
        };
        Self {
            label: label.into(),
            dc,
            old_roll,
            hero_points,
            options,
            default,
        }
    }

    /// Whether `choice` is one of the offered options.
    pub fn offers(&self, choice: KeepPolicy) -> bool {
        self.options.contains(&choice)
    }
}

/// Asks the user which result to keep. `None` means the prompt was closed.
pub trait RerollPrompt {
    /// Show the prompt and wait for an answer.
    fn choose(&mut self, request: &RerollRequest) -> Option<KeepPolicy>;
}

/// Always answers with the preselected option.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptDefault;

impl RerollPrompt for AcceptDefault {
    fn choose(&mut self, request: &RerollRequest) -> Option<KeepPolicy> {
        Some(request.default)
    }
}

/// Always answers with the same choice, or cancels.
#[derive(Debug, Clone, Copy)]
pub struct FixedChoice(pub Option<KeepPolicy>);

impl RerollPrompt for FixedChoice {
    fn choose(&mut self, _request: &RerollRequest) -> Option<KeepPolicy> {
        self.0
    }
}
