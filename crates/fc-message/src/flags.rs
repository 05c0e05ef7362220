//! Persisted flat check state.
//!
//! This is the shape stored on a message under the configured namespace:
//!
//! ```json
//! { "grabbed": { "label": "Grabbed", "dc": 5, "roll": 8,
//!                "reroll": { "oldRoll": 12, "keep": "low" } },
//!   "targets": { "count": 3 } }
//! ```

use std::fmt;
use std::str::FromStr;

use fc_core::CheckDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key under the namespace that holds the slots.
pub const FLAGS_KEY: &str = "flatchecks";

/// Which of the two rolls a reroll keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeepPolicy {
    /// Keep the lower of the two results.
    Low,
    /// Keep the higher of the two results.
    #[serde(alias = "higher")]
    High,
    /// Spend a hero point and keep the new result.
    Hero,
    /// Keep the new result.
    New,
}

impl KeepPolicy {
    /// Serialized name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::High => "high",
            Self::Hero => "hero",
            Self::New => "new",
        }
    }

    /// Icon shown next to a rerolled slot.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Hero => "fa-solid fa-hospital-symbol",
            Self::New => "fa-solid fa-dice",
            Self::Low => "fa-solid fa-dice-one",
            Self::High => "fa-solid fa-dice-six",
        }
    }

    /// Text of the prompt option.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Hero => "Reroll using a hero point",
            Self::New => "Reroll and keep the new result",
            Self::Low => "Reroll and keep the lower result",
            Self::High => "Reroll and keep the higher result",
        }
    }
}

impl fmt::Display for KeepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeepPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "lower" => Ok(Self::Low),
            "high" | "higher" => Ok(Self::High),
            "hero" => Ok(Self::Hero),
            "new" => Ok(Self::New),
            other => Err(format!("unknown keep policy: {other}")),
        }
    }
}

/// The record of a second roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reroll {
    /// The roll that stood before the reroll.
    #[serde(rename = "oldRoll")]
    pub old_roll: u32,
    /// Which result is kept.
    pub keep: KeepPolicy,
}

/// Lifecycle phase of a populated slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPhase {
    /// Waiting for the first roll.
    Populated,
    /// Rolled once; a reroll is still possible.
    Rolled,
    /// Rerolled; terminal.
    Rerolled,
}

/// One flat check slot on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSlotState {
    /// What imposes the check.
    pub label: String,
    /// Difficulty class.
    pub dc: u32,
    /// The most recent roll total.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll: Option<u32>,
    /// Present once the slot has been rerolled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reroll: Option<Reroll>,
}

impl CheckSlotState {
    /// A freshly populated slot.
    pub fn new(label: impl Into<String>, dc: u32) -> Self {
        Self {
            label: label.into(),
            dc,
            roll: None,
            reroll: None,
        }
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> SlotPhase {
        match (self.roll, self.reroll) {
            (_, Some(_)) => SlotPhase::Rerolled,
            (Some(_), None) => SlotPhase::Rolled,
            (None, None) => SlotPhase::Populated,
        }
    }

    /// Whether the slot's control accepts clicks from a viewer.
    pub fn is_interactive(&self, can_modify: bool) -> bool {
        can_modify && self.reroll.is_none()
    }

    /// A reroll without a roll cannot have been produced by the protocol.
    pub fn is_consistent(&self) -> bool {
        self.reroll.is_none() || self.roll.is_some()
    }
}

impl From<CheckDescriptor> for CheckSlotState {
    fn from(d: CheckDescriptor) -> Self {
        Self::new(d.label, d.dc)
    }
}

/// The named slots a message can carry, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKey {
    /// Grabbed while manipulating.
    Grabbed,
    /// Stupefied while casting.
    Stupefied,
    /// Deafened while using auditory actions or casting.
    Deafened,
    /// Visibility of the targets.
    Targets,
}

impl SlotKey {
    /// Every slot, in display order.
    pub const ALL: [SlotKey; 4] = [Self::Grabbed, Self::Stupefied, Self::Deafened, Self::Targets];

    /// Serialized name (also the `data-key` of the control).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grabbed => "grabbed",
            Self::Stupefied => "stupefied",
            Self::Deafened => "deafened",
            Self::Targets => "targets",
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown slot: {s}"))
    }
}

/// The `targets` slot: a real check, or just a count of affected targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetsSlot {
    /// One target requires a check.
    Check(CheckSlotState),
    /// Several targets require a check; informational only.
    Count {
        /// How many targets require a check.
        count: u32,
    },
}

/// All flat check slots stored on one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatCheckFlags {
    /// Grabbed slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grabbed: Option<CheckSlotState>,
    /// Stupefied slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stupefied: Option<CheckSlotState>,
    /// Deafened slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deafened: Option<CheckSlotState>,
    /// Targets slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<TargetsSlot>,
}

impl FlatCheckFlags {
    /// The check slot stored under `key`. A target count is not a check slot.
    pub fn slot(&self, key: SlotKey) -> Option<&CheckSlotState> {
        match key {
            SlotKey::Grabbed => self.grabbed.as_ref(),
            SlotKey::Stupefied => self.stupefied.as_ref(),
            SlotKey::Deafened => self.deafened.as_ref(),
            SlotKey::Targets => match &self.targets {
                Some(TargetsSlot::Check(s)) => Some(s),
                _ => None,
            },
        }
    }

    /// Mutable access to the check slot stored under `key`.
    pub fn slot_mut(&mut self, key: SlotKey) -> Option<&mut CheckSlotState> {
        match key {
            SlotKey::Grabbed => self.grabbed.as_mut(),
            SlotKey::Stupefied => self.stupefied.as_mut(),
            SlotKey::Deafened => self.deafened.as_mut(),
            SlotKey::Targets => match &mut self.targets {
                Some(TargetsSlot::Check(s)) => Some(s),
                _ => None,
            },
        }
    }

    /// The number of targets requiring a check, when several were targeted.
    pub fn target_count(&self) -> Option<u32> {
        match self.targets {
            Some(TargetsSlot::Count { count }) => Some(count),
            _ => None,
        }
    }

    /// Populated check slots in display order.
    pub fn slots(&self) -> impl Iterator<Item = (SlotKey, &CheckSlotState)> {
        SlotKey::ALL
            .into_iter()
            .filter_map(move |k| self.slot(k).map(|s| (k, s)))
    }

    /// Returns true if no slot is populated.
    pub fn is_empty(&self) -> bool {
        self.grabbed.is_none()
            && self.stupefied.is_none()
            && self.deafened.is_none()
            && self.targets.is_none()
    }

    /// Read flags from their stored JSON form.
    ///
    /// Anything that does not parse reads as "no flat checks". Slots whose
    /// reroll has no roll are dropped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let mut flags: Self = match serde_json::from_value(value.clone()) {
            Ok(f) => f,
            Err(err) => {
                tracing::debug!(%err, "ignoring malformed flat check flags");
                return None;
            }
        };
        for key in SlotKey::ALL {
            if flags.slot(key).is_some_and(|s| !s.is_consistent()) {
                tracing::debug!(slot = %key, "dropping inconsistent flat check slot");
                match key {
                    SlotKey::Grabbed => flags.grabbed = None,
                    SlotKey::Stupefied => flags.stupefied = None,
                    SlotKey::Deafened => flags.deafened = None,
                    SlotKey::Targets => flags.targets = None,
                }
            }
        }
        Some(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn phases() {
        let mut slot = CheckSlotState::new("Grabbed", 5);
        assert_eq!(slot.phase(), SlotPhase::Populated);
        slot.roll = Some(12);
        assert_eq!(slot.phase(), SlotPhase::Rolled);
        slot.reroll = Some(Reroll {
            old_roll: 12,
            keep: KeepPolicy::New,
        });
        slot.roll = Some(4);
        assert_eq!(slot.phase(), SlotPhase::Rerolled);
    }

    #[test]
    fn interactivity() {
        let mut slot = CheckSlotState::new("Hidden", 11);
        assert!(slot.is_interactive(true));
        assert!(!slot.is_interactive(false));
        slot.roll = Some(3);
        assert!(slot.is_interactive(true));
        slot.reroll = Some(Reroll {
            old_roll: 3,
            keep: KeepPolicy::High,
        });
        slot.roll = Some(15);
        assert!(!slot.is_interactive(true));
    }

    #[test]
    fn stored_shape() {
        let flags = FlatCheckFlags {
            grabbed: Some(CheckSlotState {
                label: "Grabbed".into(),
                dc: 5,
                roll: Some(3),
                reroll: Some(Reroll {
                    old_roll: 8,
                    keep: KeepPolicy::Low,
                }),
            }),
            targets: Some(TargetsSlot::Count { count: 2 }),
            ..Default::default()
        };
        let value = serde_json::to_value(&flags).expect("serializes");
        assert_eq!(
            value,
            json!({
                "grabbed": {"label": "Grabbed", "dc": 5, "roll": 3, "reroll": {"oldRoll": 8, "keep": "low"}},
                "targets": {"count": 2}
            })
        );
    }

    #[test]
    fn targets_slot_reads_both_shapes() {
        let flags = FlatCheckFlags::from_value(&json!({"targets": {"label": "Hidden", "dc": 11}}))
            .expect("valid");
        assert_eq!(flags.slot(SlotKey::Targets).map(|s| s.dc), Some(11));
        assert_eq!(flags.target_count(), None);

        let flags = FlatCheckFlags::from_value(&json!({"targets": {"count": 4}})).expect("valid");
        assert_eq!(flags.slot(SlotKey::Targets), None);
        assert_eq!(flags.target_count(), Some(4));
    }

    #[test]
    fn legacy_higher_reads_as_high() {
        let flags = FlatCheckFlags::from_value(&json!({
            "deafened": {"label": "Deafened", "dc": 5, "roll": 9, "reroll": {"oldRoll": 2, "keep": "higher"}}
        }))
        .expect("valid");
        let reroll = flags.deafened.and_then(|s| s.reroll).expect("rerolled");
        assert_eq!(reroll.keep, KeepPolicy::High);
    }

    #[test]
    fn malformed_reads_as_none() {
        assert_eq!(FlatCheckFlags::from_value(&json!("garbage")), None);
        assert_eq!(FlatCheckFlags::from_value(&json!({"grabbed": {"dc": "five"}})), None);
    }

    #[test]
    fn inconsistent_slot_is_dropped() {
        let flags = FlatCheckFlags::from_value(&json!({
            "grabbed": {"label": "Grabbed", "dc": 5, "reroll": {"oldRoll": 2, "keep": "new"}},
            "stupefied": {"label": "Stupefied 1", "dc": 6}
        }))
        .expect("valid");
        assert!(flags.grabbed.is_none());
        assert!(flags.stupefied.is_some());
    }

    #[test]
    fn slots_iterate_in_display_order() {
        let flags = FlatCheckFlags {
            deafened: Some(CheckSlotState::new("Deafened", 5)),
            grabbed: Some(CheckSlotState::new("Grabbed", 5)),
            ..Default::default()
        };
        let keys: Vec<SlotKey> = flags.slots().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![SlotKey::Grabbed, SlotKey::Deafened]);
    }

    #[test]
    fn keep_policy_parsing() {
        assert_eq!("higher".parse::<KeepPolicy>(), Ok(KeepPolicy::High));
        assert_eq!("Hero".parse::<KeepPolicy>(), Ok(KeepPolicy::Hero));
        assert!("best".parse::<KeepPolicy>().is_err());
    }
}
