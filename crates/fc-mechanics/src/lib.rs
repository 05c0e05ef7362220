//! Flat check rules engine.
//!
//! Decides whether an action needs a flat check and at which DC, using
//! either an external visibility provider or the built-in condition tables.
//! Also provides the d20 primitive the check is rolled with.

pub mod aggregate;
pub mod dice;
pub mod error;
pub mod provider;
pub mod resolution;
pub mod rules;

pub use aggregate::{AggregateTargetSlot, aggregate_for_targets};
pub use dice::{FlatRoll, FlatRoller, RollOptions, ScriptedRoller, SeededRoller};
pub use error::{MechError, MechResult};
pub use provider::{
    AdvisoryGate, Affects, FixedProvider, Notifier, ProviderStatus, VisibilityProvider,
};
pub use resolution::FlatOutcome;
pub use rules::{OriginCondition, TargetCondition, requirement_for, requirement_from, table_requirement};
