//! Fan the rule engine out over the user's live targets.
//!
//! One target yields its descriptor. Several targets collapse into a count
//! so a message never shows one control per target.

use fc_core::{Actor, CheckDescriptor, Scene, TokenId};
use serde::{Deserialize, Serialize};

use crate::provider::VisibilityProvider;
use crate::rules::requirement_for;

/// The flat check requirement for the whole target set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateTargetSlot {
    /// Exactly one target, and it requires a check.
    Single(CheckDescriptor),
    /// Several targets; this many of them require a check.
    Count(u32),
}

/// Evaluate every live target and aggregate the result.
///
/// Target IDs that no longer resolve to a token are skipped.
pub fn aggregate_for_targets(
    scene: &Scene,
    origin: &Actor,
    targets: &[TokenId],
    provider: Option<&dyn VisibilityProvider>,
) -> Option<AggregateTargetSlot> {
    let mut requirements = targets
        .iter()
        .filter_map(|id| scene.token(*id))
        .map(|token| requirement_for(scene, origin, token, provider));

    match targets.len() {
        0 => None,
        1 => requirements.next().flatten().map(AggregateTargetSlot::Single),
        _ => {
            let count = requirements.filter(Option::is_some).count() as u32;
            tracing::debug!(targets = targets.len(), count, "aggregated target checks");
            (count > 0).then_some(AggregateTargetSlot::Count(count))
        }
    }
}
