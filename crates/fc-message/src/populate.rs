//! Decide which flat checks a freshly created message needs.

use fc_core::{Actor, CheckKind, FlatCheckConfig, Scene, UserContext};
use fc_mechanics::{AggregateTargetSlot, VisibilityProvider, aggregate_for_targets};

use crate::flags::{CheckSlotState, FlatCheckFlags, TargetsSlot};
use crate::record::{ContextType, ItemKind, MessageRecord};

/// DC of the grabbed and deafened checks, and the base of the stupefied DC.
const BASE_DC: u32 = 5;

/// Whether a message is the kind of message flat checks are attached to.
pub fn should_show_flat_checks(record: &MessageRecord) -> bool {
    match &record.context {
        Some(ContextType::FlatCheck | ContextType::DamageTaken | ContextType::HealingReceived) => {
            return false;
        }
        // An attack spell gets its checks on the attack roll, not the card.
        Some(ContextType::SpellCast) => {
            return record.item.as_ref().is_some_and(|i| i.is_attack) == record.is_roll;
        }
        _ => {}
    }

    if record.is_roll {
        return record.context.is_some() && record.context_has_dc;
    }

    record.item.as_ref().is_some_and(|item| {
        matches!(
            item.kind,
            ItemKind::Action
                | ItemKind::Consumable
                | ItemKind::Equipment
                | ItemKind::Feat
                | ItemKind::Melee
                | ItemKind::Weapon
        )
    })
}

/// Work out the flat check slots for `record`.
///
/// Returns `None` when the message has no speaker or is not relevant. A
/// relevant message with nothing to check yields empty flags.
pub fn prepare_flags(
    record: &MessageRecord,
    scene: &Scene,
    user: &UserContext,
    config: &FlatCheckConfig,
    provider: Option<&dyn VisibilityProvider>,
) -> Option<FlatCheckFlags> {
    let actor = scene.actor(record.actor?)?;
    if !should_show_flat_checks(record) {
        return None;
    }

    let has_trait = |slug: &str| record.item.as_ref().is_some_and(|i| i.has_trait(slug));
    let enabled = |kind: CheckKind| !config.is_ignored(kind);
    let mut flags = FlatCheckFlags::default();

    if enabled(CheckKind::Manipulate) && actor.has_condition("grabbed") && has_trait("manipulate") {
        flags.grabbed = Some(CheckSlotState::new("Grabbed", BASE_DC));
    }

    let deafened = actor.has_condition("deafened");
    let auditory = enabled(CheckKind::Deafened) && has_trait("auditory");
    let spoken_spell =
        enabled(CheckKind::DeafenedSpellcasting) && record.origin_is_spell && !has_trait("subtle");
    if deafened && (auditory || spoken_spell) {
        flags.deafened = Some(CheckSlotState::new("Deafened", BASE_DC));
    }

    let stupefied = actor
        .condition_value("stupefied")
        .filter(|n| *n > 0 && enabled(CheckKind::Stupefied) && record.origin_is_spell);
    if let Some(n) = stupefied {
        let dc = BASE_DC.saturating_add(n);
        flags.stupefied = Some(CheckSlotState::new(format!("Stupefied {n}"), dc));
    }

    if enabled(CheckKind::Target) {
        flags.targets = target_slot(scene, actor, user, provider);
    }

    tracing::debug!(message = %record.id, actor = %actor.name, ?flags, "prepared flat checks");
    Some(flags)
}

fn target_slot(
    scene: &Scene,
    origin: &Actor,
    user: &UserContext,
    provider: Option<&dyn VisibilityProvider>,
) -> Option<TargetsSlot> {
    aggregate_for_targets(scene, origin, &user.targets, provider).map(|slot| match slot {
        AggregateTargetSlot::Single(descriptor) => TargetsSlot::Check(descriptor.into()),
        AggregateTargetSlot::Count(count) => TargetsSlot::Count { count },
    })
}

/// Prepare flags for `record` and store them on it in one write.
///
/// Returns true if flags were written.
pub fn populate(
    record: &mut MessageRecord,
    scene: &Scene,
    user: &UserContext,
    config: &FlatCheckConfig,
    provider: Option<&dyn VisibilityProvider>,
) -> serde_json::Result<bool> {
    let Some(flags) = prepare_flags(record, scene, user, config, provider) else {
        return Ok(false);
    };
    record.set_check_flags(&config.namespace, &flags)?;
    Ok(true)
}
