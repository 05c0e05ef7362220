//! The roll/reroll protocol for a single slot.
//!
//! The first click on a slot rolls once. The second click opens the reroll
//! prompt; the slot stays inert until the prompt is answered, then rolls
//! again and records which result is kept. After that the slot is final.
//!
//! The prompt is a suspension point, so the protocol is split in two:
//! [`SlotResolver::begin`] either finishes immediately or hands back a
//! [`PendingReroll`], which [`SlotResolver::complete`] consumes once the
//! user has answered. [`SlotResolver::activate`] runs both halves against a
//! synchronous [`RerollPrompt`].

use std::collections::HashSet;

use fc_core::{ActorId, MessageId};
use fc_mechanics::{FlatRoll, FlatRoller, RollOptions};

use crate::error::{MessageError, MessageResult};
use crate::flags::{KeepPolicy, Reroll, SlotKey, SlotPhase};
use crate::prompt::{RerollPrompt, RerollRequest};
use crate::record::Viewer;
use crate::store::{RecordStore, SlotUpdate};

/// Why a click did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The viewer may not update the message.
    NotPermitted,
    /// The message has no such slot.
    MissingSlot,
    /// The slot only reports a target count.
    Informational,
    /// The slot has already been rerolled.
    Terminal,
    /// A reroll prompt for this slot is still open.
    Pending,
}

/// What a click did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// First roll made and stored.
    Rolled(FlatRoll),
    /// Reroll made and stored.
    Rerolled {
        /// The new roll.
        roll: FlatRoll,
        /// The kept result policy.
        keep: KeepPolicy,
    },
    /// The prompt was closed; nothing changed.
    Cancelled,
    /// Nothing happened.
    Ignored(IgnoreReason),
}

/// A reroll waiting on the user's choice.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingReroll {
    message: MessageId,
    key: SlotKey,
    actor: Option<ActorId>,
    /// What to ask the user.
    pub request: RerollRequest,
}

impl PendingReroll {
    /// The slot being rerolled.
    pub fn slot(&self) -> (MessageId, SlotKey) {
        (self.message, self.key)
    }
}

/// The first half of an activation.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    /// The activation finished without needing a choice.
    Done(Activation),
    /// The user must choose a reroll policy.
    Choose(PendingReroll),
}

/// Drives slot activations and owns the dice primitive.
#[derive(Debug)]
pub struct SlotResolver<R> {
    roller: R,
    pending: HashSet<(MessageId, SlotKey)>,
}

impl<R: FlatRoller> SlotResolver<R> {
    /// Create a resolver rolling with `roller`.
    pub fn new(roller: R) -> Self {
        Self {
            roller,
            pending: HashSet::new(),
        }
    }

    /// The dice primitive.
    pub fn roller(&self) -> &R {
        &self.roller
    }

    /// Whether a reroll prompt is open for the slot.
    pub fn is_pending(&self, message: MessageId, key: SlotKey) -> bool {
        self.pending.contains(&(message, key))
    }

    /// Forget an open reroll prompt without answering it, e.g. when the
    /// dialog was closed by the host. Returns false if none was open.
    ///
    /// Nothing is persisted; the slot stays rolled.
    pub fn abandon(&mut self, message: MessageId, key: SlotKey) -> bool {
        let removed = self.pending.remove(&(message, key));
        if removed {
            tracing::debug!(%message, slot = %key, "reroll prompt abandoned");
        }
        removed
    }

    /// Roll once against `dc`, attributed to `origin`.
    pub fn execute_roll(&mut self, dc: u32, origin: Option<ActorId>) -> MessageResult<FlatRoll> {
        Ok(self.roller.roll(dc, RollOptions::inline(origin))?)
    }

    /// Handle a click on a slot's control.
    pub fn begin<S: RecordStore>(
        &mut self,
        store: &mut S,
        viewer: Viewer,
        message: MessageId,
        key: SlotKey,
    ) -> MessageResult<Step> {
        if self.is_pending(message, key) {
            return Ok(Step::Done(Activation::Ignored(IgnoreReason::Pending)));
        }
        let record = store
            .record(message)
            .ok_or(MessageError::RecordNotFound(message))?;
        if !viewer.can_modify {
            return Ok(Step::Done(Activation::Ignored(IgnoreReason::NotPermitted)));
        }
        let actor = record.actor;
        let Some(flags) = record.check_flags(store.namespace()) else {
            return Ok(Step::Done(Activation::Ignored(IgnoreReason::MissingSlot)));
        };
        let Some(slot) = flags.slot(key) else {
            let reason = if key == SlotKey::Targets && flags.target_count().is_some() {
                IgnoreReason::Informational
            } else {
                IgnoreReason::MissingSlot
            };
            return Ok(Step::Done(Activation::Ignored(reason)));
        };

        match (slot.phase(), slot.roll) {
            (SlotPhase::Populated, _) => {
                let roll = self.execute_roll(slot.dc, actor)?;
                store.apply(&SlotUpdate {
                    message,
                    key,
                    roll: roll.total,
                    reroll: None,
                    spend_hero_point: None,
                })?;
                tracing::debug!(%message, slot = %key, total = roll.total, "flat check rolled");
                Ok(Step::Done(Activation::Rolled(roll)))
            }
            (SlotPhase::Rolled, Some(old_roll)) => {
                let hero_points = actor
                    .and_then(|id| store.actor(id))
                    .map_or(0, |a| a.hero_point_balance());
                let request = RerollRequest::new(slot.label.clone(), slot.dc, old_roll, hero_points);
                self.pending.insert((message, key));
                Ok(Step::Choose(PendingReroll {
                    message,
                    key,
                    actor,
                    request,
                }))
            }
            _ => Ok(Step::Done(Activation::Ignored(IgnoreReason::Terminal))),
        }
    }

    /// Finish a reroll with the user's answer. `None` cancels.
    ///
    /// A failed roll persists nothing; the slot stays rolled and can be
    /// activated again.
    pub fn complete<S: RecordStore>(
        &mut self,
        store: &mut S,
        pending: PendingReroll,
        choice: Option<KeepPolicy>,
    ) -> MessageResult<Activation> {
        self.pending.remove(&(pending.message, pending.key));
        let Some(keep) = choice else {
            tracing::debug!(message = %pending.message, slot = %pending.key, "reroll cancelled");
            return Ok(Activation::Cancelled);
        };
        if !pending.request.offers(keep) {
            return Err(MessageError::ChoiceNotOffered(keep));
        }

        let roll = self.execute_roll(pending.request.dc, pending.actor)?;
        store.apply(&SlotUpdate {
            message: pending.message,
            key: pending.key,
            roll: roll.total,
            reroll: Some(Reroll {
                old_roll: pending.request.old_roll,
                keep,
            }),
            spend_hero_point: pending.actor.filter(|_| keep == KeepPolicy::Hero),
        })?;
        tracing::debug!(
            message = %pending.message,
            slot = %pending.key,
            old = pending.request.old_roll,
            new = roll.total,
            %keep,
            "flat check rerolled"
        );
        Ok(Activation::Rerolled { roll, keep })
    }

    /// Handle a click, answering any reroll prompt through `prompt`.
    pub fn activate<S: RecordStore, P: RerollPrompt>(
        &mut self,
        store: &mut S,
        prompt: &mut P,
        viewer: Viewer,
        message: MessageId,
        key: SlotKey,
    ) -> MessageResult<Activation> {
        match self.begin(store, viewer, message, key)? {
            Step::Done(activation) => Ok(activation),
            Step::Choose(pending) => {
                let choice = prompt.choose(&pending.request);
                self.complete(store, pending, choice)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{CheckSlotState, FlatCheckFlags, TargetsSlot};
    use crate::prompt::FixedChoice;
    use crate::record::MessageRecord;
    use crate::render::{ButtonState, CellMark, build_control_block};
    use crate::store::MemoryStore;
    use fc_core::{Actor, Scene};
    use fc_mechanics::{FlatOutcome, MechError, ScriptedRoller};

    const NS: &str = "flat-check";

    fn setup(hero_points: i32, flags: FlatCheckFlags) -> (MemoryStore, MessageId, ActorId) {
        let mut scene = Scene::default();
        let actor = Actor::character("Valeros").with_hero_points(hero_points, 3);
        let actor_id = scene.add_actor(actor);
        let mut store = MemoryStore::new(NS, scene);
        let mut record = MessageRecord::new(Some(actor_id));
        record.set_check_flags(NS, &flags).expect("serializes");
        let id = store.insert(record);
        (store, id, actor_id)
    }

    fn grabbed(dc: u32) -> FlatCheckFlags {
        FlatCheckFlags {
            grabbed: Some(CheckSlotState::new("Grabbed", dc)),
            ..Default::default()
        }
    }

    fn flags(store: &MemoryStore, id: MessageId) -> FlatCheckFlags {
        store
            .record(id)
            .and_then(|r| r.check_flags(NS))
            .expect("flags present")
    }

    fn hero_points(store: &MemoryStore, actor: ActorId) -> i32 {
        store.actor(actor).map_or(-1, |a| a.hero_point_balance())
    }

    #[test]
    fn roll_then_reroll_keep_low() {
        let (mut store, id, _) = setup(0, grabbed(5));
        let mut resolver = SlotResolver::new(ScriptedRoller::new([8, 3]));
        let mut prompt = FixedChoice(Some(KeepPolicy::Low));

        let first = resolver
            .activate(&mut store, &mut prompt, Viewer::owner(), id, SlotKey::Grabbed)
            .expect("first activation");
        assert!(matches!(first, Activation::Rolled(r) if r.total == 8));
        let slot = flags(&store, id).grabbed.expect("slot");
        assert_eq!(slot.roll, Some(8));
        assert_eq!(slot.reroll, None);

        let block = build_control_block(&flags(&store, id), Viewer::owner());
        assert_eq!(block.check_rows().next().map(|r| r.button), Some(ButtonState::Reroll));

        let second = resolver
            .activate(&mut store, &mut prompt, Viewer::owner(), id, SlotKey::Grabbed)
            .expect("second activation");
        assert!(matches!(second, Activation::Rerolled { keep: KeepPolicy::Low, .. }));
        let slot = flags(&store, id).grabbed.expect("slot");
        assert_eq!(slot.roll, Some(3));
        assert_eq!(
            slot.reroll,
            Some(Reroll {
                old_roll: 8,
                keep: KeepPolicy::Low
            })
        );

        let block = build_control_block(&flags(&store, id), Viewer::owner());
        let row = block.check_rows().next().expect("row");
        assert_eq!(row.cells[0].value, Some(8));
        assert_eq!(row.cells[0].mark, CellMark::Struck);
        assert_eq!(row.cells[1].value, Some(3));
        assert_eq!(row.cells[1].mark, CellMark::Outcome(FlatOutcome::Failure));
        assert_eq!(row.button, ButtonState::Hidden);
    }

    #[test]
    fn rerolled_slot_is_terminal() {
        let (mut store, id, _) = setup(0, grabbed(5));
        let mut resolver = SlotResolver::new(ScriptedRoller::new([8, 3, 20]));
        let mut prompt = FixedChoice(Some(KeepPolicy::New));
        for _ in 0..2 {
            resolver
                .activate(&mut store, &mut prompt, Viewer::owner(), id, SlotKey::Grabbed)
                .expect("activation");
        }
        let third = resolver
            .activate(&mut store, &mut prompt, Viewer::owner(), id, SlotKey::Grabbed)
            .expect("third activation");
        assert_eq!(third, Activation::Ignored(IgnoreReason::Terminal));
        assert_eq!(resolver.roller().remaining(), 1);
    }

    #[test]
    fn hero_choice_spends_a_point() {
        let (mut store, id, actor) = setup(2, grabbed(5));
        let mut resolver = SlotResolver::new(ScriptedRoller::new([2, 17]));
        let mut prompt = FixedChoice(Some(KeepPolicy::Hero));
        for _ in 0..2 {
            resolver
                .activate(&mut store, &mut prompt, Viewer::owner(), id, SlotKey::Grabbed)
                .expect("activation");
        }
        assert_eq!(hero_points(&store, actor), 1);
    }

    #[test]
    fn hero_not_offered_without_points() {
        let (mut store, id, actor) = setup(0, grabbed(5));
        let mut resolver = SlotResolver::new(ScriptedRoller::new([2, 17]));
        resolver
            .activate(&mut store, &mut FixedChoice(None), Viewer::owner(), id, SlotKey::Grabbed)
            .expect("first roll");
        let Step::Choose(pending) = resolver
            .begin(&mut store, Viewer::owner(), id, SlotKey::Grabbed)
            .expect("begin")
        else {
            panic!("expected a prompt");
        };
        assert_eq!(pending.request.default, KeepPolicy::New);
        let err = resolver.complete(&mut store, pending, Some(KeepPolicy::Hero));
        assert!(matches!(err, Err(MessageError::ChoiceNotOffered(KeepPolicy::Hero))));
        assert_eq!(hero_points(&store, actor), 0);
        assert_eq!(flags(&store, id).grabbed.and_then(|s| s.reroll), None);
        assert!(!resolver.is_pending(id, SlotKey::Grabbed));
    }

    #[test]
    fn cancel_changes_nothing() {
        let (mut store, id, actor) = setup(1, grabbed(5));
        let mut resolver = SlotResolver::new(ScriptedRoller::new([12, 1]));
        resolver
            .activate(&mut store, &mut FixedChoice(None), Viewer::owner(), id, SlotKey::Grabbed)
            .expect("first roll");
        let before = flags(&store, id);
        let cancelled = resolver
            .activate(&mut store, &mut FixedChoice(None), Viewer::owner(), id, SlotKey::Grabbed)
            .expect("cancel");
        assert_eq!(cancelled, Activation::Cancelled);
        assert_eq!(flags(&store, id), before);
        assert_eq!(hero_points(&store, actor), 1);
        assert_eq!(resolver.roller().remaining(), 1);
    }

    #[test]
    fn pending_reroll_makes_slot_inert() {
        let (mut store, id, _) = setup(0, grabbed(5));
        let mut resolver = SlotResolver::new(ScriptedRoller::new([12, 4]));
        resolver
            .begin(&mut store, Viewer::owner(), id, SlotKey::Grabbed)
            .expect("first roll");
        let Step::Choose(pending) = resolver
            .begin(&mut store, Viewer::owner(), id, SlotKey::Grabbed)
            .expect("begin reroll")
        else {
            panic!("expected a prompt");
        };
        let again = resolver
            .begin(&mut store, Viewer::owner(), id, SlotKey::Grabbed)
            .expect("second click");
        assert_eq!(again, Step::Done(Activation::Ignored(IgnoreReason::Pending)));

        let done = resolver
            .complete(&mut store, pending, Some(KeepPolicy::High))
            .expect("complete");
        assert!(matches!(done, Activation::Rerolled { keep: KeepPolicy::High, .. }));
        assert!(!resolver.is_pending(id, SlotKey::Grabbed));
    }

    #[test]
    fn abandoned_prompt_frees_the_slot() {
        let (mut store, id, _) = setup(0, grabbed(5));
        let mut resolver = SlotResolver::new(ScriptedRoller::new([12, 4]));
        resolver
            .begin(&mut store, Viewer::owner(), id, SlotKey::Grabbed)
            .expect("first roll");
        let step = resolver
            .begin(&mut store, Viewer::owner(), id, SlotKey::Grabbed)
            .expect("begin reroll");
        assert!(matches!(step, Step::Choose(_)));

        assert!(resolver.abandon(id, SlotKey::Grabbed));
        assert!(!resolver.abandon(id, SlotKey::Grabbed));
        assert_eq!(flags(&store, id).grabbed.and_then(|s| s.reroll), None);

        let again = resolver
            .begin(&mut store, Viewer::owner(), id, SlotKey::Grabbed)
            .expect("prompt again");
        assert!(matches!(again, Step::Choose(_)));
    }

    #[test]
    fn failed_roll_persists_nothing() {
        let (mut store, id, actor) = setup(1, grabbed(5));
        let mut resolver = SlotResolver::new(ScriptedRoller::new([6]));
        resolver
            .activate(&mut store, &mut FixedChoice(None), Viewer::owner(), id, SlotKey::Grabbed)
            .expect("first roll");
        let err = resolver.activate(
            &mut store,
            &mut FixedChoice(Some(KeepPolicy::Hero)),
            Viewer::owner(),
            id,
            SlotKey::Grabbed,
        );
        assert!(matches!(err, Err(MessageError::Roll(MechError::RollsExhausted))));
        let slot = flags(&store, id).grabbed.expect("slot");
        assert_eq!(slot.roll, Some(6));
        assert_eq!(slot.reroll, None);
        assert_eq!(hero_points(&store, actor), 1);
        assert!(!resolver.is_pending(id, SlotKey::Grabbed));
    }

    #[test]
    fn observers_cannot_roll() {
        let (mut store, id, _) = setup(0, grabbed(5));
        let mut resolver = SlotResolver::new(ScriptedRoller::new([6]));
        let result = resolver
            .activate(&mut store, &mut FixedChoice(None), Viewer::observer(), id, SlotKey::Grabbed)
            .expect("activation");
        assert_eq!(result, Activation::Ignored(IgnoreReason::NotPermitted));
        assert_eq!(flags(&store, id).grabbed.and_then(|s| s.roll), None);
    }

    #[test]
    fn target_count_is_informational() {
        let (mut store, id, _) = setup(
            0,
            FlatCheckFlags {
                targets: Some(TargetsSlot::Count { count: 3 }),
                ..Default::default()
            },
        );
        let mut resolver = SlotResolver::new(ScriptedRoller::new([6]));
        let result = resolver
            .activate(&mut store, &mut FixedChoice(None), Viewer::owner(), id, SlotKey::Targets)
            .expect("activation");
        assert_eq!(result, Activation::Ignored(IgnoreReason::Informational));
        let missing = resolver
            .activate(&mut store, &mut FixedChoice(None), Viewer::owner(), id, SlotKey::Deafened)
            .expect("activation");
        assert_eq!(missing, Activation::Ignored(IgnoreReason::MissingSlot));
    }

    #[test]
    fn roll_is_attributed_to_the_speaker() {
        let (mut store, id, actor) = setup(0, grabbed(5));
        let mut resolver = SlotResolver::new(ScriptedRoller::new([6]));
        resolver
            .activate(&mut store, &mut FixedChoice(None), Viewer::owner(), id, SlotKey::Grabbed)
            .expect("roll");
        let (dc, options) = resolver.roller().history[0];
        assert_eq!(dc, 5);
        assert_eq!(options, RollOptions::inline(Some(actor)));
    }

    #[test]
    fn unknown_message_is_an_error() {
        let (mut store, _, _) = setup(0, grabbed(5));
        let mut resolver = SlotResolver::new(ScriptedRoller::new([6]));
        let err = resolver.begin(&mut store, Viewer::owner(), MessageId::new(), SlotKey::Grabbed);
        assert!(matches!(err, Err(MessageError::RecordNotFound(_))));
    }
}
