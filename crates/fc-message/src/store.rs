//! Persistence boundary for message flat check state.
//!
//! Each resolution step is written through a single [`RecordStore::apply`]
//! call carrying the roll, the reroll record, and the hero point spend
//! together, so no partial result is ever visible.

use std::collections::HashMap;

use fc_core::{Actor, ActorId, MessageId, Scene};

use crate::error::{MessageError, MessageResult};
use crate::flags::{Reroll, SlotKey, SlotPhase};
use crate::record::MessageRecord;

/// All field updates produced by one resolution step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotUpdate {
    /// The message being updated.
    pub message: MessageId,
    /// The slot being updated.
    pub key: SlotKey,
    /// The new roll total.
    pub roll: u32,
    /// Set on the second resolution.
    pub reroll: Option<Reroll>,
    /// Actor to charge one hero point to.
    pub spend_hero_point: Option<ActorId>,
}

/// Where messages and actors live.
pub trait RecordStore {
    /// Namespace flat check flags are stored under.
    fn namespace(&self) -> &str;

    /// Look up a message.
    fn record(&self, id: MessageId) -> Option<&MessageRecord>;

    /// Look up an actor.
    fn actor(&self, id: ActorId) -> Option<&Actor>;

    /// Apply every part of `update`, or none of it.
    fn apply(&mut self, update: &SlotUpdate) -> MessageResult<()>;
}

/// An in-memory store backed by a [`Scene`].
#[derive(Debug, Clone)]
pub struct MemoryStore {
    namespace: String,
    scene: Scene,
    records: HashMap<MessageId, MessageRecord>,
}

impl MemoryStore {
    /// Create a store over a scene.
    pub fn new(namespace: impl Into<String>, scene: Scene) -> Self {
        Self {
            namespace: namespace.into(),
            scene,
            records: HashMap::new(),
        }
    }

    /// Insert a message. Returns its ID.
    pub fn insert(&mut self, record: MessageRecord) -> MessageId {
        let id = record.id;
        self.records.insert(id, record);
        id
    }

    /// The scene backing this store.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access to the scene.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }
}

impl RecordStore for MemoryStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn record(&self, id: MessageId) -> Option<&MessageRecord> {
        self.records.get(&id)
    }

    fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.scene.actor(id)
    }

    fn apply(&mut self, update: &SlotUpdate) -> MessageResult<()> {
        let record = self
            .records
            .get(&update.message)
            .ok_or(MessageError::RecordNotFound(update.message))?;
        let mut flags = record
            .check_flags(&self.namespace)
            .ok_or(MessageError::SlotNotFound(update.key))?;
        let slot = flags
            .slot_mut(update.key)
            .ok_or(MessageError::SlotNotFound(update.key))?;

        // The update must extend the state it was built from.
        let expected = match update.reroll {
            None => slot.phase() == SlotPhase::Populated,
            Some(r) => slot.phase() == SlotPhase::Rolled && slot.roll == Some(r.old_roll),
        };
        if !expected {
            return Err(MessageError::StaleUpdate(update.key));
        }
        if let Some(actor) = update.spend_hero_point {
            if self.scene.actor(actor).is_none() {
                return Err(MessageError::ActorNotFound(actor));
            }
        }

        slot.roll = Some(update.roll);
        slot.reroll = update.reroll;
        let namespace = self.namespace.clone();
        let record = self
            .records
            .get_mut(&update.message)
            .ok_or(MessageError::RecordNotFound(update.message))?;
        record.set_check_flags(&namespace, &flags)?;

        if let Some(actor) = update.spend_hero_point {
            let actor = self
                .scene
                .actor_mut(actor)
                .map_err(|_| MessageError::ActorNotFound(actor))?;
            if let Some(points) = actor.hero_points.as_mut() {
                points.spend();
            }
        }
        tracing::debug!(message = %update.message, slot = %update.key, roll = update.roll, "applied flat check update");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{CheckSlotState, FlatCheckFlags, KeepPolicy};

    fn store_with_slot() -> (MemoryStore, MessageId, ActorId) {
        let mut scene = Scene::default();
        let actor = Actor::character("Kyra").with_hero_points(1, 3);
        let actor_id = actor.id;
        scene.add_actor(actor);
        let mut store = MemoryStore::new("flat-check", scene);
        let mut record = MessageRecord::new(Some(actor_id));
        let flags = FlatCheckFlags {
            grabbed: Some(CheckSlotState::new("Grabbed", 5)),
            ..Default::default()
        };
        record.set_check_flags("flat-check", &flags).expect("serializes");
        let id = store.insert(record);
        (store, id, actor_id)
    }

    fn slot(store: &MemoryStore, id: MessageId) -> CheckSlotState {
        store
            .record(id)
            .and_then(|r| r.check_flags("flat-check"))
            .and_then(|f| f.grabbed)
            .expect("slot present")
    }

    #[test]
    fn first_roll_then_reroll() {
        let (mut store, id, actor) = store_with_slot();
        store
            .apply(&SlotUpdate {
                message: id,
                key: SlotKey::Grabbed,
                roll: 8,
                reroll: None,
                spend_hero_point: None,
            })
            .expect("first roll");
        assert_eq!(slot(&store, id).roll, Some(8));

        let reroll = Reroll {
            old_roll: 8,
            keep: KeepPolicy::Hero,
        };
        store
            .apply(&SlotUpdate {
                message: id,
                key: SlotKey::Grabbed,
                roll: 3,
                reroll: Some(reroll),
                spend_hero_point: Some(actor),
            })
            .expect("reroll");
        let s = slot(&store, id);
        assert_eq!(s.roll, Some(3));
        assert_eq!(s.reroll, Some(reroll));
        assert_eq!(store.actor(actor).map(|a| a.hero_point_balance()), Some(0));
    }

    #[test]
    fn stale_update_changes_nothing() {
        let (mut store, id, actor) = store_with_slot();
        let err = store.apply(&SlotUpdate {
            message: id,
            key: SlotKey::Grabbed,
            roll: 3,
            reroll: Some(Reroll {
                old_roll: 8,
                keep: KeepPolicy::Hero,
            }),
            spend_hero_point: Some(actor),
        });
        assert!(matches!(err, Err(MessageError::StaleUpdate(SlotKey::Grabbed))));
        assert_eq!(slot(&store, id).roll, None);
        assert_eq!(store.actor(actor).map(|a| a.hero_point_balance()), Some(1));
    }

    #[test]
    fn unknown_actor_changes_nothing() {
        let (mut store, id, _) = store_with_slot();
        let err = store.apply(&SlotUpdate {
            message: id,
            key: SlotKey::Grabbed,
            roll: 3,
            reroll: None,
            spend_hero_point: Some(ActorId::new()),
        });
        assert!(matches!(err, Err(MessageError::ActorNotFound(_))));
        assert_eq!(slot(&store, id).roll, None);
    }

    #[test]
    fn missing_slot_is_an_error() {
        let (mut store, id, _) = store_with_slot();
        let err = store.apply(&SlotUpdate {
            message: id,
            key: SlotKey::Deafened,
            roll: 3,
            reroll: None,
            spend_hero_point: None,
        });
        assert!(matches!(err, Err(MessageError::SlotNotFound(SlotKey::Deafened))));
    }
}
