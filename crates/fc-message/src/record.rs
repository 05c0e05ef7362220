//! The chat message an action produced, as far as flat checks care.

use fc_core::{ActorId, MessageId};
use serde_json::{Map, Value};

use crate::flags::{FLAGS_KEY, FlatCheckFlags};

/// The roll context type a message was created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextType {
    /// A flat check roll itself.
    FlatCheck,
    /// Damage applied to a token.
    DamageTaken,
    /// Healing applied to a token.
    HealingReceived,
    /// A spell being cast.
    SpellCast,
    /// An attack roll.
    AttackRoll,
    /// A skill check.
    SkillCheck,
    /// A saving throw.
    SavingThrow,
    /// Anything else.
    Other(String),
}

impl ContextType {
    /// Parse a context type from its host name.
    pub fn parse(s: &str) -> Self {
        match s {
            "flat-check" => Self::FlatCheck,
            "damage-taken" => Self::DamageTaken,
            "healing-received" => Self::HealingReceived,
            "spell-cast" => Self::SpellCast,
            "attack-roll" => Self::AttackRoll,
            "skill-check" => Self::SkillCheck,
            "saving-throw" => Self::SavingThrow,
            other => Self::Other(other.to_string()),
        }
    }
}

/// The kind of item a message was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// An action or activity.
    Action,
    /// A consumable item.
    Consumable,
    /// Worn or held equipment.
    Equipment,
    /// A feat.
    Feat,
    /// A creature's natural attack.
    Melee,
    /// A weapon.
    Weapon,
    /// A spell.
    Spell,
    /// Any other item type.
    Other,
}

impl ItemKind {
    /// Parse an item kind from its host name. Unknown names are [`ItemKind::Other`].
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "action" => Self::Action,
            "consumable" => Self::Consumable,
            "equipment" => Self::Equipment,
            "feat" => Self::Feat,
            "melee" => Self::Melee,
            "weapon" => Self::Weapon,
            "spell" => Self::Spell,
            _ => Self::Other,
        }
    }
}

/// The item behind a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInfo {
    /// Item kind.
    pub kind: ItemKind,
    /// Trait slugs, e.g. `manipulate`, `auditory`, `subtle`.
    pub traits: Vec<String>,
    /// For spells: whether casting it makes an attack roll.
    pub is_attack: bool,
}

impl ItemInfo {
    /// Create an item with the given kind and traits.
    pub fn new(kind: ItemKind, traits: &[&str]) -> Self {
        Self {
            kind,
            traits: traits.iter().map(|t| t.to_string()).collect(),
            is_attack: false,
        }
    }

    /// Returns true if the item has the given trait.
    pub fn has_trait(&self, slug: &str) -> bool {
        self.traits.iter().any(|t| t == slug)
    }
}

/// Who is looking at a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    /// Whether this viewer may update the message.
    pub can_modify: bool,
}

impl Viewer {
    /// A viewer allowed to update the message.
    pub fn owner() -> Self {
        Self { can_modify: true }
    }

    /// A viewer who may only look.
    pub fn observer() -> Self {
        Self { can_modify: false }
    }
}

/// A chat message: the event record flat check slots are attached to.
#[derive(Debug, Clone)]
pub struct MessageRecord {
    /// Unique identifier.
    pub id: MessageId,
    /// The speaking actor.
    pub actor: Option<ActorId>,
    /// The item used, if any.
    pub item: Option<ItemInfo>,
    /// Roll context type.
    pub context: Option<ContextType>,
    /// Whether the roll context carries a DC.
    pub context_has_dc: bool,
    /// Whether the message is a dice roll.
    pub is_roll: bool,
    /// Whether the message originates from a spell.
    pub origin_is_spell: bool,
    /// Whether the viewer may see the content (blind rolls hide it).
    pub content_visible: bool,
    flags: Map<String, Value>,
}

impl MessageRecord {
    /// A visible, non-roll message spoken by `actor`.
    pub fn new(actor: Option<ActorId>) -> Self {
        Self {
            id: MessageId::new(),
            actor,
            item: None,
            context: None,
            context_has_dc: false,
            is_roll: false,
            origin_is_spell: false,
            content_visible: true,
            flags: Map::new(),
        }
    }

    /// Attach an item (builder style).
    pub fn with_item(mut self, item: ItemInfo) -> Self {
        self.origin_is_spell = item.kind == ItemKind::Spell;
        self.item = Some(item);
        self
    }

    /// Set the roll context (builder style).
    pub fn with_context(mut self, context: ContextType, has_dc: bool) -> Self {
        self.context = Some(context);
        self.context_has_dc = has_dc;
        self
    }

    /// Mark the message as a dice roll (builder style).
    pub fn as_roll(mut self) -> Self {
        self.is_roll = true;
        self
    }

    /// Raw flag value stored under `namespace`, if any.
    pub fn flag(&self, namespace: &str) -> Option<&Value> {
        self.flags.get(namespace)
    }

    /// Flat check flags stored under `namespace`. Missing or malformed
    /// flags read as `None`.
    pub fn check_flags(&self, namespace: &str) -> Option<FlatCheckFlags> {
        self.flag(namespace)
            .and_then(|ns| ns.get(FLAGS_KEY))
            .and_then(FlatCheckFlags::from_value)
    }

    /// Store flat check flags under `namespace`, replacing what was there.
    pub fn set_check_flags(&mut self, namespace: &str, flags: &FlatCheckFlags) -> serde_json::Result<()> {
        let value = serde_json::to_value(flags)?;
        let ns = self
            .flags
            .entry(namespace.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !ns.is_object() {
            *ns = Value::Object(Map::new());
        }
        if let Value::Object(map) = ns {
            map.insert(FLAGS_KEY.to_string(), value);
        }
        Ok(())
    }

    /// Overwrite a raw flag value (for hosts importing stored data).
    pub fn set_flag(&mut self, namespace: &str, value: Value) {
        self.flags.insert(namespace.to_string(), value);
    }
}
