use std::fmt;

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::id::ActorId;
use crate::hero::HeroPoints;

/// The kind of an actor. Only characters carry hero points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// A player character.
    #[default]
    Character,
    /// A non-player creature.
    Npc,
    /// A hazard or other non-creature actor.
    Hazard,
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character => write!(f, "character"),
            Self::Npc => write!(f, "npc"),
            Self::Hazard => write!(f, "hazard"),
        }
    }
}

/// An actor: the sheet behind a token, holding its conditions and resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Unique identifier.
    #[serde(default)]
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Actor kind.
    #[serde(default)]
    pub kind: ActorKind,
    /// Currently active conditions.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Hero point pool, present on characters only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_points: Option<HeroPoints>,
}

impl Actor {
    /// Create a character with no conditions holding one of three hero points.
    pub fn character(name: impl Into<String>) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            kind: ActorKind::Character,
            conditions: Vec::new(),
            hero_points: Some(HeroPoints::default()),
        }
    }

    /// Create a non-player creature with no conditions.
    pub fn npc(name: impl Into<String>) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            kind: ActorKind::Npc,
            conditions: Vec::new(),
            hero_points: None,
        }
    }

    /// Add a condition (builder style).
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Set the hero point balance (builder style). Ignored on non-characters.
    pub fn with_hero_points(mut self, current: i32, max: i32) -> Self {
        if self.is_character() {
            self.hero_points = Some(HeroPoints::new(current, max));
        }
        self
    }

    /// Returns true if this actor is a player character.
    pub fn is_character(&self) -> bool {
        self.kind == ActorKind::Character
    }

    /// Returns true if a condition with the given slug is active.
    pub fn has_condition(&self, slug: &str) -> bool {
        self.conditions.iter().any(|c| c.is(slug))
    }

    /// The value of a valued condition, or `None` if it is not active.
    pub fn condition_value(&self, slug: &str) -> Option<u32> {
        self.conditions
            .iter()
            .filter(|c| c.is(slug))
            .filter_map(|c| c.value)
            .max()
    }

    /// Current hero point balance (0 for actors without a pool).
    pub fn hero_point_balance(&self) -> i32 {
        self.hero_points
            .as_ref()
            .filter(|_| self.is_character())
            .map_or(0, |p| p.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_has_hero_points() {
        let a = Actor::character("Valeros");
        assert!(a.is_character());
        assert_eq!(a.hero_point_balance(), 1);
    }

    #[test]
    fn npc_has_no_hero_points() {
        let a = Actor::npc("Goblin").with_hero_points(3, 3);
        assert_eq!(a.hero_points, None);
        assert_eq!(a.hero_point_balance(), 0);
    }

    #[test]
    fn condition_lookup() {
        let a = Actor::character("Ezren")
            .with_condition(Condition::new("grabbed"))
            .with_condition(Condition::valued("stupefied", 2));
        assert!(a.has_condition("grabbed"));
        assert!(!a.has_condition("deafened"));
        assert_eq!(a.condition_value("stupefied"), Some(2));
        assert_eq!(a.condition_value("grabbed"), None);
    }

    #[test]
    fn deserializes_with_defaults() {
        let a: Actor = serde_json::from_str(r#"{"name": "Kyra"}"#).expect("valid json");
        assert_eq!(a.kind, ActorKind::Character);
        assert!(a.conditions.is_empty());
    }
}
