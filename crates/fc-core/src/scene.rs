//! The scene: actors, the tokens that represent them, and the viewing
//! user's live targeting state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::error::{CoreError, CoreResult};
use crate::id::{ActorId, TokenId};

/// Pixel bounds of a token on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Bounds {
    /// Bounds of a square token of `squares` grid units at the origin.
    pub fn square(grid_size: f64, squares: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: grid_size * squares,
            height: grid_size * squares,
        }
    }
}

/// A token placed on the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Unique identifier.
    #[serde(default)]
    pub id: TokenId,
    /// Display name.
    pub name: String,
    /// The actor this token represents, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<ActorId>,
    /// Pixel bounds.
    pub bounds: Bounds,
}

impl Token {
    /// Create a one-square token for an actor.
    pub fn for_actor(actor: &Actor, grid_size: f64) -> Self {
        Self {
            id: TokenId::new(),
            name: actor.name.clone(),
            actor: Some(actor.id),
            bounds: Bounds::square(grid_size, 1.0),
        }
    }

    /// Override the token's bounds (builder style).
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }
}

/// The tokens the viewing user currently targets and controls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserContext {
    /// Targeted tokens, in targeting order, without duplicates.
    #[serde(default)]
    pub targets: Vec<TokenId>,
    /// Tokens the user currently controls (selection).
    #[serde(default)]
    pub controlled: Vec<TokenId>,
    /// The user's assigned character, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<ActorId>,
}

impl UserContext {
    /// Add a token to the target set. Returns false if it was already targeted.
    pub fn target(&mut self, token: TokenId) -> bool {
        if self.targets.contains(&token) {
            return false;
        }
        self.targets.push(token);
        true
    }

    /// Remove a token from the target set. Returns false if it was not targeted.
    pub fn untarget(&mut self, token: TokenId) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| *t != token);
        self.targets.len() != before
    }

    /// Replace the controlled set with a single token.
    pub fn control(&mut self, token: TokenId) {
        self.controlled = vec![token];
    }
}

/// A scene: the grid, the actors, and the tokens placed on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Size of one grid square in pixels.
    pub grid_size: f64,
    actors: HashMap<ActorId, Actor>,
    tokens: HashMap<TokenId, Token>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Scene {
    /// Create an empty scene with the given grid size.
    pub fn new(grid_size: f64) -> Self {
        Self {
            grid_size,
            actors: HashMap::new(),
            tokens: HashMap::new(),
        }
    }

    /// Add an actor. Returns its ID.
    pub fn add_actor(&mut self, actor: Actor) -> ActorId {
        let id = actor.id;
        self.actors.insert(id, actor);
        id
    }

    /// Place a token. Fails if it refers to an actor the scene does not know.
    pub fn place_token(&mut self, token: Token) -> CoreResult<TokenId> {
        if let Some(actor) = token.actor {
            if !self.actors.contains_key(&actor) {
                return Err(CoreError::DanglingActor {
                    token: token.id,
                    actor,
                });
            }
        }
        let id = token.id;
        self.tokens.insert(id, token);
        Ok(id)
    }

    /// Add an actor and place a one-square token for it. Returns the token ID.
    pub fn spawn(&mut self, actor: Actor) -> TokenId {
        let token = Token::for_actor(&actor, self.grid_size);
        let id = token.id;
        self.add_actor(actor);
        self.tokens.insert(id, token);
        id
    }

    /// Look up an actor.
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Look up an actor mutably.
    pub fn actor_mut(&mut self, id: ActorId) -> CoreResult<&mut Actor> {
        self.actors.get_mut(&id).ok_or(CoreError::ActorNotFound(id))
    }

    /// Look up a token.
    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(&id)
    }

    /// Move a token to a new position.
    pub fn move_token(&mut self, id: TokenId, x: f64, y: f64) -> CoreResult<()> {
        let token = self.tokens.get_mut(&id).ok_or(CoreError::TokenNotFound(id))?;
        token.bounds.x = x;
        token.bounds.y = y;
        Ok(())
    }

    /// The actor a token represents.
    pub fn actor_of(&self, token: &Token) -> Option<&Actor> {
        token.actor.and_then(|id| self.actors.get(&id))
    }

    /// The first token representing the given actor.
    pub fn token_of(&self, actor: ActorId) -> Option<&Token> {
        self.tokens.values().find(|t| t.actor == Some(actor))
    }

    /// Best guess at who is acting: the first controlled token's actor,
    /// falling back to the user's assigned character.
    pub fn guess_origin(&self, user: &UserContext) -> Option<&Actor> {
        user.controlled
            .iter()
            .filter_map(|id| self.token(*id))
            .find_map(|t| self.actor_of(t))
            .or_else(|| user.character.and_then(|id| self.actor(id)))
    }

    /// Number of actors in the scene.
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Number of tokens in the scene.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;

    #[test]
    fn spawn_links_token_and_actor() {
        let mut scene = Scene::new(100.0);
        let actor = Actor::character("Amiri");
        let actor_id = actor.id;
        let token_id = scene.spawn(actor);
        let token = scene.token(token_id).expect("token placed");
        assert_eq!(token.actor, Some(actor_id));
        assert_eq!(scene.actor_of(token).map(|a| a.id), Some(actor_id));
        assert_eq!(scene.token_of(actor_id).map(|t| t.id), Some(token_id));
    }

    #[test]
    fn place_token_rejects_unknown_actor() {
        let mut scene = Scene::default();
        let stranger = Actor::npc("Stranger");
        let token = Token::for_actor(&stranger, 100.0);
        assert!(matches!(
            scene.place_token(token),
            Err(CoreError::DanglingActor { .. })
        ));
    }

    #[test]
    fn target_set_has_no_duplicates() {
        let mut user = UserContext::default();
        let t = TokenId::new();
        assert!(user.target(t));
        assert!(!user.target(t));
        assert_eq!(user.targets.len(), 1);
        assert!(user.untarget(t));
        assert!(!user.untarget(t));
    }

    #[test]
    fn guess_origin_prefers_controlled_token() {
        let mut scene = Scene::default();
        let pc = Actor::character("Seelah");
        let pc_id = pc.id;
        scene.spawn(pc);
        let npc_token = scene.spawn(Actor::npc("Bandit").with_condition(Condition::new("blinded")));

        let mut user = UserContext {
            character: Some(pc_id),
            ..Default::default()
        };
        assert_eq!(scene.guess_origin(&user).map(|a| a.name.as_str()), Some("Seelah"));

        user.control(npc_token);
        assert_eq!(scene.guess_origin(&user).map(|a| a.name.as_str()), Some("Bandit"));
    }

    #[test]
    fn guess_origin_none_without_context() {
        let scene = Scene::default();
        assert!(scene.guess_origin(&UserContext::default()).is_none());
    }

    #[test]
    fn move_token_updates_bounds() {
        let mut scene = Scene::default();
        let t = scene.spawn(Actor::npc("Wolf"));
        scene.move_token(t, 300.0, 200.0).expect("token exists");
        let b = scene.token(t).expect("token exists").bounds;
        assert_eq!((b.x, b.y), (300.0, 200.0));
        assert!(scene.move_token(TokenId::new(), 0.0, 0.0).is_err());
    }
}
