//! The registry of live target markers.
//!
//! The cache is the only thing that creates or destroys markers. An entry
//! exists exactly while its token is targeted; removing it detaches the
//! marker from the sink, so a token is never detached twice.

use std::collections::HashMap;

use fc_core::{CheckDescriptor, Scene, Token, TokenId, UserContext};
use fc_mechanics::{VisibilityProvider, requirement_from};

use crate::overlay::MarkerOverlay;
use crate::sink::MarkerSink;

/// The state markers are drawn from.
#[derive(Clone, Copy)]
pub struct MarkerContext<'a> {
    /// The current scene.
    pub scene: &'a Scene,
    /// The viewing user.
    pub user: &'a UserContext,
    /// Installed visibility provider, if any.
    pub provider: Option<&'a dyn VisibilityProvider>,
}

impl<'a> MarkerContext<'a> {
    /// A context without a visibility provider.
    pub fn new(scene: &'a Scene, user: &'a UserContext) -> Self {
        Self {
            scene,
            user,
            provider: None,
        }
    }

    /// Use a visibility provider (builder style).
    pub fn with_provider(mut self, provider: &'a dyn VisibilityProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// The check the guessed origin needs against `target`.
    pub fn requirement(&self, target: &Token) -> Option<CheckDescriptor> {
        let origin = self.scene.guess_origin(self.user);
        requirement_from(self.scene, origin, target, self.provider)
    }
}

#[derive(Debug)]
struct MarkerEntry {
    overlay: MarkerOverlay,
}

/// One marker per targeted token.
#[derive(Debug)]
pub struct TargetCache<S> {
    sink: S,
    entries: HashMap<TokenId, MarkerEntry>,
}

impl<S: MarkerSink> TargetCache<S> {
    /// Create an empty cache drawing on `sink`.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            entries: HashMap::new(),
        }
    }

    /// The drawing surface.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Number of live markers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no marker is live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a token has a live marker.
    pub fn contains(&self, token: TokenId) -> bool {
        self.entries.contains_key(&token)
    }

    /// What a token's marker currently shows.
    pub fn overlay(&self, token: TokenId) -> Option<&MarkerOverlay> {
        self.entries.get(&token).map(|e| &e.overlay)
    }

    /// Create the token's marker if needed, then draw it.
    pub fn target(&mut self, ctx: &MarkerContext<'_>, token: TokenId) {
        if !self.entries.contains_key(&token) {
            self.sink.attach(token);
            self.entries.insert(
                token,
                MarkerEntry {
                    overlay: MarkerOverlay::cleared(),
                },
            );
            tracing::debug!(%token, "target marker created");
        }
        self.draw(ctx, token);
    }

    /// Destroy the token's marker. Returns false if there was none.
    pub fn untarget(&mut self, token: TokenId) -> bool {
        if self.entries.remove(&token).is_none() {
            return false;
        }
        self.sink.detach(token);
        tracing::debug!(%token, "target marker destroyed");
        true
    }

    /// Redraw the token's marker if it has one. Returns true if redrawn.
    pub fn refresh_token(&mut self, ctx: &MarkerContext<'_>, token: TokenId) -> bool {
        if !self.entries.contains_key(&token) {
            return false;
        }
        self.draw(ctx, token);
        true
    }

    /// Destroy every marker.
    pub fn destroy_all(&mut self) {
        for (token, _) in self.entries.drain() {
            self.sink.detach(token);
        }
    }

    /// Target every token the user currently targets.
    pub fn refresh_targets(&mut self, ctx: &MarkerContext<'_>) {
        for token in &ctx.user.targets {
            self.target(ctx, *token);
        }
    }

    fn draw(&mut self, ctx: &MarkerContext<'_>, token: TokenId) {
        let overlay = match ctx.scene.token(token) {
            Some(t) => {
                let requirement = ctx.requirement(t);
                MarkerOverlay::for_requirement(requirement.as_ref(), &t.bounds, ctx.scene.grid_size)
            }
            None => {
                tracing::debug!(%token, "targeted token is not on the scene");
                MarkerOverlay::cleared()
            }
        };
        self.sink.present(token, &overlay);
        if let Some(entry) = self.entries.get_mut(&token) {
            entry.overlay = overlay;
        }
    }
}
