//! Canvas events driving the target markers.

use std::time::{Duration, Instant};

use fc_core::{FlatCheckConfig, TokenId};

use crate::cache::{MarkerContext, TargetCache};
use crate::debounce::Debouncer;
use crate::sink::MarkerSink;

/// Something that happened on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasEvent {
    /// The user targeted a token.
    Targeted(TokenId),
    /// The user dropped a target.
    Untargeted(TokenId),
    /// The user's controlled tokens changed.
    ControlChanged,
    /// A token was redrawn.
    TokenRefreshed {
        /// The token.
        token: TokenId,
        /// Its position changed.
        position: bool,
        /// Its visibility changed.
        visibility: bool,
    },
    /// The canvas is being torn down.
    TearDown,
    /// Scene lighting was recomputed.
    LightingRefreshed,
}

/// Target markers wired to canvas events.
#[derive(Debug)]
pub struct TargetMarkers<S> {
    cache: TargetCache<S>,
    refresh: Debouncer<TokenId>,
}

impl<S: MarkerSink> TargetMarkers<S> {
    /// Create markers drawing on `sink`, debouncing with the configured delay.
    pub fn new(sink: S, config: &FlatCheckConfig) -> Self {
        Self {
            cache: TargetCache::new(sink),
            refresh: Debouncer::new(Duration::from_millis(config.refresh_delay_ms)),
        }
    }

    /// The marker registry.
    pub fn cache(&self) -> &TargetCache<S> {
        &self.cache
    }

    /// Whether a token redraw is waiting for its quiet period.
    pub fn is_refresh_pending(&self, token: TokenId) -> bool {
        self.refresh.is_scheduled(&token)
    }

    /// When [`TargetMarkers::tick`] next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.refresh.next_deadline()
    }

    /// React to a canvas event received at `now`.
    pub fn handle(&mut self, event: CanvasEvent, now: Instant, ctx: &MarkerContext<'_>) {
        match event {
            CanvasEvent::Targeted(token) => self.cache.target(ctx, token),
            CanvasEvent::Untargeted(token) => {
                self.refresh.cancel(&token);
                self.cache.untarget(token);
            }
            CanvasEvent::ControlChanged | CanvasEvent::LightingRefreshed => {
                self.cache.refresh_targets(ctx);
            }
            CanvasEvent::TokenRefreshed {
                token,
                position,
                visibility,
            } => {
                if position && visibility {
                    self.refresh.schedule(token, now);
                }
            }
            CanvasEvent::TearDown => {
                self.refresh.clear();
                self.cache.destroy_all();
            }
        }
    }

    /// Run the token redraws whose quiet period has elapsed. Returns how
    /// many markers were redrawn.
    pub fn tick(&mut self, now: Instant, ctx: &MarkerContext<'_>) -> usize {
        self.refresh
            .due(now)
            .into_iter()
            .filter(|token| self.cache.refresh_token(ctx, *token))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;
    use fc_core::{Actor, Condition, Scene, UserContext};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn moved(token: TokenId) -> CanvasEvent {
        CanvasEvent::TokenRefreshed {
            token,
            position: true,
            visibility: true,
        }
    }

    fn setup() -> (Scene, UserContext, TokenId) {
        let mut scene = Scene::default();
        let me = scene.spawn(Actor::character("Amiri"));
        let goblin = scene.spawn(Actor::npc("Goblin").with_condition(Condition::new("hidden")));
        let mut user = UserContext::default();
        user.control(me);
        user.target(goblin);
        (scene, user, goblin)
    }

    #[test]
    fn burst_of_refreshes_redraws_once() {
        let (scene, user, goblin) = setup();
        let ctx = MarkerContext::new(&scene, &user);
        let t0 = Instant::now();
        let mut markers = TargetMarkers::new(RecordingSink::default(), &FlatCheckConfig::default());
        markers.handle(CanvasEvent::Targeted(goblin), t0, &ctx);

        for i in 0..10 {
            markers.handle(moved(goblin), t0 + ms(i * 20), &ctx);
            assert_eq!(markers.tick(t0 + ms(i * 20), &ctx), 0);
        }
        assert_eq!(markers.tick(t0 + ms(180 + 99), &ctx), 0);
        assert_eq!(markers.tick(t0 + ms(180 + 100), &ctx), 1);
        assert_eq!(markers.tick(t0 + ms(1000), &ctx), 0);
        // initial draw plus the debounced one
        assert_eq!(markers.cache().sink().draws(goblin), 2);
    }

    #[test]
    fn partial_refreshes_are_ignored() {
        let (scene, user, goblin) = setup();
        let ctx = MarkerContext::new(&scene, &user);
        let t0 = Instant::now();
        let mut markers = TargetMarkers::new(RecordingSink::default(), &FlatCheckConfig::default());
        markers.handle(CanvasEvent::Targeted(goblin), t0, &ctx);
        let only_position = CanvasEvent::TokenRefreshed {
            token: goblin,
            position: true,
            visibility: false,
        };
        markers.handle(only_position, t0, &ctx);
        assert!(!markers.is_refresh_pending(goblin));
        assert_eq!(markers.tick(t0 + ms(500), &ctx), 0);
    }

    #[test]
    fn refresh_of_untracked_token_draws_nothing() {
        let (scene, user, goblin) = setup();
        let ctx = MarkerContext::new(&scene, &user);
        let t0 = Instant::now();
        let mut markers = TargetMarkers::new(RecordingSink::default(), &FlatCheckConfig::default());
        markers.handle(moved(goblin), t0, &ctx);
        assert_eq!(markers.tick(t0 + ms(100), &ctx), 0);
        assert!(markers.cache().sink().events.is_empty());
    }

    #[test]
    fn configured_delay() {
        let (scene, user, goblin) = setup();
        let ctx = MarkerContext::new(&scene, &user);
        let t0 = Instant::now();
        let config = FlatCheckConfig::default().with_refresh_delay_ms(250);
        let mut markers = TargetMarkers::new(RecordingSink::default(), &config);
        markers.handle(CanvasEvent::Targeted(goblin), t0, &ctx);
        markers.handle(moved(goblin), t0, &ctx);
        assert_eq!(markers.next_deadline(), Some(t0 + ms(250)));
        assert_eq!(markers.tick(t0 + ms(249), &ctx), 0);
        assert_eq!(markers.tick(t0 + ms(250), &ctx), 1);
    }

    #[test]
    fn untarget_cancels_pending_refresh() {
        let (scene, user, goblin) = setup();
        let ctx = MarkerContext::new(&scene, &user);
        let t0 = Instant::now();
        let mut markers = TargetMarkers::new(RecordingSink::default(), &FlatCheckConfig::default());
        markers.handle(CanvasEvent::Targeted(goblin), t0, &ctx);
        markers.handle(moved(goblin), t0, &ctx);
        markers.handle(CanvasEvent::Untargeted(goblin), t0 + ms(10), &ctx);
        markers.handle(CanvasEvent::Untargeted(goblin), t0 + ms(20), &ctx);
        assert!(!markers.is_refresh_pending(goblin));
        assert_eq!(markers.cache().sink().detaches(goblin), 1);
    }

    #[test]
    fn control_change_retargets_and_teardown_clears() {
        let (scene, mut user, goblin) = setup();
        let t0 = Instant::now();
        let mut markers = TargetMarkers::new(RecordingSink::default(), &FlatCheckConfig::default());
        {
            let ctx = MarkerContext::new(&scene, &user);
            markers.handle(CanvasEvent::ControlChanged, t0, &ctx);
            assert!(markers.cache().contains(goblin));
            assert!(markers.cache().overlay(goblin).is_some_and(|o| o.outline.enabled));
        }

        user.controlled.clear();
        let ctx = MarkerContext::new(&scene, &user);
        markers.handle(CanvasEvent::LightingRefreshed, t0, &ctx);
        assert!(markers.cache().overlay(goblin).is_some_and(|o| !o.outline.enabled));

        markers.handle(moved(goblin), t0, &ctx);
        markers.handle(CanvasEvent::TearDown, t0, &ctx);
        assert!(markers.cache().is_empty());
        assert!(!markers.is_refresh_pending(goblin));
    }
}
