//! The drawing surface markers are presented on.

use fc_core::TokenId;

use crate::overlay::MarkerOverlay;

/// Host drawing surface.
pub trait MarkerSink {
    /// Create the marker layer and outline on a token.
    fn attach(&mut self, token: TokenId);
    /// Replace what the token's marker shows.
    fn present(&mut self, token: TokenId, overlay: &MarkerOverlay);
    /// Destroy the layer and remove the outline.
    fn detach(&mut self, token: TokenId);
}

/// A call received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    /// [`MarkerSink::attach`].
    Attach(TokenId),
    /// [`MarkerSink::present`].
    Present(TokenId, MarkerOverlay),
    /// [`MarkerSink::detach`].
    Detach(TokenId),
}

/// A sink that keeps a log of every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Calls in order.
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    /// Number of presents for a token.
    pub fn draws(&self, token: TokenId) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SinkEvent::Present(t, _) if *t == token))
            .count()
    }

    /// Number of detaches for a token.
    pub fn detaches(&self, token: TokenId) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SinkEvent::Detach(t) if *t == token))
            .count()
    }

    /// The last overlay presented on a token.
    pub fn last_overlay(&self, token: TokenId) -> Option<&MarkerOverlay> {
        self.events.iter().rev().find_map(|e| match e {
            SinkEvent::Present(t, overlay) if *t == token => Some(overlay),
            _ => None,
        })
    }
}

impl MarkerSink for RecordingSink {
    fn attach(&mut self, token: TokenId) {
        self.events.push(SinkEvent::Attach(token));
    }

    fn present(&mut self, token: TokenId, overlay: &MarkerOverlay) {
        self.events.push(SinkEvent::Present(token, overlay.clone()));
    }

    fn detach(&mut self, token: TokenId) {
        self.events.push(SinkEvent::Detach(token));
    }
}
