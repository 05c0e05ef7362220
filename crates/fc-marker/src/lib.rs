//! Target markers.
//!
//! Every token the user targets gets an outline colored by the flat check
//! DC it imposes and a short `DC n - Label` overlay. The [`TargetCache`]
//! owns one entry per targeted token; [`TargetMarkers`] feeds it canvas
//! events and coalesces bursts of token refreshes through a [`Debouncer`].

pub mod cache;
pub mod color;
pub mod debounce;
pub mod events;
pub mod overlay;
pub mod sink;

pub use cache::{MarkerContext, TargetCache};
pub use color::TargetColor;
pub use debounce::{Debouncer, Ticket};
pub use events::{CanvasEvent, TargetMarkers};
pub use overlay::{MarkerOverlay, Outline, OverlayText};
pub use sink::{MarkerSink, RecordingSink, SinkEvent};
