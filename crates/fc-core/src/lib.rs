//! Core types for flat checks: conditions, actors, tokens, and the scene model.
//!
//! This crate defines the data the rule engine reads. It is independent of
//! any host application: a [`Scene`] can be built programmatically or
//! deserialized from JSON.

/// Actors and their kinds.
pub mod actor;
/// Status conditions and their slugs.
pub mod condition;
/// Runtime configuration shared by every crate.
pub mod config;
/// The resolved requirement for a single check.
pub mod descriptor;
/// Error types used throughout the crate.
pub mod error;
/// The hero point pool.
pub mod hero;
/// Identifiers for actors, tokens, and records.
pub mod id;
/// Scene, tokens, and the viewing user's targeting state.
pub mod scene;

/// Re-export actor types.
pub use actor::{Actor, ActorKind};
/// Re-export condition types.
pub use condition::Condition;
/// Re-export configuration types.
pub use config::{CheckKind, FlatCheckConfig};
/// Re-export the check descriptor.
pub use descriptor::CheckDescriptor;
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export identifier types.
pub use id::{ActorId, MessageId, TokenId};
/// Re-export scene types.
pub use scene::{Bounds, Scene, Token, UserContext};
/// Re-export the hero point pool.
pub use hero::HeroPoints;
