//! Error types for message flat checks.

use fc_core::{ActorId, MessageId};
use fc_mechanics::MechError;

use crate::flags::{KeepPolicy, SlotKey};

/// Errors that can occur while resolving or rendering message flat checks.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// The message does not exist in the store.
    #[error("message not found: {0}")]
    RecordNotFound(MessageId),

    /// The message has no populated slot with this key.
    #[error("no flat check slot '{0}' on message")]
    SlotNotFound(SlotKey),

    /// An update was built against state that has since changed.
    #[error("stale update for slot '{0}'")]
    StaleUpdate(SlotKey),

    /// The actor to charge a hero point to does not exist.
    #[error("actor not found: {0}")]
    ActorNotFound(ActorId),

    /// A reroll policy was chosen that the prompt did not offer.
    #[error("reroll option '{0}' was not offered")]
    ChoiceNotOffered(KeepPolicy),

    /// None of the known anchors exist in the rendered message.
    #[error("no insertion point for flat check controls")]
    NoInsertionPoint,

    /// The dice primitive failed.
    #[error(transparent)]
    Roll(#[from] MechError),

    /// Flags could not be serialized.
    #[error("flag serialization failed: {0}")]
    Flags(#[from] serde_json::Error),
}

/// Convenience result type for message operations.
pub type MessageResult<T> = Result<T, MessageError>;
