use crate::id::{ActorId, TokenId};

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when manipulating a scene or its configuration.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The requested actor does not exist in the scene.
    #[error("actor not found: {0}")]
    ActorNotFound(ActorId),

    /// The requested token does not exist in the scene.
    #[error("token not found: {0}")]
    TokenNotFound(TokenId),

    /// A token refers to an actor the scene does not know.
    #[error("token {token} references unknown actor {actor}")]
    DanglingActor {
        /// The token holding the reference.
        token: TokenId,
        /// The missing actor.
        actor: ActorId,
    },

    /// A check kind name was not recognized.
    #[error("unknown check kind: {0}")]
    UnknownCheckKind(String),

    /// A configuration document could not be parsed.
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}
