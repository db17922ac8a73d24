use thiserror::Error;

/// Why a session stopped accepting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The media never became playable or the host dropped it. Terminal
    /// until a fresh resource is attached.
    ResourceUnavailable,
    /// The resource errored after playback had started.
    PlaybackFailed,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlayerError {
    #[error("Media resource unavailable")]
    ResourceUnavailable,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Playback failed")]
    PlaybackFailed,

    #[error("Player controller disconnected")]
    ControllerDisconnected,
}

impl From<FailureKind> for PlayerError {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::ResourceUnavailable => PlayerError::ResourceUnavailable,
            FailureKind::PlaybackFailed => PlayerError::PlaybackFailed,
        }
    }
}

pub type PlayerResult<T> = Result<T, PlayerError>;
