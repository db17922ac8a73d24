// Playback controls for a media resource owned by the host application.

pub mod config;
pub mod player;
pub mod utils;

pub use config::Config;
pub use player::{
    AspectShape, DisplayMode, MediaEvent, MediaResource, PlaybackRate, PlaybackState,
    PlaybackStatus, PlayerController, PlayerHandle, PlayerSession, PlayerSnapshot,
    PointerActivity, SimulatedResource,
};
pub use utils::{FailureKind, PlayerError, PlayerResult};
