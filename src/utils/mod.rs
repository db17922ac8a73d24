pub mod errors;
pub mod time;

pub use errors::{FailureKind, PlayerError, PlayerResult};
pub use time::{format_duration, format_seconds};
