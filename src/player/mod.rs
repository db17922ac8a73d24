pub mod aspect;
pub mod controller;
pub mod playback;
pub mod seek;
pub mod session;
pub mod simulated;
pub mod subscription;
pub mod traits;
pub mod types;
pub mod visibility;

pub use aspect::{AspectClassifier, Reconciled, classify, reconcile};
pub use controller::{PlayerCommand, PlayerController, PlayerHandle};
pub use playback::{PlaybackController, PlaybackState, PlaybackStatus, StateChange};
pub use session::{PlayerSession, PlayerSnapshot};
pub use simulated::{ResourceCommand, SimulatedResource};
pub use subscription::Subscription;
pub use traits::{MediaErrorKind, MediaEvent, MediaResource, SubscriptionId};
pub use types::{AspectShape, DisplayMode, PlaybackRate, PointerActivity};
pub use visibility::{ControlsVisibility, Countdown, VisibilityState};
