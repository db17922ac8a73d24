use tokio::sync::mpsc;

/// Lifecycle notifications a media resource delivers to its subscribers.
///
/// Events carry no payload; subscribers read the live values they care about
/// back from the resource when the event arrives.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    MetadataReady,
    TimeAdvanced,
    Started,
    Stopped,
    VolumeChanged,
    RateChanged,
    BufferingStarted,
    BufferingEnded,
    FullscreenChanged,
    Ended,
    Failed(MediaErrorKind),
    /// Anything the host forwards that the controls do not understand
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaErrorKind {
    Aborted,
    Network,
    Decode,
    SourceNotSupported,
}

/// Identifies one registration made through [`MediaResource::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// A playable, seekable stream owned by the host.
///
/// Commands are fire-and-forget: the resource acknowledges them later through
/// a [`MediaEvent`]. Accessors return the live value, which may already
/// reflect a command whose notification has not been delivered yet.
pub trait MediaResource: Send + Sync {
    fn natural_width(&self) -> u32;
    fn natural_height(&self) -> u32;
    /// Seconds; `0.0` or NaN until metadata is loaded
    fn duration(&self) -> f64;
    fn current_time(&self) -> f64;
    fn volume(&self) -> f64;
    fn muted(&self) -> bool;
    fn playback_rate(&self) -> f64;
    fn paused(&self) -> bool;

    fn play(&self);
    fn pause(&self);
    fn seek_to(&self, time: f64);
    fn set_volume(&self, volume: f64);
    fn set_muted(&self, muted: bool);
    fn set_playback_rate(&self, rate: f64);

    /// Feature detection for the fullscreen capability.
    fn supports_fullscreen(&self) -> bool {
        false
    }
    fn is_fullscreen(&self) -> bool {
        false
    }
    fn request_fullscreen(&self) {}
    fn exit_fullscreen(&self) {}

    /// Register a sink for lifecycle notifications.
    fn subscribe(&self, sink: mpsc::UnboundedSender<MediaEvent>) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId);
}
