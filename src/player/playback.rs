use serde::Serialize;
use std::sync::{Arc, Weak};
use tracing::{debug, info, trace, warn};

use super::seek::{fraction_to_time, has_duration};
use super::traits::{MediaEvent, MediaResource};
use super::types::PlaybackRate;
use crate::config::PlaybackConfig;
use crate::utils::{FailureKind, PlayerError, PlayerResult};

/// Transport state mirrored from the media resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    /// Seconds, within `[0, duration]` once the duration is known
    pub current_time: f64,
    /// Seconds, `0.0` until metadata arrives
    pub duration: f64,
    pub volume: f64,
    pub is_muted: bool,
    pub playback_rate: PlaybackRate,
    pub is_fullscreen: bool,
    pub is_buffering: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: 1.0,
            is_muted: false,
            playback_rate: PlaybackRate::Normal,
            is_fullscreen: false,
            is_buffering: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum PlaybackStatus {
    /// No resource attached
    #[default]
    Detached,
    /// Attached, waiting for metadata
    Loading,
    Ready,
    /// Terminal until a new resource is attached
    Failed(FailureKind),
}

/// What applying a notification changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateChange {
    Ignored,
    Updated,
    MetadataLoaded { width: u32, height: u32 },
    PlayStateChanged(bool),
    Failed(FailureKind),
}

/// Mirrors one media resource into [`PlaybackState`] and issues transport
/// commands against it.
///
/// Holds only a weak reference; the host owns the resource. Commands are
/// fire-and-forget, so the mirrored state catches up when the resource's
/// acknowledgement arrives through [`PlaybackController::handle_event`].
pub struct PlaybackController {
    resource: Weak<dyn MediaResource>,
    state: PlaybackState,
    status: PlaybackStatus,
    has_started: bool,
    skip_seconds: f64,
    volume_step: f64,
}

impl PlaybackController {
    pub fn new(resource: &Arc<dyn MediaResource>, config: &PlaybackConfig) -> Self {
        let state = PlaybackState {
            is_playing: !resource.paused(),
            volume: sanitize_volume(resource.volume()),
            is_muted: resource.muted(),
            playback_rate: PlaybackRate::nearest(resource.playback_rate()),
            is_fullscreen: resource.is_fullscreen(),
            ..PlaybackState::default()
        };

        Self {
            resource: Arc::downgrade(resource),
            state,
            status: PlaybackStatus::Loading,
            has_started: state.is_playing,
            skip_seconds: config.skip_seconds,
            volume_step: config.volume_step,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Natural size if the resource already had metadata when it was
    /// attached, in which case no `MetadataReady` will follow.
    pub fn adopt_loaded_metadata(&mut self) -> Option<(u32, u32)> {
        let resource = self.resource.upgrade()?;
        let duration = resource.duration();
        if !has_duration(duration) {
            return None;
        }
        match self.apply(&resource, MediaEvent::MetadataReady) {
            StateChange::MetadataLoaded { width, height } => Some((width, height)),
            _ => None,
        }
    }

    /// Mark the resource as unusable (metadata never arrived).
    pub fn fail(&mut self, kind: FailureKind) {
        if matches!(self.status, PlaybackStatus::Failed(_)) {
            return;
        }
        warn!("Playback session failed: {:?}", kind);
        self.status = PlaybackStatus::Failed(kind);
        self.state.is_playing = false;
        self.state.is_buffering = false;
    }

    /// Apply one lifecycle notification, in delivery order.
    pub fn handle_event(&mut self, event: MediaEvent) -> StateChange {
        if let PlaybackStatus::Failed(_) = self.status {
            trace!("Ignoring {:?} after failure", event);
            return StateChange::Ignored;
        }

        let Some(resource) = self.resource.upgrade() else {
            self.fail(FailureKind::ResourceUnavailable);
            return StateChange::Failed(FailureKind::ResourceUnavailable);
        };

        self.apply(&resource, event)
    }

    fn apply(&mut self, resource: &Arc<dyn MediaResource>, event: MediaEvent) -> StateChange {
        match event {
            MediaEvent::MetadataReady => {
                let duration = resource.duration();
                self.state.duration = if has_duration(duration) { duration } else { 0.0 };
                self.state.current_time = self.clamp_time(resource.current_time());
                self.status = PlaybackStatus::Ready;

                let width = resource.natural_width();
                let height = resource.natural_height();
                info!(
                    "Media metadata ready: {}x{}, {:.1}s",
                    width, height, self.state.duration
                );
                StateChange::MetadataLoaded { width, height }
            }
            MediaEvent::TimeAdvanced => {
                // last write wins
                self.state.current_time = self.clamp_time(resource.current_time());
                StateChange::Updated
            }
            MediaEvent::Started => {
                self.has_started = true;
                self.set_playing(true)
            }
            MediaEvent::Stopped => self.set_playing(false),
            MediaEvent::Ended => {
                if self.state.duration > 0.0 {
                    self.state.current_time = self.state.duration;
                }
                self.set_playing(false)
            }
            MediaEvent::VolumeChanged => {
                self.state.volume = sanitize_volume(resource.volume());
                self.state.is_muted = resource.muted();
                StateChange::Updated
            }
            MediaEvent::RateChanged => {
                let rate = resource.playback_rate();
                self.state.playback_rate = PlaybackRate::nearest(rate);
                if self.state.playback_rate.as_f64() != rate {
                    debug!(
                        "Resource reported rate {}, showing nearest {}",
                        rate, self.state.playback_rate
                    );
                }
                StateChange::Updated
            }
            MediaEvent::BufferingStarted => {
                self.state.is_buffering = true;
                StateChange::Updated
            }
            MediaEvent::BufferingEnded => {
                self.state.is_buffering = false;
                StateChange::Updated
            }
            MediaEvent::FullscreenChanged => {
                self.state.is_fullscreen = resource.is_fullscreen();
                StateChange::Updated
            }
            MediaEvent::Failed(error) => {
                let kind = if self.has_started {
                    FailureKind::PlaybackFailed
                } else {
                    FailureKind::ResourceUnavailable
                };
                warn!("Media resource reported {:?}", error);
                self.fail(kind);
                StateChange::Failed(kind)
            }
            MediaEvent::Other(name) => {
                trace!("Ignoring unknown media notification '{}'", name);
                StateChange::Ignored
            }
        }
    }

    fn set_playing(&mut self, playing: bool) -> StateChange {
        if self.state.is_playing == playing {
            return StateChange::Updated;
        }
        self.state.is_playing = playing;
        StateChange::PlayStateChanged(playing)
    }

    fn clamp_time(&self, time: f64) -> f64 {
        if !time.is_finite() {
            return 0.0;
        }
        if self.state.duration > 0.0 {
            time.clamp(0.0, self.state.duration)
        } else {
            time.max(0.0)
        }
    }

    /// The resource, if commands may still be issued against it.
    fn live(&self) -> PlayerResult<Arc<dyn MediaResource>> {
        if let PlaybackStatus::Failed(kind) = self.status {
            return Err(kind.into());
        }
        self.resource
            .upgrade()
            .ok_or(PlayerError::ResourceUnavailable)
    }

    /// Play when the resource is paused, pause otherwise.
    ///
    /// Decides on the resource's live paused flag rather than the mirrored
    /// state, so a second call made before the first is acknowledged undoes
    /// it instead of repeating it.
    pub fn toggle_play_pause(&self) -> PlayerResult<()> {
        let resource = self.live()?;
        if resource.paused() {
            trace!("Starting playback");
            resource.play();
        } else {
            trace!("Pausing playback");
            resource.pause();
        }
        Ok(())
    }

    /// Seek to a normalised position. Returns the target time, or `None`
    /// when the duration is not known yet and nothing was issued.
    pub fn seek(&self, fraction: f64) -> PlayerResult<Option<f64>> {
        if !fraction.is_finite() {
            return Err(PlayerError::InvalidArgument(format!(
                "seek fraction {} is not finite",
                fraction
            )));
        }
        let resource = self.live()?;
        let Some(target) = fraction_to_time(fraction, resource.duration()) else {
            debug!("Ignoring seek before duration is known");
            return Ok(None);
        };
        trace!("Seeking to {:.2}s", target);
        resource.seek_to(target);
        Ok(Some(target))
    }

    /// Seek to an absolute time, clamped into the media.
    pub fn seek_to_time(&self, seconds: f64) -> PlayerResult<Option<f64>> {
        if !seconds.is_finite() {
            return Err(PlayerError::InvalidArgument(format!(
                "seek target {} is not finite",
                seconds
            )));
        }
        let resource = self.live()?;
        let duration = resource.duration();
        if !has_duration(duration) {
            return Ok(None);
        }
        let target = seconds.clamp(0.0, duration);
        resource.seek_to(target);
        Ok(Some(target))
    }

    /// Jump relative to the live position, clamped into the media.
    pub fn skip(&self, delta_seconds: f64) -> PlayerResult<Option<f64>> {
        if !delta_seconds.is_finite() {
            return Err(PlayerError::InvalidArgument(format!(
                "skip delta {} is not finite",
                delta_seconds
            )));
        }
        let resource = self.live()?;
        let duration = resource.duration();
        if !has_duration(duration) {
            return Ok(None);
        }
        let current = resource.current_time();
        let current = if current.is_finite() { current } else { 0.0 };
        let target = (current + delta_seconds).clamp(0.0, duration);
        trace!("Skipping {:+.1}s to {:.2}s", delta_seconds, target);
        resource.seek_to(target);
        Ok(Some(target))
    }

    pub fn skip_forward(&self) -> PlayerResult<Option<f64>> {
        self.skip(self.skip_seconds)
    }

    pub fn skip_backward(&self) -> PlayerResult<Option<f64>> {
        self.skip(-self.skip_seconds)
    }

    /// Set the volume; zero also mutes and anything above zero unmutes.
    pub fn set_volume(&self, volume: f64) -> PlayerResult<f64> {
        if !volume.is_finite() {
            return Err(PlayerError::InvalidArgument(format!(
                "volume {} is not finite",
                volume
            )));
        }
        let resource = self.live()?;
        let volume = volume.clamp(0.0, 1.0);
        trace!("Setting volume to {}", volume);
        resource.set_volume(volume);
        resource.set_muted(volume == 0.0);
        Ok(volume)
    }

    pub fn volume_up(&self) -> PlayerResult<f64> {
        let current = self.live()?.volume();
        self.set_volume(sanitize_volume(current) + self.volume_step)
    }

    pub fn volume_down(&self) -> PlayerResult<f64> {
        let current = self.live()?.volume();
        self.set_volume(sanitize_volume(current) - self.volume_step)
    }

    /// Flip mute without touching the stored volume, so unmuting restores it.
    pub fn toggle_mute(&self) -> PlayerResult<bool> {
        let resource = self.live()?;
        let muted = !resource.muted();
        trace!("Toggling mute to {}", muted);
        resource.set_muted(muted);
        Ok(muted)
    }

    /// Accepts only the offered rates.
    pub fn set_playback_rate(&self, rate: f64) -> PlayerResult<PlaybackRate> {
        let rate = PlaybackRate::try_from(rate)?;
        self.set_rate(rate)?;
        Ok(rate)
    }

    pub fn set_rate(&self, rate: PlaybackRate) -> PlayerResult<()> {
        let resource = self.live()?;
        trace!("Setting playback rate to {}", rate);
        resource.set_playback_rate(rate.as_f64());
        Ok(())
    }

    /// Step one rate up; `None` when already at the fastest.
    pub fn faster(&self) -> PlayerResult<Option<PlaybackRate>> {
        let current = PlaybackRate::nearest(self.live()?.playback_rate());
        self.step_rate(current.faster())
    }

    /// Step one rate down; `None` when already at the slowest.
    pub fn slower(&self) -> PlayerResult<Option<PlaybackRate>> {
        let current = PlaybackRate::nearest(self.live()?.playback_rate());
        self.step_rate(current.slower())
    }

    fn step_rate(&self, next: Option<PlaybackRate>) -> PlayerResult<Option<PlaybackRate>> {
        match next {
            Some(rate) => {
                self.set_rate(rate)?;
                Ok(Some(rate))
            }
            None => Ok(None),
        }
    }

    pub fn toggle_fullscreen(&self) -> PlayerResult<()> {
        let resource = self.live()?;
        if !resource.supports_fullscreen() {
            return Err(PlayerError::UnsupportedOperation(
                "fullscreen is not available for this media".to_string(),
            ));
        }
        if resource.is_fullscreen() {
            debug!("Exiting fullscreen");
            resource.exit_fullscreen();
        } else {
            debug!("Requesting fullscreen");
            resource.request_fullscreen();
        }
        Ok(())
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .field("status", &self.status)
            .field("resource_alive", &(self.resource.strong_count() > 0))
            .finish()
    }
}

fn sanitize_volume(volume: f64) -> f64 {
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        1.0
    }
}
