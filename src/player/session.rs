use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::aspect::{AspectClassifier, Reconciled, reconcile};
use super::playback::{PlaybackController, PlaybackState, PlaybackStatus, StateChange};
use super::seek::{preview_label, progress_fraction, track_fraction};
use super::subscription::Subscription;
use super::traits::{MediaEvent, MediaResource};
use super::types::{AspectShape, DisplayMode, PlaybackRate, PointerActivity};
use super::visibility::{ControlsVisibility, Countdown, VisibilityState};
use crate::config::{Config, PlaybackConfig};
use crate::utils::{FailureKind, PlayerError, PlayerResult};

/// Read-only view of everything the player surface renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub status: PlaybackStatus,
    pub playback: PlaybackState,
    pub shape: AspectShape,
    pub preference: DisplayMode,
    pub effective_mode: AspectShape,
    pub forced: bool,
    pub visibility: VisibilityState,
    /// Time left before the controls auto-hide, if a countdown is pending
    pub hide_in_ms: Option<u64>,
    /// Filled share of the progress track, `0.0` until the duration is known
    pub progress: f64,
}

struct Attachment {
    subscription: Subscription,
    playback: PlaybackController,
}

/// Composes the playback controller, aspect classifier and visibility timer
/// around one attached media resource.
///
/// Each state slice has exactly one writer among the components; the session
/// only routes inputs to them.
pub struct PlayerSession {
    playback_config: PlaybackConfig,
    metadata_timeout: Duration,
    attachment: Option<Attachment>,
    aspect: AspectClassifier,
    preference: DisplayMode,
    visibility: ControlsVisibility,
    metadata_deadline: Countdown,
}

impl PlayerSession {
    pub fn new(config: &Config) -> Self {
        Self {
            playback_config: config.playback.clone(),
            metadata_timeout: config.playback.metadata_timeout(),
            attachment: None,
            aspect: AspectClassifier::new(),
            preference: config.display.default_mode,
            visibility: ControlsVisibility::new(
                config.controls.idle_timeout(),
                config.controls.pointer_move_threshold,
            ),
            metadata_deadline: Countdown::new(),
        }
    }

    /// Start controlling `resource`. Any previously attached resource is
    /// detached first.
    pub fn attach(&mut self, resource: &Arc<dyn MediaResource>, now: Instant) {
        self.detach();

        let subscription = Subscription::acquire(resource);
        let mut playback = PlaybackController::new(resource, &self.playback_config);

        match playback.adopt_loaded_metadata() {
            Some((width, height)) => {
                self.aspect.observe(width, height);
            }
            None => self.metadata_deadline.schedule(now + self.metadata_timeout),
        }
        self.visibility.set_playing(playback.state().is_playing, now);

        info!("Attached media resource ({:?})", subscription.id());
        self.attachment = Some(Attachment {
            subscription,
            playback,
        });
    }

    /// Unsubscribes and cancels every pending timer in one step. Returns
    /// whether anything was attached.
    pub fn detach(&mut self) -> bool {
        let attached = self.attachment.take().is_some();
        self.visibility.reset();
        self.metadata_deadline.cancel();
        self.aspect.reset();
        if attached {
            info!("Detached media resource");
        }
        attached
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    /// Apply one notification from the attached resource.
    pub fn handle_event(&mut self, event: MediaEvent, now: Instant) -> StateChange {
        let Some(attachment) = self.attachment.as_mut() else {
            return StateChange::Ignored;
        };

        let change = attachment.playback.handle_event(event);
        match change {
            StateChange::MetadataLoaded { width, height } => {
                self.metadata_deadline.cancel();
                self.aspect.observe(width, height);
            }
            StateChange::PlayStateChanged(playing) => self.visibility.set_playing(playing, now),
            StateChange::Failed(_) => {
                self.metadata_deadline.cancel();
                self.visibility.set_playing(false, now);
            }
            StateChange::Updated | StateChange::Ignored => {}
        }
        change
    }

    /// Apply every notification already delivered, in order.
    pub fn pump_events(&mut self, now: Instant) -> usize {
        let mut handled = 0;
        while let Some(event) = self
            .attachment
            .as_mut()
            .and_then(|attachment| attachment.subscription.try_recv())
        {
            self.handle_event(event, now);
            handled += 1;
        }
        handled
    }

    /// Wait for the next notification; pending while nothing is attached.
    pub async fn next_event(&mut self) -> Option<MediaEvent> {
        match self.attachment.as_mut() {
            Some(attachment) => attachment.subscription.recv().await,
            None => std::future::pending().await,
        }
    }

    /// The resource stopped delivering notifications because the host
    /// dropped it.
    pub fn resource_lost(&mut self, now: Instant) {
        if let Some(attachment) = self.attachment.as_mut() {
            warn!("Media resource went away while attached");
            attachment.playback.fail(FailureKind::ResourceUnavailable);
            self.metadata_deadline.cancel();
            self.visibility.set_playing(false, now);
        }
    }

    pub fn on_pointer(&mut self, activity: PointerActivity, now: Instant) {
        self.visibility.on_activity(activity, now);
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.visibility.deadline(), self.metadata_deadline.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fire whichever timers are due. Returns true when something changed.
    pub fn poll_timers(&mut self, now: Instant) -> bool {
        let mut changed = self.visibility.expire(now);

        if self.metadata_deadline.expire(now)
            && let Some(attachment) = self.attachment.as_mut()
            && attachment.playback.status() == PlaybackStatus::Loading
        {
            warn!(
                "No metadata after {:?}, giving up on resource",
                self.metadata_timeout
            );
            attachment.playback.fail(FailureKind::ResourceUnavailable);
            self.visibility.set_playing(false, now);
            changed = true;
        }

        changed
    }

    fn playback(&self) -> PlayerResult<&PlaybackController> {
        self.attachment
            .as_ref()
            .map(|attachment| &attachment.playback)
            .ok_or(PlayerError::ResourceUnavailable)
    }

    pub fn toggle_play_pause(&self) -> PlayerResult<()> {
        self.playback()?.toggle_play_pause()
    }

    pub fn seek(&self, fraction: f64) -> PlayerResult<Option<f64>> {
        self.playback()?.seek(fraction)
    }

    /// Seek from a click or drag on the progress track.
    pub fn seek_from_track(&self, offset_x: f64, track_width: f64) -> PlayerResult<Option<f64>> {
        match track_fraction(offset_x, track_width) {
            Some(fraction) => self.seek(fraction),
            None => {
                debug!("Ignoring seek on a track without geometry");
                Ok(None)
            }
        }
    }

    /// Tooltip text for hovering over the progress track.
    pub fn preview(&self, offset_x: f64, track_width: f64) -> Option<String> {
        preview_label(offset_x, track_width, self.playback_state().duration)
    }

    pub fn seek_to_time(&self, seconds: f64) -> PlayerResult<Option<f64>> {
        self.playback()?.seek_to_time(seconds)
    }

    pub fn skip(&self, delta_seconds: f64) -> PlayerResult<Option<f64>> {
        self.playback()?.skip(delta_seconds)
    }

    pub fn skip_forward(&self) -> PlayerResult<Option<f64>> {
        self.playback()?.skip_forward()
    }

    pub fn skip_backward(&self) -> PlayerResult<Option<f64>> {
        self.playback()?.skip_backward()
    }

    pub fn set_volume(&self, volume: f64) -> PlayerResult<f64> {
        self.playback()?.set_volume(volume)
    }

    pub fn volume_up(&self) -> PlayerResult<f64> {
        self.playback()?.volume_up()
    }

    pub fn volume_down(&self) -> PlayerResult<f64> {
        self.playback()?.volume_down()
    }

    pub fn toggle_mute(&self) -> PlayerResult<bool> {
        self.playback()?.toggle_mute()
    }

    pub fn set_playback_rate(&self, rate: f64) -> PlayerResult<PlaybackRate> {
        self.playback()?.set_playback_rate(rate)
    }

    pub fn faster(&self) -> PlayerResult<Option<PlaybackRate>> {
        self.playback()?.faster()
    }

    pub fn slower(&self) -> PlayerResult<Option<PlaybackRate>> {
        self.playback()?.slower()
    }

    pub fn toggle_fullscreen(&self) -> PlayerResult<()> {
        self.playback()?.toggle_fullscreen()
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        debug!("Display mode preference set to {}", mode);
        self.preference = mode;
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.preference
    }

    pub fn shape(&self) -> AspectShape {
        self.aspect.shape()
    }

    /// Recomputed on every call from the cached shape and current preference.
    pub fn reconciled(&self) -> Reconciled {
        reconcile(self.aspect.shape(), self.preference)
    }

    pub fn status(&self) -> PlaybackStatus {
        self.attachment
            .as_ref()
            .map_or(PlaybackStatus::Detached, |attachment| {
                attachment.playback.status()
            })
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.attachment
            .as_ref()
            .map(|attachment| attachment.playback.state())
            .unwrap_or_default()
    }

    pub fn visibility(&self) -> VisibilityState {
        self.visibility.state()
    }

    pub fn snapshot(&self, now: Instant) -> PlayerSnapshot {
        let reconciled = self.reconciled();
        let playback = self.playback_state();
        let visibility = self.visibility.state();
        let hide_in_ms = visibility
            .idle_deadline
            .map(|deadline| deadline.saturating_duration_since(now).as_millis() as u64);

        PlayerSnapshot {
            status: self.status(),
            playback,
            shape: self.aspect.shape(),
            preference: self.preference,
            effective_mode: reconciled.effective,
            forced: reconciled.forced,
            visibility,
            hide_in_ms,
            progress: progress_fraction(playback.current_time, playback.duration),
        }
    }
}

impl Drop for PlayerSession {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for PlayerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSession")
            .field("status", &self.status())
            .field("shape", &self.aspect.shape())
            .field("preference", &self.preference)
            .field("visibility", &self.visibility)
            .finish()
    }
}
