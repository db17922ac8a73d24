use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::types::PointerActivity;

/// One pending deadline at most.
///
/// Scheduling replaces whatever was pending, so two timers can never race to
/// flip visibility. The owner polls [`Countdown::expire`] when the deadline
/// passes (the async controller sleeps until [`Countdown::deadline`]).
#[derive(Debug, Default, Clone)]
pub struct Countdown {
    deadline: Option<Instant>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: Instant) {
        if let Some(previous) = self.deadline.replace(deadline) {
            trace!("Countdown rescheduled, dropping deadline {:?}", previous);
        }
    }

    /// Returns whether something was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fires once `now` reaches the pending deadline; clears it when it does.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// What the renderer needs to draw the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisibilityState {
    pub controls_visible: bool,
    #[serde(skip)]
    pub idle_deadline: Option<Instant>,
}

/// Control surface visibility state machine.
///
/// Visible on any pointer activity. While media plays, an idle countdown
/// hides the controls again; while paused nothing is pending and the
/// controls stay up.
#[derive(Debug)]
pub struct ControlsVisibility {
    visible: bool,
    playing: bool,
    countdown: Countdown,
    idle_timeout: Duration,
    move_threshold: f64,
    last_pointer: Option<(f64, f64)>,
}

impl ControlsVisibility {
    pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(3000);

    pub fn new(idle_timeout: Duration, move_threshold: f64) -> Self {
        Self {
            visible: true,
            playing: false,
            countdown: Countdown::new(),
            idle_timeout,
            move_threshold: move_threshold.max(0.0),
            last_pointer: None,
        }
    }

    pub fn on_activity(&mut self, activity: PointerActivity, now: Instant) {
        match activity {
            PointerActivity::Moved { x, y } => {
                if !self.movement_exceeds_threshold(x, y) {
                    return;
                }
                self.last_pointer = Some((x, y));
                self.show(now);
            }
            PointerActivity::Entered => self.show(now),
            PointerActivity::Left => {
                self.last_pointer = None;
                if self.playing {
                    debug!("Pointer left while playing, hiding controls");
                    self.countdown.cancel();
                    self.visible = false;
                }
            }
        }
    }

    /// Follow a play-state transition reported by the playback controller.
    pub fn set_playing(&mut self, playing: bool, now: Instant) {
        if playing == self.playing {
            return;
        }
        self.playing = playing;

        if playing {
            // count from this moment, not from when playback first began
            self.visible = true;
            self.countdown.schedule(now + self.idle_timeout);
        } else {
            if self.countdown.cancel() {
                debug!("Playback stopped, cancelled pending hide");
            }
            self.visible = true;
        }
    }

    /// Apply countdown expiry. Returns true when the controls were hidden.
    pub fn expire(&mut self, now: Instant) -> bool {
        if !self.countdown.expire(now) {
            return false;
        }
        if !self.playing {
            return false;
        }
        debug!("Idle timeout reached, hiding controls");
        self.visible = false;
        true
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.countdown.deadline()
    }

    pub fn controls_visible(&self) -> bool {
        self.visible
    }

    pub fn state(&self) -> VisibilityState {
        VisibilityState {
            controls_visible: self.visible,
            idle_deadline: self.countdown.deadline(),
        }
    }

    /// Cancel anything pending and start over as for a fresh session.
    pub fn reset(&mut self) {
        self.countdown.cancel();
        self.visible = true;
        self.playing = false;
        self.last_pointer = None;
    }

    fn show(&mut self, now: Instant) {
        self.visible = true;
        if self.playing {
            self.countdown.schedule(now + self.idle_timeout);
        } else {
            self.countdown.cancel();
        }
    }

    fn movement_exceeds_threshold(&self, x: f64, y: f64) -> bool {
        match self.last_pointer {
            Some((last_x, last_y)) => {
                let dx = x - last_x;
                let dy = y - last_y;
                (dx * dx + dy * dy).sqrt() >= self.move_threshold
            }
            // first movement always counts
            None => true,
        }
    }
}

impl Default for ControlsVisibility {
    fn default() -> Self {
        Self::new(Self::DEFAULT_IDLE_TIMEOUT, 0.0)
    }
}
