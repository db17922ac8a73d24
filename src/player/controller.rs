use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use super::session::{PlayerSession, PlayerSnapshot};
use super::traits::MediaResource;
use super::types::{DisplayMode, PlaybackRate, PointerActivity};
use crate::config::Config;
use crate::utils::{PlayerError, PlayerResult};

/// Commands that can be sent to the player controller
pub enum PlayerCommand {
    /// Start controlling a resource, replacing any attached one
    Attach {
        resource: Arc<dyn MediaResource>,
        respond_to: oneshot::Sender<()>,
    },
    /// Release the attached resource
    Detach { respond_to: oneshot::Sender<bool> },
    TogglePlayPause {
        respond_to: oneshot::Sender<PlayerResult<()>>,
    },
    /// Seek to a normalised position
    Seek {
        fraction: f64,
        respond_to: oneshot::Sender<PlayerResult<Option<f64>>>,
    },
    /// Seek from a pointer offset on the progress track
    SeekFromTrack {
        offset_x: f64,
        track_width: f64,
        respond_to: oneshot::Sender<PlayerResult<Option<f64>>>,
    },
    /// Tooltip label for a hover position on the progress track
    Preview {
        offset_x: f64,
        track_width: f64,
        respond_to: oneshot::Sender<Option<String>>,
    },
    SeekToTime {
        seconds: f64,
        respond_to: oneshot::Sender<PlayerResult<Option<f64>>>,
    },
    Skip {
        delta_seconds: f64,
        respond_to: oneshot::Sender<PlayerResult<Option<f64>>>,
    },
    SkipForward {
        respond_to: oneshot::Sender<PlayerResult<Option<f64>>>,
    },
    SkipBackward {
        respond_to: oneshot::Sender<PlayerResult<Option<f64>>>,
    },
    /// Set volume (0.0 to 1.0)
    SetVolume {
        volume: f64,
        respond_to: oneshot::Sender<PlayerResult<f64>>,
    },
    VolumeUp {
        respond_to: oneshot::Sender<PlayerResult<f64>>,
    },
    VolumeDown {
        respond_to: oneshot::Sender<PlayerResult<f64>>,
    },
    ToggleMute {
        respond_to: oneshot::Sender<PlayerResult<bool>>,
    },
    SetPlaybackRate {
        rate: f64,
        respond_to: oneshot::Sender<PlayerResult<PlaybackRate>>,
    },
    Faster {
        respond_to: oneshot::Sender<PlayerResult<Option<PlaybackRate>>>,
    },
    Slower {
        respond_to: oneshot::Sender<PlayerResult<Option<PlaybackRate>>>,
    },
    ToggleFullscreen {
        respond_to: oneshot::Sender<PlayerResult<()>>,
    },
    SetDisplayMode {
        mode: DisplayMode,
        respond_to: oneshot::Sender<()>,
    },
    /// Pointer activity over the player surface
    Pointer { activity: PointerActivity },
    /// Current snapshot, taken at the time the command is handled
    GetSnapshot {
        respond_to: oneshot::Sender<PlayerSnapshot>,
    },
}

impl PlayerCommand {
    fn name(&self) -> &'static str {
        match self {
            PlayerCommand::Attach { .. } => "attach",
            PlayerCommand::Detach { .. } => "detach",
            PlayerCommand::TogglePlayPause { .. } => "toggle_play_pause",
            PlayerCommand::Seek { .. } => "seek",
            PlayerCommand::SeekFromTrack { .. } => "seek_from_track",
            PlayerCommand::Preview { .. } => "preview",
            PlayerCommand::SeekToTime { .. } => "seek_to_time",
            PlayerCommand::Skip { .. } => "skip",
            PlayerCommand::SkipForward { .. } => "skip_forward",
            PlayerCommand::SkipBackward { .. } => "skip_backward",
            PlayerCommand::SetVolume { .. } => "set_volume",
            PlayerCommand::VolumeUp { .. } => "volume_up",
            PlayerCommand::VolumeDown { .. } => "volume_down",
            PlayerCommand::ToggleMute { .. } => "toggle_mute",
            PlayerCommand::SetPlaybackRate { .. } => "set_playback_rate",
            PlayerCommand::Faster { .. } => "faster",
            PlayerCommand::Slower { .. } => "slower",
            PlayerCommand::ToggleFullscreen { .. } => "toggle_fullscreen",
            PlayerCommand::SetDisplayMode { .. } => "set_display_mode",
            PlayerCommand::Pointer { .. } => "pointer",
            PlayerCommand::GetSnapshot { .. } => "get_snapshot",
        }
    }
}

/// Controller that owns the [`PlayerSession`] and serialises handle commands,
/// resource notifications and timer deadlines into it.
pub struct PlayerController {
    session: PlayerSession,
    receiver: mpsc::UnboundedReceiver<PlayerCommand>,
    snapshot_tx: watch::Sender<PlayerSnapshot>,
    shutdown: CancellationToken,
}

impl PlayerController {
    /// Create a new player controller with the given config
    pub fn new(config: &Config) -> (PlayerHandle, PlayerController) {
        let session = PlayerSession::new(config);
        let (sender, receiver) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot(Instant::now()));
        let shutdown = CancellationToken::new();

        let controller = PlayerController {
            session,
            receiver,
            snapshot_tx,
            shutdown: shutdown.clone(),
        };
        let handle = PlayerHandle {
            sender,
            snapshots: snapshot_rx,
            shutdown,
        };

        (handle, controller)
    }

    /// Run the controller event loop until every handle is dropped or
    /// [`PlayerHandle::shutdown`] is called.
    pub async fn run(mut self) {
        debug!("PlayerController event loop started");

        loop {
            let deadline = self.session.next_deadline();

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!("PlayerController shutdown requested");
                    break;
                }
                command = self.receiver.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                event = self.session.next_event() => {
                    let now = Instant::now();
                    match event {
                        Some(event) => {
                            self.session.handle_event(event, now);
                            self.session.pump_events(now);
                        }
                        None => self.session.resource_lost(now),
                    }
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.session.poll_timers(Instant::now());
                }
            }

            self.publish();
        }

        self.session.detach();
        self.publish();
        debug!("PlayerController event loop terminated");
    }

    fn publish(&self) {
        self.snapshot_tx
            .send_replace(self.session.snapshot(Instant::now()));
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        trace!("Handling {} command", command.name());
        let now = Instant::now();

        // notifications already delivered apply before the command reads state
        self.session.pump_events(now);

        match command {
            PlayerCommand::Attach {
                resource,
                respond_to,
            } => {
                self.session.attach(&resource, now);
                let _ = respond_to.send(());
            }
            PlayerCommand::Detach { respond_to } => {
                let _ = respond_to.send(self.session.detach());
            }
            PlayerCommand::TogglePlayPause { respond_to } => {
                let _ = respond_to.send(self.session.toggle_play_pause());
            }
            PlayerCommand::Seek {
                fraction,
                respond_to,
            } => {
                let _ = respond_to.send(self.session.seek(fraction));
            }
            PlayerCommand::SeekFromTrack {
                offset_x,
                track_width,
                respond_to,
            } => {
                let _ = respond_to.send(self.session.seek_from_track(offset_x, track_width));
            }
            PlayerCommand::Preview {
                offset_x,
                track_width,
                respond_to,
            } => {
                let _ = respond_to.send(self.session.preview(offset_x, track_width));
            }
            PlayerCommand::SeekToTime {
                seconds,
                respond_to,
            } => {
                let _ = respond_to.send(self.session.seek_to_time(seconds));
            }
            PlayerCommand::Skip {
                delta_seconds,
                respond_to,
            } => {
                let _ = respond_to.send(self.session.skip(delta_seconds));
            }
            PlayerCommand::SkipForward { respond_to } => {
                let _ = respond_to.send(self.session.skip_forward());
            }
            PlayerCommand::SkipBackward { respond_to } => {
                let _ = respond_to.send(self.session.skip_backward());
            }
            PlayerCommand::SetVolume { volume, respond_to } => {
                let _ = respond_to.send(self.session.set_volume(volume));
            }
            PlayerCommand::VolumeUp { respond_to } => {
                let _ = respond_to.send(self.session.volume_up());
            }
            PlayerCommand::VolumeDown { respond_to } => {
                let _ = respond_to.send(self.session.volume_down());
            }
            PlayerCommand::ToggleMute { respond_to } => {
                let _ = respond_to.send(self.session.toggle_mute());
            }
            PlayerCommand::SetPlaybackRate { rate, respond_to } => {
                let _ = respond_to.send(self.session.set_playback_rate(rate));
            }
            PlayerCommand::Faster { respond_to } => {
                let _ = respond_to.send(self.session.faster());
            }
            PlayerCommand::Slower { respond_to } => {
                let _ = respond_to.send(self.session.slower());
            }
            PlayerCommand::ToggleFullscreen { respond_to } => {
                let _ = respond_to.send(self.session.toggle_fullscreen());
            }
            PlayerCommand::SetDisplayMode { mode, respond_to } => {
                self.session.set_display_mode(mode);
                let _ = respond_to.send(());
            }
            PlayerCommand::Pointer { activity } => {
                self.session.on_pointer(activity, now);
            }
            PlayerCommand::GetSnapshot { respond_to } => {
                let _ = respond_to.send(self.session.snapshot(now));
            }
        }
    }
}

/// Handle to send commands to the player controller
#[derive(Clone)]
pub struct PlayerHandle {
    sender: mpsc::UnboundedSender<PlayerCommand>,
    snapshots: watch::Receiver<PlayerSnapshot>,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("sender", &"<UnboundedSender>")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

impl PlayerHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> PlayerCommand,
    ) -> PlayerResult<T> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(command(respond_to))
            .map_err(|_| PlayerError::ControllerDisconnected)?;
        response
            .await
            .map_err(|_| PlayerError::ControllerDisconnected)
    }

    /// Start controlling `resource`. The host keeps ownership.
    pub async fn attach(&self, resource: Arc<dyn MediaResource>) -> PlayerResult<()> {
        info!("Attaching media resource");
        self.request(|respond_to| PlayerCommand::Attach {
            resource,
            respond_to,
        })
        .await
    }

    /// Release the attached resource. Returns whether one was attached.
    pub async fn detach(&self) -> PlayerResult<bool> {
        self.request(|respond_to| PlayerCommand::Detach { respond_to })
            .await
    }

    pub async fn toggle_play_pause(&self) -> PlayerResult<()> {
        self.request(|respond_to| PlayerCommand::TogglePlayPause { respond_to })
            .await?
    }

    pub async fn seek(&self, fraction: f64) -> PlayerResult<Option<f64>> {
        self.request(|respond_to| PlayerCommand::Seek {
            fraction,
            respond_to,
        })
        .await?
    }

    pub async fn seek_from_track(
        &self,
        offset_x: f64,
        track_width: f64,
    ) -> PlayerResult<Option<f64>> {
        self.request(|respond_to| PlayerCommand::SeekFromTrack {
            offset_x,
            track_width,
            respond_to,
        })
        .await?
    }

    /// Label for the hovered position, `None` until the duration is known.
    pub async fn preview(&self, offset_x: f64, track_width: f64) -> PlayerResult<Option<String>> {
        self.request(|respond_to| PlayerCommand::Preview {
            offset_x,
            track_width,
            respond_to,
        })
        .await
    }

    pub async fn seek_to_time(&self, seconds: f64) -> PlayerResult<Option<f64>> {
        self.request(|respond_to| PlayerCommand::SeekToTime {
            seconds,
            respond_to,
        })
        .await?
    }

    pub async fn skip(&self, delta_seconds: f64) -> PlayerResult<Option<f64>> {
        self.request(|respond_to| PlayerCommand::Skip {
            delta_seconds,
            respond_to,
        })
        .await?
    }

    pub async fn skip_forward(&self) -> PlayerResult<Option<f64>> {
        self.request(|respond_to| PlayerCommand::SkipForward { respond_to })
            .await?
    }

    pub async fn skip_backward(&self) -> PlayerResult<Option<f64>> {
        self.request(|respond_to| PlayerCommand::SkipBackward { respond_to })
            .await?
    }

    /// Set volume (0.0 to 1.0). Returns the clamped value applied.
    pub async fn set_volume(&self, volume: f64) -> PlayerResult<f64> {
        self.request(|respond_to| PlayerCommand::SetVolume { volume, respond_to })
            .await?
    }

    pub async fn volume_up(&self) -> PlayerResult<f64> {
        self.request(|respond_to| PlayerCommand::VolumeUp { respond_to })
            .await?
    }

    pub async fn volume_down(&self) -> PlayerResult<f64> {
        self.request(|respond_to| PlayerCommand::VolumeDown { respond_to })
            .await?
    }

    /// Returns the muted flag that was requested.
    pub async fn toggle_mute(&self) -> PlayerResult<bool> {
        self.request(|respond_to| PlayerCommand::ToggleMute { respond_to })
            .await?
    }

    pub async fn set_playback_rate(&self, rate: f64) -> PlayerResult<PlaybackRate> {
        self.request(|respond_to| PlayerCommand::SetPlaybackRate { rate, respond_to })
            .await?
    }

    pub async fn faster(&self) -> PlayerResult<Option<PlaybackRate>> {
        self.request(|respond_to| PlayerCommand::Faster { respond_to })
            .await?
    }

    pub async fn slower(&self) -> PlayerResult<Option<PlaybackRate>> {
        self.request(|respond_to| PlayerCommand::Slower { respond_to })
            .await?
    }

    pub async fn toggle_fullscreen(&self) -> PlayerResult<()> {
        self.request(|respond_to| PlayerCommand::ToggleFullscreen { respond_to })
            .await?
    }

    pub async fn set_display_mode(&self, mode: DisplayMode) -> PlayerResult<()> {
        self.request(|respond_to| PlayerCommand::SetDisplayMode { mode, respond_to })
            .await
    }

    /// Report pointer activity. Does not wait for the controller.
    pub fn pointer(&self, activity: PointerActivity) -> PlayerResult<()> {
        self.sender
            .send(PlayerCommand::Pointer { activity })
            .map_err(|_| PlayerError::ControllerDisconnected)
    }

    pub async fn snapshot(&self) -> PlayerResult<PlayerSnapshot> {
        self.request(|respond_to| PlayerCommand::GetSnapshot { respond_to })
            .await
    }

    /// Receiver that sees a new snapshot after every input the controller
    /// handles.
    pub fn subscribe(&self) -> watch::Receiver<PlayerSnapshot> {
        self.snapshots.clone()
    }

    /// Stop the controller loop. The attached resource is released.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
