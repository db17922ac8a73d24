//! In-memory media resource.
//!
//! Behaves like a media element whose notifications are delivered by an event
//! loop: commands change the live fields immediately and queue the matching
//! notification. Queued notifications reach subscribers on
//! [`SimulatedResource::deliver_pending`], or straight away in auto-deliver
//! mode. The demo binary and the test suites drive the controls through it.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::trace;

use super::traits::{MediaErrorKind, MediaEvent, MediaResource, SubscriptionId};

/// Commands received from the controls, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceCommand {
    Play,
    Pause,
    SeekTo(f64),
    SetVolume(f64),
    SetMuted(bool),
    SetPlaybackRate(f64),
    RequestFullscreen,
    ExitFullscreen,
}

#[derive(Debug)]
struct Inner {
    natural_size: (u32, u32),
    media_duration: f64,
    metadata_loaded: bool,
    current_time: f64,
    volume: f64,
    muted: bool,
    playback_rate: f64,
    paused: bool,
    fullscreen_supported: bool,
    fullscreen: bool,
    auto_deliver: bool,
    next_subscription: u64,
    subscribers: HashMap<SubscriptionId, mpsc::UnboundedSender<MediaEvent>>,
    pending: VecDeque<MediaEvent>,
    commands: Vec<ResourceCommand>,
}

impl Inner {
    fn queue(&mut self, event: MediaEvent) {
        self.pending.push_back(event);
        if self.auto_deliver {
            self.flush();
        }
    }

    fn flush(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.pending.pop_front() {
            trace!("Delivering {:?} to {} subscriber(s)", event, self.subscribers.len());
            self.subscribers
                .retain(|_, sender| sender.send(event.clone()).is_ok());
            delivered += 1;
        }
        delivered
    }
}

#[derive(Debug)]
pub struct SimulatedResource {
    inner: Mutex<Inner>,
}

impl SimulatedResource {
    /// A resource of the given natural size and duration whose metadata has
    /// not loaded yet.
    pub fn new(width: u32, height: u32, duration: f64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                natural_size: (width, height),
                media_duration: duration,
                metadata_loaded: false,
                current_time: 0.0,
                volume: 1.0,
                muted: false,
                playback_rate: 1.0,
                paused: true,
                fullscreen_supported: true,
                fullscreen: false,
                auto_deliver: false,
                next_subscription: 0,
                subscribers: HashMap::new(),
                pending: VecDeque::new(),
                commands: Vec::new(),
            }),
        }
    }

    pub fn with_fullscreen_support(self, supported: bool) -> Self {
        self.lock().fullscreen_supported = supported;
        self
    }

    /// Deliver every notification as soon as it is queued.
    pub fn with_auto_deliver(self, auto_deliver: bool) -> Self {
        self.lock().auto_deliver = auto_deliver;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make size and duration readable and queue `MetadataReady`.
    pub fn load_metadata(&self) {
        let mut inner = self.lock();
        inner.metadata_loaded = true;
        inner.queue(MediaEvent::MetadataReady);
    }

    /// Let playback time pass. Reaching the end pauses and queues `Ended`.
    pub fn advance(&self, seconds: f64) {
        let mut inner = self.lock();
        if inner.paused || !inner.metadata_loaded {
            return;
        }
        let next = inner.current_time + seconds * inner.playback_rate;
        inner.current_time = next.min(inner.media_duration);
        inner.queue(MediaEvent::TimeAdvanced);

        if inner.current_time >= inner.media_duration {
            inner.paused = true;
            inner.queue(MediaEvent::Ended);
        }
    }

    pub fn start_buffering(&self) {
        self.lock().queue(MediaEvent::BufferingStarted);
    }

    pub fn end_buffering(&self) {
        self.lock().queue(MediaEvent::BufferingEnded);
    }

    pub fn fail(&self, kind: MediaErrorKind) {
        self.lock().queue(MediaEvent::Failed(kind));
    }

    /// Queue an arbitrary notification.
    pub fn emit(&self, event: MediaEvent) {
        self.lock().queue(event);
    }

    /// Hand every queued notification to the subscribers, oldest first.
    pub fn deliver_pending(&self) -> usize {
        self.lock().flush()
    }

    pub fn commands(&self) -> Vec<ResourceCommand> {
        self.lock().commands.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

impl MediaResource for SimulatedResource {
    fn natural_width(&self) -> u32 {
        let inner = self.lock();
        if inner.metadata_loaded { inner.natural_size.0 } else { 0 }
    }

    fn natural_height(&self) -> u32 {
        let inner = self.lock();
        if inner.metadata_loaded { inner.natural_size.1 } else { 0 }
    }

    fn duration(&self) -> f64 {
        let inner = self.lock();
        if inner.metadata_loaded {
            inner.media_duration
        } else {
            f64::NAN
        }
    }

    fn current_time(&self) -> f64 {
        self.lock().current_time
    }

    fn volume(&self) -> f64 {
        self.lock().volume
    }

    fn muted(&self) -> bool {
        self.lock().muted
    }

    fn playback_rate(&self) -> f64 {
        self.lock().playback_rate
    }

    fn paused(&self) -> bool {
        self.lock().paused
    }

    fn play(&self) {
        let mut inner = self.lock();
        inner.commands.push(ResourceCommand::Play);
        inner.paused = false;
        inner.queue(MediaEvent::Started);
    }

    fn pause(&self) {
        let mut inner = self.lock();
        inner.commands.push(ResourceCommand::Pause);
        inner.paused = true;
        inner.queue(MediaEvent::Stopped);
    }

    fn seek_to(&self, time: f64) {
        let mut inner = self.lock();
        inner.commands.push(ResourceCommand::SeekTo(time));
        inner.current_time = time;
        inner.queue(MediaEvent::TimeAdvanced);
    }

    fn set_volume(&self, volume: f64) {
        let mut inner = self.lock();
        inner.commands.push(ResourceCommand::SetVolume(volume));
        inner.volume = volume;
        inner.queue(MediaEvent::VolumeChanged);
    }

    fn set_muted(&self, muted: bool) {
        let mut inner = self.lock();
        inner.commands.push(ResourceCommand::SetMuted(muted));
        inner.muted = muted;
        inner.queue(MediaEvent::VolumeChanged);
    }

    fn set_playback_rate(&self, rate: f64) {
        let mut inner = self.lock();
        inner.commands.push(ResourceCommand::SetPlaybackRate(rate));
        inner.playback_rate = rate;
        inner.queue(MediaEvent::RateChanged);
    }

    fn supports_fullscreen(&self) -> bool {
        self.lock().fullscreen_supported
    }

    fn is_fullscreen(&self) -> bool {
        self.lock().fullscreen
    }

    fn request_fullscreen(&self) {
        let mut inner = self.lock();
        inner.commands.push(ResourceCommand::RequestFullscreen);
        if inner.fullscreen_supported {
            inner.fullscreen = true;
            inner.queue(MediaEvent::FullscreenChanged);
        }
    }

    fn exit_fullscreen(&self) {
        let mut inner = self.lock();
        inner.commands.push(ResourceCommand::ExitFullscreen);
        if inner.fullscreen {
            inner.fullscreen = false;
            inner.queue(MediaEvent::FullscreenChanged);
        }
    }

    fn subscribe(&self, sink: mpsc::UnboundedSender<MediaEvent>) -> SubscriptionId {
        let mut inner = self.lock();
        inner.next_subscription += 1;
        let id = SubscriptionId(inner.next_subscription);
        inner.subscribers.insert(id, sink);
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().subscribers.remove(&id);
    }
}
