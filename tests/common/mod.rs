#![allow(dead_code)]

pub mod builders;
pub mod fixtures;

use std::sync::Arc;
use tokio::time::Instant;
use trainreel::config::Config;
use trainreel::player::{PlayerSession, SimulatedResource};

pub use builders::{ResourceBuilder, as_dyn};

pub struct TestSession {
    pub session: PlayerSession,
    pub resource: Arc<SimulatedResource>,
    pub started: Instant,
}

impl TestSession {
    pub fn attach(resource: Arc<SimulatedResource>) -> Self {
        Self::attach_with(resource, &Config::default())
    }

    pub fn attach_with(resource: Arc<SimulatedResource>, config: &Config) -> Self {
        let started = Instant::now();
        let mut session = PlayerSession::new(config);
        session.attach(&as_dyn(&resource), started);
        Self {
            session,
            resource,
            started,
        }
    }

    /// Deliver everything the resource queued and apply it at `now`.
    pub fn acknowledge(&mut self, now: Instant) -> usize {
        self.resource.deliver_pending();
        self.session.pump_events(now)
    }

    pub fn at(&self, millis: u64) -> Instant {
        self.started + std::time::Duration::from_millis(millis)
    }
}
