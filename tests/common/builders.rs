use std::sync::Arc;
use trainreel::player::{MediaResource, SimulatedResource};

pub struct ResourceBuilder {
    width: u32,
    height: u32,
    duration: f64,
    metadata_loaded: bool,
    auto_deliver: bool,
    fullscreen: bool,
}

impl ResourceBuilder {
    pub fn landscape() -> Self {
        Self::sized(1920, 1080)
    }

    pub fn portrait() -> Self {
        Self::sized(1080, 1920)
    }

    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            duration: 120.0,
            metadata_loaded: false,
            auto_deliver: false,
            fullscreen: true,
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Metadata is readable before anything subscribes.
    pub fn loaded(mut self) -> Self {
        self.metadata_loaded = true;
        self
    }

    pub fn auto_deliver(mut self) -> Self {
        self.auto_deliver = true;
        self
    }

    pub fn without_fullscreen(mut self) -> Self {
        self.fullscreen = false;
        self
    }

    pub fn build(self) -> Arc<SimulatedResource> {
        let resource = SimulatedResource::new(self.width, self.height, self.duration)
            .with_fullscreen_support(self.fullscreen)
            .with_auto_deliver(self.auto_deliver);
        if self.metadata_loaded {
            resource.load_metadata();
            // nobody is subscribed yet
            resource.deliver_pending();
        }
        Arc::new(resource)
    }
}

pub fn as_dyn(resource: &Arc<SimulatedResource>) -> Arc<dyn MediaResource> {
    resource.clone()
}
