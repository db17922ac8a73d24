use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::traits::{MediaEvent, MediaResource, SubscriptionId};

/// Scoped registration against a [`MediaResource`].
///
/// Acquiring subscribes; dropping unsubscribes, so every exit path (detach,
/// resource swap, error, unwinding) releases the registration. Only a weak
/// reference to the resource is kept: the host stays the sole owner.
pub struct Subscription {
    resource: Weak<dyn MediaResource>,
    id: SubscriptionId,
    receiver: mpsc::UnboundedReceiver<MediaEvent>,
    exhausted: bool,
}

impl Subscription {
    pub fn acquire(resource: &Arc<dyn MediaResource>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = resource.subscribe(sender);
        debug!("Subscribed to media resource as {:?}", id);

        Self {
            resource: Arc::downgrade(resource),
            id,
            receiver,
            exhausted: false,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The resource, if the host still holds it.
    pub fn resource(&self) -> Option<Arc<dyn MediaResource>> {
        self.resource.upgrade()
    }

    /// Next notification in delivery order. Yields `None` once when the
    /// resource drops its sender, then stays pending.
    pub async fn recv(&mut self) -> Option<MediaEvent> {
        if self.exhausted {
            return std::future::pending().await;
        }
        let event = self.receiver.recv().await;
        if event.is_none() {
            self.exhausted = true;
        }
        event
    }

    /// Drain without waiting.
    pub fn try_recv(&mut self) -> Option<MediaEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.receiver.close();
        match self.resource.upgrade() {
            Some(resource) => {
                resource.unsubscribe(self.id);
                debug!("Unsubscribed {:?} from media resource", self.id);
            }
            None => trace!("Media resource already gone, nothing to unsubscribe"),
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("resource_alive", &(self.resource.strong_count() > 0))
            .finish()
    }
}
