use crossbeam_channel::{unbounded, Receiver, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
/// Wizard event bus
///
/// Fans engine events out to every view that listens to a wizard session:
/// the step indicator, the toast area, an audit log. Views that went away
/// are dropped from the bus the next time something is published.
use std::sync::Arc;

use super::events::{Notification, WizardEvent};
use super::NotificationSink;

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

struct Subscriber {
    id: SubscriberId,
    sender: Sender<WizardEvent>,
}

/// Shared between clones, so the engine and the views can hold their own copy
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
    next_id: Arc<Mutex<usize>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen to every event published from now on
    pub fn subscribe(&self) -> (Receiver<WizardEvent>, SubscriberId) {
        let (tx, rx) = unbounded();

        let id = {
            let mut next_id = self.next_id.lock();
            let id = SubscriberId(*next_id);
            *next_id += 1;
            id
        };

        self.subscribers.write().push(Subscriber { id, sender: tx });
        tracing::trace!(target: "claimdesk::events", subscriber = id.0, "Subscribed");

        (rx, id)
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.write().retain(|s| s.id != id);
    }

    /// Deliver `event` to every live subscriber
    ///
    /// Subscribers whose receiver was dropped are removed.
    pub fn publish(&self, event: WizardEvent) {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();

        subscribers.retain(|subscriber| {
            !matches!(
                subscriber.sender.try_send(event.clone()),
                Err(TrySendError::Disconnected(_))
            )
        });

        let pruned = before - subscribers.len();
        if pruned > 0 {
            tracing::debug!(target: "claimdesk::events", pruned, "Dropped closed subscribers");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl NotificationSink for EventBus {
    fn notify(&self, notification: Notification) {
        self.publish(WizardEvent::Notice(notification));
    }

    fn emit(&self, event: WizardEvent) {
        self.publish(event);
    }
}
