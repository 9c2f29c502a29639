/// Messaging module for wizard notifications
///
/// The engine reports what happened through a [`NotificationSink`]:
/// - **Notifications**: user-visible success/failure messages (fire-and-forget)
/// - **Events**: everything the engine did, for views and logs that follow along
///
/// ## Architecture
///
/// ```text
/// ┌──────────────┐   notify / publish   ┌─────────────┐
/// │ WizardEngine │ ───────────────────> │  Event Bus  │
/// └──────────────┘                      └─────────────┘
///                                              │
///                                              │ Publishes
///                                              ▼
///                                        ┌──────────┐
///                                        │ Handlers │
///                                        │ (toasts, │
///                                        │  views)  │
///                                        └──────────┘
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// let event_bus = EventBus::new();
/// let (rx, _id) = event_bus.subscribe();
///
/// let mut engine = WizardEngine::new(steps, record)?.with_sink(Arc::new(event_bus.clone()));
/// engine.go_next();
///
/// while let Ok(event) = rx.try_recv() {
///     if let WizardEvent::Notice(notice) = event {
///         show_toast(&notice);
///     }
/// }
/// ```

pub mod events;
pub mod bus;

// Re-export commonly used types
pub use events::{Notification, NoticeLevel, WizardEvent};
pub use bus::{EventBus, SubscriberId};

/// Receiver of everything the wizard engine reports
///
/// Calls are fire-and-forget: a sink never fails back into the engine.
pub trait NotificationSink: Send + Sync {
    /// Surface a user-visible notification
    fn notify(&self, notification: Notification);

    /// Record an engine event. Ignored by default.
    fn emit(&self, event: WizardEvent) {
        let _ = event;
    }
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _notification: Notification) {}
}
