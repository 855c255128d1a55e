//! Per-subscriber queues and worker tasks.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::core::panic_message;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscriber;

struct Entry {
    name: &'static str,
    tx: mpsc::Sender<Event>,
}

/// Fan-out stage between the bus listener and registered subscribers.
///
/// ## Rules
/// - **One worker per subscriber**: events are processed in order per
///   subscriber, concurrently across subscribers.
/// - **Never blocks**: `emit` uses `try_send`; a full queue drops the event
///   for that subscriber only.
/// - **Self-reports once**: drops and panics are published back to the bus
///   as subscriber events, except when the troubled event is itself a
///   subscriber event (that would amplify while the queue stays full).
pub(crate) struct SubscriberSet {
    entries: Vec<Entry>,
    bus: Bus,
}

/// True for events reporting subscriber trouble; these are never re-reported.
fn is_subscriber_event(kind: EventKind) -> bool {
    matches!(
        kind,
        EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
    )
}

impl SubscriberSet {
    /// Spawns a worker per subscriber. Must be called from within a tokio
    /// runtime.
    pub(crate) fn new(subs: Vec<Arc<dyn Subscriber>>, bus: &Bus) -> Self {
        let entries = subs
            .into_iter()
            .map(|sub| {
                let name = sub.name();
                let (tx, rx) = mpsc::channel::<Event>(sub.queue_capacity().max(1));
                tokio::spawn(worker(sub, rx, bus.clone()));
                Entry { name, tx }
            })
            .collect();
        Self {
            entries,
            bus: bus.clone(),
        }
    }

    pub(crate) fn emit(&self, ev: &Event) {
        for entry in &self.entries {
            match entry.tx.try_send(ev.clone()) {
                Ok(()) => {}
                Err(err) => {
                    let reason = match err {
                        TrySendError::Full(_) => "queue_full",
                        TrySendError::Closed(_) => "worker_closed",
                    };
                    tracing::warn!(subscriber = entry.name, reason, "subscriber event dropped");
                    if !is_subscriber_event(ev.kind) {
                        self.bus.publish(Event::subscriber_overflow(entry.name, reason));
                    }
                }
            }
        }
    }
}

async fn worker(sub: Arc<dyn Subscriber>, mut rx: mpsc::Receiver<Event>, bus: Bus) {
    let name = sub.name();
    while let Some(ev) = rx.recv().await {
        let kind = ev.kind;
        if let Err(payload) = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await {
            let info = panic_message(payload);
            tracing::error!(subscriber = name, info, "subscriber panicked");
            if !is_subscriber_event(kind) {
                bus.publish(Event::subscriber_panicked(name, info));
            }
        }
    }
}
