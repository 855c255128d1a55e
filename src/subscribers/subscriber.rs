//! Subscriber trait for observing runtime events.

use async_trait::async_trait;

use crate::events::Event;

/// # Observer of scheduler runtime events.
///
/// Implementations are registered via
/// [`SchedulerBuilder::with_subscriber`](crate::SchedulerBuilder::with_subscriber)
/// and receive every bus event in order, on a dedicated worker task.
///
/// ## Rules
/// - **Isolation**: a panic in `on_event` is caught by the worker and
///   reported; it never affects other subscribers or the scheduler.
/// - **Backpressure**: events queue up to [`queue_capacity`]; beyond that
///   they are dropped for this subscriber (and the drop is reported).
///
/// [`queue_capacity`]: Subscriber::queue_capacity
#[async_trait]
pub trait Subscriber: Send + Sync + 'static {
    /// Handles one event. Keep it quick; long work should be offloaded.
    async fn on_event(&self, event: &Event);

    /// Stable name used in drop/panic reports.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of this subscriber's event queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
