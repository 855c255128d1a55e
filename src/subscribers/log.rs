//! Built-in subscriber that writes events to the `tracing` log.

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscriber;

/// Logs every runtime event via `tracing`.
///
/// Failures and subscriber trouble go to `warn`, everything else to `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

#[async_trait]
impl Subscriber for LogWriter {
    async fn on_event(&self, event: &Event) {
        let job = event.job.as_deref().unwrap_or("-");
        let reason = event.reason.as_deref().unwrap_or("");
        match event.kind {
            EventKind::JobFailed => {
                tracing::warn!(seq = event.seq, job, run = event.run, reason, "job failed")
            }
            EventKind::GraceExceeded => {
                tracing::warn!(seq = event.seq, reason, "shutdown grace exceeded")
            }
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {
                tracing::warn!(seq = event.seq, subscriber = job, reason, "subscriber trouble")
            }
            EventKind::JobAdded => tracing::info!(
                seq = event.seq,
                job,
                next_run = ?event.next_run,
                "job added"
            ),
            EventKind::JobRemoved => tracing::info!(seq = event.seq, job, "job removed"),
            EventKind::JobFinished => {
                tracing::info!(seq = event.seq, job, run = event.run, reason, "job finished")
            }
            EventKind::JobStarting => tracing::info!(
                seq = event.seq,
                job,
                run = event.run,
                next_run = ?event.next_run,
                "job starting"
            ),
            EventKind::JobCompleted => {
                tracing::info!(seq = event.seq, job, run = event.run, "job completed")
            }
            EventKind::JobSkipped => tracing::info!(
                seq = event.seq,
                job,
                next_run = ?event.next_run,
                "firing skipped"
            ),
            EventKind::JobDeferred => {
                tracing::info!(seq = event.seq, job, "firing deferred")
            }
            EventKind::ShutdownRequested => {
                tracing::info!(seq = event.seq, "shutdown requested")
            }
            EventKind::AllStoppedWithin => {
                tracing::info!(seq = event.seq, "all executions drained")
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
