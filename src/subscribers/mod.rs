//! # Event subscribers: observer interface and fan-out.
//!
//! Subscribers consume the scheduler's runtime events off the bus without
//! touching the dispatch path:
//!
//! ```text
//!   Bus ──▶ listener ──▶ SubscriberSet ──┬──▶ [queue] ─▶ worker ─▶ Subscriber A
//!                                        └──▶ [queue] ─▶ worker ─▶ Subscriber B
//! ```
//!
//! Each subscriber gets its own bounded queue and worker task, so a slow or
//! panicking subscriber can drop its own events but never stalls the
//! scheduler or its peers.

mod log;
mod set;
mod subscriber;

pub use log::LogWriter;
pub use subscriber::Subscriber;

pub(crate) use set::SubscriberSet;
