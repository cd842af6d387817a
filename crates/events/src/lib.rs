//! Progress event plumbing between a playbook worker and status pollers.
//!
//! - [`ProgressEvent`]: one immutable progress record emitted by the worker.
//! - [`channel`]: unbounded FIFO queue ([`EventSender`] / [`EventReceiver`])
//!   that never blocks the producer.
//! - [`StatusAggregator`]: single consumer that drains the queue on demand
//!   and folds events into a poll-friendly [`RunStatus`] snapshot.

pub mod aggregator;
pub mod channel;
pub mod event;

pub use aggregator::{RunStatus, StatusAggregator};
pub use channel::{channel, ChannelClosed, EventReceiver, EventSender};
pub use event::ProgressEvent;
