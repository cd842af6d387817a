//! Unbounded FIFO channel carrying [`ProgressEvent`]s out of the worker.
//!
//! Backed by `tokio::sync::mpsc::unbounded_channel`. Sending is a plain
//! synchronous call, so engine hooks running anywhere (async task or
//! blocking thread) can emit without awaiting. Draining is non-blocking and
//! is serialized by the owning `StatusAggregator`.

use tokio::sync::mpsc;

use crate::event::ProgressEvent;

/// Returned by [`EventSender::send`] once the receiving side is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("progress event channel is closed")]
pub struct ChannelClosed;

/// Producer half. Cheap to clone; every clone feeds the same queue.
#[derive(Debug, Clone)]
pub struct EventSender {
    inner: mpsc::UnboundedSender<ProgressEvent>,
}

/// Consumer half.
#[derive(Debug)]
pub struct EventReceiver {
    inner: mpsc::UnboundedReceiver<ProgressEvent>,
}

/// Open a new event channel.
pub fn channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { inner: tx }, EventReceiver { inner: rx })
}

impl EventSender {
    /// Queue `event`. Never blocks.
    pub fn send(&self, event: ProgressEvent) -> Result<(), ChannelClosed> {
        self.inner.send(event).map_err(|_| ChannelClosed)
    }

    /// Whether the receiver has been dropped (the run was superseded).
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl EventReceiver {
    /// Drain every queued event in emission order without waiting.
    ///
    /// Returns an empty vec when nothing is pending, including after all
    /// senders have been dropped.
    pub fn try_receive_all(&mut self) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.inner.try_recv() {
            events.push(event);
        }
        events
    }
}
