//! Channel-based ingestion boundary.
//!
//! Host surfaces push input events through a cloneable [`InputHandle`]; the
//! engine loop is the single consumer. Serializing all ingestion through
//! one channel is what lets the engine itself stay lock-free.

use crate::collector::types::InputEvent;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Default channel capacity.
const DEFAULT_CAPACITY: usize = 10_000;

/// Owns the event channel between host surfaces and the engine loop.
pub struct ChannelCollector {
    sender: Sender<InputEvent>,
    receiver: Receiver<InputEvent>,
}

impl ChannelCollector {
    /// Create a collector with a bounded channel of the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// A cloneable producer handle for host surfaces.
    pub fn handle(&self) -> InputHandle {
        InputHandle {
            sender: self.sender.clone(),
        }
    }

    /// The consuming end of the channel.
    pub fn receiver(&self) -> &Receiver<InputEvent> {
        &self.receiver
    }

    /// Split into a producer handle and the consuming end, dropping the
    /// collector's own sender so the channel disconnects once every handle
    /// is gone.
    pub fn into_parts(self) -> (InputHandle, Receiver<InputEvent>) {
        (InputHandle { sender: self.sender }, self.receiver)
    }
}

impl Default for ChannelCollector {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Cloneable producer handle for pushing input events to the engine loop.
#[derive(Clone)]
pub struct InputHandle {
    sender: Sender<InputEvent>,
}

impl InputHandle {
    /// Report entered text.
    pub fn chars_entered(&self, text: impl Into<String>) {
        self.send(InputEvent::entered(text));
    }

    /// Report a deletion of `count` characters.
    pub fn chars_deleted(&self, count: u64) {
        self.send(InputEvent::deleted(count));
    }

    /// Push a pre-built event.
    pub fn send(&self, event: InputEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!("input channel full, dropping event");
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!("input channel disconnected, dropping event");
            }
        }
    }
}
