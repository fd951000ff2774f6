use crate::geolocation::PositionEvent;
use futures::{
    channel::mpsc::{self, UnboundedReceiver, UnboundedSender},
    Stream,
};
use std::{
    pin::Pin,
    sync::{Arc, Mutex, PoisonError},
    task::{Context, Poll},
};

/// Fan-out of position events to any number of listeners.
///
/// The host page publishes its own position-success events here; the
/// indicator subscribes as one more listener instead of replacing the
/// host's handler.
#[derive(Clone, Default)]
pub struct PositionBus {
    listeners: Arc<Mutex<Vec<UnboundedSender<PositionEvent>>>>,
}

/// Receiving end of a bus subscription; dropping it unsubscribes
pub struct PositionSubscription {
    receiver: UnboundedReceiver<PositionEvent>,
}

impl PositionBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> PositionSubscription {
        let (sender, receiver) = mpsc::unbounded();
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sender);
        PositionSubscription { receiver }
    }

    /// Delivers `event` to every live listener and returns how many got it
    pub fn publish(&self, event: PositionEvent) -> usize {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|listener| listener.unbounded_send(event).is_ok());
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|listener| !listener.is_closed());
        listeners.len()
    }
}

impl Stream for PositionSubscription {
    type Item = PositionEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}
