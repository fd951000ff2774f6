//! One-shot "map is ready" notification
//!
//! The host initialises its map asynchronously. Rather than polling for the
//! map to appear, both controllers await a shared future that the map's
//! initialiser resolves exactly once.

use crate::{Error, Result};
use futures::{
    channel::oneshot,
    future::{FutureExt, Shared},
};
use std::sync::{Arc, Mutex};

/// Map handle shared between the host page and the navigation controllers
pub type SharedMap<M> = Arc<Mutex<M>>;

/// Resolving half, held by whatever code creates the map
pub struct MapReadyNotifier<M> {
    sender: oneshot::Sender<SharedMap<M>>,
}

/// Awaiting half; cheap to clone, every clone resolves to the same map
pub struct MapReady<M> {
    inner: Shared<oneshot::Receiver<SharedMap<M>>>,
}

/// Creates a linked notifier/waiter pair.
pub fn map_ready<M>() -> (MapReadyNotifier<M>, MapReady<M>) {
    let (sender, receiver) = oneshot::channel();
    (
        MapReadyNotifier { sender },
        MapReady {
            inner: receiver.shared(),
        },
    )
}

impl<M> MapReadyNotifier<M> {
    /// Publishes the map. Returns false if every waiter has already gone away.
    pub fn notify(self, map: SharedMap<M>) -> bool {
        self.sender.send(map).is_ok()
    }
}

impl<M> MapReady<M> {
    /// Waits for the map. Fails with [`Error::MapUnavailable`] when the
    /// notifier is dropped without ever publishing one.
    pub async fn wait(self) -> Result<SharedMap<M>> {
        self.inner.await.map_err(|_| Error::MapUnavailable)
    }

    /// The map, if it has already been published and observed.
    pub fn now(&self) -> Option<SharedMap<M>> {
        self.inner.peek().and_then(|result| result.as_ref().ok().cloned())
    }
}

impl<M> Clone for MapReady<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_all_waiters_see_the_same_map() {
        let (notifier, ready) = map_ready::<u32>();
        let other = ready.clone();
        let map = Arc::new(Mutex::new(7));

        assert!(notifier.notify(map.clone()));

        let first = block_on(ready.wait()).unwrap();
        let second = block_on(other.wait()).unwrap();
        assert!(Arc::ptr_eq(&first, &map));
        assert!(Arc::ptr_eq(&second, &map));
    }

    #[test]
    fn test_dropped_notifier_reports_unavailable() {
        let (notifier, ready) = map_ready::<u32>();
        drop(notifier);
        assert!(matches!(block_on(ready.wait()), Err(Error::MapUnavailable)));
    }

    #[test]
    fn test_now_is_none_before_resolution() {
        let (_notifier, ready) = map_ready::<u32>();
        assert!(ready.now().is_none());
    }
}
