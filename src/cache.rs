//! # In-Flight Request Cache
//!
//! Coalesces concurrent network operations that target the same wire path.
//!
//! The first caller for a path starts the operation; every caller that arrives while it is
//! still pending attaches to the same shared cell and receives a clone of the same outcome.
//! Once the operation settles (success or failure) the entry is removed, so the next call
//! for that path always starts fresh.
//!
//! Only the network call is shared. Each caller still drives its own continuation, which
//! is what lets the dispatcher emit one start/terminal transition pair per caller.
//!
//! Waiters resume in the order they attached.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;
use tracing::debug;

type Entry<T> = Arc<OnceCell<T>>;

/// Process-wide map from wire path to a pending operation.
///
/// Owned by one dispatcher instance (and its clones) rather than being a global, so tests
/// get isolated caches.
pub struct InFlightCache<T> {
    entries: Mutex<HashMap<String, Entry<T>>>,
}

impl<T> Default for InFlightCache<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Clone> InFlightCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the outcome of the operation pending for `path`, starting it with `start`
    /// if there is none.
    ///
    /// `start` is only invoked when this caller ends up driving the operation.
    pub async fn acquire<F, Fut>(&self, path: &str, start: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let (cell, attached) = {
            let mut entries = self.lock();
            match entries.get(path) {
                Some(cell) => (cell.clone(), true),
                None => {
                    let cell: Entry<T> = Arc::new(OnceCell::new());
                    entries.insert(path.to_string(), cell.clone());
                    (cell, false)
                }
            }
        };
        debug!(path, attached, "Acquire");

        let settled = &cell;
        let outcome = cell
            .get_or_init(|| async move {
                let outcome = start().await;
                self.settle(path, settled);
                outcome
            })
            .await;
        outcome.clone()
    }

    /// Removes the entry for `path` if it still refers to `cell`.
    fn settle(&self, path: &str, cell: &Entry<T>) {
        let mut entries = self.lock();
        if entries.get(path).is_some_and(|current| Arc::ptr_eq(current, cell)) {
            entries.remove(path);
            debug!(path, "Settled");
        }
    }

    /// Whether an operation is currently pending for `path`.
    pub fn is_pending(&self, path: &str) -> bool {
        self.lock().contains_key(path)
    }

    /// Number of pending operations.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
