//! Change feed for store mutations.
//!
//! Callbacks receive the username passed to the mutating call and the full
//! collection after the write. Invocation order across subscribers is
//! unspecified.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

type Callback<T> = Arc<dyn Fn(&str, &[T]) + Send + Sync>;

struct ListenerTable<T> {
    next_id: u64,
    callbacks: BTreeMap<u64, Callback<T>>,
}

/// Registry of change callbacks for one store.
pub struct Listeners<T> {
    table: Arc<Mutex<ListenerTable<T>>>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            table: Arc::new(Mutex::new(ListenerTable {
                next_id: 0,
                callbacks: BTreeMap::new(),
            })),
        }
    }
}

impl<T> Listeners<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` until the returned handle is unsubscribed.
    ///
    /// Nothing is delivered at registration. The first call happens on the
    /// next write; callers seed their view from the store's `list`.
    pub fn subscribe<F>(&self, callback: F) -> Subscription<T>
    where
        F: Fn(&str, &[T]) + Send + Sync + 'static,
    {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        let id = table.next_id;
        table.next_id += 1;
        table.callbacks.insert(id, Arc::new(callback));
        Subscription {
            id,
            table: Arc::downgrade(&self.table),
        }
    }

    pub fn len(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .callbacks
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers `items` to every subscriber.
    ///
    /// The table lock is released before callbacks run, so callbacks may
    /// subscribe or unsubscribe.
    pub fn notify(&self, username: &str, items: &[T]) {
        let callbacks: Vec<Callback<T>> = self
            .table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .callbacks
            .values()
            .cloned()
            .collect();
        for callback in callbacks {
            callback(username, items);
        }
    }
}

/// Handle returned by `Listeners::subscribe`.
#[must_use = "dropping the handle keeps the callback registered; call `unsubscribe` to stop it"]
pub struct Subscription<T> {
    id: u64,
    table: Weak<Mutex<ListenerTable<T>>>,
}

impl<T> Subscription<T> {
    /// Stops delivery to this subscriber. No-op if the store is gone.
    pub fn unsubscribe(self) {
        if let Some(table) = self.table.upgrade() {
            table
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .callbacks
                .remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Listeners;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn unsubscribed_callback_is_not_called() {
        let listeners: Listeners<u32> = Listeners::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let subscription = listeners.subscribe(move |_, items| {
            counter.fetch_add(items.len(), Ordering::SeqCst);
        });

        listeners.notify("ana", &[1, 2]);
        subscription.unsubscribe();
        listeners.notify("ana", &[1, 2, 3]);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(listeners.is_empty());
    }
}
