//! Change notification for page cache observers.
//!
//! Observers register a zero-argument callback and get a [`Subscription`]
//! back. A notification only says "something changed"; observers pull
//! whatever state they need from the cache themselves.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

type Callback = Arc<dyn Fn() + Send + Sync>;

struct Entry {
    id: usize,
    active: Arc<AtomicBool>,
    callback: Callback,
}

/// Registry of observer callbacks, invoked in registration order.
///
/// Wrap in `Arc` to enable subscriptions.
pub struct ChangeNotifier {
    entries: Mutex<Vec<Entry>>,
    next_id: AtomicUsize,
}

/// Handle returned by [`ChangeNotifier::subscribe`].
///
/// Call [`unsubscribe`](Subscription::unsubscribe) or drop the handle to stop
/// receiving notifications. Unsubscribing more than once is a no-op.
#[must_use = "dropping a Subscription unsubscribes it immediately"]
pub struct Subscription {
    notifier: Weak<ChangeNotifier>,
    id: usize,
    active: Arc<AtomicBool>,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(notifier) = self.notifier.upgrade() {
            notifier.remove(self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(0),
        }
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`. Subscribing from inside a callback is allowed; the
    /// new subscriber first hears about the next round.
    pub fn subscribe(
        self: &Arc<Self>,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));

        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Entry {
                id,
                active: Arc::clone(&active),
                callback: Arc::new(callback),
            });
        tracing::trace!(subscription = id, "observer subscribed");

        Subscription {
            notifier: Arc::downgrade(self),
            id,
            active,
        }
    }

    fn remove(&self, id: usize) {
        let removed: Vec<Entry> = {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            let (removed, kept) = entries.drain(..).partition(|entry| entry.id == id);
            *entries = kept;
            removed
        };
        // A callback may own other subscriptions on this notifier; their
        // Drop re-enters `remove`, so release the lock first.
        drop(removed);
        tracing::trace!(subscription = id, "observer unsubscribed");
    }

    pub fn subscriber_count(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Invoke every registered callback. A panicking callback is logged and
    /// skipped; the rest still run. Returns how many callbacks completed.
    pub fn notify_all(&self) -> usize {
        // The lock is released before any callback runs so callbacks may
        // subscribe or unsubscribe freely.
        let round: Vec<(usize, Arc<AtomicBool>, Callback)> = self
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|entry| {
                (
                    entry.id,
                    Arc::clone(&entry.active),
                    Arc::clone(&entry.callback),
                )
            })
            .collect();

        let mut delivered = 0;
        for (id, active, callback) in round {
            // unsubscribed earlier in this round
            if !active.load(Ordering::Acquire) {
                continue;
            }

            match catch_unwind(AssertUnwindSafe(|| callback())) {
                Ok(()) => delivered += 1,
                Err(payload) => {
                    tracing::error!(
                        subscription = id,
                        reason = %panic_message(payload.as_ref()),
                        "observer panicked during change notification"
                    );
                }
            }
        }

        tracing::debug!(delivered, "change notification fanned out");
        delivered
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}
