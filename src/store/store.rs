use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};

type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registered callbacks of a store, keyed by subscription id.
struct Subscribers<T> {
    next_id: AtomicUsize,
    entries: RwLock<Vec<(usize, Subscriber<T>)>>,
}

impl<T> Subscribers<T> {
    fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(0),
            entries: RwLock::new(Vec::new()),
        }
    }

    fn insert(&self, subscriber: Subscriber<T>) -> usize {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        write_lock(&self.entries).push((id, subscriber));
        id
    }

    fn snapshot(&self) -> Vec<Subscriber<T>> {
        read_lock(&self.entries)
            .iter()
            .map(|(_, subscriber)| Arc::clone(subscriber))
            .collect()
    }

    fn len(&self) -> usize {
        read_lock(&self.entries).len()
    }
}

/// Type-erased view of [`Subscribers`] so a [`Subscription`] does not carry `T`.
trait Registry: Send + Sync {
    fn remove(&self, id: usize);
}

impl<T> Registry for Subscribers<T> {
    fn remove(&self, id: usize) {
        write_lock(&self.entries).retain(|(entry, _)| *entry != id);
    }
}

/// A thread-safe store for managing application state.
///
/// Every change made through [`set`](Store::set), [`update`](Store::update) or
/// a committing [`try_update`](Store::try_update) is delivered to each
/// subscriber exactly once, and changes are delivered in the order they
/// were applied, even when several threads write at once.
///
/// Callbacks run after the state lock is released, so they may read the
/// store. They must not modify the store they are subscribed to: writers
/// hold the delivery lock while callbacks run.
pub struct Store<T> {
    state: Arc<RwLock<T>>,
    subscribers: Arc<Subscribers<T>>,
    // Held from the start of a write until its notifications are done.
    delivery: Arc<Mutex<()>>,
}

impl<T: Clone + 'static> Store<T> {
    /// Create a new store with the given initial state.
    pub fn new(initial: T) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial)),
            subscribers: Arc::new(Subscribers::new()),
            delivery: Arc::new(Mutex::new(())),
        }
    }

    /// Get a clone of the current state.
    pub fn get(&self) -> T {
        read_lock(&self.state).clone()
    }

    /// Update the state using a function.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let _delivery = lock(&self.delivery);
        let snapshot = {
            let mut state = write_lock(&self.state);
            f(&mut state);
            state.clone()
        };
        self.notify(&snapshot);
    }

    /// Set a new state value.
    pub fn set(&self, new_state: T) {
        let _delivery = lock(&self.delivery);
        let snapshot = new_state.clone();
        *write_lock(&self.state) = new_state;
        self.notify(&snapshot);
    }

    /// Apply a fallible change to a draft of the state.
    ///
    /// `f` returns `Ok(true)` when the draft should replace the state. On
    /// `Ok(false)` or `Err` the state is left untouched and no subscriber is
    /// called. The state lock is held while `f` runs, so concurrent updates
    /// are serialized.
    pub fn try_update<F, E>(&self, f: F) -> Result<bool, E>
    where
        F: FnOnce(&mut T) -> Result<bool, E>,
    {
        let _delivery = lock(&self.delivery);
        let snapshot = {
            let mut state = write_lock(&self.state);
            let mut draft = state.clone();
            if !f(&mut draft)? {
                return Ok(false);
            }
            *state = draft;
            state.clone()
        };
        self.notify(&snapshot);
        Ok(true)
    }

    /// Subscribe to state changes.
    ///
    /// The callback will be called whenever the state is updated, until the
    /// returned [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.subscribers.insert(Arc::new(callback));
        let registry: Arc<dyn Registry> = self.subscribers.clone();
        Subscription {
            id,
            registry: Arc::downgrade(&registry),
        }
    }

    /// Subscribe to state changes and call `callback` with the current state
    /// right away.
    pub fn watch<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let callback = Arc::new(callback);
        let _delivery = lock(&self.delivery);
        let subscription = self.subscribe({
            let callback = Arc::clone(&callback);
            move |state| callback(state)
        });
        let current = self.get();
        callback(&current);
        subscription
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Notify all subscribers of a state change.
    fn notify(&self, state: &T) {
        for subscriber in self.subscribers.snapshot() {
            subscriber(state);
        }
    }

    /// Read state without triggering reactivity.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let state = read_lock(&self.state);
        f(&state)
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            subscribers: Arc::clone(&self.subscribers),
            delivery: Arc::clone(&self.delivery),
        }
    }
}

/// Handle for a callback registered with [`Store::subscribe`] or
/// [`Store::watch`].
///
/// Dropping the handle removes the callback.
#[must_use = "dropping a Subscription unsubscribes its callback"]
pub struct Subscription {
    id: usize,
    registry: Weak<dyn Registry>,
}

impl Subscription {
    /// Remove the callback from its store.
    pub fn unsubscribe(self) {}

    /// Keep the callback registered for as long as the store lives.
    pub fn detach(self) {
        std::mem::forget(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
