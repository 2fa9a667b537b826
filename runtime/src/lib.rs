//! # Offerdesk Runtime
//!
//! Runtime implementation for the Offerdesk reducer architecture.
//!
//! This crate provides the [`Store`] that owns the single state tree,
//! serializes every mutation through the reducer, persists a whitelisted
//! projection, and notifies subscribers synchronously.
//!
//! ## Core Components
//!
//! - **Store**: Single-writer owner of the state tree
//! - **Listeners**: Synchronous `(new, previous)` callbacks, optionally gated by a selector
//! - **Persistence**: Optional storage-backed projection written after every commit
//! - **Event Bus**: [`bus::InProcessEventBus`] for topic broadcasts
//!
//! ## Lifecycle
//!
//! `construct → hydrate → run → shutdown` (flushes persistence).
//!
//! ## Example
//!
//! ```ignore
//! use offerdesk_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething)?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field);
//! ```

use offerdesk_core::{effect::Effect, reducer::Reducer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// In-process event bus
pub mod bus;

/// Metric descriptions for observability
pub mod metrics;

mod persist;

pub use persist::Hydration;
pub use store::{Store, Subscription};

/// Error types for the Store runtime
pub mod error {
    use offerdesk_core::environment::StorageError;
    use offerdesk_core::persistence::PersistenceError;
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// The snapshot could not be encoded
        #[error(transparent)]
        Persistence(#[from] PersistenceError),

        /// The storage backend rejected an explicit flush
        #[error(transparent)]
        Storage(#[from] StorageError),
    }
}

pub use error::StoreError;

/// Default capacity of the action broadcast channel
pub const DEFAULT_ACTION_BROADCAST_CAPACITY: usize = 16;

/// Configuration for Store behavior
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::default()
///     .with_storage_key("offerdesk-store-test")
///     .with_action_broadcast_capacity(64);
///
/// let store = Store::with_persistence(state, reducer, env, storage, config);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Override for the storage key (defaults to `Persist::KEY`)
    pub storage_key: Option<String>,
    /// Write the snapshot after every committed action
    ///
    /// When disabled, only [`Store::flush`] and [`Store::shutdown`] write.
    pub persist_on_commit: bool,
    /// Capacity of the action broadcast channel
    pub action_broadcast_capacity: usize,
}

impl StoreConfig {
    /// Set the storage key
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    /// Enable or disable persisting after every commit
    #[must_use]
    pub const fn with_persist_on_commit(mut self, enabled: bool) -> Self {
        self.persist_on_commit = enabled;
        self
    }

    /// Set the action broadcast capacity
    #[must_use]
    pub const fn with_action_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.action_broadcast_capacity = capacity;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: None,
            persist_on_commit: true,
            action_broadcast_capacity: DEFAULT_ACTION_BROADCAST_CAPACITY,
        }
    }
}

type Listener<S> = Arc<dyn Fn(&S, &S) + Send + Sync>;

struct ListenerRegistry<S> {
    next_id: u64,
    entries: Vec<(u64, Listener<S>)>,
}

impl<S> ListenerRegistry<S> {
    const fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    fn insert(&mut self, listener: Listener<S>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    fn snapshot(&self) -> Vec<Listener<S>> {
        self.entries.iter().map(|(_, l)| Arc::clone(l)).collect()
    }
}

/// Store module - the runtime owner of application state
pub mod store {
    use super::{
        Arc, AtomicBool, Effect, Listener, ListenerRegistry, Mutex, Ordering, PoisonError,
        Reducer, RwLock, StoreConfig, StoreError,
    };
    use crate::persist::{Hydration, Persister};
    use offerdesk_core::environment::StateStorage;
    use offerdesk_core::persistence::Persist;
    use std::sync::Weak;
    use tokio::sync::broadcast;

    /// Handle returned by the subscribe methods
    ///
    /// Dropping the handle keeps the listener registered; call
    /// [`Subscription::unsubscribe`] to detach it.
    #[must_use = "keep the handle to be able to unsubscribe later"]
    pub struct Subscription {
        detach: Option<Box<dyn FnOnce() -> bool + Send + Sync>>,
    }

    impl Subscription {
        fn new(detach: impl FnOnce() -> bool + Send + Sync + 'static) -> Self {
            Self {
                detach: Some(Box::new(detach)),
            }
        }

        /// Detach the listener; returns `false` if it was already gone
        pub fn unsubscribe(mut self) -> bool {
            self.detach.take().is_some_and(|detach| detach())
        }
    }

    impl std::fmt::Debug for Subscription {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Subscription")
                .field("active", &self.detach.is_some())
                .finish()
        }
    }

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`, written only by `send`)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Listeners notified after every commit
    /// 5. Optional persistence of a whitelisted projection
    ///
    /// Every `send` runs to completion on the caller's thread: reduce,
    /// persist, notify, then dispatch feedback actions. The write lock makes
    /// the store the single writer of its state even when shared across
    /// threads.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        listeners: Arc<Mutex<ListenerRegistry<S>>>,
        persister: Option<Arc<Persister<S>>>,
        persist_on_commit: bool,
        shutdown: Arc<AtomicBool>,
        /// Every dispatched action, including feedback actions from effects.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                listeners: Arc::clone(&self.listeners),
                persister: self.persister.clone(),
                persist_on_commit: self.persist_on_commit,
                shutdown: Arc::clone(&self.shutdown),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Clone + Send + std::fmt::Debug + 'static,
        S: Clone + Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store without persistence
        ///
        /// # Arguments
        ///
        /// - `initial_state`: The starting state for the store
        /// - `reducer`: The reducer implementation (business logic)
        /// - `environment`: Injected dependencies
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::build(initial_state, reducer, environment, None, &StoreConfig::default())
        }

        /// Create a new store with a custom configuration and no persistence
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: &StoreConfig,
        ) -> Self {
            Self::build(initial_state, reducer, environment, None, config)
        }

        /// Create a store whose state is hydrated from and persisted to `storage`
        ///
        /// The persisted snapshot (if any) is merged over `defaults` before
        /// the store is returned. Unreadable snapshots fall back to
        /// `defaults` and are logged.
        #[must_use]
        pub fn with_persistence(
            defaults: S,
            reducer: R,
            environment: E,
            storage: Arc<dyn StateStorage>,
            config: &StoreConfig,
        ) -> Self
        where
            S: Persist,
        {
            let key = config
                .storage_key
                .clone()
                .unwrap_or_else(|| S::KEY.to_string());
            let persister = Persister::<S>::new(storage, key);
            let (state, hydration) = persister.hydrate(defaults);
            tracing::debug!(?hydration, "Store hydrated");

            Self::build(state, reducer, environment, Some(Arc::new(persister)), config)
        }

        fn build(
            initial_state: S,
            reducer: R,
            environment: E,
            persister: Option<Arc<Persister<S>>>,
            config: &StoreConfig,
        ) -> Self {
            let (action_broadcast, _) =
                broadcast::channel(config.action_broadcast_capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                listeners: Arc::new(Mutex::new(ListenerRegistry::new())),
                persister,
                persist_on_commit: config.persist_on_commit,
                shutdown: Arc::new(AtomicBool::new(false)),
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// This method:
        /// 1. Runs the reducer under the write lock
        /// 2. Persists the whitelisted projection (fire-and-forget)
        /// 3. Notifies listeners with `(new, previous)` after releasing the lock
        /// 4. Dispatches actions fed back through [`Effect::Send`], in order
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub fn send(&self, action: A) -> Result<(), StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                return Err(StoreError::ShutdownInProgress);
            }

            tracing::debug!(?action, "Processing action");
            metrics::counter!("store.actions.total").increment(1);

            // Nobody observing the action stream is the common case.
            let _ = self.action_broadcast.send(action.clone());

            let (effects, previous, current) = {
                let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
                let previous = state.clone();

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                if self.persist_on_commit {
                    if let Some(persister) = &self.persister {
                        persister.write(&*state);
                    }
                }

                (effects, previous, state.clone())
            };

            self.notify(&current, &previous);

            tracing::trace!("Dispatching {} effects", effects.len());
            for effect in effects {
                if matches!(effect, Effect::None) {
                    continue;
                }
                for follow_up in effect.into_actions() {
                    self.send(follow_up)?;
                }
            }

            Ok(())
        }

        fn notify(&self, current: &S, previous: &S) {
            let listeners = self
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .snapshot();

            metrics::counter!("store.listeners.notified")
                .increment(u64::try_from(listeners.len()).unwrap_or(u64::MAX));

            for listener in listeners {
                listener(current, previous);
            }
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let order_value = store.state(|s| s.calculator.order_value);
        /// ```
        pub fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            f(&*state)
        }

        /// Clone the whole current state
        #[must_use]
        pub fn snapshot(&self) -> S {
            self.state(Clone::clone)
        }

        /// Access the injected environment
        #[must_use]
        pub fn environment(&self) -> &E {
            &self.environment
        }

        /// Subscribe to every commit
        ///
        /// The listener receives `(new, previous)` once per committed action,
        /// synchronously, on the thread that sent the action.
        pub fn subscribe<F>(&self, listener: F) -> Subscription
        where
            F: Fn(&S, &S) + Send + Sync + 'static,
        {
            let listener: Listener<S> = Arc::new(listener);
            let id = self
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(listener);

            let registry: Weak<Mutex<ListenerRegistry<S>>> = Arc::downgrade(&self.listeners);
            Subscription::new(move || {
                registry.upgrade().is_some_and(|registry| {
                    registry
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .remove(id)
                })
            })
        }

        /// Subscribe to changes of a selected value
        ///
        /// `listener` receives `(new, previous)` of the selected value and only
        /// fires when the two differ.
        pub fn subscribe_with_selector<T, Sel, F>(&self, selector: Sel, listener: F) -> Subscription
        where
            T: PartialEq,
            Sel: Fn(&S) -> T + Send + Sync + 'static,
            F: Fn(&T, &T) + Send + Sync + 'static,
        {
            self.subscribe(move |current, previous| {
                let next = selector(current);
                let prev = selector(previous);
                if next != prev {
                    listener(&next, &prev);
                }
            })
        }

        /// Number of registered listeners
        #[must_use]
        pub fn listener_count(&self) -> usize {
            self.listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entries
                .len()
        }

        /// Subscribe to the stream of dispatched actions
        ///
        /// Receives every action passed to `send`, including feedback actions.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Re-read the persisted snapshot and merge it over the current state
        ///
        /// Listeners are notified with the states before and after the merge.
        pub fn rehydrate(&self) -> Hydration {
            let Some(persister) = &self.persister else {
                return Hydration::Disabled;
            };

            let (hydration, previous, current) = {
                let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
                let previous = state.clone();
                let (next, hydration) = persister.hydrate(previous.clone());
                *state = next;
                (hydration, previous, state.clone())
            };

            tracing::debug!(?hydration, "Store rehydrated");
            self.notify(&current, &previous);
            hydration
        }

        /// Write the persisted snapshot now, surfacing failures
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Persistence`] if the snapshot cannot be encoded,
        /// or [`StoreError::Storage`] if the backend rejects the write.
        pub fn flush(&self) -> Result<(), StoreError> {
            let Some(persister) = &self.persister else {
                return Ok(());
            };
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            persister.try_write(&*state)
        }

        /// Stop accepting actions and flush persistence
        ///
        /// # Errors
        ///
        /// Returns the flush error, if any. The store stays shut down either way.
        pub fn shutdown(&self) -> Result<(), StoreError> {
            tracing::info!("Initiating store shutdown");
            self.shutdown.store(true, Ordering::Release);
            self.flush()
        }

        /// Whether [`Store::shutdown`] has been called
        #[must_use]
        pub fn is_shut_down(&self) -> bool {
            self.shutdown.load(Ordering::Acquire)
        }
    }
}
