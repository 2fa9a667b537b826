//! The dotted-path facade over [`AppStore`].

use crate::diff::{diff, leaves, ChangeEvent, LeafChange};
use crate::path::{lookup, matches, segments};
use crate::setters;
use crate::LegacyError;
use offerdesk_core::event_bus::{BusEvent, EventBus, STATE_CHANGED, STATE_INITIALIZED};
use offerdesk_runtime::{Hydration, Subscription};
use offerdesk_store::{AppAction, AppState, AppStore};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

type Callback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Result of [`LegacyAdapter::set`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The path was recognised and its actions were dispatched
    Applied,
    /// The path is unknown; the store is unchanged and a synthetic change
    /// event was broadcast instead
    UnknownPath,
}

#[derive(Default)]
struct PathRegistry {
    next_id: u64,
    entries: Vec<(u64, String, Callback)>,
}

impl PathRegistry {
    fn insert(&mut self, pattern: &str, callback: Callback) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, pattern.to_string(), callback));
        id
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _, _)| *entry != id);
        self.entries.len() != before
    }

    fn matching(&self, path: &str) -> Vec<Callback> {
        self.entries
            .iter()
            .filter(|(_, pattern, _)| matches(pattern, path))
            .map(|(_, _, callback)| Arc::clone(callback))
            .collect()
    }
}

/// Handle returned by [`LegacyAdapter::subscribe`]
///
/// Dropping the handle keeps the callback registered.
#[must_use = "keep the handle to be able to unsubscribe later"]
#[derive(Debug)]
pub struct PathSubscription {
    id: u64,
    registry: Weak<Mutex<PathRegistry>>,
}

impl PathSubscription {
    /// Detach the callback; returns `false` if it was already gone
    pub fn unsubscribe(self) -> bool {
        self.registry.upgrade().is_some_and(|registry| {
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(self.id)
        })
    }
}

/// Read, write and observe the application state by dotted path
///
/// Every write is translated into typed [`AppAction`]s, so the store stays
/// the only writer. Every leaf that changes in a commit is published on the
/// event bus under [`STATE_CHANGED`].
pub struct LegacyAdapter {
    store: AppStore,
    bus: Arc<dyn EventBus>,
    registry: Arc<Mutex<PathRegistry>>,
    initialized: AtomicBool,
    publisher: Option<Subscription>,
}

impl std::fmt::Debug for LegacyAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyAdapter")
            .field("subscriptions", &self.subscription_count())
            .field("initialized", &self.initialized.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

fn project(state: &AppState) -> Option<Value> {
    match serde_json::to_value(state) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(error = %e, "Failed to project state to JSON");
            None
        },
    }
}

fn notify(registry: &Mutex<PathRegistry>, event: &ChangeEvent) {
    // Collected first so callbacks may subscribe or unsubscribe.
    let callbacks = registry
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .matching(&event.path);
    for callback in callbacks {
        callback(event);
    }
}

fn publish_changes(
    bus: &dyn EventBus,
    registry: &Mutex<PathRegistry>,
    current: &AppState,
    previous: &AppState,
) {
    let (Some(new), Some(old)) = (project(current), project(previous)) else {
        return;
    };

    let changes = diff("", &old, &new);
    if changes.is_empty() {
        return;
    }

    let state = Arc::new(new);
    for change in changes {
        let event = ChangeEvent::new(change, Arc::clone(&state));
        notify(registry, &event);
        if let Err(e) = bus.publish(BusEvent::new(STATE_CHANGED, event.to_payload())) {
            tracing::warn!(path = %event.path, error = %e, "Failed to publish state change");
        }
    }
}

impl LegacyAdapter {
    /// Wrap `store` and start publishing its changes on `bus`
    #[must_use]
    pub fn new(store: AppStore, bus: Arc<dyn EventBus>) -> Self {
        let registry = Arc::new(Mutex::new(PathRegistry::default()));
        let publisher = {
            let bus = Arc::clone(&bus);
            let registry = Arc::clone(&registry);
            store.subscribe(move |current, previous| {
                publish_changes(bus.as_ref(), &registry, current, previous);
            })
        };

        Self {
            store,
            bus,
            registry,
            initialized: AtomicBool::new(false),
            publisher: Some(publisher),
        }
    }

    /// The wrapped store
    #[must_use]
    pub const fn store(&self) -> &AppStore {
        &self.store
    }

    /// Value at `path`, or `default` when the path does not exist
    ///
    /// `None` returns the whole state tree.
    #[must_use]
    pub fn get(&self, path: Option<&str>, default: Value) -> Value {
        let Some(state) = self.store.state(project) else {
            return default;
        };
        match path {
            None => state,
            Some(path) => lookup(&state, &segments(path)).cloned().unwrap_or(default),
        }
    }

    /// Write `value` at `path`
    ///
    /// Recognised paths dispatch their actions in order. Unknown paths leave
    /// the store untouched; matching subscribers and the bus still receive a
    /// change event carrying the current value as `old_value`.
    ///
    /// # Errors
    ///
    /// Returns [`LegacyError::InvalidValue`] when a recognised path receives
    /// a value of the wrong shape (nothing is dispatched), and
    /// [`LegacyError::Store`] when the store rejects an action.
    pub fn set(&self, path: &str, value: Value) -> Result<SetOutcome, LegacyError> {
        let routed = self.store.state(|state| setters::route(path, &value, state))?;

        let Some(actions) = routed else {
            tracing::warn!(path, "Unknown legacy path, store not updated");
            self.broadcast_unknown(path, value)?;
            return Ok(SetOutcome::UnknownPath);
        };

        tracing::debug!(path, actions = actions.len(), "Legacy set");
        for action in actions {
            self.store.send(action)?;
        }
        Ok(SetOutcome::Applied)
    }

    fn broadcast_unknown(&self, path: &str, value: Value) -> Result<(), LegacyError> {
        let state = self.store.state(|state| serde_json::to_value(state))?;
        let old_value = lookup(&state, &segments(path)).cloned().unwrap_or(Value::Null);
        let event = ChangeEvent::new(
            LeafChange {
                path: path.to_string(),
                old_value,
                new_value: value,
            },
            Arc::new(state),
        );

        notify(&self.registry, &event);
        self.bus.publish(BusEvent::new(STATE_CHANGED, event.to_payload()))?;
        Ok(())
    }

    /// Call `callback` for every changed leaf selected by `pattern`
    ///
    /// Patterns are dotted paths where `*` matches any single segment, and
    /// `"*"` alone matches everything. Subscribers see the same leaf events
    /// that are published on the bus, computed once per commit.
    pub fn subscribe<F>(&self, pattern: &str, callback: F) -> PathSubscription
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let id = self
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pattern, Arc::new(callback));

        tracing::debug!(pattern, id, "Legacy subscription added");
        PathSubscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Number of live path subscriptions
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    /// Write the persisted snapshot now
    ///
    /// # Errors
    ///
    /// Returns [`LegacyError::Store`] when the snapshot cannot be written.
    pub fn save(&self) -> Result<(), LegacyError> {
        self.store.flush()?;
        Ok(())
    }

    /// Reset every slice to its defaults
    ///
    /// # Errors
    ///
    /// Returns [`LegacyError::Store`] when the store is shut down.
    pub fn clear(&self) -> Result<(), LegacyError> {
        self.store.send(AppAction::Reset)?;
        Ok(())
    }

    /// One-time startup: hydrate, apply defaults, mark the app initialized
    ///
    /// The persisted snapshot is re-read first. When nothing was restored,
    /// the recognised leaves of `default_state` are written through
    /// [`LegacyAdapter::set`]; unrecognised leaves are skipped. Afterwards
    /// `Hydrate` is sent and [`STATE_INITIALIZED`] published with the full
    /// state. Returns `false` without doing anything on later calls.
    ///
    /// # Errors
    ///
    /// Propagates store and bus failures. Invalid default values are logged
    /// and skipped.
    pub fn init(&self, default_state: Option<&Value>) -> Result<bool, LegacyError> {
        if self.initialized.swap(true, Ordering::AcqRel) {
            tracing::debug!("Legacy adapter already initialized");
            return Ok(false);
        }

        let hydration = self.store.rehydrate();
        let restored = matches!(hydration, Hydration::Restored(_));

        if let Some(defaults) = default_state.filter(|_| !restored) {
            for (path, value) in leaves(defaults) {
                if !setters::is_recognised(&path) {
                    tracing::debug!(%path, "Skipping unrecognised default");
                    continue;
                }
                match self.set(&path, value) {
                    Ok(_) => {},
                    Err(LegacyError::InvalidValue { path, reason }) => {
                        tracing::warn!(%path, %reason, "Skipping invalid default");
                    },
                    Err(e) => return Err(e),
                }
            }
        }

        self.store.send(AppAction::Hydrate)?;

        let state = self.store.state(|state| serde_json::to_value(state))?;
        self.bus
            .publish(BusEvent::new(STATE_INITIALIZED, serde_json::json!({ "state": state })))?;

        tracing::info!(?hydration, "Legacy adapter initialized");
        Ok(true)
    }
}

impl Drop for LegacyAdapter {
    fn drop(&mut self) {
        if let Some(publisher) = self.publisher.take() {
            publisher.unsubscribe();
        }
    }
}
