//! Storage-backed persistence of a store's whitelisted projection.

use crate::StoreError;
use offerdesk_core::environment::StateStorage;
use offerdesk_core::persistence::{self, Persist, PersistenceError, VersionCheck};
use std::sync::Arc;

/// Outcome of reading the persisted snapshot into the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    /// The store has no persistence configured
    Disabled,
    /// Nothing was stored under the key; defaults are in use
    Empty,
    /// The snapshot was merged over the base state
    Restored(VersionCheck),
    /// Reading or decoding failed; the base state was kept
    Fallback,
}

type Encode<S> = fn(&S) -> Result<String, PersistenceError>;
type Merge<S> = fn(S, &str) -> Result<(S, VersionCheck), PersistenceError>;

/// Type-erased persistence hooks for one state type
///
/// Built from a [`Persist`] implementation so that the store itself does not
/// need the `Persist` bound outside of its persisted constructor.
pub(crate) struct Persister<S> {
    storage: Arc<dyn StateStorage>,
    key: String,
    encode: Encode<S>,
    merge: Merge<S>,
}

fn merge<P: Persist>(base: P, raw: &str) -> Result<(P, VersionCheck), PersistenceError> {
    let (snapshot, check) = persistence::decode::<P>(raw)?;
    Ok((P::restore(base, snapshot), check))
}

impl<P: Persist> Persister<P> {
    pub(crate) fn new(storage: Arc<dyn StateStorage>, key: String) -> Self {
        Self {
            storage,
            key,
            encode: persistence::encode::<P>,
            merge: merge::<P>,
        }
    }
}

impl<S: Clone> Persister<S> {
    /// Merge the stored snapshot over `base`, falling back to `base` on any error
    pub(crate) fn hydrate(&self, base: S) -> (S, Hydration) {
        let raw = match self.storage.load(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return (base, Hydration::Empty),
            Err(error) => {
                tracing::warn!(
                    key = %self.key,
                    %error,
                    "Failed to read persisted state, using defaults"
                );
                metrics::counter!("store.persistence.failures").increment(1);
                return (base, Hydration::Fallback);
            },
        };

        match (self.merge)(base.clone(), &raw) {
            Ok((state, check)) => {
                if let VersionCheck::Mismatch { stored, current } = check {
                    tracing::warn!(
                        key = %self.key,
                        stored,
                        current,
                        "Persisted state has a different schema version, merging over defaults"
                    );
                }
                (state, Hydration::Restored(check))
            },
            Err(error) => {
                tracing::warn!(
                    key = %self.key,
                    %error,
                    "Persisted state is unreadable, using defaults"
                );
                metrics::counter!("store.persistence.failures").increment(1);
                (base, Hydration::Fallback)
            },
        }
    }

    /// Write the snapshot, logging instead of surfacing failures
    pub(crate) fn write(&self, state: &S) {
        if let Err(error) = self.try_write(state) {
            tracing::warn!(key = %self.key, %error, "Failed to persist state");
            metrics::counter!("store.persistence.failures").increment(1);
        }
    }

    /// Write the snapshot, surfacing failures
    pub(crate) fn try_write(&self, state: &S) -> Result<(), StoreError> {
        let raw = (self.encode)(state)?;
        self.storage.save(&self.key, &raw)?;
        metrics::counter!("store.persistence.writes").increment(1);
        Ok(())
    }
}
