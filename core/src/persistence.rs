//! Persistence contract for state projections.
//!
//! A store persists a whitelisted projection of its state, never the whole
//! tree. The projection is wrapped in a [`PersistedEnvelope`] carrying a
//! numeric schema version so that later releases can detect stale shapes.
//!
//! # Migration policy
//!
//! There is exactly one policy: merge over defaults. Snapshot types mark
//! every field `#[serde(default)]`, so unknown fields are ignored and missing
//! fields fall back to the initial values. A version mismatch is reported to
//! the caller through [`VersionCheck`] but does not block the merge.
//!
//! # Example
//!
//! ```
//! use offerdesk_core::persistence::{decode, encode, Persist, VersionCheck};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct Counter {
//!     count: u32,
//!     session_only: bool,
//! }
//!
//! #[derive(Serialize, Deserialize, Default)]
//! #[serde(default)]
//! struct CounterSnapshot {
//!     count: u32,
//! }
//!
//! impl Persist for Counter {
//!     type Snapshot = CounterSnapshot;
//!     const KEY: &'static str = "counter";
//!     const VERSION: u32 = 1;
//!
//!     fn snapshot(&self) -> CounterSnapshot {
//!         CounterSnapshot { count: self.count }
//!     }
//!
//!     fn restore(base: Self, snapshot: CounterSnapshot) -> Self {
//!         Self { count: snapshot.count, ..base }
//!     }
//! }
//!
//! let raw = encode(&Counter { count: 7, session_only: true }).unwrap();
//! let (snapshot, check) = decode::<Counter>(&raw).unwrap();
//! assert_eq!(check, VersionCheck::Current);
//! assert_eq!(Counter::restore(Counter::default(), snapshot).count, 7);
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A state type that can be projected into a persisted snapshot and restored.
pub trait Persist: Sized {
    /// The persisted projection of this state
    type Snapshot: Serialize + DeserializeOwned;

    /// Storage key the envelope is written under
    const KEY: &'static str;

    /// Current schema version of [`Self::Snapshot`]
    const VERSION: u32;

    /// Project the whitelisted parts of the state
    fn snapshot(&self) -> Self::Snapshot;

    /// Merge a snapshot over `base`, keeping `base` for everything not persisted
    #[must_use]
    fn restore(base: Self, snapshot: Self::Snapshot) -> Self;
}

/// Versioned wrapper written to storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedEnvelope<T> {
    /// Schema version of `state`
    pub version: u32,
    /// The persisted projection
    pub state: T,
}

/// Outcome of comparing a stored envelope version with the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionCheck {
    /// Stored version equals [`Persist::VERSION`]
    Current,
    /// Stored version differs; the snapshot was still merged over defaults
    Mismatch {
        /// Version found in storage
        stored: u32,
        /// Version this build writes
        current: u32,
    },
}

/// Errors raised while encoding or decoding an envelope
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The snapshot could not be serialized
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    /// The stored value is not a readable envelope
    #[error("Failed to decode snapshot: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Serialize the snapshot of `state` into an envelope string
///
/// # Errors
///
/// Returns [`PersistenceError::Encode`] if the snapshot cannot be serialized.
pub fn encode<S: Persist>(state: &S) -> Result<String, PersistenceError> {
    let envelope = PersistedEnvelope {
        version: S::VERSION,
        state: state.snapshot(),
    };
    serde_json::to_string(&envelope).map_err(PersistenceError::Encode)
}

/// Parse an envelope string into a snapshot and its version check
///
/// # Errors
///
/// Returns [`PersistenceError::Decode`] if `raw` is not an envelope whose
/// `state` deserializes into [`Persist::Snapshot`].
pub fn decode<S: Persist>(raw: &str) -> Result<(S::Snapshot, VersionCheck), PersistenceError> {
    let envelope: PersistedEnvelope<S::Snapshot> =
        serde_json::from_str(raw).map_err(PersistenceError::Decode)?;

    let check = if envelope.version == S::VERSION {
        VersionCheck::Current
    } else {
        VersionCheck::Mismatch {
            stored: envelope.version,
            current: S::VERSION,
        }
    };

    Ok((envelope.state, check))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Prefs {
        language: String,
        volume: u8,
        loading: bool,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(default)]
    struct PrefsSnapshot {
        language: String,
        volume: u8,
    }

    impl Default for PrefsSnapshot {
        fn default() -> Self {
            Self {
                language: "de".to_string(),
                volume: 5,
            }
        }
    }

    impl Persist for Prefs {
        type Snapshot = PrefsSnapshot;
        const KEY: &'static str = "prefs";
        const VERSION: u32 = 2;

        fn snapshot(&self) -> PrefsSnapshot {
            PrefsSnapshot {
                language: self.language.clone(),
                volume: self.volume,
            }
        }

        fn restore(base: Self, snapshot: PrefsSnapshot) -> Self {
            Self {
                language: snapshot.language,
                volume: snapshot.volume,
                ..base
            }
        }
    }

    #[test]
    fn snapshot_excludes_session_fields() {
        let raw = encode(&Prefs {
            language: "en".to_string(),
            volume: 9,
            loading: true,
        })
        .unwrap();
        assert!(!raw.contains("loading"));
        assert!(raw.contains("\"version\":2"));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let (snapshot, check) =
            decode::<Prefs>(r#"{"version":2,"state":{"language":"en","extra":1}}"#).unwrap();
        assert_eq!(check, VersionCheck::Current);
        assert_eq!(snapshot.language, "en");
        assert_eq!(snapshot.volume, 5);
    }

    #[test]
    fn stale_version_is_reported_but_decoded() {
        let (snapshot, check) =
            decode::<Prefs>(r#"{"version":1,"state":{"volume":3}}"#).unwrap();
        assert_eq!(
            check,
            VersionCheck::Mismatch {
                stored: 1,
                current: 2
            }
        );
        assert_eq!(snapshot.volume, 3);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            decode::<Prefs>("not json"),
            Err(PersistenceError::Decode(_))
        ));
    }
}
