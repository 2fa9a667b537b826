//! # Offerdesk Core
//!
//! Core traits and types for the Offerdesk state architecture.
//!
//! This crate provides the fundamental abstractions shared by the pricing
//! calculator, the application store and the legacy path adapter.
//!
//! ## Core Concepts
//!
//! - **State**: Owned, `Clone`-able application data split into slices
//! - **Action**: Every mutation the store accepts, one concern per variant
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Follow-up work described as a value (never executed here)
//! - **Environment**: Injected dependencies via traits (`Clock`, `StateStorage`)
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Synchronous dispatch: no action suspends, awaits or retries
//! - Dependency Injection via Environment
//!
//! ## Example
//!
//! ```
//! use offerdesk_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct CartState {
//!     items: u32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CartAction {
//!     Add,
//! }
//!
//! struct CartReducer;
//!
//! impl Reducer for CartReducer {
//!     type State = CartState;
//!     type Action = CartAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CartState,
//!         action: CartAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CartAction>; 4]> {
//!         match action {
//!             CartAction::Add => state.items += 1,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = CartState::default();
//! let _ = CartReducer.reduce(&mut state, CartAction::Add, &());
//! assert_eq!(state.items, 1);
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Reducer composition utilities (`combine_reducers`, `scope_reducer`)
pub mod composition;

/// Event bus abstraction for broadcasting named topics
pub mod event_bus;

/// Persistence contract for whitelisted state projections
pub mod persistence;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Updates state in place
        /// 2. Returns effect descriptions to be executed by the store
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe follow-up work for the store. They are values, returned
/// from reducers and interpreted by the runtime after the state change has
/// been committed and observed by subscribers.
pub mod effect {
    /// Effect type - describes follow-up work for the store
    ///
    /// Every variant is interpreted synchronously, inside the same call stack
    /// as the action that produced it.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    #[derive(Clone, PartialEq)]
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects one after another
        Sequential(Vec<Effect<Action>>),

        /// Feed an action back into the store as a separate dispatch
        ///
        /// The follow-up action is committed and broadcast on its own, so
        /// subscribers observe two distinct state transitions.
        Send(Box<Action>),
    }

    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Send(action) => f.debug_tuple("Effect::Send").field(action).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Feed `action` back into the store
        #[must_use]
        pub fn send(action: Action) -> Effect<Action> {
            Effect::Send(Box::new(action))
        }

        /// Map the action carried by this effect into another action type
        ///
        /// Used by [`scope_reducer`](crate::composition::scope_reducer) to lift
        /// child effects into the parent action space.
        #[must_use]
        pub fn map<B, F>(self, f: F) -> Effect<B>
        where
            F: Fn(Action) -> B + Copy,
        {
            match self {
                Effect::None => Effect::None,
                Effect::Sequential(effects) => {
                    Effect::Sequential(effects.into_iter().map(|e| e.map(f)).collect())
                },
                Effect::Send(action) => Effect::Send(Box::new(f(*action))),
            }
        }

        /// Flatten this effect into the actions it feeds back, in order
        #[must_use]
        pub fn into_actions(self) -> Vec<Action> {
            match self {
                Effect::None => Vec::new(),
                Effect::Sequential(effects) => {
                    effects.into_iter().flat_map(Effect::into_actions).collect()
                },
                Effect::Send(action) => vec![*action],
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter or the store constructor.
pub mod environment {
    use chrono::{DateTime, Utc};
    use thiserror::Error;

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Production - uses system clock
    /// let clock = SystemClock;
    ///
    /// // Test - fixed time for deterministic tests
    /// let clock = FixedClock::new(time);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock implementation of [`Clock`]
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Errors raised by a [`StateStorage`] backend
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StorageError {
        /// Reading a key failed
        #[error("Failed to read '{key}': {reason}")]
        Read {
            /// The key being read
            key: String,
            /// Backend-specific reason
            reason: String,
        },

        /// Writing a key failed
        #[error("Failed to write '{key}': {reason}")]
        Write {
            /// The key being written
            key: String,
            /// Backend-specific reason
            reason: String,
        },
    }

    /// Durable key/value storage provided by the host environment
    ///
    /// The store serializes its whitelisted projection into a single value
    /// under one key. Implementations only move strings around; they know
    /// nothing about the state shape.
    pub trait StateStorage: Send + Sync {
        /// Load the value stored under `key`, `Ok(None)` when absent
        ///
        /// # Errors
        ///
        /// Returns [`StorageError::Read`] if the backend cannot be read.
        fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

        /// Store `value` under `key`, replacing any previous value
        ///
        /// # Errors
        ///
        /// Returns [`StorageError::Write`] if the backend rejects the write.
        fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

        /// Remove `key` from the backend
        ///
        /// # Errors
        ///
        /// Returns [`StorageError::Write`] if the backend rejects the removal.
        fn remove(&self, key: &str) -> Result<(), StorageError>;
    }
}
