//! # Casefold Runtime
//!
//! The Store host for casefold reducers.
//!
//! ## Core Components
//!
//! - **Store**: Owns the current state snapshot and runs the reducer on dispatch
//! - **Subscriptions**: Every new snapshot is broadcast to subscribers
//! - **`StoreConfig`**: Tunables for the store (subscription buffer size)
//!
//! ## Example
//!
//! ```
//! use casefold_core::{create_reducer, make_action_creator, AnyAction};
//! use casefold_runtime::Store;
//!
//! #[derive(Clone, Debug, Default)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! let increment = make_action_creator::<i64>("counter/increment");
//! let builder = create_reducer::<CounterState, AnyAction>(CounterState::default());
//! builder.add_payload_case(&increment, |draft, amount, _| draft.count += amount);
//!
//! let store = Store::new(builder.reducer());
//! let _ = store.dispatch(increment.create(5).into());
//!
//! assert_eq!(store.select(|s| s.count), 5);
//! ```

use casefold_core::{action::Action, reducer::Reducer};
use std::sync::Arc;

/// Error types for the Store runtime
pub mod error {
    use casefold_core::error::ReduceError;
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// The reducer rejected the action
        ///
        /// The store keeps the state it had before the dispatch.
        #[error("Reducer failed: {0}")]
        Reduce(#[from] ReduceError),

        /// `dispatch` was called from inside an update function of the same store
        ///
        /// The outer dispatch carries on; the nested action is dropped.
        #[error("Dispatch called while this thread is already dispatching to the store")]
        Reentrant,
    }
}

pub use error::StoreError;

/// Store configuration
///
/// # Example
///
/// ```
/// use casefold_runtime::StoreConfig;
///
/// let config = StoreConfig::default().with_broadcast_capacity(256);
/// assert_eq!(config.broadcast_capacity, 256);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Number of state snapshots buffered for slow subscribers
    pub broadcast_capacity: usize,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(broadcast_capacity: usize) -> Self {
        Self { broadcast_capacity }
    }

    /// Set the subscription buffer size (at least 1)
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
        }
    }
}

/// Store module - The runtime host for reducers
pub mod store {
    use super::{Action, Arc, Reducer, StoreConfig, StoreError};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};
    use std::thread::{self, ThreadId};
    use tokio::sync::broadcast;

    /// Serializes dispatches and remembers which thread is running one
    #[derive(Debug, Default)]
    struct DispatchLock {
        turn: Mutex<()>,
        owner: Mutex<Option<ThreadId>>,
    }

    impl DispatchLock {
        fn held_by(&self, thread: ThreadId) -> bool {
            *self.owner.lock().unwrap_or_else(PoisonError::into_inner) == Some(thread)
        }

        fn acquire(&self, thread: ThreadId) -> DispatchTurn<'_> {
            let turn = self.turn.lock().unwrap_or_else(PoisonError::into_inner);
            *self.owner.lock().unwrap_or_else(PoisonError::into_inner) = Some(thread);
            DispatchTurn {
                _turn: turn,
                owner: &self.owner,
            }
        }
    }

    /// Held for the length of one dispatch, panics included
    struct DispatchTurn<'a> {
        _turn: MutexGuard<'a, ()>,
        owner: &'a Mutex<Option<ThreadId>>,
    }

    impl Drop for DispatchTurn<'_> {
        fn drop(&mut self) {
            *self.owner.lock().unwrap_or_else(PoisonError::into_inner) = None;
        }
    }

    /// The Store - runtime host for a reducer
    ///
    /// The Store manages:
    /// 1. State (the current `Arc` snapshot, behind an `RwLock`)
    /// 2. Reducer (called on every dispatch)
    /// 3. Subscribers (receive every new snapshot)
    ///
    /// Dispatches are serialized by a dispatch lock; the state lock is only
    /// taken to read or swap the snapshot, so update functions may call
    /// [`state`](Store::state) and [`select`](Store::select) on their own
    /// store. A nested [`dispatch`](Store::dispatch) from an update function
    /// fails with [`StoreError::Reentrant`]. A failed dispatch leaves the
    /// state untouched, and so does a dispatch whose update function panicked.
    ///
    /// # Type Parameters
    ///
    /// - `R`: Reducer implementation
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = Store::new(todo_reducer());
    ///
    /// let mut changes = store.subscribe();
    /// store.dispatch(add_todo.create("write docs".into()).into())?;
    ///
    /// let snapshot = changes.recv().await?;
    /// ```
    pub struct Store<R>
    where
        R: Reducer,
    {
        state: Arc<RwLock<Arc<R::State>>>,
        reducer: R,
        changes: broadcast::Sender<Arc<R::State>>,
        dispatched: Arc<AtomicU64>,
        dispatch_lock: Arc<DispatchLock>,
    }

    impl<R> Store<R>
    where
        R: Reducer,
        R::Action: Action,
    {
        /// Create a store whose state starts at the reducer's initial state
        #[must_use]
        pub fn new(reducer: R) -> Self {
            Self::with_config(reducer, StoreConfig::default())
        }

        /// Create a store with custom configuration
        #[must_use]
        pub fn with_config(reducer: R, config: StoreConfig) -> Self {
            let state = reducer.initial_state();
            Self::with_state(reducer, state, config)
        }

        /// Create a store with preloaded state
        ///
        /// # Arguments
        ///
        /// - `reducer`: The reducer run on every dispatch
        /// - `state`: Snapshot to start from instead of the initial state
        /// - `config`: Store configuration
        #[must_use]
        pub fn with_state(reducer: R, state: Arc<R::State>, config: StoreConfig) -> Self {
            let (changes, _) = broadcast::channel(config.broadcast_capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(state)),
                reducer,
                changes,
                dispatched: Arc::new(AtomicU64::new(0)),
                dispatch_lock: Arc::new(DispatchLock::default()),
            }
        }

        /// Dispatch an action through the reducer
        ///
        /// Stores the resulting snapshot and returns it. Subscribers are only
        /// notified when the reducer produced a new snapshot.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Reduce`] when the reducer fails; the current
        /// state is kept. Returns [`StoreError::Reentrant`] when called from an
        /// update function running inside a dispatch on this store.
        #[tracing::instrument(
            skip(self, action),
            fields(action_type = %action.action_type()),
            name = "store_dispatch"
        )]
        pub fn dispatch(&self, action: R::Action) -> Result<Arc<R::State>, StoreError> {
            let thread = thread::current().id();
            if self.dispatch_lock.held_by(thread) {
                tracing::warn!("Nested dispatch rejected");
                return Err(StoreError::Reentrant);
            }
            let _turn = self.dispatch_lock.acquire(thread);

            let current = self.state();
            let next = match self.reducer.reduce(Some(&current), &action) {
                Ok(next) => next,
                Err(error) => {
                    tracing::warn!(error = %error, "Dispatch rejected, state kept");
                    return Err(error.into());
                },
            };
            self.dispatched.fetch_add(1, Ordering::Relaxed);

            if Arc::ptr_eq(&next, &current) {
                tracing::trace!("State unchanged");
                return Ok(next);
            }

            *self.state.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&next);

            // No receivers is not an error for a store
            let receivers = self.changes.send(Arc::clone(&next)).unwrap_or(0);
            tracing::debug!(receivers, "State changed");

            Ok(next)
        }

        /// The current state snapshot
        #[must_use]
        pub fn state(&self) -> Arc<R::State> {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(&*state)
        }

        /// Read a value out of the current state
        pub fn select<T>(&self, f: impl FnOnce(&R::State) -> T) -> T {
            f(&self.state())
        }

        /// Subscribe to state changes
        ///
        /// The receiver gets every snapshot stored after this call. Lagging
        /// receivers skip snapshots beyond the configured buffer.
        #[must_use]
        pub fn subscribe(&self) -> broadcast::Receiver<Arc<R::State>> {
            self.changes.subscribe()
        }

        /// The reducer this store runs
        #[must_use]
        pub const fn reducer(&self) -> &R {
            &self.reducer
        }

        /// Number of successful dispatches so far
        #[must_use]
        pub fn dispatch_count(&self) -> u64 {
            self.dispatched.load(Ordering::Relaxed)
        }
    }

    impl<R> Clone for Store<R>
    where
        R: Reducer + Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                changes: self.changes.clone(),
                dispatched: Arc::clone(&self.dispatched),
                dispatch_lock: Arc::clone(&self.dispatch_lock),
            }
        }
    }
}

pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert_eq!(StoreConfig::default().broadcast_capacity, 16);
    }

    #[test]
    fn test_config_builder() {
        let config = StoreConfig::new(4).with_broadcast_capacity(64);
        assert_eq!(config.broadcast_capacity, 64);
    }
}
