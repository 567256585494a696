//! # Casefold Core
//!
//! Action creators, copy-on-write drafts and case reducers for Redux-style
//! state management.
//!
//! ## Core Concepts
//!
//! - **Action**: A value tagged with a stable string (`{type, payload?}`)
//! - **Action Creator**: Builds actions and renders as its own tag
//! - **Case**: An update function registered against one tag
//! - **Draft**: Mutable staging view over one state snapshot
//! - **Reducer**: `(State, Action) → State`, folding the action through its cases
//!
//! ## Architecture Principles
//!
//! - State snapshots are immutable `Arc`s; edits go through drafts
//! - Unwritten structure is shared between snapshots, never deep-copied
//! - Dispatch is synchronous and fail-fast: no partial state escapes an error
//!
//! ## Example
//!
//! ```
//! use casefold_core::{create_reducer, make_action_creator, make_empty_action_creator};
//! use casefold_core::{AnyAction, Reducer};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! let increment = make_action_creator::<i64>("counter/increment");
//! let reset = make_empty_action_creator("counter/reset");
//!
//! let builder = create_reducer::<CounterState, AnyAction>(CounterState::default());
//! builder
//!     .add_payload_case(&increment, |draft, amount, _| draft.count += amount)
//!     .add_case(&reset, |_, _, _| Some(CounterState::default()));
//!
//! let reducer = builder.reducer();
//! let state = reducer.reduce(None, &increment.create(5).into()).ok();
//! assert_eq!(state.as_deref(), Some(&CounterState { count: 5 }));
//! ```

/// Actions, action tags and action creators
pub mod action;

/// Reducer builder and the compiled case reducer
pub mod builder;

/// Cases and update outcomes
pub mod case;

/// Reducer composition utilities
pub mod composition;

/// Copy-on-write drafts
pub mod draft;

/// Error types
pub mod error;

/// Reducer module - The core trait for state transitions
///
/// Reducers are pure functions: `(State, Action) → State`.
///
/// State travels as `Arc` snapshots so that a reducer can hand back the very
/// snapshot it received when nothing changed.
pub mod reducer {
    use crate::error::ReduceError;
    use std::sync::Arc;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    ///
    /// # Example
    ///
    /// ```
    /// use casefold_core::error::ReduceError;
    /// use casefold_core::reducer::Reducer;
    /// use std::sync::Arc;
    ///
    /// struct Toggle;
    ///
    /// impl Reducer for Toggle {
    ///     type State = bool;
    ///     type Action = ();
    ///
    ///     fn initial_state(&self) -> Arc<bool> {
    ///         Arc::new(false)
    ///     }
    ///
    ///     fn reduce(&self, state: Option<&Arc<bool>>, _action: &()) -> Result<Arc<bool>, ReduceError> {
    ///         let current = state.cloned().unwrap_or_else(|| self.initial_state());
    ///         Ok(Arc::new(!*current))
    ///     }
    /// }
    ///
    /// assert!(matches!(Toggle.reduce(None, &()), Ok(ref on) if **on));
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The state used when `reduce` is called with no current state
        fn initial_state(&self) -> Arc<Self::State>;

        /// Reduce an action into the next state
        ///
        /// `None` stands for "no state yet" and is replaced by
        /// [`initial_state`](Reducer::initial_state). Implementations return
        /// the input snapshot itself when the action changes nothing.
        ///
        /// # Errors
        ///
        /// Returns [`ReduceError`] when an update step fails. The input state
        /// is left as it was.
        fn reduce(
            &self,
            state: Option<&Arc<Self::State>>,
            action: &Self::Action,
        ) -> Result<Arc<Self::State>, ReduceError>;
    }
}

pub use action::{
    Action, ActionCreator, ActionTag, AnyAction, EmptyAction, EmptyActionCreator,
    INIT_ACTION_TYPE, PayloadAction, make_action_creator, make_empty_action_creator,
};
pub use builder::{CaseReducer, ReducerBuilder, create_reducer};
pub use case::{IntoOutcome, Outcome};
pub use draft::Draft;
pub use error::{BoxError, ReduceError};
pub use reducer::Reducer;
