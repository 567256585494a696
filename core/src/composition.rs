//! Reducer composition utilities
//!
//! This module provides utilities for composing reducers in various ways:
//! - **`combine_reducers`**: Run multiple reducers over the same state, one after another
//! - **`scope_reducer`**: Mount a reducer on one field of a larger state
//!
//! # Examples
//!
//! ## Scoping a case reducer
//!
//! ```
//! use casefold_core::composition::scope_reducer;
//! use casefold_core::{create_reducer, AnyAction, Reducer};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Debug, Default)]
//! struct AppState {
//!     clicks: Arc<u32>,
//!     title: String,
//! }
//!
//! let clicks = create_reducer::<u32, AnyAction>(0);
//! clicks.add_case("click", |draft, _, _| **draft += 1);
//!
//! let app = scope_reducer(
//!     clicks.reducer(),
//!     |app: &AppState| &app.clicks,
//!     |app: &mut AppState, clicks| app.clicks = clicks,
//! );
//!
//! let state = app.reduce(None, &AnyAction::new("click")).ok();
//! assert_eq!(state.map(|s| *s.clicks), Some(1));
//! ```

use crate::error::ReduceError;
use crate::reducer::Reducer;
use std::sync::Arc;

/// Boxed reducer accepted by [`combine_reducers`]
pub type BoxedReducer<S, A> = Box<dyn Reducer<State = S, Action = A> + Send + Sync>;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Reducers run in the given order; each one reduces the state produced by
/// the previous one. An error from any of them aborts the whole dispatch.
///
/// # Examples
///
/// ```
/// use casefold_core::composition::combine_reducers;
/// use casefold_core::{create_reducer, AnyAction, Reducer};
///
/// let doubling = create_reducer::<i64, AnyAction>(0);
/// doubling.add_case("step", |draft, _, _| **draft *= 2);
///
/// let adding = create_reducer::<i64, AnyAction>(0);
/// adding.add_case("step", |draft, _, _| **draft += 1);
///
/// let combined = combine_reducers(
///     1,
///     vec![Box::new(doubling.reducer()), Box::new(adding.reducer())],
/// );
///
/// let state = combined.reduce(None, &AnyAction::new("step")).ok();
/// assert_eq!(state.as_deref(), Some(&3));
/// ```
#[must_use]
pub fn combine_reducers<S, A>(
    initial_state: S,
    reducers: Vec<BoxedReducer<S, A>>,
) -> CombinedReducer<S, A> {
    CombinedReducer {
        initial: Arc::new(initial_state),
        reducers,
    }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A> {
    initial: Arc<S>,
    reducers: Vec<BoxedReducer<S, A>>,
}

impl<S, A> Reducer for CombinedReducer<S, A> {
    type State = S;
    type Action = A;

    fn initial_state(&self) -> Arc<S> {
        Arc::clone(&self.initial)
    }

    fn reduce(&self, state: Option<&Arc<S>>, action: &A) -> Result<Arc<S>, ReduceError> {
        let mut current = Arc::clone(state.unwrap_or(&self.initial));

        for reducer in &self.reducers {
            current = reducer.reduce(Some(&current), action)?;
        }

        Ok(current)
    }
}

/// Scopes a reducer to one field of a larger state.
///
/// The field holds the child state as an `Arc`, so untouched children are
/// shared between parent snapshots. The parent is only copied when the
/// child reducer produced a new snapshot.
///
/// The parent's initial state is `S::default()` with the child's initial
/// state mounted on it, built once here and shared by every unset-state
/// dispatch.
pub fn scope_reducer<S, R>(
    reducer: R,
    get_state: fn(&S) -> &Arc<R::State>,
    set_state: fn(&mut S, Arc<R::State>),
) -> ScopedReducer<S, R>
where
    S: Clone + Default,
    R: Reducer,
{
    let mut initial = S::default();
    set_state(&mut initial, reducer.initial_state());

    ScopedReducer {
        initial: Arc::new(initial),
        reducer,
        get_state,
        set_state,
    }
}

/// A scoped reducer that operates on a subset of state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, R>
where
    R: Reducer,
{
    initial: Arc<S>,
    reducer: R,
    get_state: fn(&S) -> &Arc<R::State>,
    set_state: fn(&mut S, Arc<R::State>),
}

impl<S, R> Reducer for ScopedReducer<S, R>
where
    S: Clone + Default,
    R: Reducer,
{
    type State = S;
    type Action = R::Action;

    fn initial_state(&self) -> Arc<S> {
        Arc::clone(&self.initial)
    }

    fn reduce(&self, state: Option<&Arc<S>>, action: &R::Action) -> Result<Arc<S>, ReduceError> {
        let mut parent = Arc::clone(state.unwrap_or(&self.initial));

        let child = (self.get_state)(&parent);
        let next = self.reducer.reduce(Some(child), action)?;
        if Arc::ptr_eq(&next, child) {
            return Ok(parent);
        }

        (self.set_state)(Arc::make_mut(&mut parent), next);
        Ok(parent)
    }
}
