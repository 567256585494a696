//! Case reducer builder
//!
//! [`create_reducer`] returns a [`ReducerBuilder`] that owns an append-only
//! list of cases. [`ReducerBuilder::reducer`] hands out a [`CaseReducer`]
//! which reads that list live: cases registered after the reducer was handed
//! out still apply to later dispatches.
//!
//! # Dispatch
//!
//! Every call to [`Reducer::reduce`] folds the action through the cases whose
//! tag equals the action's tag, in registration order. Each matching case
//! gets a fresh [`Draft`] of the state produced by the previous step, the
//! action, and the state the caller passed in (never an intermediate one).
//! Cases that don't match leave the snapshot untouched, so an action nobody
//! handles returns the very same `Arc`.
//!
//! Several cases may be registered for one tag, through the same creator or
//! through different creators that happen to share a tag. All of them run.
//! Nothing deduplicates them: keep tags unique per reducer unless the
//! stacking is what you want.
//!
//! # Example
//!
//! ```
//! use casefold_core::action::{make_action_creator, AnyAction};
//! use casefold_core::builder::create_reducer;
//! use casefold_core::reducer::Reducer;
//! use std::sync::Arc;
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct Counter {
//!     count: i64,
//! }
//!
//! let increment = make_action_creator::<i64>("increment");
//!
//! let builder = create_reducer::<Counter, AnyAction>(Counter::default());
//! builder.add_payload_case(&increment, |draft, amount, _| {
//!     draft.count += amount;
//! });
//!
//! let reducer = builder.reducer();
//! let next = reducer
//!     .reduce(Some(&Arc::new(Counter { count: 0 })), &increment.create(5).into())
//!     .ok();
//! assert_eq!(next.as_deref(), Some(&Counter { count: 5 }));
//! ```

use crate::action::{Action, ActionCreator, ActionTag, AnyAction};
use crate::case::{Case, CaseError, CaseList, IntoOutcome, Outcome, UpdateFn};
use crate::draft::Draft;
use crate::error::{BoxError, ReduceError};
use crate::reducer::Reducer;
use std::any::{Any, type_name};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

struct Shared<S, A> {
    initial: Arc<S>,
    cases: RwLock<Arc<CaseList<S, A>>>,
}

/// Reducer compiled by a [`ReducerBuilder`].
///
/// Clones share the builder's case list; see [`CaseReducer::ptr_eq`].
pub struct CaseReducer<S, A> {
    shared: Arc<Shared<S, A>>,
}

impl<S, A> CaseReducer<S, A> {
    /// Whether both handles come from the same builder
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Number of registered cases
    #[must_use]
    pub fn case_count(&self) -> usize {
        self.cases().len()
    }

    /// Tags of the registered cases, in registration order
    #[must_use]
    pub fn registered_types(&self) -> Vec<String> {
        self.cases().tags().map(str::to_string).collect()
    }

    // The lock is only held to clone the handle, never across update functions.
    fn cases(&self) -> Arc<CaseList<S, A>> {
        let guard = self
            .shared
            .cases
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }
}

impl<S, A> Clone for CaseReducer<S, A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S, A> fmt::Debug for CaseReducer<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseReducer")
            .field("cases", &self.registered_types())
            .finish_non_exhaustive()
    }
}

impl<S, A> Reducer for CaseReducer<S, A>
where
    S: Clone,
    A: Action,
{
    type State = S;
    type Action = A;

    fn initial_state(&self) -> Arc<S> {
        Arc::clone(&self.shared.initial)
    }

    fn reduce(&self, state: Option<&Arc<S>>, action: &A) -> Result<Arc<S>, ReduceError> {
        let original = state.unwrap_or(&self.shared.initial);
        let action_type = action.action_type();
        let cases = self.cases();

        let mut current = Arc::clone(original);
        let mut matched = 0_usize;

        for (index, case) in cases.matching(action_type) {
            matched += 1;
            let mut draft = Draft::new(current);

            let outcome = match (case.update)(&mut draft, action, &**original) {
                Ok(outcome) => outcome,
                Err(error) => {
                    let error = error.into_reduce_error(action_type, index);
                    tracing::warn!(action_type, index, error = %error, "Case failed, dispatch aborted");
                    return Err(error);
                },
            };

            current = match outcome {
                Outcome::Keep => draft.finalize(),
                Outcome::Replace(next) => Arc::new(next),
            };
        }

        tracing::trace!(
            action_type,
            matched,
            changed = !Arc::ptr_eq(&current, original),
            "Folded action through cases"
        );

        Ok(current)
    }
}

/// Accumulates cases for one reducer.
///
/// The builder is the only owner allowed to append cases; reducers it hands
/// out can read the list but never change it.
pub struct ReducerBuilder<S, A> {
    reducer: CaseReducer<S, A>,
}

/// Start building a reducer whose unset state defaults to `initial_state`
#[must_use]
pub fn create_reducer<S, A>(initial_state: S) -> ReducerBuilder<S, A> {
    ReducerBuilder::new(initial_state)
}

impl<S, A> ReducerBuilder<S, A> {
    /// Create a builder with no cases
    #[must_use]
    pub fn new(initial_state: S) -> Self {
        Self {
            reducer: CaseReducer {
                shared: Arc::new(Shared {
                    initial: Arc::new(initial_state),
                    cases: RwLock::new(Arc::new(CaseList::new())),
                }),
            },
        }
    }

    /// The reducer compiled from this builder
    ///
    /// Every call returns a handle to the same reducer.
    #[must_use]
    pub fn reducer(&self) -> CaseReducer<S, A> {
        self.reducer.clone()
    }

    /// Number of registered cases
    #[must_use]
    pub fn case_count(&self) -> usize {
        self.reducer.case_count()
    }

    fn register(&self, tag: &str, update: Arc<UpdateFn<S, A>>) -> &Self {
        let mut cases = self
            .reducer
            .shared
            .cases
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        // Dispatches in flight keep their own snapshot of the list.
        let index = Arc::make_mut(&mut *cases).push(Case {
            tag: Arc::from(tag),
            update,
        });

        tracing::debug!(action_type = tag, index, "Registered case");
        self
    }
}

impl<S, A> ReducerBuilder<S, A>
where
    S: 'static,
    A: 'static,
{
    /// Register an update function for actions tagged `tag`.
    ///
    /// `update` gets the draft, the action, and the state passed to the
    /// reducer. Returning `()` (or `None`, or [`Outcome::Keep`]) keeps the
    /// draft; returning `Some(state)` or [`Outcome::Replace`] replaces it.
    ///
    /// Registering several cases for the same tag is allowed: all of them
    /// run, in registration order, each seeing the draft the previous one
    /// left behind.
    pub fn add_case<T, F, O>(&self, tag: &T, update: F) -> &Self
    where
        T: ActionTag + ?Sized,
        F: Fn(&mut Draft<S>, &A, &S) -> O + Send + Sync + 'static,
        O: IntoOutcome<S> + 'static,
    {
        self.register(tag.tag(), infallible(update))
    }

    /// Register a fallible update function for actions tagged `tag`.
    ///
    /// An `Err` aborts the dispatch with [`ReduceError::CaseFailed`].
    pub fn try_add_case<T, F, O, E>(&self, tag: &T, update: F) -> &Self
    where
        T: ActionTag + ?Sized,
        F: Fn(&mut Draft<S>, &A, &S) -> Result<O, E> + Send + Sync + 'static,
        O: IntoOutcome<S> + 'static,
        E: Into<BoxError> + 'static,
    {
        self.register(tag.tag(), fallible(update))
    }
}

impl<S: 'static> ReducerBuilder<S, AnyAction> {
    /// Register an update function that receives the payload produced by `creator`.
    ///
    /// Dispatching an action with `creator`'s tag but no payload of type `P`
    /// fails with [`ReduceError::PayloadMismatch`].
    pub fn add_payload_case<P, F, O>(&self, creator: &ActionCreator<P>, update: F) -> &Self
    where
        P: Any + Send + Sync,
        F: Fn(&mut Draft<S>, &P, &S) -> O + Send + Sync + 'static,
        O: IntoOutcome<S> + 'static,
    {
        self.register(creator.tag(), with_payload(update))
    }
}

impl<S, A> fmt::Debug for ReducerBuilder<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReducerBuilder")
            .field("reducer", &self.reducer)
            .finish()
    }
}

fn infallible<S, A, F, O>(update: F) -> Arc<UpdateFn<S, A>>
where
    S: 'static,
    A: 'static,
    F: Fn(&mut Draft<S>, &A, &S) -> O + Send + Sync + 'static,
    O: IntoOutcome<S> + 'static,
{
    Arc::new(
        move |draft: &mut Draft<S>, action: &A, original: &S| -> Result<Outcome<S>, CaseError> {
            Ok(update(draft, action, original).into_outcome())
        },
    )
}

fn fallible<S, A, F, O, E>(update: F) -> Arc<UpdateFn<S, A>>
where
    S: 'static,
    A: 'static,
    F: Fn(&mut Draft<S>, &A, &S) -> Result<O, E> + Send + Sync + 'static,
    O: IntoOutcome<S> + 'static,
    E: Into<BoxError> + 'static,
{
    Arc::new(
        move |draft: &mut Draft<S>, action: &A, original: &S| -> Result<Outcome<S>, CaseError> {
            update(draft, action, original)
                .map(IntoOutcome::into_outcome)
                .map_err(|error| CaseError::Failed(error.into()))
        },
    )
}

fn with_payload<S, P, F, O>(update: F) -> Arc<UpdateFn<S, AnyAction>>
where
    S: 'static,
    P: Any + Send + Sync,
    F: Fn(&mut Draft<S>, &P, &S) -> O + Send + Sync + 'static,
    O: IntoOutcome<S> + 'static,
{
    Arc::new(
        move |draft: &mut Draft<S>,
              action: &AnyAction,
              original: &S|
              -> Result<Outcome<S>, CaseError> {
            let Some(payload) = action.payload::<P>() else {
                return Err(CaseError::PayloadMismatch {
                    expected: type_name::<P>(),
                });
            };
            Ok(update(draft, payload, original).into_outcome())
        },
    )
}
