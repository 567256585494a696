//! Cases: update functions registered against an action tag
//!
//! An update function receives the [`Draft`] for the current fold step, the
//! action, and the state originally handed to the reducer. What it returns
//! decides how the step commits:
//!
//! - `()` or [`Outcome::Keep`] or `None`: keep the draft, edits included;
//! - [`Outcome::Replace`] or `Some(state)`: replace the state wholesale and
//!   discard any edits made to the draft.

use crate::draft::Draft;
use crate::error::{BoxError, ReduceError};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

/// How a case commits its fold step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<S> {
    /// Keep the (possibly edited) draft
    Keep,
    /// Replace the state with this value
    Replace(S),
}

/// Conversion from an update function's return value into an [`Outcome`].
pub trait IntoOutcome<S> {
    /// Perform the conversion
    fn into_outcome(self) -> Outcome<S>;
}

impl<S> IntoOutcome<S> for () {
    fn into_outcome(self) -> Outcome<S> {
        Outcome::Keep
    }
}

impl<S> IntoOutcome<S> for Outcome<S> {
    fn into_outcome(self) -> Outcome<S> {
        self
    }
}

impl<S> IntoOutcome<S> for Option<S> {
    fn into_outcome(self) -> Outcome<S> {
        self.map_or(Outcome::Keep, Outcome::Replace)
    }
}

/// Failure of a single case, before it is tied to an action and index
#[derive(Debug)]
pub(crate) enum CaseError {
    Failed(BoxError),
    PayloadMismatch { expected: &'static str },
}

impl CaseError {
    pub(crate) fn into_reduce_error(self, action_type: &str, index: usize) -> ReduceError {
        match self {
            Self::Failed(source) => ReduceError::CaseFailed {
                action_type: action_type.to_string(),
                index,
                source,
            },
            Self::PayloadMismatch { expected } => ReduceError::PayloadMismatch {
                action_type: action_type.to_string(),
                expected,
            },
        }
    }
}

/// Type-erased update function as stored in a [`CaseList`]
pub(crate) type UpdateFn<S, A> =
    dyn Fn(&mut Draft<S>, &A, &S) -> Result<Outcome<S>, CaseError> + Send + Sync;

/// One registered case
pub(crate) struct Case<S, A> {
    pub(crate) tag: Arc<str>,
    pub(crate) update: Arc<UpdateFn<S, A>>,
}

impl<S, A> Clone for Case<S, A> {
    fn clone(&self) -> Self {
        Self {
            tag: Arc::clone(&self.tag),
            update: Arc::clone(&self.update),
        }
    }
}

/// Append-only, insertion-ordered list of cases with a per-tag index.
///
/// Several cases may share a tag; the index keeps them in registration order.
pub(crate) struct CaseList<S, A> {
    cases: Vec<Case<S, A>>,
    by_tag: HashMap<Arc<str>, SmallVec<[usize; 4]>>,
}

impl<S, A> CaseList<S, A> {
    pub(crate) fn new() -> Self {
        Self {
            cases: Vec::new(),
            by_tag: HashMap::new(),
        }
    }

    /// Append a case, returning its registration index
    pub(crate) fn push(&mut self, case: Case<S, A>) -> usize {
        let index = self.cases.len();
        self.by_tag
            .entry(Arc::clone(&case.tag))
            .or_default()
            .push(index);
        self.cases.push(case);
        index
    }

    /// Cases registered for `tag`, in registration order
    pub(crate) fn matching<'a>(
        &'a self,
        tag: &str,
    ) -> impl Iterator<Item = (usize, &'a Case<S, A>)> + 'a {
        self.by_tag
            .get(tag)
            .into_iter()
            .flatten()
            .map(|&index| (index, &self.cases[index]))
    }

    pub(crate) fn len(&self) -> usize {
        self.cases.len()
    }

    pub(crate) fn tags(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(|case| &*case.tag)
    }
}

impl<S, A> Clone for CaseList<S, A> {
    fn clone(&self) -> Self {
        Self {
            cases: self.cases.clone(),
            by_tag: self.by_tag.clone(),
        }
    }
}
