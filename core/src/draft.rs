//! Copy-on-write drafts over state snapshots
//!
//! A [`Draft`] wraps one `Arc<S>` snapshot for the duration of a single fold
//! step. Reading through it never copies. The first write goes through
//! [`Arc::make_mut`], so the state is cloned only when the snapshot is still
//! shared with someone else (typically the caller that passed it in). Fields
//! that are themselves behind an `Arc` stay shared after that clone until
//! they are written too.
//!
//! A draft nobody wrote to finalizes into the exact same `Arc` it was created
//! from, which callers can observe with [`Arc::ptr_eq`].

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Mutable staging view over a state snapshot.
pub struct Draft<S> {
    current: Arc<S>,
    modified: bool,
}

impl<S> Draft<S> {
    pub(crate) const fn new(base: Arc<S>) -> Self {
        Self {
            current: base,
            modified: false,
        }
    }

    /// Whether the draft has been borrowed mutably
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    /// Freeze the draft into an immutable snapshot
    pub(crate) fn finalize(self) -> Arc<S> {
        self.current
    }
}

impl<S> Deref for Draft<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.current
    }
}

impl<S: Clone> DerefMut for Draft<S> {
    fn deref_mut(&mut self) -> &mut S {
        self.modified = true;
        Arc::make_mut(&mut self.current)
    }
}

impl<S: fmt::Debug> fmt::Debug for Draft<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Draft")
            .field("state", &*self.current)
            .field("modified", &self.modified)
            .finish()
    }
}
