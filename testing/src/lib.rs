//! # Casefold Testing
//!
//! Testing utilities and helpers for casefold reducers.
//!
//! This crate provides:
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Assertion helpers for state snapshots
//! - A call recorder for checking the order cases run in
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```
//! use casefold_core::{create_reducer, AnyAction};
//! use casefold_testing::ReducerTest;
//!
//! let builder = create_reducer::<i64, AnyAction>(0);
//! builder.add_case("increment", |draft, _, _| **draft += 1);
//!
//! ReducerTest::new(builder.reducer())
//!     .given_state(41)
//!     .when_action(AnyAction::new("increment"))
//!     .then_state(|count| assert_eq!(*count, 42))
//!     .run();
//! ```


/// Mock implementations for testing.
pub mod mocks {
    use std::sync::{Arc, Mutex, PoisonError};

    /// Thread-safe recorder of labelled calls
    ///
    /// Clone it into update functions to check which cases ran, and in
    /// which order.
    ///
    /// # Example
    ///
    /// ```
    /// use casefold_testing::mocks::CallLog;
    ///
    /// let log = CallLog::new();
    /// let handle = log.clone();
    /// handle.record("first");
    /// handle.record("second");
    /// assert_eq!(log.entries(), vec!["first", "second"]);
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct CallLog {
        entries: Arc<Mutex<Vec<String>>>,
    }

    impl CallLog {
        /// Create an empty log
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Append an entry
        pub fn record(&self, entry: impl Into<String>) {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(entry.into());
        }

        /// All entries, oldest first
        #[must_use]
        pub fn entries(&self) -> Vec<String> {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Number of recorded entries
        #[must_use]
        pub fn len(&self) -> usize {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// Whether nothing was recorded
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }
}

/// Test helpers and utilities
pub mod helpers {
    use tracing_subscriber::EnvFilter;

    /// Install a test-friendly tracing subscriber
    ///
    /// Honors `RUST_LOG` and defaults to `warn`. Safe to call from every
    /// test; only the first call installs anything.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use casefold_core::action::AnyAction;
    use proptest::prelude::*;

    /// Action tags shaped like `domain/event`
    pub fn action_type() -> impl Strategy<Value = String> {
        ("[a-z]{1,8}", "[a-z][a-z_]{0,11}").prop_map(|(domain, event)| format!("{domain}/{event}"))
    }

    /// Actions drawn from `tags`, half of them carrying an `i64` payload
    ///
    /// # Panics
    ///
    /// The strategy panics when sampled if `tags` is empty.
    pub fn any_action_from(tags: Vec<String>) -> impl Strategy<Value = AnyAction> {
        (proptest::sample::select(tags), proptest::option::of(any::<i64>())).prop_map(
            |(tag, payload)| match payload {
                Some(payload) => AnyAction::with_payload(tag, payload),
                None => AnyAction::new(tag),
            },
        )
    }
}

// Re-export commonly used items
pub use mocks::CallLog;
pub use reducer_test::{ReducerTest, assertions};
