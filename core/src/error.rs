//! Error types for case reducers

use thiserror::Error;

/// Boxed error returned by fallible update functions
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that abort a dispatch.
///
/// A failed dispatch never yields a partially folded state: the caller keeps
/// whatever state it passed in.
#[derive(Error, Debug)]
pub enum ReduceError {
    /// A fallible case returned an error
    #[error("case #{index} for action `{action_type}` failed: {source}")]
    CaseFailed {
        /// Tag of the action being reduced
        action_type: String,
        /// Registration index of the failing case
        index: usize,
        /// Error returned by the update function
        #[source]
        source: BoxError,
    },

    /// A payload case saw an action whose payload is missing or of another type
    #[error("action `{action_type}` does not carry a payload of type `{expected}`")]
    PayloadMismatch {
        /// Tag of the action being reduced
        action_type: String,
        /// Payload type the case was registered for
        expected: &'static str,
    },
}
