//! # Counter Example
//!
//! A simple counter built from casefold action creators and cases.
//!
//! This example showcases:
//! - Action creators defined once, at module level
//! - Cases registered against creators (payload and payload-less)
//! - Several cases reacting to the same action
//! - Decoding `{"type": ..., "payload": ...}` actions from JSON
//!
//! ## Example
//!
//! ```
//! use counter::{counter_reducer, INCREMENT};
//! use casefold_runtime::Store;
//!
//! let store = Store::new(counter_reducer());
//! let _ = store.dispatch(INCREMENT.create(5).into());
//!
//! assert_eq!(store.select(|s| s.count), 5);
//! ```

use anyhow::{Context, bail};
use casefold_core::{
    ActionCreator, AnyAction, CaseReducer, Draft, EmptyActionCreator, create_reducer,
    make_action_creator, make_empty_action_creator,
};
use serde::Deserialize;
use std::sync::{Arc, LazyLock};

/// Counter state
///
/// `history` records every count the counter went through. It sits behind an
/// `Arc` so snapshots share it until a case appends to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CounterState {
    /// Current count value
    pub count: i64,
    /// Counts reached by increments and decrements, oldest first
    pub history: Arc<Vec<i64>>,
}

/// Add the payload to the counter
pub static INCREMENT: LazyLock<ActionCreator<i64>> =
    LazyLock::new(|| make_action_creator("counter/increment"));

/// Subtract the payload from the counter
pub static DECREMENT: LazyLock<ActionCreator<i64>> =
    LazyLock::new(|| make_action_creator("counter/decrement"));

/// Reset the counter and its history
pub static RESET: LazyLock<EmptyActionCreator> =
    LazyLock::new(|| make_empty_action_creator("counter/reset"));

fn record_history(draft: &mut Draft<CounterState>) {
    let count = draft.count;
    Arc::make_mut(&mut draft.history).push(count);
}

/// Build the counter reducer
///
/// Increments and decrements each have two cases: one that changes the
/// count, and one that records the new count in the history.
#[must_use]
pub fn counter_reducer() -> CaseReducer<CounterState, AnyAction> {
    let builder = create_reducer::<CounterState, AnyAction>(CounterState::default());

    builder
        .add_payload_case(&INCREMENT, |draft, amount, _| {
            draft.count = draft.count.saturating_add(*amount);
        })
        .add_payload_case(&DECREMENT, |draft, amount, _| {
            draft.count = draft.count.saturating_sub(*amount);
        })
        .add_case(&*INCREMENT, |draft, _, _| record_history(draft))
        .add_case(&*DECREMENT, |draft, _, _| record_history(draft))
        .add_case(&*RESET, |_, _, _| Some(CounterState::default()));

    builder.reducer()
}

#[derive(Debug, Deserialize)]
struct WireAction {
    #[serde(rename = "type")]
    action_type: String,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

/// Decode a JSON action such as `{"type": "counter/increment", "payload": 5}`
///
/// Known counter actions get their payload decoded to the type their creator
/// expects. Any other tag is passed through with its raw JSON payload.
///
/// # Errors
///
/// Fails on malformed JSON, or when a counter action's payload is missing or
/// not an integer.
pub fn decode_action(line: &str) -> anyhow::Result<AnyAction> {
    let wire: WireAction = serde_json::from_str(line).context("action is not valid JSON")?;

    let action = match wire.action_type.as_str() {
        tag if INCREMENT.action_type() == tag || DECREMENT.action_type() == tag => {
            let Some(payload) = wire.payload else {
                bail!("action `{tag}` needs an integer payload");
            };
            let amount: i64 = serde_json::from_value(payload)
                .with_context(|| format!("payload of `{tag}` is not an integer"))?;

            if INCREMENT.action_type() == tag {
                INCREMENT.create(amount).into()
            } else {
                DECREMENT.create(amount).into()
            }
        },
        tag if RESET.action_type() == tag => RESET.create().into(),
        _ => match wire.payload {
            Some(payload) => AnyAction::with_payload(wire.action_type, payload),
            None => AnyAction::new(wire.action_type),
        },
    };

    Ok(action)
}
