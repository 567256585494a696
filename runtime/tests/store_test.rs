//! Integration tests for the Store host
//!
//! Covers dispatch, failure semantics, subscriptions and live case registration.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use casefold_core::{
    AnyAction, CaseReducer, ReduceError, Reducer, ReducerBuilder, create_reducer,
    make_action_creator, make_empty_action_creator,
};
use casefold_runtime::{Store, StoreConfig, StoreError};
use casefold_testing::{CallLog, assertions, helpers::init_test_tracing};
use std::sync::{Arc, OnceLock};
use tokio::sync::broadcast::error::TryRecvError;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
struct TestState {
    counter: i64,
    history: Arc<Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
#[error("counter would overflow")]
struct Overflow;

fn test_builder() -> ReducerBuilder<TestState, AnyAction> {
    let add = make_action_creator::<i64>("counter/add");
    let reset = make_empty_action_creator("counter/reset");

    let builder = create_reducer::<TestState, AnyAction>(TestState::default());
    builder
        .add_payload_case(&add, |draft, amount, _| draft.counter += amount)
        .add_case(&reset, |_, _, _| Some(TestState::default()))
        .try_add_case("counter/double", |draft, _, _| {
            draft.counter = draft.counter.checked_mul(2).ok_or(Overflow)?;
            Ok::<_, Overflow>(())
        });
    builder
}

fn add(amount: i64) -> AnyAction {
    make_action_creator::<i64>("counter/add").create(amount).into()
}

fn test_store() -> (ReducerBuilder<TestState, AnyAction>, Store<CaseReducer<TestState, AnyAction>>) {
    init_test_tracing();
    let builder = test_builder();
    let store = Store::new(builder.reducer());
    (builder, store)
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn test_store_starts_at_initial_state() {
    let (_builder, store) = test_store();

    assertions::assert_same_snapshot(&store.state(), &store.reducer().initial_state());
    assert_eq!(store.dispatch_count(), 0);
}

#[test]
fn test_dispatch_updates_state() {
    let (_builder, store) = test_store();

    let next = store.dispatch(add(5)).unwrap();

    assert_eq!(next.counter, 5);
    assert_eq!(store.select(|s| s.counter), 5);
    assert_eq!(store.dispatch_count(), 1);
}

#[test]
fn test_dispatch_sequence() {
    let (_builder, store) = test_store();

    store.dispatch(add(2)).unwrap();
    store.dispatch(AnyAction::new("counter/double")).unwrap();
    store.dispatch(add(-1)).unwrap();
    assert_eq!(store.select(|s| s.counter), 3);

    store.dispatch(AnyAction::new("counter/reset")).unwrap();
    assert_eq!(*store.state(), TestState::default());
}

#[test]
fn test_unknown_action_keeps_snapshot() {
    let (_builder, store) = test_store();
    store.dispatch(add(1)).unwrap();
    let before = store.state();

    let after = store.dispatch(AnyAction::new("counter/unknown")).unwrap();

    assertions::assert_same_snapshot(&before, &after);
}

#[test]
fn test_failed_dispatch_keeps_state() {
    let builder = test_builder();
    let store = Store::with_state(
        builder.reducer(),
        Arc::new(TestState {
            counter: i64::MAX,
            ..TestState::default()
        }),
        StoreConfig::default(),
    );
    let before = store.state();

    let result = store.dispatch(AnyAction::new("counter/double"));

    assert!(matches!(
        result,
        Err(StoreError::Reduce(ReduceError::CaseFailed { index: 2, .. }))
    ));
    assertions::assert_same_snapshot(&before, &store.state());
    assert_eq!(store.dispatch_count(), 0);
}

#[test]
fn test_panicking_case_keeps_state() {
    let (builder, store) = test_store();
    builder.add_case("counter/explode", |draft, _, _| {
        draft.counter = -1;
        if draft.counter < 0 {
            panic!("update function exploded");
        }
    });
    store.dispatch(add(4)).unwrap();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        store.dispatch(AnyAction::new("counter/explode"))
    }));

    assert!(result.is_err());
    assert_eq!(store.select(|s| s.counter), 4);
    store.dispatch(add(1)).unwrap();
    assert_eq!(store.select(|s| s.counter), 5);
}

#[test]
fn test_update_function_can_read_its_own_store() {
    let (builder, store) = test_store();
    let store = Arc::new(store);
    let slot: Arc<OnceLock<Arc<Store<CaseReducer<TestState, AnyAction>>>>> =
        Arc::new(OnceLock::new());
    let log = CallLog::new();

    let (reader, writer) = (Arc::clone(&slot), log.clone());
    builder.add_case("counter/peek", move |draft, _, _| {
        if let Some(store) = reader.get() {
            writer.record(format!("saw {}", store.select(|s| s.counter)));
            let nested = store.dispatch(add(100));
            let reentrant = matches!(nested, Err(StoreError::Reentrant));
            writer.record(format!("nested reentrant: {reentrant}"));
        }
        draft.counter += 1;
    });
    let _ = slot.set(Arc::clone(&store));
    store.dispatch(add(2)).unwrap();

    let worker = Arc::clone(&store);
    let handle = std::thread::spawn(move || worker.dispatch(AnyAction::new("counter/peek")));
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    while !handle.is_finished() {
        assert!(std::time::Instant::now() < deadline, "dispatch did not finish");
        std::thread::sleep(std::time::Duration::from_millis(10));
    }

    let next = handle.join().unwrap().unwrap();
    assert_eq!(next.counter, 3);
    assert_eq!(log.entries(), vec!["saw 2", "nested reentrant: true"]);
    assert_eq!(store.dispatch_count(), 2);

    // The store stays usable after the nested attempt
    store.dispatch(add(1)).unwrap();
    assert_eq!(store.select(|s| s.counter), 4);
}

// ============================================================================
// Live registration
// ============================================================================

#[test]
fn test_cases_added_after_store_creation_apply() {
    let (builder, store) = test_store();
    let log = CallLog::new();

    store.dispatch(AnyAction::new("counter/note")).unwrap();
    assert!(log.is_empty());

    let writer = log.clone();
    builder.add_case("counter/note", move |draft, _, _| {
        writer.record("note");
        Arc::make_mut(&mut draft.history).push("noted".to_string());
    });

    let next = store.dispatch(AnyAction::new("counter/note")).unwrap();

    assert_eq!(log.entries(), vec!["note"]);
    assert_eq!(*next.history, vec!["noted".to_string()]);
}

#[test]
fn test_untouched_fields_are_shared_between_snapshots() {
    let (builder, store) = test_store();
    builder.add_case("counter/note", |draft, _, _| {
        Arc::make_mut(&mut draft.history).push("noted".to_string());
    });

    let noted = store.dispatch(AnyAction::new("counter/note")).unwrap();
    let added = store.dispatch(add(1)).unwrap();

    assertions::assert_new_snapshot(&noted, &added);
    assert!(Arc::ptr_eq(&noted.history, &added.history));
}

// ============================================================================
// Subscriptions
// ============================================================================

#[tokio::test]
async fn test_subscribers_receive_new_snapshots() {
    let (_builder, store) = test_store();
    let mut changes = store.subscribe();

    store.dispatch(add(3)).unwrap();
    store.dispatch(add(4)).unwrap();

    let first = changes.recv().await.unwrap();
    let second = changes.recv().await.unwrap();
    assert_eq!(first.counter, 3);
    assert_eq!(second.counter, 7);
}

#[test]
fn test_unchanged_dispatch_does_not_notify() {
    let (_builder, store) = test_store();
    let mut changes = store.subscribe();

    store.dispatch(AnyAction::new("counter/unknown")).unwrap();

    assert!(matches!(changes.try_recv(), Err(TryRecvError::Empty)));
}

#[test]
fn test_failed_dispatch_does_not_notify() {
    let builder = test_builder();
    let store = Store::with_state(
        builder.reducer(),
        Arc::new(TestState {
            counter: i64::MIN,
            ..TestState::default()
        }),
        StoreConfig::default().with_broadcast_capacity(4),
    );
    let mut changes = store.subscribe();

    assert!(store.dispatch(AnyAction::new("counter/double")).is_err());
    assert!(matches!(changes.try_recv(), Err(TryRecvError::Empty)));
}

// ============================================================================
// Sharing
// ============================================================================

#[test]
fn test_store_clones_share_state() {
    let (_builder, store) = test_store();
    let other = store.clone();

    other.dispatch(add(9)).unwrap();

    assert_eq!(store.select(|s| s.counter), 9);
    assert_eq!(store.dispatch_count(), 1);
}

#[test]
fn test_concurrent_dispatches_are_serialized() {
    let (_builder, store) = test_store();

    std::thread::scope(|scope| {
        for _ in 0..10 {
            scope.spawn(|| {
                store.dispatch(add(1)).unwrap();
            });
        }
    });

    assert_eq!(store.select(|s| s.counter), 10);
    assert_eq!(store.dispatch_count(), 10);
}
