//! Actions and action creators
//!
//! An action is anything that carries a stable string tag. The tag is what
//! case reducers match on, so every action type in this module exposes it
//! through [`Action::action_type`].
//!
//! Action creators bundle a tag with a constructor. They render as their tag
//! (via [`Display`](fmt::Display)), which lets a creator stand in for its tag
//! wherever a case is registered.
//!
//! # Examples
//!
//! ```
//! use casefold_core::action::{make_action_creator, make_empty_action_creator, Action};
//!
//! let reset = make_empty_action_creator("counter/reset");
//! let increment = make_action_creator::<i64>("counter/increment");
//!
//! assert_eq!(reset.create().action_type(), "counter/reset");
//! assert_eq!(increment.to_string(), "counter/increment");
//!
//! let action = increment.create(5);
//! assert_eq!(action.payload, 5);
//! ```

use serde::{Deserialize, Serialize};
use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Tag of the action hosts send to probe a reducer for its initial state.
pub const INIT_ACTION_TYPE: &str = "@@casefold/INIT";

/// A value that names what happened by a stable string tag.
pub trait Action {
    /// The tag case reducers compare against.
    fn action_type(&self) -> &str;
}

/// Anything that can be converted to a stable action tag.
///
/// Cases are registered against an `ActionTag`: a plain string, or one of the
/// action creators in this module.
pub trait ActionTag {
    /// The tag this value stands for.
    fn tag(&self) -> &str;
}

impl ActionTag for str {
    fn tag(&self) -> &str {
        self
    }
}

impl ActionTag for String {
    fn tag(&self) -> &str {
        self
    }
}

impl ActionTag for Arc<str> {
    fn tag(&self) -> &str {
        self
    }
}

impl<T: ActionTag + ?Sized> ActionTag for &T {
    fn tag(&self) -> &str {
        (**self).tag()
    }
}

impl<T: Action + ?Sized> Action for &T {
    fn action_type(&self) -> &str {
        (**self).action_type()
    }
}

/// An action without a payload: `{"type": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmptyAction {
    /// Action tag
    #[serde(rename = "type")]
    pub action_type: Arc<str>,
}

impl Action for EmptyAction {
    fn action_type(&self) -> &str {
        &self.action_type
    }
}

/// An action carrying a payload: `{"type": ..., "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadAction<P> {
    /// Action tag
    #[serde(rename = "type")]
    pub action_type: Arc<str>,
    /// Caller-defined payload, stored as given
    pub payload: P,
}

impl<P> Action for PayloadAction<P> {
    fn action_type(&self) -> &str {
        &self.action_type
    }
}

/// Builds [`EmptyAction`]s for one fixed tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmptyActionCreator {
    action_type: Arc<str>,
}

impl EmptyActionCreator {
    /// Create a creator for the given tag
    #[must_use]
    pub fn new(action_type: impl Into<Arc<str>>) -> Self {
        Self {
            action_type: action_type.into(),
        }
    }

    /// Build a new action
    #[must_use]
    pub fn create(&self) -> EmptyAction {
        EmptyAction {
            action_type: Arc::clone(&self.action_type),
        }
    }

    /// The tag every action from this creator carries
    #[must_use]
    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    /// Whether `action` carries this creator's tag
    pub fn matches<A: Action + ?Sized>(&self, action: &A) -> bool {
        action.action_type() == &*self.action_type
    }
}

impl fmt::Display for EmptyActionCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.action_type)
    }
}

impl ActionTag for EmptyActionCreator {
    fn tag(&self) -> &str {
        &self.action_type
    }
}

/// Builds [`PayloadAction<P>`]s for one fixed tag.
///
/// The payload is moved into the action untouched. To share it with the
/// caller, pass a handle such as `Arc<T>`.
pub struct ActionCreator<P> {
    action_type: Arc<str>,
    _payload: PhantomData<fn(P) -> P>,
}

impl<P> ActionCreator<P> {
    /// Create a creator for the given tag
    #[must_use]
    pub fn new(action_type: impl Into<Arc<str>>) -> Self {
        Self {
            action_type: action_type.into(),
            _payload: PhantomData,
        }
    }

    /// Build a new action around `payload`
    #[must_use]
    pub fn create(&self, payload: P) -> PayloadAction<P> {
        PayloadAction {
            action_type: Arc::clone(&self.action_type),
            payload,
        }
    }

    /// The tag every action from this creator carries
    #[must_use]
    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    /// Whether `action` carries this creator's tag
    pub fn matches<A: Action + ?Sized>(&self, action: &A) -> bool {
        action.action_type() == &*self.action_type
    }
}

impl<P> Clone for ActionCreator<P> {
    fn clone(&self) -> Self {
        Self {
            action_type: Arc::clone(&self.action_type),
            _payload: PhantomData,
        }
    }
}

impl<P> fmt::Debug for ActionCreator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCreator")
            .field("action_type", &self.action_type)
            .field("payload", &type_name::<P>())
            .finish()
    }
}

impl<P> fmt::Display for ActionCreator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.action_type)
    }
}

impl<P> ActionTag for ActionCreator<P> {
    fn tag(&self) -> &str {
        &self.action_type
    }
}

/// Create a creator for actions without a payload
#[must_use]
pub fn make_empty_action_creator(action_type: impl Into<Arc<str>>) -> EmptyActionCreator {
    EmptyActionCreator::new(action_type)
}

/// Create a creator for actions carrying a `P` payload
#[must_use]
pub fn make_action_creator<P>(action_type: impl Into<Arc<str>>) -> ActionCreator<P> {
    ActionCreator::new(action_type)
}

/// Heterogeneous action envelope.
///
/// Holds a tag and an optional payload behind a shared, type-erased handle.
/// Reducers that must accept actions from many unrelated creators use
/// `AnyAction` as their action type and recover the payload with
/// [`AnyAction::payload`].
#[derive(Clone)]
pub struct AnyAction {
    action_type: Arc<str>,
    payload: Option<Arc<dyn Any + Send + Sync>>,
}

impl AnyAction {
    /// An action with no payload
    #[must_use]
    pub fn new(action_type: impl Into<Arc<str>>) -> Self {
        Self {
            action_type: action_type.into(),
            payload: None,
        }
    }

    /// An action wrapping `payload`
    #[must_use]
    pub fn with_payload<P: Any + Send + Sync>(action_type: impl Into<Arc<str>>, payload: P) -> Self {
        Self {
            action_type: action_type.into(),
            payload: Some(Arc::new(payload)),
        }
    }

    /// The init action hosts send with an unset state
    #[must_use]
    pub fn init() -> Self {
        Self::new(INIT_ACTION_TYPE)
    }

    /// The payload, if present and of type `P`
    #[must_use]
    pub fn payload<P: Any>(&self) -> Option<&P> {
        self.payload.as_deref()?.downcast_ref::<P>()
    }

    /// Whether any payload is attached
    #[must_use]
    pub const fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}

impl Action for AnyAction {
    fn action_type(&self) -> &str {
        &self.action_type
    }
}

impl fmt::Debug for AnyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyAction")
            .field("action_type", &self.action_type)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}

impl From<EmptyAction> for AnyAction {
    fn from(action: EmptyAction) -> Self {
        Self {
            action_type: action.action_type,
            payload: None,
        }
    }
}

impl<P: Any + Send + Sync> From<PayloadAction<P>> for AnyAction {
    fn from(action: PayloadAction<P>) -> Self {
        Self {
            action_type: action.action_type,
            payload: Some(Arc::new(action.payload)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Mutex;

    #[test]
    fn test_empty_action_shape() {
        let reset = make_empty_action_creator("counter/reset");
        let action = reset.create();

        assert_eq!(action.action_type(), "counter/reset");
        assert_eq!(reset.to_string(), "counter/reset");
        assert!(reset.matches(&action));
    }

    #[test]
    fn test_payload_action_shape() {
        let rename = make_action_creator::<String>("user/rename");
        let action = rename.create("Alice".to_string());

        assert_eq!(
            action,
            PayloadAction {
                action_type: "user/rename".into(),
                payload: "Alice".to_string(),
            }
        );
        assert_eq!(format!("{rename}"), "user/rename");
    }

    #[test]
    fn test_payload_is_shared_not_copied() {
        let shared = Arc::new(Mutex::new(vec![1, 2]));
        let append = make_action_creator::<Arc<Mutex<Vec<i32>>>>("list/append");
        let action = append.create(Arc::clone(&shared));

        if let Ok(mut items) = shared.lock() {
            items.push(3);
        }

        let seen = action.payload.lock().map(|items| items.clone()).unwrap_or_default();
        assert_eq!(seen, vec![1, 2, 3]);
        assert!(Arc::ptr_eq(&shared, &action.payload));
    }

    #[test]
    fn test_creator_does_not_match_foreign_tag() {
        let increment = make_action_creator::<i64>("counter/increment");
        let other = make_empty_action_creator("counter/decrement").create();

        assert!(!increment.matches(&other));
    }

    #[test]
    fn test_actions_serialize_like_plain_objects() {
        let empty = make_empty_action_creator("counter/reset").create();
        let with_payload = make_action_creator::<i64>("counter/increment").create(5);

        let empty_json = serde_json::to_value(&empty).unwrap_or_default();
        let payload_json = serde_json::to_value(&with_payload).unwrap_or_default();

        assert_eq!(empty_json, serde_json::json!({ "type": "counter/reset" }));
        assert_eq!(
            payload_json,
            serde_json::json!({ "type": "counter/increment", "payload": 5 })
        );
    }

    #[test]
    fn test_payload_action_deserializes() {
        let parsed: Result<PayloadAction<i64>, _> =
            serde_json::from_str(r#"{"type":"counter/increment","payload":7}"#);

        assert!(matches!(parsed, Ok(ref a) if a.payload == 7 && a.action_type() == "counter/increment"));
    }

    #[test]
    fn test_any_action_payload_downcast() {
        let action: AnyAction = make_action_creator::<i64>("counter/increment").create(5).into();

        assert!(action.has_payload());
        assert_eq!(action.payload::<i64>(), Some(&5));
        assert_eq!(action.payload::<String>(), None);
    }

    #[test]
    fn test_any_action_from_empty() {
        let action: AnyAction = make_empty_action_creator("counter/reset").create().into();

        assert_eq!(action.action_type(), "counter/reset");
        assert!(!action.has_payload());
        assert_eq!(action.payload::<i64>(), None);
    }

    #[test]
    fn test_init_action() {
        assert_eq!(AnyAction::init().action_type(), INIT_ACTION_TYPE);
    }

    #[test]
    fn test_tags_from_strings_and_creators() {
        let creator = make_empty_action_creator("a");
        let owned = String::from("b");
        let shared: Arc<str> = Arc::from("c");

        assert_eq!(creator.tag(), "a");
        assert_eq!(owned.tag(), "b");
        assert_eq!(shared.tag(), "c");
        assert_eq!("d".tag(), "d");
        assert_eq!((&creator).tag(), "a");
    }

    proptest! {
        #[test]
        fn prop_empty_creator_tag_fidelity(tag in "\\PC+") {
            let creator = make_empty_action_creator(tag.as_str());
            let action = creator.create();
            prop_assert_eq!(action.action_type(), tag.as_str());
            prop_assert_eq!(creator.to_string(), tag.clone());
        }

        #[test]
        fn prop_payload_creator_passthrough(tag in "\\PC+", payload in any::<i64>()) {
            let creator = make_action_creator::<i64>(tag.as_str());
            let action = creator.create(payload);
            prop_assert_eq!(action.action_type(), tag.as_str());
            prop_assert_eq!(action.payload, payload);
            prop_assert_eq!(creator.to_string(), tag.clone());
        }
    }
}
