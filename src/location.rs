//! # Location Values
//!
//! `LocationChange` is the value type exchanged at every boundary of this
//! crate: applications request navigations with it, backends read the current
//! position into it, and the published channel carries it to subscribers.
//!
//! The `state` field is opaque: it is attached to and retrieved from the
//! host's history entry verbatim. The only key this crate ever touches inside
//! it is the depth marker (see [`crate::integration::depth`]).

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A requested or observed navigation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationChange {
    /// Path + query + fragment, e.g. `/users/7?tab=posts#bio`.
    pub value: String,
    /// Opaque per-entry state, carried by the host. Never inspected here
    /// except to inject the depth marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
    /// Overwrite the current entry instead of pushing a new one.
    #[serde(default)]
    pub replace: bool,
    /// Scroll to the fragment (or the top of the page) after the write.
    #[serde(default)]
    pub scroll: bool,
}

impl LocationChange {
    /// A plain forward navigation to `value`, no state, push semantics.
    pub fn to(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    /// Attach a typed state payload, serialized into the opaque state slot.
    pub fn with_state<T: Serialize>(mut self, state: &T) -> Result<Self, StateError> {
        self.state = Some(serde_json::to_value(state).map_err(StateError::Convert)?);
        Ok(self)
    }

    /// Read the opaque state back as a typed value.
    pub fn state_as<T: DeserializeOwned>(&self) -> Result<T, StateError> {
        let value = self.state.as_ref().ok_or(StateError::Missing)?;
        serde_json::from_value(value.clone()).map_err(StateError::Convert)
    }
}

// Raw string sources are wrapped into `{ value }` automatically.
impl From<&str> for LocationChange {
    fn from(value: &str) -> Self {
        LocationChange::to(value)
    }
}

impl From<String> for LocationChange {
    fn from(value: String) -> Self {
        LocationChange::to(value)
    }
}

/// Everything after the first `#`, or `""` if there is none.
pub(crate) fn fragment_of(value: &str) -> &str {
    value.split_once('#').map(|(_, after)| after).unwrap_or("")
}

/// Errors converting the opaque state slot to or from a typed value.
/// Nothing else in this crate is fallible: malformed fragments, out-of-range
/// deltas and blocked navigations all degrade to no-ops.
#[derive(Debug)]
pub enum StateError {
    /// The change carries no state.
    Missing,
    /// Serde failed to convert the state value.
    Convert(serde_json::Error),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Missing => write!(f, "no state attached to this location change"),
            StateError::Convert(e) => write!(f, "state conversion error: {e}"),
        }
    }
}

impl std::error::Error for StateError {}
