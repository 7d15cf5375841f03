//! # Depth Tracking
//!
//! Browser back/forward events arrive *after* the position has changed, with
//! no way to ask "how far". The workaround: stamp every entry's persisted
//! state with an integer depth, and recover the signed delta of an external
//! jump as the difference between the previously recorded depth and the one
//! found on the entry the host landed on.
//!
//! Depth state is owned per integration; two integrations over different
//! hosts never interfere.

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, warn};
use serde_json::Value;

use crate::host::Host;

/// Key under which the depth marker is injected into an entry's opaque state.
/// The only key inside application state this crate ever touches.
pub(crate) const DEPTH_KEY: &str = "_depth";

/// Persists and recovers the "distance from origin" of the host's current
/// entry.
pub struct DepthTracker {
    host: Rc<dyn Host>,
    depth: Cell<Option<i64>>,
}

impl DepthTracker {
    pub fn new(host: Rc<dyn Host>) -> Self {
        DepthTracker {
            host,
            depth: Cell::new(None),
        }
    }

    /// Depth recorded by the last [`DepthTracker::save_current_depth`], if
    /// any. `None` until the first save.
    pub fn depth(&self) -> Option<i64> {
        self.depth.get()
    }

    /// Read the current entry's depth, stamping a baseline first if the
    /// entry has none. `history_length - 1` is the best available proxy for
    /// absolute position: no host offers a direct index query.
    pub fn save_current_depth(&self) {
        if self.entry_depth().is_none() {
            let baseline = self.host.history_length() as i64 - 1;
            let stamped = inject_depth(self.host.entry_state(), baseline);
            self.host.replace_entry_state(Some(stamped));
            debug!("depth tracker: stamped baseline {baseline}");
        }
        self.depth.set(self.entry_depth());
    }

    /// Copy the current entry's depth into `state`, so a programmatic
    /// replace carries it forward. A push deliberately does not: its depth is
    /// re-derived from host state on the next observed event.
    pub fn keep_depth(&self, state: Option<Value>) -> Option<Value> {
        match self.entry_depth() {
            Some(depth) => Some(inject_depth(state, depth)),
            None => state,
        }
    }

    fn entry_depth(&self) -> Option<i64> {
        let state = self.host.entry_state()?;
        let marker = state.get(DEPTH_KEY)?;
        let depth = marker.as_i64();
        if depth.is_none() {
            warn!("depth tracker: non-integer depth marker {marker}, treating as absent");
        }
        depth
    }
}

/// Merge the depth marker into an object state. A non-object state cannot
/// hold the marker and is replaced by an object carrying only the marker.
fn inject_depth(state: Option<Value>, depth: i64) -> Value {
    let mut object = match state {
        Some(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    object.insert(DEPTH_KEY.to_string(), depth.into());
    Value::Object(object)
}
