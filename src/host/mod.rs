//! # Host Abstraction
//!
//! Everything the browser-backed integrations need from their environment,
//! expressed as one trait. A wasm binding would implement [`Host`] over
//! `window.history` / `window.location`; this crate ships [`SimulatedHost`],
//! a browser-faithful in-process implementation used by the test suite and by
//! headless callers.
//!
//! The contract mirrors what real browsers provide: entries can be pushed and
//! replaced with an opaque serializable state, the current entry's state can
//! be swapped in place, and relative traversal (`go`) is the only operation
//! that emits change events — programmatic writes are already known to the
//! caller that performed them.

mod simulated;

pub use simulated::{ScrollEvent, SimulatedHost};

use std::rc::Rc;

use serde_json::Value;

use crate::signal::Subscription;

/// External-change events a host can deliver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// History traversal happened (browser `popstate`).
    StateChange,
    /// The URL fragment changed (browser `hashchange`).
    FragmentChange,
}

/// The history/location surface of a host environment.
///
/// Hosts are expected to deliver change events strictly serially and
/// synchronously relative to [`Host::go`]; the block-aware notifier relies on
/// that ordering (see [`crate::integration::notifier`]).
pub trait Host {
    /// Current path + query + fragment, e.g. `/inbox?page=2#msg-9`.
    fn path_query_fragment(&self) -> String;

    /// Current fragment, without the leading `#`. Empty if there is none.
    fn fragment(&self) -> String;

    /// The opaque state stored on the current entry.
    fn entry_state(&self) -> Option<Value>;

    /// Push a new entry. A `url` starting with `#` is resolved against the
    /// current path, as a browser resolves relative URLs. Discards any
    /// forward history. Emits no events.
    fn push_entry(&self, url: &str, state: Option<Value>);

    /// Replace the current entry's URL and state in place. Emits no events.
    fn replace_entry(&self, url: &str, state: Option<Value>);

    /// Replace only the current entry's state, keeping its URL. Emits no
    /// events.
    fn replace_entry_state(&self, state: Option<Value>);

    /// Set the fragment, pushing a new entry when it actually changes
    /// (browser `location.hash = …` semantics). Emits no events.
    fn set_fragment(&self, fragment: &str);

    /// Move by `delta` entries, clamped to the ends of the history. Emits
    /// [`HostEvent::StateChange`] (and [`HostEvent::FragmentChange`] when the
    /// fragment differs) if the position actually moved.
    fn go(&self, delta: i64);

    /// Total number of entries in the host's history.
    fn history_length(&self) -> usize;

    /// Whether an element with this fragment id exists. Must not raise on a
    /// malformed id: treat it as "not found".
    fn element_exists(&self, fragment_id: &str) -> bool;

    /// Scroll the element with this fragment id into view.
    fn scroll_to_element(&self, fragment_id: &str);

    /// Scroll to the top of the document.
    fn scroll_to_top(&self);

    /// Register a handler for `event`. The returned [`Subscription`] removes
    /// exactly that handler.
    fn subscribe(&self, event: HostEvent, handler: Rc<dyn Fn()>) -> Subscription;
}

/// Scroll to the element named by `fragment_id` if it exists; otherwise fall
/// back to the top of the page when `fallback_top` is set. An empty or
/// malformed fragment counts as "not found".
pub(crate) fn scroll_to_fragment(host: &dyn Host, fragment_id: &str, fallback_top: bool) {
    if !fragment_id.is_empty() && host.element_exists(fragment_id) {
        host.scroll_to_element(fragment_id);
    } else if fallback_top {
        host.scroll_to_top();
    }
}
