//! In-process host: a faithful model of browser history for tests and
//! headless use.
//!
//! Entries carry a URL string and an opaque state, traversal clamps at the
//! ends, pushing truncates forward history, and change events are delivered
//! synchronously from inside [`SimulatedHost::go`] — the serial-delivery
//! ordering the notifier assumes.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use log::debug;
use serde_json::Value;

use crate::host::{Host, HostEvent};
use crate::location::fragment_of;
use crate::signal::Subscription;

struct Entry {
    url: String,
    state: Option<Value>,
}

/// A recorded scroll operation, for assertions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScrollEvent {
    Element(String),
    Top,
}

struct Shared {
    entries: RefCell<Vec<Entry>>,
    index: Cell<usize>,
    state_listeners: RefCell<Vec<(u64, Rc<dyn Fn()>)>>,
    fragment_listeners: RefCell<Vec<(u64, Rc<dyn Fn()>)>>,
    next_id: Cell<u64>,
    elements: RefCell<HashSet<String>>,
    scrolls: RefCell<Vec<ScrollEvent>>,
}

/// Browser-like history host. Cheap to clone; clones share the same history.
#[derive(Clone)]
pub struct SimulatedHost {
    shared: Rc<Shared>,
}

impl SimulatedHost {
    /// A host whose history contains the single entry `initial_url`.
    pub fn new(initial_url: impl Into<String>) -> Self {
        SimulatedHost {
            shared: Rc::new(Shared {
                entries: RefCell::new(vec![Entry {
                    url: initial_url.into(),
                    state: None,
                }]),
                index: Cell::new(0),
                state_listeners: RefCell::new(Vec::new()),
                fragment_listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                elements: RefCell::new(HashSet::new()),
                scrolls: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Register an element id so `element_exists` finds it.
    pub fn add_element(&self, id: impl Into<String>) {
        self.shared.elements.borrow_mut().insert(id.into());
    }

    /// Current position in the history (0-based).
    pub fn position(&self) -> usize {
        self.shared.index.get()
    }

    /// Current URL, as the host sees it.
    pub fn url(&self) -> String {
        self.current_url()
    }

    /// All scroll operations performed so far, oldest first.
    pub fn scroll_events(&self) -> Vec<ScrollEvent> {
        self.shared.scrolls.borrow().clone()
    }

    /// User pressing the back button.
    pub fn back(&self) {
        self.go(-1);
    }

    /// User pressing the forward button.
    pub fn forward(&self) {
        self.go(1);
    }

    fn current_url(&self) -> String {
        let entries = self.shared.entries.borrow();
        entries[self.shared.index.get()].url.clone()
    }

    /// Resolve a write URL the way a browser resolves a relative URL: a bare
    /// `#fragment` keeps the current path and query.
    fn resolve(&self, url: &str) -> String {
        if let Some(fragment) = url.strip_prefix('#') {
            let current = self.current_url();
            let base = current.split('#').next().unwrap_or("");
            format!("{base}#{fragment}")
        } else {
            url.to_string()
        }
    }

    fn fire(&self, listeners: &RefCell<Vec<(u64, Rc<dyn Fn()>)>>) {
        // Snapshot before dispatch: a handler may re-enter `go` (the
        // notifier's corrective jump does) or unsubscribe.
        let snapshot: Vec<Rc<dyn Fn()>> =
            listeners.borrow().iter().map(|(_, f)| f.clone()).collect();
        for handler in snapshot {
            handler();
        }
    }

    fn register(
        &self,
        listeners: fn(&Shared) -> &RefCell<Vec<(u64, Rc<dyn Fn()>)>>,
        handler: Rc<dyn Fn()>,
    ) -> Subscription {
        let id = self.shared.next_id.get();
        self.shared.next_id.set(id + 1);
        listeners(&self.shared).borrow_mut().push((id, handler));

        let weak: Weak<Shared> = Rc::downgrade(&self.shared);
        Subscription::new(move || {
            if let Some(shared) = weak.upgrade() {
                listeners(&shared).borrow_mut().retain(|(lid, _)| *lid != id);
            }
        })
    }
}

impl Host for SimulatedHost {
    fn path_query_fragment(&self) -> String {
        self.current_url()
    }

    fn fragment(&self) -> String {
        fragment_of(&self.current_url()).to_string()
    }

    fn entry_state(&self) -> Option<Value> {
        let entries = self.shared.entries.borrow();
        entries[self.shared.index.get()].state.clone()
    }

    fn push_entry(&self, url: &str, state: Option<Value>) {
        let url = self.resolve(url);
        let mut entries = self.shared.entries.borrow_mut();
        let index = self.shared.index.get();
        entries.truncate(index + 1);
        entries.push(Entry { url, state });
        self.shared.index.set(index + 1);
    }

    fn replace_entry(&self, url: &str, state: Option<Value>) {
        let url = self.resolve(url);
        let mut entries = self.shared.entries.borrow_mut();
        let index = self.shared.index.get();
        entries[index] = Entry { url, state };
    }

    fn replace_entry_state(&self, state: Option<Value>) {
        let mut entries = self.shared.entries.borrow_mut();
        entries[self.shared.index.get()].state = state;
    }

    fn set_fragment(&self, fragment: &str) {
        // Assigning an identical fragment does nothing, like the browser.
        if self.fragment() == fragment {
            return;
        }
        self.push_entry(&format!("#{fragment}"), None);
    }

    fn go(&self, delta: i64) {
        let len = self.shared.entries.borrow().len();
        let index = self.shared.index.get();
        let target = (index as i64 + delta).clamp(0, len as i64 - 1) as usize;
        if target == index {
            return;
        }

        let from_fragment = self.fragment();
        self.shared.index.set(target);
        debug!("simulated host: go({delta}) moved {index} -> {target}");

        self.fire(&self.shared.state_listeners);
        if self.fragment() != from_fragment {
            self.fire(&self.shared.fragment_listeners);
        }
    }

    fn history_length(&self) -> usize {
        self.shared.entries.borrow().len()
    }

    fn element_exists(&self, fragment_id: &str) -> bool {
        // Unknown or malformed ids are simply absent from the registry, so
        // the "must not raise" requirement holds trivially.
        self.shared.elements.borrow().contains(fragment_id)
    }

    fn scroll_to_element(&self, fragment_id: &str) {
        self.shared
            .scrolls
            .borrow_mut()
            .push(ScrollEvent::Element(fragment_id.to_string()));
    }

    fn scroll_to_top(&self) {
        self.shared.scrolls.borrow_mut().push(ScrollEvent::Top);
    }

    fn subscribe(&self, event: HostEvent, handler: Rc<dyn Fn()>) -> Subscription {
        match event {
            HostEvent::StateChange => self.register(|s| &s.state_listeners, handler),
            HostEvent::FragmentChange => self.register(|s| &s.fragment_listeners, handler),
        }
    }
}
