//! In-memory navigation stack with classic browser-history semantics:
//! navigating from a mid-stack position discards all forward entries, and
//! traversal clamps at both ends instead of erroring.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use log::debug;

use crate::location::{fragment_of, LocationChange};
use crate::signal::Subscription;

type Listener = Rc<RefCell<dyn FnMut(&str)>>;

struct Shared {
    entries: RefCell<Vec<String>>,
    index: Cell<usize>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_id: Cell<u64>,
    scroll: RefCell<Option<Box<dyn FnMut(&str)>>>,
    // Values from re-entrant `go` calls, drained by the outermost dispatch.
    pending: RefCell<VecDeque<String>>,
    dispatching: Cell<bool>,
}

/// A host-independent history stack. Cheap to clone; clones share the same
/// entries.
#[derive(Clone)]
pub struct MemoryHistory {
    shared: Rc<Shared>,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHistory {
    /// A history whose single root entry is `/`.
    pub fn new() -> Self {
        Self::starting_at("/")
    }

    /// A history whose single root entry is `root`.
    pub fn starting_at(root: impl Into<String>) -> Self {
        MemoryHistory {
            shared: Rc::new(Shared {
                entries: RefCell::new(vec![root.into()]),
                index: Cell::new(0),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                scroll: RefCell::new(None),
                pending: RefCell::new(VecDeque::new()),
                dispatching: Cell::new(false),
            }),
        }
    }

    /// The current entry's value.
    pub fn get(&self) -> String {
        let entries = self.shared.entries.borrow();
        entries[self.shared.index.get()].clone()
    }

    /// Apply a navigation request.
    ///
    /// `replace` overwrites the current entry in place; otherwise every entry
    /// after the current index is discarded and the new value appended. When
    /// `scroll` is set, the registered scroll handler receives the fragment
    /// portion of the new value (possibly empty, meaning "top").
    pub fn set(&self, change: &LocationChange) {
        {
            let mut entries = self.shared.entries.borrow_mut();
            let index = self.shared.index.get();
            if change.replace {
                entries[index] = change.value.clone();
            } else {
                let discarded = entries.len() - index - 1;
                if discarded > 0 {
                    debug!("memory history: discarding {discarded} forward entries");
                }
                entries.truncate(index + 1);
                entries.push(change.value.clone());
                self.shared.index.set(index + 1);
            }
        }

        if change.scroll {
            let fragment = fragment_of(&change.value).to_string();
            if let Some(handler) = self.shared.scroll.borrow_mut().as_mut() {
                handler(&fragment);
            }
        }
    }

    /// Move by `n` entries, clamping to `[0, len - 1]`. Listeners are always
    /// notified with the resulting current value, even when `n` caused no
    /// movement. Out-of-range `n` is not an error.
    ///
    /// A listener may traverse again from inside its callback; the nested
    /// notification is queued and delivered after the current round, never
    /// re-entering a listener that is still running.
    pub fn go(&self, n: i64) {
        let len = self.shared.entries.borrow().len();
        let index = self.shared.index.get();
        let target = (index as i64 + n).clamp(0, len as i64 - 1) as usize;
        self.shared.index.set(target);

        let value = {
            let entries = self.shared.entries.borrow();
            entries[target].clone()
        };
        self.shared.pending.borrow_mut().push_back(value);

        if self.shared.dispatching.get() {
            return; // the outermost `go` drains the queue
        }
        self.shared.dispatching.set(true);
        loop {
            let value = match self.shared.pending.borrow_mut().pop_front() {
                Some(value) => value,
                None => break,
            };
            let listeners: Vec<Listener> = self
                .shared
                .listeners
                .borrow()
                .iter()
                .map(|(_, f)| f.clone())
                .collect();
            for listener in listeners {
                (listener.borrow_mut())(&value);
            }
        }
        self.shared.dispatching.set(false);
    }

    pub fn back(&self) {
        self.go(-1);
    }

    pub fn forward(&self) {
        self.go(1);
    }

    /// Register `listener` to be called with the new current value on every
    /// `go`. The returned [`Subscription`] removes exactly that listener.
    pub fn listen(&self, listener: impl FnMut(&str) + 'static) -> Subscription {
        let id = self.shared.next_id.get();
        self.shared.next_id.set(id + 1);
        self.shared
            .listeners
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(listener))));

        let weak: Weak<Shared> = Rc::downgrade(&self.shared);
        Subscription::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
            }
        })
    }

    /// Install the handler invoked for `scroll` navigations. Replaces any
    /// previous handler.
    pub fn set_scroll_handler(&self, handler: impl FnMut(&str) + 'static) {
        *self.shared.scroll.borrow_mut() = Some(Box::new(handler));
    }

    /// Snapshot of the entry stack, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.shared.entries.borrow().clone()
    }

    /// Current position in the stack (0-based).
    pub fn index(&self) -> usize {
        self.shared.index.get()
    }
}
