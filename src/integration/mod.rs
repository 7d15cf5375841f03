//! # Integrations
//!
//! An integration adapts one concrete history backend into a uniform
//! bidirectional reactive channel, with feedback-loop suppression.
//!
//! ```text
//!   application           this module                    backend
//!
//!   navigate(change) ──▶ write path ──(guard clear)──▶ set(change)
//!                            │                            │
//!                            ▼                            ▼
//!                     published channel            real location source
//!                            ▲                            │
//!                            │                   external change event
//!                     notifier (guard set,                │
//!                     publish directly)  ◀── block-aware ─┘
//!                                            notifier
//! ```
//!
//! Writes from the application invoke the backend's `set`; a change observed
//! *from* the backend is pushed straight into the published channel with a
//! one-shot re-entrancy guard raised, so a subscriber reacting to it cannot
//! echo it back into the backend's write path.
//!
//! Concrete backends: [`path_integration`](path::path_integration) and
//! [`hash_integration`](hash::hash_integration) over a [`crate::host::Host`],
//! [`memory_integration`](memory::memory_integration) over a
//! [`crate::history::memory::MemoryHistory`], and [`static_integration`] for
//! a fixed location (server-side rendering).

pub mod depth;
pub mod hash;
pub mod memory;
pub mod notifier;
pub mod path;

pub use hash::hash_integration;
pub use memory::memory_integration;
pub use path::path_integration;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::guard::NavigationGuard;
use crate::location::LocationChange;
use crate::signal::{Subject, Subscription};

/// Teardown returned by a backend's `init`: removes every listener the
/// backend registered.
pub type Teardown = Box<dyn FnOnce()>;

/// Per-backend utilities exposed alongside the channel.
pub struct IntegrationUtils {
    /// Relative traversal, delegated to the backend's history.
    pub go: Rc<dyn Fn(i64)>,
    /// Turn a routed path into the backend's outward representation
    /// (hash backend: `/foo` → `#/foo`).
    pub render_path: Option<Rc<dyn Fn(&str) -> String>>,
    /// Normalize an externally supplied target into a routed path
    /// (hash backend: disambiguates in-page anchors from routed paths).
    pub parse_path: Option<Rc<dyn Fn(&str) -> String>>,
    /// The guard this integration consults for external jumps.
    pub guard: Option<Rc<dyn NavigationGuard>>,
}

impl Default for IntegrationUtils {
    fn default() -> Self {
        IntegrationUtils {
            go: Rc::new(|_| {}),
            render_path: None,
            parse_path: None,
            guard: None,
        }
    }
}

/// Callback handed to a backend's `init`; invoking it publishes an
/// externally-observed change without echoing it into the backend.
#[derive(Clone)]
pub struct Notifier {
    channel: Subject<LocationChange>,
    read: Rc<dyn Fn() -> LocationChange>,
    writing_back: Rc<Cell<bool>>,
}

impl Notifier {
    /// Publish `value`, or re-read the backend's current value when `None`.
    /// The re-entrancy guard is raised for the duration of the publish.
    pub fn notify(&self, value: Option<LocationChange>) {
        let next = value.unwrap_or_else(|| (self.read)());
        self.writing_back.set(true);
        self.channel.set(next);
        self.writing_back.set(false);
    }
}

/// A uniform adapter over one concrete history backend.
///
/// Not `Clone`: the integration owns its backend subscription, and dropping
/// it (or calling [`Integration::dispose`]) tears that subscription down.
pub struct Integration {
    channel: Subject<LocationChange>,
    write: Rc<dyn Fn(&LocationChange)>,
    writing_back: Rc<Cell<bool>>,
    teardown: RefCell<Option<Teardown>>,
    /// Backend utilities: `go`, path rendering/parsing, the guard.
    pub utils: IntegrationUtils,
}

impl Integration {
    /// The currently published location.
    pub fn location(&self) -> LocationChange {
        self.channel.get()
    }

    /// Application-side write path: forwards to the backend's `set` (unless
    /// the re-entrancy guard is up) and publishes the change. Listeners fire
    /// only when `value` actually differs from the published one.
    pub fn navigate(&self, change: impl Into<LocationChange>) {
        let change = change.into();
        if !self.writing_back.get() {
            (self.write)(&change);
        }
        self.channel.set(change);
    }

    /// Subscribe to published location changes.
    pub fn subscribe(&self, listener: impl FnMut(&LocationChange) + 'static) -> Subscription {
        self.channel.subscribe(listener)
    }

    /// Remove every listener this integration registered on its backend.
    /// Idempotent; also runs on drop.
    pub fn dispose(&self) {
        if let Some(teardown) = self.teardown.borrow_mut().take() {
            teardown();
        }
    }
}

impl Drop for Integration {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Build an [`Integration`] from a backend's `{get, set, init}` triad.
///
/// `get` may return a raw string; it is wrapped into a value-only
/// [`LocationChange`]. If `init` is supplied it runs once with a [`Notifier`]
/// and must return the teardown that removes whatever listeners it
/// registered.
pub fn create_integration<L: Into<LocationChange>>(
    get: impl Fn() -> L + 'static,
    set: impl Fn(&LocationChange) + 'static,
    init: Option<Box<dyn FnOnce(Notifier) -> Teardown>>,
    utils: IntegrationUtils,
) -> Integration {
    let read: Rc<dyn Fn() -> LocationChange> = Rc::new(move || get().into());
    let channel = Subject::new(read(), |a: &LocationChange, b| a.value == b.value);
    let writing_back = Rc::new(Cell::new(false));

    let teardown = init.map(|init| {
        init(Notifier {
            channel: channel.clone(),
            read: read.clone(),
            writing_back: writing_back.clone(),
        })
    });

    Integration {
        channel,
        write: Rc::new(set),
        writing_back,
        teardown: RefCell::new(teardown),
        utils,
    }
}

/// Fixed-location backend for server-side or headless rendering: an explicit
/// mutable cell owned by this integration, written only through its write
/// path. No external change source, no history to traverse.
pub fn static_integration(initial: impl Into<LocationChange>) -> Integration {
    let cell = Rc::new(RefCell::new(initial.into()));
    let read = cell.clone();
    let write = cell;
    create_integration(
        move || read.borrow().clone(),
        move |next: &LocationChange| {
            *write.borrow_mut() = next.clone();
        },
        None,
        IntegrationUtils::default(),
    )
}
