//! # Subject
//!
//! A minimal single-threaded publish/subscribe cell, parameterized by a
//! comparator instead of `PartialEq`. Every integration publishes its current
//! location through one of these, comparing only the `value` field so that
//! redundant writes which change nothing but `state` stay silent.
//!
//! Deliberately not tied to any reactive framework: a framework adapter can
//! subscribe here and forward into its own signal primitive.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct SubjectInner<T> {
    value: RefCell<T>,
    unchanged: Box<dyn Fn(&T, &T) -> bool>,
    listeners: RefCell<Vec<(u64, Callback<T>)>>,
    next_id: Cell<u64>,
    // Re-entrant `set` calls land here and are drained by the outermost
    // dispatch, so a listener is never re-entered while it is running.
    pending: RefCell<VecDeque<T>>,
    dispatching: Cell<bool>,
}

/// A shared mutable value with change notification.
///
/// `Subject` is a cheap handle; clones observe the same cell. Listeners run
/// synchronously inside [`Subject::set`], in subscription order.
pub struct Subject<T> {
    inner: Rc<SubjectInner<T>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Subject {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Subject<T> {
    /// Create a subject holding `initial`. `unchanged(current, next)`
    /// returning `true` makes `set(next)` a silent no-op.
    pub fn new(initial: T, unchanged: impl Fn(&T, &T) -> bool + 'static) -> Self {
        Subject {
            inner: Rc::new(SubjectInner {
                value: RefCell::new(initial),
                unchanged: Box::new(unchanged),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                pending: RefCell::new(VecDeque::new()),
                dispatching: Cell::new(false),
            }),
        }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Store `next` and notify listeners, unless the comparator says the
    /// value is unchanged (in which case the old value is kept as-is).
    ///
    /// Listeners may call `set` again from inside their callback (a
    /// redirect-on-publish subscriber does): the nested value is queued and
    /// delivered after the current dispatch round, never re-entering a
    /// listener that is still running.
    pub fn set(&self, next: T) {
        {
            let current = self.inner.value.borrow();
            if (self.inner.unchanged)(&current, &next) {
                return;
            }
        }
        *self.inner.value.borrow_mut() = next.clone();
        self.inner.pending.borrow_mut().push_back(next);

        if self.inner.dispatching.get() {
            return; // the outermost `set` drains the queue
        }
        self.inner.dispatching.set(true);
        loop {
            let value = match self.inner.pending.borrow_mut().pop_front() {
                Some(value) => value,
                None => break,
            };
            // Snapshot the listener list so callbacks may subscribe or
            // unsubscribe without invalidating the iteration.
            let callbacks: Vec<Callback<T>> = self
                .inner
                .listeners
                .borrow()
                .iter()
                .map(|(_, cb)| cb.clone())
                .collect();
            for cb in callbacks {
                (cb.borrow_mut())(&value);
            }
        }
        self.inner.dispatching.set(false);
    }

    /// Register `listener` to run on every accepted `set`. The returned
    /// [`Subscription`] removes exactly this listener.
    pub fn subscribe(&self, listener: impl FnMut(&T) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(listener))));

        let weak: Weak<SubjectInner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
            }
        })
    }
}

/// Handle for a registered listener; call [`Subscription::unsubscribe`] to
/// remove it. Dropping the handle leaves the listener registered.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap a cancellation action. Host implementations use this to hand out
    /// unbind handles for their own listener registries.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Subscription {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Remove the listener this handle was returned for.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}
