//! # Navigation Guards
//!
//! The contract for the application-level guard registry. This crate never
//! implements the registry's bookkeeping (which routes opted into "confirm
//! before leaving"); it only calls [`NavigationGuard::confirm`] when an
//! externally-initiated navigation is observed and must be allowed or
//! reversed.

use serde_json::Value;

/// What the guard is being asked to confirm.
#[derive(Debug)]
pub enum GuardTarget<'a> {
    /// A backward jump by this many entries (always negative). Raised when
    /// the reconstructed depth delta shows the user went back.
    Steps(i64),
    /// A forward or lateral move to a concrete destination. Raised for
    /// forward jumps and for same-position edits where no delta is known.
    Destination {
        value: &'a str,
        state: Option<&'a Value>,
    },
}

/// External collaborator deciding whether a pending navigation may proceed.
pub trait NavigationGuard {
    /// Return `false` to block the navigation; the engine will then reverse
    /// it. Treated as synchronous: an async confirmation UI is the
    /// registry's own concern.
    fn confirm(&self, target: GuardTarget<'_>) -> bool;
}

/// Guard that allows every navigation. The default when an application
/// registers no "confirm before leaving" predicates.
pub struct AllowAll;

impl NavigationGuard for AllowAll {
    fn confirm(&self, _target: GuardTarget<'_>) -> bool {
        true
    }
}
