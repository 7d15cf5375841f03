//! # backtrail
//!
//! A navigation-history engine. Three history backends — browser path-based,
//! browser hash-based, and an in-memory stack for non-browser hosts — behind
//! one [`Integration`] abstraction, with a re-entrancy-safe notification
//! protocol that can detect, and reverse, externally-initiated navigation
//! (browser back/forward, hash edits) when an application-level
//! [`NavigationGuard`] declines to allow it.
//!
//! The hard part: back/forward events fire *after* the host has already
//! moved, with no way to ask how far or to veto. The engine reconstructs the
//! missing signed delta from a depth counter persisted in per-entry state
//! ([`integration::depth`]), and reverses rejected jumps while swallowing the
//! echo event the correction itself produces ([`integration::notifier`]).
//!
//! Route matching, data loading and rendering are deliberately out of scope;
//! a router builds on top of the published location channel.

pub mod guard;
pub mod history;
pub mod host;
pub mod integration;
pub mod location;
pub mod signal;

pub use guard::{AllowAll, GuardTarget, NavigationGuard};
pub use history::memory::MemoryHistory;
pub use host::{Host, HostEvent, ScrollEvent, SimulatedHost};
pub use integration::{
    create_integration, hash_integration, memory_integration, path_integration,
    static_integration, Integration, IntegrationUtils, Notifier, Teardown,
};
pub use location::{LocationChange, StateError};
pub use signal::{Subject, Subscription};
