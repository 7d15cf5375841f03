//! # History Backends
//!
//! Self-contained navigation stacks that need no host environment.
//! [`memory::MemoryHistory`] is the backend for non-browser hosts and tests:
//! fully controlled, so no depth tracking or blocking is ever needed on top
//! of it.

pub mod memory;
