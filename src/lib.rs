//! Deferred, at-most-once, thread-safe construction of expensive values.
//!
//! [`Holder`] is the double-checked variant: a lock-free read once the value
//! exists, a mutex only while it is being built. [`SyncHolder`] takes its lock on
//! every access.
pub mod config;
pub mod demo;
pub mod error;
pub mod heavy;
pub mod holder;

pub use error::ConstructionFailure;
pub use holder::{Holder, State, SyncHolder};
