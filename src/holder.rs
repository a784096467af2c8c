//! Deferred, at-most-once construction of an expensive value.
//!
//! [`Holder`] starts empty and runs its factory the first time
//! [`Holder::get_value`] is called. Every later call, from any thread, returns
//! the same instance without taking a lock.
use std::fmt;
use std::sync::{Mutex, OnceLock, PoisonError, TryLockError};

use crate::error::{ConstructionFailure, Result};

pub mod naive;

pub use self::naive::SyncHolder;

/// Observable lifecycle of a [`Holder`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum State {
    /// No value yet, nobody is constructing one
    Empty,
    /// A thread is inside the critical section running the factory
    Initializing,
    /// The value is published and immutable
    Ready,
}

/// Lazily constructs a value the first time it is requested and memoizes it.
///
/// Reads after initialization only perform an acquire load. Construction runs
/// under a per-holder mutex with a second check of the slot, so concurrent
/// callers never build the value twice.
///
/// # Example
///
/// ```
/// use lazyhold::Holder;
///
/// static GREETING: Holder<String> = Holder::new(|| Ok("hello".to_owned()));
///
/// # fn main() -> Result<(), lazyhold::ConstructionFailure> {
/// assert!(GREETING.get().is_none());
/// assert_eq!(GREETING.get_value()?, "hello");
/// assert!(std::ptr::eq(GREETING.get_value()?, GREETING.get_value()?));
/// # Ok(())
/// # }
/// ```
pub struct Holder<T, F = fn() -> anyhow::Result<T>> {
    value: OnceLock<T>,
    init: Mutex<()>,
    factory: F,
}

impl<T, F> Holder<T, F>
where
    F: Fn() -> anyhow::Result<T>,
{
    /// Creates an empty holder. The factory is not called.
    pub const fn new(factory: F) -> Self {
        Self {
            value: OnceLock::new(),
            init: Mutex::new(()),
            factory,
        }
    }

    /// Creates a holder that is already [`State::Ready`]; `factory` is never called.
    pub fn with_value(value: T, factory: F) -> Self {
        Self {
            value: OnceLock::from(value),
            init: Mutex::new(()),
            factory,
        }
    }

    /// Returns the memoized value, constructing it on first use.
    ///
    /// When the factory fails, only the caller that ran it sees the error and
    /// the holder stays [`State::Empty`]: the next call tries again.
    pub fn get_value(&self) -> Result<&T> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        self.get_value_slow()
    }

    #[cold]
    fn get_value_slow(&self) -> Result<&T> {
        // The mutex protects no data, a panic in a previous factory call only
        // means the slot was left empty.
        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have won the race while we were waiting.
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        tracing::debug!(
            value = std::any::type_name::<T>(),
            "constructing held value"
        );
        let value = (self.factory)().map_err(|error| {
            tracing::warn!(
                value = std::any::type_name::<T>(),
                "construction failed: {error:#}"
            );
            ConstructionFailure::from(error)
        })?;

        // Only the lock holder writes, so the slot is still empty here.
        let value = self.value.get_or_init(|| value);
        tracing::debug!(value = std::any::type_name::<T>(), "held value published");

        Ok(value)
    }
}

impl<T, F> Holder<T, F> {
    /// Returns the value if it has been constructed. Never blocks, never constructs.
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    pub fn is_ready(&self) -> bool {
        self.value.get().is_some()
    }

    /// Snapshot of the lifecycle; may be stale by the time it is returned.
    pub fn state(&self) -> State {
        if self.is_ready() {
            return State::Ready;
        }

        match self.init.try_lock() {
            Err(TryLockError::WouldBlock) => {
                // The winner may have published between the two checks.
                if self.is_ready() {
                    State::Ready
                } else {
                    State::Initializing
                }
            }
            Ok(_) | Err(TryLockError::Poisoned(_)) => {
                if self.is_ready() {
                    State::Ready
                } else {
                    State::Empty
                }
            }
        }
    }

    /// Consumes the holder, returning the value if it was constructed.
    pub fn into_inner(self) -> Option<T> {
        self.value.into_inner()
    }
}

impl<T: fmt::Debug, F> fmt::Debug for Holder<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct(stringify!(Holder));
        debug.field("state", &self.state());
        match self.get() {
            Some(value) => debug.field("value", value).finish(),
            None => debug.finish_non_exhaustive(),
        }
    }
}
