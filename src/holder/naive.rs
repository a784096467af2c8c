use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{ConstructionFailure, Result};

/// Lazy holder that takes its lock on every access.
///
/// Same guarantees as [`super::Holder`], but every call to
/// [`SyncHolder::get_value`] crosses the mutex, even once the value exists.
pub struct SyncHolder<T, F = fn() -> anyhow::Result<T>> {
    value: Mutex<Option<Arc<T>>>,
    factory: F,
}

impl<T, F> SyncHolder<T, F>
where
    F: Fn() -> anyhow::Result<T>,
{
    pub const fn new(factory: F) -> Self {
        Self {
            value: Mutex::new(None),
            factory,
        }
    }

    /// Returns a handle to the memoized value, constructing it on first use.
    pub fn get_value(&self) -> Result<Arc<T>> {
        let mut slot = self.value.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = slot.as_ref() {
            return Ok(Arc::clone(value));
        }

        tracing::debug!(
            value = std::any::type_name::<T>(),
            "constructing held value under lock"
        );
        let value = Arc::new((self.factory)().map_err(ConstructionFailure::from)?);
        *slot = Some(Arc::clone(&value));

        Ok(value)
    }
}

impl<T, F> SyncHolder<T, F> {
    pub fn is_ready(&self) -> bool {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl<T, F> fmt::Debug for SyncHolder<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(stringify!(SyncHolder))
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}
