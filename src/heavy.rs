use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

/// A value that is expensive to build
#[derive(Debug)]
pub struct Heavy {
    serial: usize,
    payload: Vec<u64>,
    complete: bool,
}

impl Heavy {
    /// Builds a new instance, blocking the current thread for `delay`.
    pub fn new(delay: Duration) -> Self {
        let serial = CONSTRUCTED.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(serial, "creating Heavy");

        let mut heavy = Self {
            serial,
            payload: Vec::new(),
            complete: false,
        };
        std::thread::sleep(delay);
        heavy.payload = (0..1024).map(|n: u64| n * n).collect();
        heavy.complete = true;
        tracing::info!(serial, "Heavy created");

        heavy
    }

    /// Number of instances built in this process before and including this one
    pub fn serial(&self) -> usize {
        self.serial
    }

    /// `true` once every field has been filled in
    pub fn is_complete(&self) -> bool {
        self.complete && self.payload.len() == 1024
    }
}

impl fmt::Display for Heavy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "quite heavy (#{})", self.serial())
    }
}
