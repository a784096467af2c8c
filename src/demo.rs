//! Drives a [`Holder`] from many threads at once and reports what happened.
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;

use anyhow::Context;

use crate::config::Config;
use crate::heavy::Heavy;
use crate::holder::Holder;

/// Outcome of a [`run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Total number of `get_value` calls
    pub calls: usize,
    /// Calls that returned a construction failure
    pub failures: usize,
    /// Successful runs of the factory
    pub constructions: usize,
    /// Distinct instances handed out
    pub distinct: usize,
    /// Values observed before they were fully built
    pub incomplete: usize,
    /// Display form of the held value, if it was built
    pub value: Option<String>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "calls: {}", self.calls)?;
        writeln!(f, "failures: {}", self.failures)?;
        writeln!(f, "constructions: {}", self.constructions)?;
        writeln!(f, "distinct instances: {}", self.distinct)?;
        writeln!(f, "incomplete observations: {}", self.incomplete)?;
        match &self.value {
            Some(value) => write!(f, "value: {value}"),
            None => write!(f, "value: <none>"),
        }
    }
}

#[derive(Default)]
struct Observed<'h> {
    values: Vec<&'h Heavy>,
    failures: usize,
}

/// Races `config.threads()` threads, each calling `get_value` `config.calls()` times.
///
/// The factory sleeps for `config.delay()` and fails its first
/// `config.failures()` attempts.
pub fn run(config: &Config) -> anyhow::Result<Report> {
    let threads = config.threads();
    let delay = config.delay();
    let attempts = AtomicUsize::new(0);
    let constructions = AtomicUsize::new(0);

    let holder = Holder::new(|| {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < config.failures() {
            anyhow::bail!("construction attempt {} refused", attempt + 1);
        }
        let heavy = Heavy::new(delay);
        constructions.fetch_add(1, Ordering::SeqCst);
        Ok(heavy)
    });
    tracing::info!(threads, "holder created, deferring heavy creation");
    anyhow::ensure!(
        attempts.load(Ordering::SeqCst) == 0,
        "value constructed before first access"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|index| format!("lazyhold-{index}"))
        .build()
        .context("could not start the worker threads")?;
    let barrier = Barrier::new(threads);

    let observed = pool.broadcast(|_| {
        barrier.wait();

        let mut observed = Observed::default();
        for _ in 0..config.calls() {
            match holder.get_value() {
                Ok(value) => observed.values.push(value),
                Err(_) => observed.failures += 1,
            }
        }
        observed
    });

    let values = observed.iter().flat_map(|observed| observed.values.iter());
    let distinct = values
        .clone()
        .map(|value| *value as *const Heavy)
        .collect::<HashSet<_>>()
        .len();
    let incomplete = values.filter(|value| !value.is_complete()).count();

    Ok(Report {
        calls: threads * config.calls(),
        failures: observed.iter().map(|observed| observed.failures).sum(),
        constructions: constructions.load(Ordering::SeqCst),
        distinct,
        incomplete,
        value: holder.get().map(ToString::to_string),
    })
}
