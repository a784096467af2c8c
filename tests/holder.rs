use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Barrier;
use std::time::Duration;

use miette::Diagnostic;

use lazyhold::{Holder, State, SyncHolder};

/// Value whose constructor counts itself and flags completion last
#[derive(Debug)]
struct Probe {
    payload: Vec<u32>,
    complete: AtomicBool,
}

impl Probe {
    fn new(count: &AtomicUsize, delay: Duration) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        let probe = Self {
            payload: Vec::new(),
            complete: AtomicBool::new(false),
        };
        std::thread::sleep(delay);
        let probe = Self {
            payload: (0..256).collect(),
            ..probe
        };
        probe.complete.store(true, Ordering::Relaxed);
        probe
    }

    fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Relaxed) && self.payload.len() == 256
    }
}

fn race<T: Send>(threads: usize, access: impl Fn() -> T + Sync) -> Vec<T> {
    let barrier = Barrier::new(threads);
    std::thread::scope(|s| {
        let handles = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    access()
                })
            })
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    })
}

#[test]
fn single_call() {
    let count = AtomicUsize::new(0);
    let holder = Holder::new(|| Ok(Probe::new(&count, Duration::ZERO)));
    assert_eq!(count.load(Ordering::SeqCst), 0);

    let value = holder.get_value().unwrap();
    assert!(value.is_complete());
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn sequential_calls_share_one_instance() {
    let count = AtomicUsize::new(0);
    let holder = Holder::new(|| Ok(Probe::new(&count, Duration::ZERO)));

    let first = holder.get_value().unwrap();
    for _ in 0..1000 {
        assert!(std::ptr::eq(first, holder.get_value().unwrap()));
    }
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_calls_share_one_instance() {
    let count = AtomicUsize::new(0);
    let holder = Holder::new(|| Ok(Probe::new(&count, Duration::from_millis(20))));

    let values = race(100, || holder.get_value().unwrap());

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(values.len(), 100);
    assert!(values.iter().all(|value| std::ptr::eq(*value, values[0])));
    assert_eq!(holder.state(), State::Ready);
}

#[test]
fn never_observed_partially_built() {
    for _ in 0..20 {
        let count = AtomicUsize::new(0);
        let holder = Holder::new(|| Ok(Probe::new(&count, Duration::ZERO)));

        let complete = race(32, || {
            (0..100).all(|_| holder.get_value().unwrap().is_complete())
        });

        assert!(complete.into_iter().all(|complete| complete));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn failure_then_retry() {
    let attempts = AtomicUsize::new(0);
    let count = AtomicUsize::new(0);
    let holder = Holder::new(|| {
        if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            anyhow::bail!("resource unavailable");
        }
        Ok(Probe::new(&count, Duration::ZERO))
    });

    let error = holder.get_value().unwrap_err();
    assert_eq!(
        error.code().unwrap().to_string(),
        "lazyhold::construction-failure"
    );
    assert_eq!(holder.state(), State::Empty);
    assert_eq!(count.load(Ordering::SeqCst), 0);

    assert!(holder.get_value().unwrap().is_complete());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_waiters_never_get_an_empty_value() {
    let attempts = AtomicUsize::new(0);
    let count = AtomicUsize::new(0);
    let holder = Holder::new(|| {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(5));
        if attempt < 3 {
            anyhow::bail!("attempt {attempt} failed");
        }
        Ok(Probe::new(&count, Duration::ZERO))
    });

    let results = race(16, || holder.get_value().map(|value| value as *const Probe as usize));

    let failures = results.iter().filter(|result| result.is_err()).count();
    let successes = results
        .iter()
        .filter_map(|result| result.as_ref().ok())
        .collect::<Vec<_>>();
    assert_eq!(failures, 3);
    assert_eq!(successes.len(), 13);
    assert!(successes.iter().all(|address| *address == successes[0]));
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn sync_holder_single_construction() {
    let count = AtomicUsize::new(0);
    let holder = SyncHolder::new(|| Ok(Probe::new(&count, Duration::from_millis(20))));
    assert_eq!(count.load(Ordering::SeqCst), 0);

    let values = race(50, || holder.get_value().unwrap());

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(values
        .iter()
        .all(|value| std::sync::Arc::ptr_eq(value, &values[0]) && value.is_complete()));
}
