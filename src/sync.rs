use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxBuildHasher, FxHashMap};
use tracing::trace;

use crate::key::{Arguments, key};

/// A memoized function that can be shared across threads.
///
/// Keys and results behave exactly like in [`Memoized`](crate::Memoized).
/// Additionally, callers that race on the same key are collapsed into a single
/// invocation: one of them runs the function while the others wait for its
/// result. Once a key has a result, reading it only takes shared locks.
///
/// The function must not call its own wrapper with the arguments it is
/// currently computing. Such a call waits on itself.
pub struct SyncMemoized<F, T> {
    func: F,
    slots: RwLock<FxHashMap<String, Arc<Slot<T>>>>,
}

/// The result for a single key.
struct Slot<T> {
    /// The memoized result, once there is one.
    value: RwLock<Option<T>>,
    /// Held by the caller that is currently computing the result.
    flight: Mutex<()>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self { value: RwLock::new(None), flight: Mutex::new(()) }
    }
}

impl<F, T> SyncMemoized<F, T> {
    /// Wrap a function with a fresh, empty cache.
    pub fn new(func: F) -> Self {
        Self { func, slots: RwLock::new(HashMap::with_hasher(FxBuildHasher)) }
    }

    /// The number of memoized results.
    pub fn len(&self) -> usize {
        self.slots.read().values().filter(|slot| slot.value.read().is_some()).count()
    }

    /// Whether nothing was memoized yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether there is a result for the arguments.
    pub fn contains<A: Arguments + ?Sized>(&self, args: &A) -> bool {
        self.slots.read().get(&key(args)).is_some_and(|slot| slot.value.read().is_some())
    }

    /// The wrapped function.
    pub fn func(&self) -> &F {
        &self.func
    }

    /// Discard the cache and return the wrapped function.
    pub fn into_inner(self) -> F {
        self.func
    }

    /// Find or create the slot for a key.
    fn slot(&self, key: &str) -> Arc<Slot<T>> {
        if let Some(slot) = self.slots.read().get(key) {
            return slot.clone();
        }

        self.slots.write().entry(key.to_owned()).or_default().clone()
    }
}

impl<F, T: Clone> SyncMemoized<F, T> {
    /// Return the memoized result for the arguments, without invoking the
    /// function.
    pub fn get<A: Arguments + ?Sized>(&self, args: &A) -> Option<T> {
        let slots = self.slots.read();
        slots.get(&key(args)).and_then(|slot| slot.value.read().clone())
    }

    /// Call the function or return its memoized result.
    pub fn call<A>(&self, args: A) -> T
    where
        A: Arguments,
        F: Fn(A) -> T,
    {
        let func = |args: A| Ok::<_, std::convert::Infallible>((self.func)(args));
        match self.try_call_with(args, func) {
            Ok(output) => output,
            Err(never) => match never {},
        }
    }

    /// Call a fallible function or return its memoized result.
    ///
    /// Only successful results are memoized. When the function fails, the
    /// error goes to the caller that ran it and the next waiting caller tries
    /// again.
    pub fn try_call<A, E>(&self, args: A) -> Result<T, E>
    where
        A: Arguments,
        F: Fn(A) -> Result<T, E>,
    {
        self.try_call_with(args, &self.func)
    }

    fn try_call_with<A, E, G>(&self, args: A, func: G) -> Result<T, E>
    where
        A: Arguments,
        G: FnOnce(A) -> Result<T, E>,
    {
        let key = key(&args);
        let slot = self.slot(&key);

        if let Some(output) = slot.value.read().clone() {
            trace!(key = %key, "memoized hit");

            #[cfg(feature = "testing")]
            crate::testing::register_hit();

            return Ok(output);
        }

        let _flight = slot.flight.lock();

        // Someone else may have finished while we were waiting.
        if let Some(output) = slot.value.read().clone() {
            trace!(key = %key, "memoized hit after waiting");

            #[cfg(feature = "testing")]
            crate::testing::register_hit();

            return Ok(output);
        }

        let output = func(args)?;
        *slot.value.write() = Some(output.clone());
        trace!(key = %key, "memoized miss");

        #[cfg(feature = "testing")]
        crate::testing::register_miss();

        Ok(output)
    }
}

impl<F, T> Debug for SyncMemoized<F, T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("SyncMemoized").field("len", &self.len()).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_sync_memoized_basic() {
        let runs = AtomicUsize::new(0);
        let sum = SyncMemoized::new(|(a, b): (u32, u32)| {
            runs.fetch_add(1, Ordering::SeqCst);
            a + b
        });
        assert!(sum.is_empty());
        assert_eq!(sum.call((1, 2)), 3);
        assert_eq!(sum.call((1, 2)), 3);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(sum.contains(&(1, 2)));
        assert_eq!(sum.get(&("1", "2")), Some(3));
        assert_eq!(sum.len(), 1);
    }

    #[test]
    fn test_sync_memoized_single_flight() {
        const THREADS: usize = 8;

        let runs = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);
        let slow = SyncMemoized::new(|x: u64| {
            runs.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            x * 10
        });

        thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    barrier.wait();
                    assert_eq!(slow.call(7), 70);
                });
            }
        });

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(slow.len(), 1);
    }

    #[test]
    fn test_sync_memoized_failure_is_retried() {
        let runs = AtomicUsize::new(0);
        let flaky = SyncMemoized::new(|x: i32| {
            if runs.fetch_add(1, Ordering::SeqCst) == 0 {
                Err("first call fails")
            } else {
                Ok(x + 1)
            }
        });
        assert_eq!(flaky.try_call(1), Err("first call fails"));
        assert!(!flaky.contains(&1));
        assert_eq!(flaky.try_call(1), Ok(2));
        assert_eq!(flaky.try_call(1), Ok(2));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_sync_memoized_failing_flight_hands_over() {
        const THREADS: usize = 4;

        let runs = AtomicUsize::new(0);
        let errors = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);
        let flaky = SyncMemoized::new(|x: u64| {
            if runs.fetch_add(1, Ordering::SeqCst) == 0 {
                thread::sleep(Duration::from_millis(50));
                Err("first flight fails")
            } else {
                Ok(x * 2)
            }
        });

        thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    barrier.wait();
                    match flaky.try_call(21) {
                        Ok(output) => assert_eq!(output, 42),
                        Err(err) => {
                            assert_eq!(err, "first flight fails");
                            errors.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                });
            }
        });

        // Only the caller that ran the failing invocation sees the error.
        // One waiter retries and the rest receive its result.
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(flaky.get(&21), Some(42));
    }
}
