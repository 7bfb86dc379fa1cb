//! Hit and miss bookkeeping for tests.

use std::cell::Cell;

/// How the memoized calls on one thread were served.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Tally {
    /// Calls answered from a cache.
    pub hits: usize,
    /// Calls that invoked the wrapped function and stored its result.
    pub misses: usize,
}

thread_local! {
    static LAST_WAS_HIT: Cell<bool> = const { Cell::new(false) };
    static TALLY: Cell<Tally> = const { Cell::new(Tally { hits: 0, misses: 0 }) };
}

/// Whether the last memoized call on this thread was a hit.
pub fn last_was_hit() -> bool {
    LAST_WAS_HIT.with(Cell::get)
}

/// The hits and misses recorded on this thread since the last reset.
pub fn tally() -> Tally {
    TALLY.with(Cell::get)
}

/// Reset this thread's tally.
pub fn reset() {
    TALLY.with(|cell| cell.set(Tally::default()));
    LAST_WAS_HIT.with(|cell| cell.set(false));
}

pub(crate) fn register_hit() {
    record(true);
}

pub(crate) fn register_miss() {
    record(false);
}

fn record(hit: bool) {
    LAST_WAS_HIT.with(|cell| cell.set(hit));
    TALLY.with(|cell| {
        let mut tally = cell.get();
        if hit {
            tally.hits += 1;
        } else {
            tally.misses += 1;
        }
        cell.set(tally);
    });
}
