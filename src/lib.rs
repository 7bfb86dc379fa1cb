//! Memoization keyed by the string form of a function's arguments.
//!
//! A memoized function remembers its result for every argument list it was
//! called with. Argument lists are identified by their string form: each
//! argument is printed and the results are joined with `-`. The first call
//! for a key invokes the function, all later calls receive the stored result.
//!
//! ```
//! use std::cell::Cell;
//!
//! let runs = Cell::new(0);
//! let sum = argmemo::memoize(|(a, b): (i32, i32)| {
//!     runs.set(runs.get() + 1);
//!     a + b
//! });
//!
//! assert_eq!(sum.call((1, 2)), 3);
//! assert_eq!(sum.call((1, 2)), 3);
//! assert_eq!(runs.get(), 1);
//! ```
//!
//! Free functions can be memoized with the [`memoize`](macro@memoize)
//! attribute instead. Dynamically typed functions go through [`wrap`], which
//! rejects values that are not functions.

mod cache;
mod error;
mod key;
mod memoize;
mod sync;
#[cfg(feature = "testing")]
mod testing;
mod value;

pub use crate::cache::Cache;
pub use crate::error::{Error, Result};
pub use crate::key::{Args, Argument, Arguments, key};
pub use crate::memoize::{Memoized, Wrapped, memoize, wrap};
pub use crate::sync::SyncMemoized;
pub use crate::value::{Function, Thrown, Value};

#[cfg(feature = "macros")]
pub use argmemo_macros::memoize;

/// These are implementation details. Do not rely on them!
#[doc(hidden)]
pub mod internal {
    pub use crate::cache::Cache;
    pub use crate::memoize::cached;

    #[cfg(feature = "testing")]
    pub use crate::testing::{Tally, last_was_hit, reset, tally};

    /// Ensure a type is usable as an argument.
    pub fn assert_argument<T: crate::Argument + ?Sized>() {}
}
