use std::fmt::{self, Debug, Formatter};
use std::thread::LocalKey;

use tracing::debug;

use crate::cache::Cache;
use crate::error::{Error, Result};
use crate::key::{Args, Arguments, key};
use crate::value::{Thrown, Value};

/// Memoize a function.
///
/// This is a shorthand for [`Memoized::new`].
///
/// ```
/// let sum = argmemo::memoize(|(a, b): (u32, u32)| a + b);
/// assert_eq!(sum.call((1, 2)), 3);
/// assert_eq!(sum.call((1, 2)), 3);
/// assert_eq!(sum.len(), 1);
/// ```
pub fn memoize<F, T>(func: F) -> Memoized<F, T> {
    Memoized::new(func)
}

/// Memoize a dynamically typed function.
///
/// Fails with [`Error::NotCallable`] if the value is not a
/// [`Value::Function`]. The check happens once, here, and not on every call.
///
/// ```
/// use argmemo::{args, Function, Value};
///
/// let double = Function::new("double", |args| match args {
///     [Value::Number(n)] => Ok(Value::Number(2.0 * n)),
///     _ => Err("expected one number".into()),
/// });
///
/// let memoized = argmemo::wrap(double.into()).unwrap();
/// assert_eq!(memoized.try_call(args![21]).unwrap(), Value::Number(42.0));
///
/// let err = argmemo::wrap(Value::Number(5.0)).unwrap_err();
/// assert_eq!(err.to_string(), "\"5\" is not a function");
/// ```
pub fn wrap(target: Value) -> Result<Wrapped> {
    let func = match target {
        Value::Function(func) => func,
        other => {
            debug!(value = %other, "refusing to memoize a value that is not a function");
            return Err(Error::NotCallable(other.to_string()));
        }
    };

    let target: Box<dyn Fn(Args<Value>) -> Result<Value, Thrown>> =
        Box::new(move |args: Args<Value>| func.call(&args.0));

    Ok(Memoized::new(target))
}

/// A memoized dynamically typed function, as returned by [`wrap`].
pub type Wrapped = Memoized<Box<dyn Fn(Args<Value>) -> Result<Value, Thrown>>, Value>;

/// A function together with the cache of its results.
///
/// Results are keyed by the string form of the arguments (see
/// [`key`](crate::key())). Two argument lists that print the same share a
/// result, even if their types differ. The function is invoked at most once
/// per key: side effects happen on the first call only and later calls
/// receive a clone of the stored result.
///
/// A `Memoized` is meant for a single thread. Use
/// [`SyncMemoized`](crate::SyncMemoized) to share one across threads.
pub struct Memoized<F, T> {
    func: F,
    cache: Cache<T>,
}

impl<F, T> Memoized<F, T> {
    /// Wrap a function with a fresh, empty cache.
    pub fn new(func: F) -> Self {
        Self { func, cache: Cache::new() }
    }

    /// The number of memoized results.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether nothing was memoized yet.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Whether there is a result for the arguments.
    pub fn contains<A: Arguments + ?Sized>(&self, args: &A) -> bool {
        self.cache.contains(&key(args))
    }

    /// The wrapped function.
    pub fn func(&self) -> &F {
        &self.func
    }

    /// Discard the cache and return the wrapped function.
    pub fn into_inner(self) -> F {
        self.func
    }
}

impl<F, T: Clone> Memoized<F, T> {
    /// Return the memoized result for the arguments, without invoking the
    /// function.
    pub fn get<A: Arguments + ?Sized>(&self, args: &A) -> Option<T> {
        self.cache.get(&key(args))
    }

    /// Call the function or return its memoized result.
    pub fn call<A>(&self, args: A) -> T
    where
        A: Arguments,
        F: Fn(A) -> T,
    {
        let key = key(&args);
        self.cache.get_or_insert_with(key, || (self.func)(args))
    }

    /// Call a fallible function or return its memoized result.
    ///
    /// Only successful results are memoized. An error is returned unchanged
    /// and the next call with the same arguments invokes the function again.
    pub fn try_call<A, E>(&self, args: A) -> Result<T, E>
    where
        A: Arguments,
        F: Fn(A) -> Result<T, E>,
    {
        let key = key(&args);
        self.cache.get_or_try_insert_with(key, || (self.func)(args))
    }
}

impl<F, T> Debug for Memoized<F, T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Memoized").field("len", &self.len()).finish_non_exhaustive()
    }
}

/// Execute a `#[memoize]`d function, trying to use a cached result for it.
pub fn cached<A, T, F>(cache: &'static LocalKey<Cache<T>>, args: A, func: F) -> T
where
    A: Arguments,
    T: Clone + 'static,
    F: FnOnce(A) -> T,
{
    let key = key(&args);
    cache.with(|cache| cache.get_or_insert_with(key, || func(args)))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashSet;

    use super::*;
    use crate::value::Function;

    #[test]
    fn test_memoized_counts_invocations() {
        let runs = Cell::new(0);
        let sum = Memoized::new(|(a, b): (i32, i32)| {
            runs.set(runs.get() + 1);
            a + b
        });
        assert_eq!(sum.call((1, 2)), 3);
        assert_eq!(sum.call((1, 2)), 3);
        assert_eq!(runs.get(), 1);
        assert_eq!(sum.call((2, 1)), 3);
        assert_eq!(runs.get(), 2);
        assert_eq!(sum.len(), 2);
    }

    #[test]
    fn test_memoized_introspection() {
        let square = memoize::<_, u64>(|x: u64| x * x);
        assert!(square.is_empty());
        assert_eq!(square.get(&4), None);
        assert_eq!(square.call(4), 16);
        assert!(square.contains(&4));
        assert!(!square.contains(&5));
        assert_eq!(square.get(&4), Some(16));
        assert_eq!(format!("{square:?}"), "Memoized { len: 1, .. }");
        assert_eq!((square.into_inner())(3), 9);
    }

    #[test]
    fn test_separate_wrappings_do_not_share() {
        let runs = Cell::new(0);
        let f = |x: i32| {
            runs.set(runs.get() + 1);
            x
        };
        let a = memoize(f);
        let b = memoize(f);
        a.call(1);
        b.call(1);
        assert_eq!(runs.get(), 2);
    }

    #[quickcheck_macros::quickcheck]
    fn test_repeat_calls_quickcheck(calls: Vec<(u8, u8)>) -> bool {
        let runs = Cell::new(0);
        let sum = memoize(|(a, b): (u8, u8)| {
            runs.set(runs.get() + 1);
            u16::from(a) + u16::from(b)
        });

        let mut distinct = HashSet::new();
        for &(a, b) in &calls {
            if sum.call((a, b)) != u16::from(a) + u16::from(b) {
                return false;
            }
            distinct.insert((a, b));
        }

        runs.get() == distinct.len() && sum.len() == distinct.len()
    }

    #[test]
    fn test_wrap_rejects_non_functions() {
        for value in [
            Value::Undefined,
            Value::Null,
            Value::Number(1.0),
            Value::from("text"),
            Value::Array(vec![]),
            Value::Object(Default::default()),
        ] {
            let expected = format!("\"{value}\" is not a function");
            let err = wrap(value).unwrap_err();
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn test_wrap_passes_arguments_in_order() {
        let concat = Function::new("concat", |args| {
            Ok(Value::Str(args.iter().map(Value::to_string).collect::<Vec<_>>().join("|")))
        });
        let memoized = wrap(concat.into()).unwrap();
        assert_eq!(
            memoized.try_call(crate::args!["a", 1, true]).unwrap(),
            Value::from("a|1|true")
        );
        assert!(memoized.contains(&crate::args!["a", 1, true]));
    }
}
