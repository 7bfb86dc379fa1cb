//! This demo memoizes a closure, a free function and a dynamically typed
//! function, and shows that arguments which print the same share a result.

use std::cell::Cell;

use argmemo::{Function, Value, args, memoize, wrap};

fn main() {
    let runs = Cell::new(0);
    let sum = memoize(|(a, b): (i32, i32)| {
        runs.set(runs.get() + 1);
        a + b
    });

    sum.call((1, 2)); // [Miss] The cache is empty.
    sum.call((1, 2)); // [Hit] Same numbers.
    sum.call((2, 1)); // [Miss] Different order, different key.
    println!("sum ran {} times for {} keys", runs.get(), sum.len());

    fib(40); // [Miss] Fills the cache for every n up to 40.
    fib(30); // [Hit]
    println!("fib(40) = {}", fib(40));

    let echo = Function::new("echo", |args| Ok(args.first().cloned().unwrap_or_default()));
    let echo = wrap(echo.into()).expect("echo is a function");
    let first = echo.try_call(args![1]).expect("echo never fails");
    let second = echo.try_call(args!["1"]).expect("echo never fails");
    println!("echo(1) = {first:?}, echo(\"1\") = {second:?}");

    match wrap(Value::Number(5.0)) {
        Ok(_) => unreachable!("numbers cannot be called"),
        Err(err) => println!("wrap(5) failed: {err}"),
    }
}

/// Compute a Fibonacci number.
#[argmemo::memoize]
fn fib(n: u64) -> u64 {
    if n <= 2 { 1 } else { fib(n - 1) + fib(n - 2) }
}
