use std::cell::Cell;

thread_local! {
    static EVALUATIONS: Cell<usize> = const { Cell::new(0) };
}

fn evaluations() -> usize {
    EVALUATIONS.with(Cell::get)
}

#[test]
fn test_simple() {
    empty(); // [Miss] The cache is empty.
    empty(); // [Hit] Always a hit from now on.
    empty(); // [Hit] Always a hit from now on.
    assert_eq!(evaluations(), 1);

    double(2); // [Miss] The cache is empty.
    double(4); // [Miss] Different number.
    double(2); // [Hit] Same number as initially.
    assert_eq!(evaluations(), 3);

    sum(2, 4); // [Miss] The cache is empty.
    sum(2, 3); // [Miss] Different numbers.
    sum(2, 3); // [Hit]  Same numbers.
    sum(4, 2); // [Miss] Different numbers.
    assert_eq!(evaluations(), 6);

    label("2-3"); // [Miss] Its key differs from everything `label` saw.
    label("2-3"); // [Hit] Same text.
    assert_eq!(evaluations(), 7);
}

fn count() {
    EVALUATIONS.with(|n| n.set(n.get() + 1));
}

/// Build a string.
#[argmemo::memoize]
fn empty() -> String {
    count();
    format!("The world is {}", "big")
}

/// Double a number.
#[argmemo::memoize]
fn double(x: u32) -> u32 {
    count();
    2 * x
}

/// Compute the sum of two numbers.
#[argmemo::memoize]
fn sum(a: u32, b: u32) -> u32 {
    count();
    a + b
}

/// Echo a label.
#[argmemo::memoize]
fn label(text: &str) -> String {
    count();
    text.to_owned()
}
