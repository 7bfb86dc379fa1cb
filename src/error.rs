use thiserror::Error;

/// Errors produced when building a memoized function.
///
/// Errors of the wrapped function itself are never converted into this type.
/// They are handed back to the caller exactly as the function returned them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The value to memoize cannot be invoked.
    #[error("\"{0}\" is not a function")]
    NotCallable(String),
}

/// A result with the crate's error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;
