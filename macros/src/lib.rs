extern crate proc_macro;

macro_rules! bail {
    ($item:expr, $fmt:literal $($tts:tt)*) => {
        return Err(Error::new_spanned(
            &$item,
            format!(concat!("argmemo: ", $fmt) $($tts)*)
        ))
    }
}

mod memoize;

use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use syn::{Error, Result, parse_quote};

/// Memoize a free function.
///
/// Results are cached per function and per thread, keyed by the string form
/// of the arguments. Every argument type must implement `argmemo::Argument`
/// and the return type must be `Clone + 'static`.
///
/// ```ignore
/// #[argmemo::memoize]
/// fn fib(n: u64) -> u64 {
///     if n <= 2 { 1 } else { fib(n - 1) + fib(n - 2) }
/// }
///
/// assert_eq!(fib(80), 23416728348467685);
/// ```
///
/// Methods, generic functions and argument patterns other than plain
/// identifiers are rejected.
#[proc_macro_attribute]
pub fn memoize(_: TokenStream, stream: TokenStream) -> TokenStream {
    let func = syn::parse_macro_input!(stream as syn::ItemFn);
    memoize::expand(func)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
