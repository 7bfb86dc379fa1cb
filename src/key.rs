use std::fmt::Write;
use std::rc::Rc;
use std::sync::Arc;

/// Separator between the arguments of a key.
const SEPARATOR: char = '-';

/// Separator between the elements of a sequence argument.
const ELEMENT_SEPARATOR: char = ',';

/// Compute the cache key of an argument list.
///
/// Every argument is converted to its string form and the results are joined
/// with `-`. An empty argument list produces the empty key.
///
/// Keys only depend on the string forms, so arguments of different types may
/// produce the same key:
///
/// ```
/// assert_eq!(argmemo::key(&(1, 2)), "1-2");
/// assert_eq!(argmemo::key(&("1", "2")), "1-2");
/// assert_eq!(argmemo::key(&"1-2"), "1-2");
/// assert_eq!(argmemo::key(&()), "");
/// ```
pub fn key<A: Arguments + ?Sized>(args: &A) -> String {
    let mut buf = String::new();
    args.write_key(&mut buf);
    buf
}

/// A single argument of a memoized function.
///
/// Implemented for primitives, strings, options, sequences and smart pointers
/// to those.
pub trait Argument {
    /// Append the argument's string form to the buffer.
    fn write_to(&self, buf: &mut String);
}

/// A full argument list of a memoized function.
///
/// This is implemented for every single [`Argument`], for tuples of up to
/// twelve arguments and for [`Args`].
pub trait Arguments {
    /// Append the list's key to the buffer.
    fn write_key(&self, buf: &mut String);
}

/// A dynamically sized argument list.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Args<T>(pub Vec<T>);

impl<T: Argument + ?Sized> Arguments for T {
    fn write_key(&self, buf: &mut String) {
        self.write_to(buf);
    }
}

impl<T: Argument> Arguments for Args<T> {
    fn write_key(&self, buf: &mut String) {
        let mut join = Join::new(buf, SEPARATOR);
        for arg in &self.0 {
            arg.write_to(join.item());
        }
    }
}

impl<T> From<Vec<T>> for Args<T> {
    fn from(args: Vec<T>) -> Self {
        Self(args)
    }
}

macro_rules! tuple_arguments {
    ($($param:tt $idx:tt),*) => {
        #[allow(unused_variables, unused_mut)]
        impl<$($param: Argument),*> Arguments for ($($param,)*) {
            fn write_key(&self, buf: &mut String) {
                let mut join = Join::new(buf, SEPARATOR);
                $(self.$idx.write_to(join.item());)*
            }
        }
    };
}

tuple_arguments! {}
tuple_arguments! { A 0 }
tuple_arguments! { A 0, B 1 }
tuple_arguments! { A 0, B 1, C 2 }
tuple_arguments! { A 0, B 1, C 2, D 3 }
tuple_arguments! { A 0, B 1, C 2, D 3, E 4 }
tuple_arguments! { A 0, B 1, C 2, D 3, E 4, F 5 }
tuple_arguments! { A 0, B 1, C 2, D 3, E 4, F 5, G 6 }
tuple_arguments! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7 }
tuple_arguments! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8 }
tuple_arguments! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9 }
tuple_arguments! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10 }
tuple_arguments! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11 }

/// Writes items into a buffer with a separator between them.
pub(crate) struct Join<'a> {
    buf: &'a mut String,
    sep: char,
    first: bool,
}

impl<'a> Join<'a> {
    pub(crate) fn new(buf: &'a mut String, sep: char) -> Self {
        Self { buf, sep, first: true }
    }

    /// Prepare the buffer for the next item.
    pub(crate) fn item(&mut self) -> &mut String {
        if !self.first {
            self.buf.push(self.sep);
        }
        self.first = false;
        &mut *self.buf
    }
}

macro_rules! display_argument {
    ($($ty:ty),* $(,)?) => {
        $(impl Argument for $ty {
            fn write_to(&self, buf: &mut String) {
                let _ = write!(buf, "{self}");
            }
        })*
    };
}

display_argument! {
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    bool, char, str, String,
}

impl Argument for f64 {
    fn write_to(&self, buf: &mut String) {
        write_number(buf, *self);
    }
}

impl Argument for f32 {
    fn write_to(&self, buf: &mut String) {
        write_number(buf, f64::from(*self));
    }
}

/// Write a float the way a number prints in a joined argument list.
pub(crate) fn write_number(buf: &mut String, v: f64) {
    if v.is_nan() {
        buf.push_str("NaN");
    } else if v.is_infinite() {
        buf.push_str(if v > 0.0 { "Infinity" } else { "-Infinity" });
    } else if v == 0.0 {
        // Negative zero prints as plain zero.
        buf.push('0');
    } else {
        let _ = write!(buf, "{v}");
    }
}

impl<T: Argument> Argument for Option<T> {
    fn write_to(&self, buf: &mut String) {
        if let Some(v) = self {
            v.write_to(buf);
        }
    }
}

impl<T: Argument> Argument for [T] {
    fn write_to(&self, buf: &mut String) {
        let mut join = Join::new(buf, ELEMENT_SEPARATOR);
        for item in self {
            item.write_to(join.item());
        }
    }
}

impl<T: Argument, const N: usize> Argument for [T; N] {
    fn write_to(&self, buf: &mut String) {
        self.as_slice().write_to(buf);
    }
}

impl<T: Argument> Argument for Vec<T> {
    fn write_to(&self, buf: &mut String) {
        self.as_slice().write_to(buf);
    }
}

impl<T: Argument + ?Sized> Argument for &T {
    fn write_to(&self, buf: &mut String) {
        (**self).write_to(buf);
    }
}

impl<T: Argument + ?Sized> Argument for Box<T> {
    fn write_to(&self, buf: &mut String) {
        (**self).write_to(buf);
    }
}

impl<T: Argument + ?Sized> Argument for Rc<T> {
    fn write_to(&self, buf: &mut String) {
        (**self).write_to(buf);
    }
}

impl<T: Argument + ?Sized> Argument for Arc<T> {
    fn write_to(&self, buf: &mut String) {
        (**self).write_to(buf);
    }
}
