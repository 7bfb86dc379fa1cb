//! Dynamically typed values.
//!
//! Most code memoizes ordinary Rust closures, whose callability the compiler
//! already proves. [`Value`] covers the dynamic case: arguments of mixed types
//! in one argument list, and targets that are only known to be functions at
//! run time. [`wrap`](crate::wrap) checks the latter once, when the function
//! is wrapped.

use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display, Formatter, Write};
use std::rc::Rc;

use crate::key::{Argument, Join, write_number};

/// An error raised by a dynamic function.
pub type Thrown = Box<dyn std::error::Error + Send + Sync>;

/// A dynamically typed value.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// The absence of a value, e.g. an omitted argument.
    #[default]
    Undefined,
    /// An explicitly empty value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A floating-point number.
    Number(f64),
    /// A string.
    Str(String),
    /// An ordered sequence of values.
    Array(Vec<Value>),
    /// A string-keyed map of values.
    Object(BTreeMap<String, Value>),
    /// An invocable function.
    Function(Function),
}

impl Value {
    /// Whether the value can be invoked.
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Function(_))
    }

    /// The function, if the value is one.
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Self::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Write the value the way it appears inside a joined list, where
    /// `undefined` and `null` are empty.
    fn write_joined(&self, buf: &mut String) {
        match self {
            Self::Undefined | Self::Null => {}
            Self::Number(v) => write_number(buf, *v),
            Self::Str(s) => buf.push_str(s),
            Self::Array(items) => {
                let mut join = Join::new(buf, ',');
                for item in items {
                    item.write_joined(join.item());
                }
            }
            other => {
                let _ = write!(buf, "{other}");
            }
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Undefined => f.pad("undefined"),
            Self::Null => f.pad("null"),
            Self::Bool(v) => Display::fmt(v, f),
            Self::Object(_) => f.pad("[object Object]"),
            Self::Function(func) => Display::fmt(func, f),
            Self::Number(_) | Self::Str(_) | Self::Array(_) => {
                let mut buf = String::new();
                self.write_joined(&mut buf);
                f.pad(&buf)
            }
        }
    }
}

impl Argument for Value {
    fn write_to(&self, buf: &mut String) {
        self.write_joined(buf);
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

macro_rules! number_from {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::Number(f64::from(v))
            }
        })*
    };
}

number_from! { i8, i16, i32, u8, u16, u32, f32 }

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Self::Object(v)
    }
}

impl From<Function> for Value {
    fn from(v: Function) -> Self {
        Self::Function(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// A function that can be stored in a [`Value`].
///
/// Functions are called with a slice of positional arguments and no receiver.
/// Two functions are equal if they share the same underlying closure.
#[derive(Clone)]
pub struct Function {
    name: Rc<str>,
    func: Rc<dyn Fn(&[Value]) -> Result<Value, Thrown>>,
}

impl Function {
    /// Create a named function.
    pub fn new<F>(name: impl Into<Rc<str>>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, Thrown> + 'static,
    {
        Self { name: name.into(), func: Rc::new(func) }
    }

    /// The function's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the function.
    pub fn call(&self, args: &[Value]) -> Result<Value, Thrown> {
        (self.func)(args)
    }
}

impl Debug for Function {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_tuple("Function").field(&self.name).finish()
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "function {}() {{ [native code] }}", self.name)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

/// Build an [`Args`](crate::Args) list of [`Value`]s.
///
/// ```
/// use argmemo::{args, Value};
///
/// let args = args![1, "two", Value::Null];
/// assert_eq!(argmemo::key(&args), "1-two-");
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        $crate::Args(::std::vec![$($crate::Value::from($arg)),*])
    };
}
