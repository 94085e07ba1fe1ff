//! Type-erased values flowing through intercepted calls.
//!
//! Advice is registered once and applied to calls of any shape, so arguments
//! and results cross the engine as [`Value`] trait objects. Handlers recover
//! the concrete type with `downcast_ref` / `downcast_mut`.

use std::{
    any::{Any, type_name},
    fmt::{self, Debug},
};

/// A value that can be passed through the interception engine.
///
/// Implemented for every `Any + Debug + Send + Sync` type.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be passed through an intercepted call",
    label = "must be `Debug + Send + Sync + 'static`",
    note = "Arguments and results are logged and shared across threads."
)]
pub trait Value: Any + Debug + Send + Sync {
    /// Upcast to `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Upcast to `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Upcast a box to `Box<dyn Any>`.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;

    /// Name of the concrete type, for diagnostics.
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Debug + Send + Sync> Value for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

impl dyn Value {
    /// Whether the concrete type is `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrow as `T` if that is the concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Mutably borrow as `T` if that is the concrete type.
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}

/// An owned, type-erased value.
pub type BoxValue = Box<dyn Value>;

/// Box a value for the engine.
pub fn boxed<T: Value>(value: T) -> BoxValue {
    Box::new(value)
}

/// Take the concrete value out of a box, or give the box back on mismatch.
pub fn unbox<T: Any>(value: BoxValue) -> Result<T, BoxValue> {
    if value.is::<T>() {
        match value.into_any().downcast::<T>() {
            Ok(v) => Ok(*v),
            // `is::<T>()` was checked above.
            Err(_) => unreachable!(),
        }
    } else {
        Err(value)
    }
}

/// The read-only argument list of an intercepted call.
#[derive(Default)]
pub struct Arguments {
    values: Vec<BoxValue>,
}

impl Arguments {
    /// An empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument.
    pub fn with<T: Value>(mut self, value: T) -> Self {
        self.values.push(Box::new(value));
        self
    }

    /// Append an already boxed argument.
    pub fn push(&mut self, value: BoxValue) {
        self.values.push(value);
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow argument `index` as `T`.
    pub fn get<T: Any>(&self, index: usize) -> Option<&T> {
        self.values.get(index).and_then(|v| v.downcast_ref())
    }

    /// Borrow argument `index` type-erased.
    pub fn get_value(&self, index: usize) -> Option<&dyn Value> {
        self.values.get(index).map(|v| &**v)
    }

    /// Iterate over the arguments in order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Value> {
        self.values.iter().map(|v| &**v)
    }
}

impl Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}

impl FromIterator<BoxValue> for Arguments {
    fn from_iter<I: IntoIterator<Item = BoxValue>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Build an [`Arguments`] list from plain values.
///
/// ```rust
/// use weave_core::args;
///
/// let args = args![1_u32, "two", false];
/// assert_eq!(args.len(), 3);
/// assert_eq!(args.get::<bool>(2), Some(&false));
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Arguments::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Arguments::new()$(.with($value))+
    };
}
