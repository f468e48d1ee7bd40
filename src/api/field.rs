use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::api::capture::{InvalidValue, Value};
use crate::api::primitive::FlagType;
use crate::model::Primitive;

/// Flag storage allocated by a [`FlagSet`](crate::FlagSet) and shared with the caller.
///
/// Returned by the allocating registration methods (ex: [`FlagSet::optional_string`](crate::FlagSet::optional_string)).
/// The handle shares the storage with the flag set, and remains readable after the flag set is dropped.
pub struct Handle<V> {
    cell: Rc<RefCell<V>>,
}

impl<V> Handle<V> {
    pub(crate) fn new(value: V) -> Self {
        Self {
            cell: Rc::new(RefCell::new(value)),
        }
    }

    /// Borrow the current value.
    ///
    /// # Panics
    /// The flag set writes through the same cell, so [`FlagSet::parse`](crate::FlagSet::parse) and
    /// [`FlagSet::set`](crate::FlagSet::set) panic if they store into this flag while the returned [`Ref`] is
    /// still alive.
    /// Prefer [`Handle::get`], or drop the [`Ref`] before parsing.
    pub fn borrow(&self) -> Ref<'_, V> {
        self.cell.borrow()
    }

    fn replace(&self, value: V) {
        *self.cell.borrow_mut() = value;
    }
}

impl<V: Clone> Handle<V> {
    /// Copy out the current value.
    pub fn get(&self) -> V {
        self.cell.borrow().clone()
    }
}

impl<T> Handle<Option<T>> {
    /// Whether the flag was supplied.
    pub fn is_set(&self) -> bool {
        self.cell.borrow().is_some()
    }
}

impl<V> Clone for Handle<V> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for Handle<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Handle").field(&*self.cell.borrow()).finish()
    }
}

// Either the caller's own variable, or storage the flag set allocated.
enum Binding<'a, V> {
    Borrowed(&'a mut V),
    Shared(Handle<V>),
}

impl<'a, V> Binding<'a, V> {
    fn store(&mut self, value: V) {
        match self {
            Binding::Borrowed(variable) => **variable = value,
            Binding::Shared(handle) => handle.replace(value),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        match self {
            Binding::Borrowed(variable) => f(&**variable),
            Binding::Shared(handle) => f(&*handle.borrow()),
        }
    }
}

/// A flag that remembers whether it was supplied, binding to an [`Option`].
///
/// The variable is `None` until the flag is parsed, and `Some(value)` from then on.
pub struct Optional<'a, T> {
    variable: Binding<'a, Option<T>>,
    example: String,
}

impl<'a, T> Optional<'a, T> {
    /// Create an optional flag over the caller's variable, resetting it to `None`.
    pub fn new(variable: &'a mut Option<T>, example: impl Into<String>) -> Self {
        *variable = None;
        Self {
            variable: Binding::Borrowed(variable),
            example: example.into(),
        }
    }

    pub(crate) fn shared(example: impl Into<String>) -> (Self, Handle<Option<T>>) {
        let handle = Handle::new(None);
        let optional = Self {
            variable: Binding::Shared(handle.clone()),
            example: example.into(),
        };
        (optional, handle)
    }
}

impl<'a, T: FlagType> Value for Optional<'a, T> {
    fn render(&self) -> String {
        self.example.clone()
    }

    fn set(&mut self, token: &str) -> Result<(), InvalidValue> {
        let value = T::parse(token)?;
        self.variable.store(Some(value));
        Ok(())
    }

    fn get(&self) -> Option<Primitive> {
        self.variable
            .read(|variable| variable.as_ref().map(FlagType::primitive))
    }

    fn is_bool_flag(&self) -> bool {
        T::IS_BOOL
    }

    fn type_hint(&self) -> &'static str {
        T::HINT
    }

    fn quote_example(&self) -> bool {
        T::QUOTED
    }
}

/// A flag binding directly to a value.
///
/// The variable starts at `T::default()`, so an unset flag cannot be told apart from one set to the zero value.
pub struct Scalar<'a, T> {
    variable: Binding<'a, T>,
    example: String,
}

impl<'a, T: Default> Scalar<'a, T> {
    /// Create a scalar flag over the caller's variable, resetting it to `T::default()`.
    pub fn new(variable: &'a mut T, example: impl Into<String>) -> Self {
        *variable = T::default();
        Self {
            variable: Binding::Borrowed(variable),
            example: example.into(),
        }
    }

    pub(crate) fn shared(example: impl Into<String>) -> (Self, Handle<T>) {
        let handle = Handle::new(T::default());
        let scalar = Self {
            variable: Binding::Shared(handle.clone()),
            example: example.into(),
        };
        (scalar, handle)
    }
}

impl<'a, T: FlagType> Value for Scalar<'a, T> {
    fn render(&self) -> String {
        self.example.clone()
    }

    fn set(&mut self, token: &str) -> Result<(), InvalidValue> {
        let value = T::parse(token)?;
        self.variable.store(value);
        Ok(())
    }

    fn get(&self) -> Option<Primitive> {
        Some(self.variable.read(FlagType::primitive))
    }

    fn is_bool_flag(&self) -> bool {
        T::IS_BOOL
    }

    fn type_hint(&self) -> &'static str {
        T::HINT
    }

    fn quote_example(&self) -> bool {
        T::QUOTED
    }
}
