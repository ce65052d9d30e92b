//! [`TypedInput`] and the closed set of [`PrimaryValue`] types.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use skein_core::{Complex, InterfaceError, NamedPoint, Time, Value, ValueKind};

use crate::callback::InputCallback;
use crate::input::Input;
use crate::manager::ValueManager;

mod sealed {
    pub trait Sealed {}
}

/// One of the nine value types an input can be read as.
///
/// Sealed: implemented exactly for `f64`, `i64`, `String`, [`Complex`],
/// `bool`, [`Time`], [`NamedPoint`], `Vec<f64>` and `Vec<Complex>`.
pub trait PrimaryValue: sealed::Sealed + Sized + Send + 'static {
    /// The matching value kind.
    const KIND: ValueKind;

    /// Unwrap a value of exactly [`Self::KIND`].
    fn from_value(value: Value) -> Option<Self>;

    /// Wrap into a [`Value`].
    fn into_value(self) -> Value;

    /// Build the matching callback variant.
    fn callback(f: impl FnMut(Self, Time) + Send + 'static) -> InputCallback;
}

macro_rules! primary_value {
    ($ty:ty, $variant:ident) => {
        impl sealed::Sealed for $ty {}

        impl PrimaryValue for $ty {
            const KIND: ValueKind = ValueKind::$variant;

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn callback(f: impl FnMut(Self, Time) + Send + 'static) -> InputCallback {
                InputCallback::$variant(Box::new(f))
            }
        }
    };
}

primary_value!(f64, Double);
primary_value!(i64, Int);
primary_value!(String, String);
primary_value!(Complex, Complex);
primary_value!(bool, Bool);
primary_value!(Time, Time);
primary_value!(NamedPoint, NamedPoint);
primary_value!(Vec<f64>, Vector);
primary_value!(Vec<Complex>, ComplexVector);

/// An [`Input`] read as one fixed type.
///
/// Dereferences to the underlying input for everything not tied to `X`.
pub struct TypedInput<X: PrimaryValue> {
    input: Input,
    _kind: PhantomData<fn() -> X>,
}

impl<X: PrimaryValue> TypedInput<X> {
    /// Wrap an input.
    pub fn new(input: Input) -> Self {
        Self {
            input,
            _kind: PhantomData,
        }
    }

    /// Read the value.
    pub fn value<M: ValueManager + ?Sized>(&mut self, manager: &mut M) -> Result<X, InterfaceError> {
        self.input.value::<X, M>(manager)
    }

    /// Set the default value.
    pub fn set_default<M: ValueManager + ?Sized>(
        &mut self,
        manager: &mut M,
        value: X,
    ) -> Result<(), InterfaceError> {
        self.input.set_default(manager, value.into_value())
    }

    /// Register a callback receiving the value as `X`.
    pub fn set_callback<M: ValueManager + ?Sized>(
        &self,
        manager: &mut M,
        f: impl FnMut(X, Time) + Send + 'static,
    ) -> Result<(), InterfaceError> {
        self.input.set_value_callback::<X, M>(manager, f)
    }

    /// The wrapped input.
    pub fn into_inner(self) -> Input {
        self.input
    }
}

impl<X: PrimaryValue> Clone for TypedInput<X> {
    fn clone(&self) -> Self {
        Self::new(self.input.clone())
    }
}

impl<X: PrimaryValue> fmt::Debug for TypedInput<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedInput")
            .field("kind", &X::KIND)
            .field("input", &self.input)
            .finish()
    }
}

impl<X: PrimaryValue> Deref for TypedInput<X> {
    type Target = Input;

    fn deref(&self) -> &Input {
        &self.input
    }
}

impl<X: PrimaryValue> DerefMut for TypedInput<X> {
    fn deref_mut(&mut self) -> &mut Input {
        &mut self.input
    }
}

impl<X: PrimaryValue> From<Input> for TypedInput<X> {
    fn from(input: Input) -> Self {
        Self::new(input)
    }
}
