//! Notification callback types.
//!
//! Input callbacks are a closed sum over the nine value kinds plus a plain
//! notification; the manager converts the buffered value to the variant's
//! kind before invoking it. Registering a callback replaces the previous one.

use std::fmt;

use skein_core::{Complex, NamedPoint, Time, ValueKind};

use crate::endpoint::Endpoint;

/// Callback for message arrival on an endpoint: the endpoint and the time
/// the messages arrived. Messages are retrieved separately.
pub type EndpointCallback = Box<dyn FnMut(&Endpoint, Time) + Send>;

/// Callback for an input update, typed by the value it receives.
pub enum InputCallback {
    /// Called with the update time only; the value is not read.
    Notify(Box<dyn FnMut(Time) + Send>),
    /// Receives the value as a double.
    Double(Box<dyn FnMut(f64, Time) + Send>),
    /// Receives the value as an integer.
    Int(Box<dyn FnMut(i64, Time) + Send>),
    /// Receives the value as a string.
    String(Box<dyn FnMut(String, Time) + Send>),
    /// Receives the value as a complex number.
    Complex(Box<dyn FnMut(Complex, Time) + Send>),
    /// Receives the value as a boolean.
    Bool(Box<dyn FnMut(bool, Time) + Send>),
    /// Receives the value as a time.
    Time(Box<dyn FnMut(Time, Time) + Send>),
    /// Receives the value as a named point.
    NamedPoint(Box<dyn FnMut(NamedPoint, Time) + Send>),
    /// Receives the value as a vector.
    Vector(Box<dyn FnMut(Vec<f64>, Time) + Send>),
    /// Receives the value as a complex vector.
    ComplexVector(Box<dyn FnMut(Vec<Complex>, Time) + Send>),
}

impl InputCallback {
    /// A plain notification callback.
    pub fn notify(f: impl FnMut(Time) + Send + 'static) -> Self {
        Self::Notify(Box::new(f))
    }

    /// The kind the callback receives, or `None` for a notification.
    pub fn kind(&self) -> Option<ValueKind> {
        Some(match self {
            Self::Notify(_) => return None,
            Self::Double(_) => ValueKind::Double,
            Self::Int(_) => ValueKind::Int,
            Self::String(_) => ValueKind::String,
            Self::Complex(_) => ValueKind::Complex,
            Self::Bool(_) => ValueKind::Bool,
            Self::Time(_) => ValueKind::Time,
            Self::NamedPoint(_) => ValueKind::NamedPoint,
            Self::Vector(_) => ValueKind::Vector,
            Self::ComplexVector(_) => ValueKind::ComplexVector,
        })
    }
}

impl fmt::Debug for InputCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "InputCallback::{kind}"),
            None => f.write_str("InputCallback::Notify"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(InputCallback::notify(|_| {}).kind(), None);
        let cb = InputCallback::Vector(Box::new(|_, _| {}));
        assert_eq!(cb.kind(), Some(ValueKind::Vector));
        assert_eq!(format!("{cb:?}"), "InputCallback::vector");
    }
}
