//! Change detection between a cached value and a candidate replacement.

use crate::value::{Complex, Value};

/// Distance between two values.
///
/// Numeric kinds use the absolute difference (seconds for time, the complex
/// magnitude of the difference for complex numbers). Double, int, bool and
/// time values compare numerically with each other even when their kinds
/// differ. Sequences use the largest element-wise distance, and differ
/// infinitely when their lengths differ. Strings and booleans are `0` when
/// equal and `1` otherwise. Any other pair of kinds, and a NaN compared with
/// a number, are infinitely far apart.
pub fn distance(a: &Value, b: &Value) -> f64 {
    match (a, b) {
        (Value::Double(x), Value::Double(y)) => scalar(*x, *y),
        (Value::Int(x), Value::Int(y)) => x.abs_diff(*y) as f64,
        (Value::Time(x), Value::Time(y)) => scalar(x.as_secs_f64(), y.as_secs_f64()),
        (Value::Bool(x), Value::Bool(y)) => equality(x == y),
        (Value::String(x), Value::String(y)) => equality(x == y),
        (Value::Complex(x), Value::Complex(y)) => complex(*x, *y),
        (Value::NamedPoint(x), Value::NamedPoint(y)) => {
            if x.name == y.name {
                scalar(x.value, y.value)
            } else {
                f64::INFINITY
            }
        }
        (Value::Vector(x), Value::Vector(y)) => sequence(x, y, |p, q| scalar(*p, *q)),
        (Value::ComplexVector(x), Value::ComplexVector(y)) => {
            sequence(x, y, |p, q| complex(*p, *q))
        }
        _ => match (scalar_value(a), scalar_value(b)) {
            (Some(x), Some(y)) => scalar(x, y),
            _ => f64::INFINITY,
        },
    }
}

fn scalar_value(value: &Value) -> Option<f64> {
    match value {
        Value::Double(v) => Some(*v),
        Value::Int(i) => Some(*i as f64),
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        Value::Time(t) => Some(t.as_secs_f64()),
        _ => None,
    }
}

/// Whether `candidate` differs from `cached` enough to replace it.
///
/// A zero `delta` reports any difference at all; a positive `delta` reports
/// differences of at least `delta`. Equal values never count as a change.
pub fn change_detected(cached: &Value, candidate: &Value, delta: f64) -> bool {
    let d = distance(cached, candidate);
    d > delta || (d > 0.0 && d >= delta)
}

fn equality(equal: bool) -> f64 {
    if equal {
        0.0
    } else {
        1.0
    }
}

fn scalar(x: f64, y: f64) -> f64 {
    match (x.is_nan(), y.is_nan()) {
        (true, true) => 0.0,
        (false, false) => (x - y).abs(),
        _ => f64::INFINITY,
    }
}

fn complex(x: Complex, y: Complex) -> f64 {
    scalar(x.re, y.re).hypot(scalar(x.im, y.im))
}

fn sequence<T>(x: &[T], y: &[T], elem: impl Fn(&T, &T) -> f64) -> f64 {
    if x.len() != y.len() {
        return f64::INFINITY;
    }
    x.iter().zip(y).map(|(p, q)| elem(p, q)).fold(0.0, f64::max)
}
