//! The conversion matrix between the nine value kinds.
//!
//! [`convert`] is total over the matrix below: every cell either produces a
//! value or fails with a typed [`ConversionError`]. `✗` cells are
//! [`ConversionError::TypeMismatch`]; string sources can additionally fail
//! with [`ConversionError::MalformedValue`] when the text does not parse.
//!
//! ```text
//!  from \ to   D  I  S  C  B  T  N  V  CV
//!  Double      ✓  ✓  ✓  ✓  ✓  ✓  ✓  ✓  ✓
//!  Int         ✓  ✓  ✓  ✓  ✓  ✓  ✓  ✓  ✓
//!  String      p  p  ✓  p  p  p  ✓  p  p
//!  Complex     ✓  ✓  ✓  ✓  ✓  ✗  ✗  ✓  ✓
//!  Bool        ✓  ✓  ✓  ✓  ✓  ✗  ✓  ✓  ✓
//!  Time        ✓  ✓  ✓  ✗  ✓  ✓  ✓  ✓  ✗
//!  NamedPoint  ✓  ✓  ✓  ✗  ✓  ✓  ✓  ✓  ✗
//!  Vector      ✓  ✓  ✓  ✓  ✓  ✗  ✓  ✓  ✓
//!  ComplexVec  ✓  ✓  ✓  ✓  ✓  ✗  ✗  ✓  ✓
//! ```
//!
//! Narrowing rules: double→int truncates toward zero and saturates (NaN is
//! malformed); a complex reads as its real part when the imaginary part is
//! zero and as its magnitude otherwise; a one-element vector reads as that
//! element and a longer one as its Euclidean norm.

use crate::error::ConversionError;
use crate::text;
use crate::time::Time;
use crate::value::{Complex, NamedPoint, Value, ValueKind};

/// Label used when a bare number becomes a named point.
pub const DEFAULT_POINT_NAME: &str = "value";

/// Whether the matrix defines a conversion from `from` to `to`.
///
/// String sources report `true`; whether the text actually parses is only
/// known at conversion time.
pub fn is_defined(from: ValueKind, to: ValueKind) -> bool {
    use ValueKind::*;
    !matches!(
        (from, to),
        (Complex, Time)
            | (Complex, NamedPoint)
            | (Bool, Time)
            | (Time, Complex)
            | (Time, ComplexVector)
            | (NamedPoint, Complex)
            | (NamedPoint, ComplexVector)
            | (Vector, Time)
            | (ComplexVector, Time)
            | (ComplexVector, NamedPoint)
    )
}

/// Convert a value to the requested kind.
pub fn convert(value: &Value, to: ValueKind) -> Result<Value, ConversionError> {
    if value.kind() == to {
        return Ok(value.clone());
    }
    if !is_defined(value.kind(), to) {
        return Err(mismatch(value.kind(), to));
    }
    Ok(match to {
        ValueKind::Double => Value::Double(to_double(value)?),
        ValueKind::Int => Value::Int(to_int(value)?),
        ValueKind::String => Value::String(text::format_value(value)),
        ValueKind::Complex => Value::Complex(to_complex(value)?),
        ValueKind::Bool => Value::Bool(to_bool(value, None)?),
        ValueKind::Time => Value::Time(to_time(value)?),
        ValueKind::NamedPoint => Value::NamedPoint(to_named_point(value)?),
        ValueKind::Vector => Value::Vector(to_vector(value)?),
        ValueKind::ComplexVector => Value::ComplexVector(to_complex_vector(value)?),
    })
}

/// Convert by value, avoiding a clone when the kind already matches.
pub fn convert_owned(value: Value, to: ValueKind) -> Result<Value, ConversionError> {
    if value.kind() == to {
        Ok(value)
    } else {
        convert(&value, to)
    }
}

fn mismatch(from: ValueKind, to: ValueKind) -> ConversionError {
    ConversionError::TypeMismatch { from, to }
}

/// Parse text for a non-string destination; free text is malformed.
fn parse_for(s: &str, to: ValueKind) -> Result<Value, ConversionError> {
    match text::parse_value(s) {
        Value::String(_) => Err(ConversionError::MalformedValue {
            detail: format!("'{s}' cannot be read as {to}"),
        }),
        parsed => Ok(parsed),
    }
}

fn complex_as_real(c: &Complex) -> f64 {
    if c.im == 0.0 {
        c.re
    } else {
        c.norm()
    }
}

/// Read any value as a double.
pub fn to_double(value: &Value) -> Result<f64, ConversionError> {
    Ok(match value {
        Value::Double(v) => *v,
        Value::Int(i) => *i as f64,
        Value::String(s) => return to_double(&parse_for(s, ValueKind::Double)?),
        Value::Complex(c) => complex_as_real(c),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Time(t) => t.as_secs_f64(),
        Value::NamedPoint(np) => {
            if np.value.is_nan() {
                // A point carrying only a label may hold the number in its name.
                if let parsed @ (Value::Double(_) | Value::Int(_)) = text::parse_value(&np.name) {
                    return to_double(&parsed);
                }
            }
            np.value
        }
        Value::Vector(v) => match v.as_slice() {
            [] => 0.0,
            [x] => *x,
            xs => xs.iter().map(|x| x * x).sum::<f64>().sqrt(),
        },
        Value::ComplexVector(v) => match v.as_slice() {
            [] => 0.0,
            [c] => complex_as_real(c),
            cs => cs.iter().map(|c| c.re * c.re + c.im * c.im).sum::<f64>().sqrt(),
        },
    })
}

/// Read any value as an integer, truncating toward zero.
pub fn to_int(value: &Value) -> Result<i64, ConversionError> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Time(t) => Ok(t.as_nanos()),
        Value::String(s) => to_int(&parse_for(s, ValueKind::Int)?),
        other => truncate(to_double(other)?),
    }
}

fn truncate(v: f64) -> Result<i64, ConversionError> {
    if v.is_nan() {
        return Err(ConversionError::MalformedValue {
            detail: "NaN has no integer value".to_owned(),
        });
    }
    // `as` truncates toward zero and saturates.
    Ok(v as i64)
}

/// Read any value as a boolean.
///
/// With a `threshold`, numeric values are true when strictly greater than
/// it; without one, when nonzero. Strings accept the boolean words and
/// otherwise any numeric text.
pub fn to_bool(value: &Value, threshold: Option<f64>) -> Result<bool, ConversionError> {
    let numeric = |v: f64| match threshold {
        Some(t) => v > t,
        None => v != 0.0 && !v.is_nan(),
    };
    Ok(match value {
        Value::Bool(b) => *b,
        Value::Int(i) => match threshold {
            Some(_) => numeric(*i as f64),
            None => *i != 0,
        },
        Value::String(s) => match text::parse_bool_word(s) {
            Some(b) => b,
            None => return to_bool(&parse_for(s, ValueKind::Bool)?, threshold),
        },
        Value::Time(t) => t.as_nanos() != 0,
        Value::NamedPoint(np) if np.value.is_nan() => match text::parse_bool_word(&np.name) {
            Some(b) => b,
            None => false,
        },
        other => numeric(to_double(other)?),
    })
}

/// Read any value as a complex number.
pub fn to_complex(value: &Value) -> Result<Complex, ConversionError> {
    Ok(match value {
        Value::Double(v) => Complex::new(*v, 0.0),
        Value::Int(i) => Complex::new(*i as f64, 0.0),
        Value::String(s) => match text::parse_complex(s) {
            Some(c) => c,
            None => return to_complex(&parse_for(s, ValueKind::Complex)?),
        },
        Value::Complex(c) => *c,
        Value::Bool(b) => Complex::new(f64::from(u8::from(*b)), 0.0),
        Value::Vector(v) => match v.as_slice() {
            [] => Complex::default(),
            [re] => Complex::new(*re, 0.0),
            [re, im, ..] => Complex::new(*re, *im),
        },
        Value::ComplexVector(v) => v.first().copied().unwrap_or_default(),
        other => return Err(mismatch(other.kind(), ValueKind::Complex)),
    })
}

/// Read any value as a time.
///
/// Doubles are seconds, integers are nanoseconds.
pub fn to_time(value: &Value) -> Result<Time, ConversionError> {
    Ok(match value {
        Value::Double(v) => Time::from_secs_f64(*v),
        Value::Int(i) => Time::from_nanos(*i),
        Value::String(s) => match text::parse_time(s) {
            Some(t) => t,
            None => {
                return Err(ConversionError::MalformedValue {
                    detail: format!("'{s}' cannot be read as time"),
                })
            }
        },
        Value::Time(t) => *t,
        Value::NamedPoint(np) => Time::from_secs_f64(to_double(value).unwrap_or(np.value)),
        other => return Err(mismatch(other.kind(), ValueKind::Time)),
    })
}

/// Read any value as a named point.
///
/// Numbers become `("value", x)`; text that is not a canonical named point
/// becomes `(text, NaN)`.
pub fn to_named_point(value: &Value) -> Result<NamedPoint, ConversionError> {
    Ok(match value {
        Value::NamedPoint(np) => np.clone(),
        Value::String(s) => {
            text::parse_named_point(s).unwrap_or_else(|| NamedPoint::new(s.as_str(), f64::NAN))
        }
        Value::Complex(_) | Value::ComplexVector(_) => {
            return Err(mismatch(value.kind(), ValueKind::NamedPoint))
        }
        other => NamedPoint::new(DEFAULT_POINT_NAME, to_double(other)?),
    })
}

/// Read any value as a vector of doubles.
///
/// A complex becomes `[re, im]`; a complex vector is interleaved.
pub fn to_vector(value: &Value) -> Result<Vec<f64>, ConversionError> {
    Ok(match value {
        Value::Vector(v) => v.clone(),
        Value::Complex(c) => vec![c.re, c.im],
        Value::ComplexVector(v) => v.iter().flat_map(|c| [c.re, c.im]).collect(),
        Value::String(s) => return to_vector(&parse_for(s, ValueKind::Vector)?),
        other => vec![to_double(other)?],
    })
}

/// Read any value as a vector of complex numbers.
pub fn to_complex_vector(value: &Value) -> Result<Vec<Complex>, ConversionError> {
    Ok(match value {
        Value::ComplexVector(v) => v.clone(),
        Value::Vector(v) => v.iter().map(|re| Complex::new(*re, 0.0)).collect(),
        Value::Complex(c) => vec![*c],
        Value::String(s) => return to_complex_vector(&parse_for(s, ValueKind::ComplexVector)?),
        Value::Time(_) | Value::NamedPoint(_) => {
            return Err(mismatch(value.kind(), ValueKind::ComplexVector))
        }
        other => vec![to_complex(other)?],
    })
}
