//! Raw payload encode/decode.
//!
//! A raw payload is a value encoded under its declared kind, with no header
//! or type tag: the kind travels alongside the bytes. All numbers are
//! little-endian.
//!
//! | Kind | Layout |
//! |------|--------|
//! | double, int, time | 8 bytes |
//! | complex | `re`, `im` (16 bytes) |
//! | bool | 1 byte, `0` or `1` |
//! | string | UTF-8 bytes |
//! | named point | `f64` value, then UTF-8 name |
//! | vector | `n × f64` |
//! | complex vector | `n × (re, im)` |

use crate::error::ConversionError;
use crate::time::Time;
use crate::value::{Complex, NamedPoint, Value, ValueKind};

const F64_SIZE: usize = 8;
const COMPLEX_SIZE: usize = 16;

// ── Primitive writers ───────────────────────────────────────────

fn put_f64(buf: &mut Vec<u8>, v: f64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_complex(buf: &mut Vec<u8>, c: Complex) {
    put_f64(buf, c.re);
    put_f64(buf, c.im);
}

// ── Primitive readers ───────────────────────────────────────────

fn get_f64(bytes: &[u8]) -> f64 {
    let mut buf = [0u8; F64_SIZE];
    buf.copy_from_slice(&bytes[..F64_SIZE]);
    f64::from_le_bytes(buf)
}

fn get_i64(bytes: &[u8]) -> i64 {
    let mut buf = [0u8; F64_SIZE];
    buf.copy_from_slice(&bytes[..F64_SIZE]);
    i64::from_le_bytes(buf)
}

fn get_complex(bytes: &[u8]) -> Complex {
    Complex::new(get_f64(bytes), get_f64(&bytes[F64_SIZE..]))
}

fn expect_len(kind: ValueKind, bytes: &[u8], len: usize) -> Result<(), ConversionError> {
    if bytes.len() == len {
        Ok(())
    } else {
        Err(ConversionError::MalformedValue {
            detail: format!("{kind} payload must be {len} bytes, got {}", bytes.len()),
        })
    }
}

fn expect_multiple(kind: ValueKind, bytes: &[u8], unit: usize) -> Result<(), ConversionError> {
    if bytes.len() % unit == 0 {
        Ok(())
    } else {
        Err(ConversionError::MalformedValue {
            detail: format!(
                "{kind} payload length {} is not a multiple of {unit}",
                bytes.len()
            ),
        })
    }
}

fn utf8(bytes: &[u8]) -> Result<String, ConversionError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| ConversionError::MalformedValue {
        detail: format!("invalid UTF-8 string: {e}"),
    })
}

// ── Values ──────────────────────────────────────────────────────

/// Encode a value under its own kind.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::with_capacity(raw_size(value));
    match value {
        Value::Double(v) => put_f64(&mut buf, *v),
        Value::Int(i) => buf.extend_from_slice(&i.to_le_bytes()),
        Value::String(s) => buf.extend_from_slice(s.as_bytes()),
        Value::Complex(c) => put_complex(&mut buf, *c),
        Value::Bool(b) => buf.push(u8::from(*b)),
        Value::Time(t) => buf.extend_from_slice(&t.as_nanos().to_le_bytes()),
        Value::NamedPoint(np) => {
            put_f64(&mut buf, np.value);
            buf.extend_from_slice(np.name.as_bytes());
        }
        Value::Vector(v) => v.iter().for_each(|x| put_f64(&mut buf, *x)),
        Value::ComplexVector(v) => v.iter().for_each(|c| put_complex(&mut buf, *c)),
    }
    buf
}

/// Decode a payload declared as `kind`.
///
/// Fails with [`ConversionError::MalformedValue`] when the length does not
/// fit the kind, a bool byte is not `0`/`1`, or text is not UTF-8.
pub fn decode(kind: ValueKind, bytes: &[u8]) -> Result<Value, ConversionError> {
    Ok(match kind {
        ValueKind::Double => {
            expect_len(kind, bytes, F64_SIZE)?;
            Value::Double(get_f64(bytes))
        }
        ValueKind::Int => {
            expect_len(kind, bytes, F64_SIZE)?;
            Value::Int(get_i64(bytes))
        }
        ValueKind::String => Value::String(utf8(bytes)?),
        ValueKind::Complex => {
            expect_len(kind, bytes, COMPLEX_SIZE)?;
            Value::Complex(get_complex(bytes))
        }
        ValueKind::Bool => {
            expect_len(kind, bytes, 1)?;
            match bytes[0] {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                other => {
                    return Err(ConversionError::MalformedValue {
                        detail: format!("bool byte must be 0 or 1, got {other}"),
                    })
                }
            }
        }
        ValueKind::Time => {
            expect_len(kind, bytes, F64_SIZE)?;
            Value::Time(Time::from_nanos(get_i64(bytes)))
        }
        ValueKind::NamedPoint => {
            if bytes.len() < F64_SIZE {
                return Err(ConversionError::MalformedValue {
                    detail: format!(
                        "named_point payload needs at least {F64_SIZE} bytes, got {}",
                        bytes.len()
                    ),
                });
            }
            let value = get_f64(bytes);
            Value::NamedPoint(NamedPoint::new(utf8(&bytes[F64_SIZE..])?, value))
        }
        ValueKind::Vector => {
            expect_multiple(kind, bytes, F64_SIZE)?;
            Value::Vector(bytes.chunks_exact(F64_SIZE).map(get_f64).collect())
        }
        ValueKind::ComplexVector => {
            expect_multiple(kind, bytes, COMPLEX_SIZE)?;
            Value::ComplexVector(bytes.chunks_exact(COMPLEX_SIZE).map(get_complex).collect())
        }
    })
}

// ── Size helpers ────────────────────────────────────────────────

/// Encoded size of a value in bytes.
pub fn raw_size(value: &Value) -> usize {
    match value {
        Value::Double(_) | Value::Int(_) | Value::Time(_) => F64_SIZE,
        Value::Complex(_) => COMPLEX_SIZE,
        Value::Bool(_) => 1,
        Value::String(s) => s.len(),
        Value::NamedPoint(np) => F64_SIZE + np.name.len(),
        Value::Vector(v) => v.len() * F64_SIZE,
        Value::ComplexVector(v) => v.len() * COMPLEX_SIZE,
    }
}

/// Length in bytes of the string a payload yields when read as text.
///
/// String payloads report their byte length; other kinds report the length
/// of their canonical textual form.
pub fn string_size(kind: ValueKind, bytes: &[u8]) -> Result<usize, ConversionError> {
    match kind {
        ValueKind::String => Ok(bytes.len()),
        _ => Ok(crate::text::format_value(&decode(kind, bytes)?).len()),
    }
}

/// Number of elements a payload yields when read as a vector.
pub fn vector_size(kind: ValueKind, bytes: &[u8]) -> Result<usize, ConversionError> {
    match kind {
        ValueKind::Vector => {
            expect_multiple(kind, bytes, F64_SIZE)?;
            Ok(bytes.len() / F64_SIZE)
        }
        ValueKind::ComplexVector => {
            expect_multiple(kind, bytes, COMPLEX_SIZE)?;
            Ok(bytes.len() / COMPLEX_SIZE * 2)
        }
        _ => Ok(crate::convert::to_vector(&decode(kind, bytes)?)?.len()),
    }
}
