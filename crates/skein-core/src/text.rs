//! Canonical textual forms of every value kind.
//!
//! Every [`Value`] has exactly one canonical string produced by
//! [`format_value`]; [`parse_value`] recognizes every canonical form (plus a
//! few lenient spellings) and falls back to [`Value::String`] for text that
//! matches none of them.
//!
//! | Kind | Canonical form |
//! |------|----------------|
//! | double | shortest round-trip decimal, `3.5` |
//! | int | decimal, `-12` |
//! | complex | `1.5+2j`, `1.5-2j` |
//! | bool | `1` / `0` |
//! | time | `<nanoseconds>ns` |
//! | named point | `{"name":1.5}` |
//! | vector | `[1,2,3]` |
//! | complex vector | `[1+2j,3-1j]` |

use crate::error::ConversionError;
use crate::time::Time;
use crate::value::{Complex, NamedPoint, Value};

/// Render a value in its canonical textual form.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Double(v) => format_double(*v),
        Value::Int(v) => v.to_string(),
        Value::String(s) => s.clone(),
        Value::Complex(c) => format_complex(*c),
        Value::Bool(b) => String::from(if *b { "1" } else { "0" }),
        Value::Time(t) => format!("{}ns", t.as_nanos()),
        Value::NamedPoint(np) => format!("{{\"{}\":{}}}", np.name, format_double(np.value)),
        Value::Vector(v) => {
            let parts: Vec<String> = v.iter().map(|x| format_double(*x)).collect();
            format!("[{}]", parts.join(","))
        }
        Value::ComplexVector(v) => {
            let parts: Vec<String> = v.iter().map(|c| format_complex(*c)).collect();
            format!("[{}]", parts.join(","))
        }
    }
}

/// Shortest decimal that parses back to the same `f64`.
pub fn format_double(v: f64) -> String {
    format!("{v}")
}

/// `re+imj` / `re-imj`.
pub fn format_complex(c: Complex) -> String {
    let sign = if c.im.is_sign_negative() { '-' } else { '+' };
    format!("{}{}{}j", format_double(c.re), sign, format_double(c.im.abs()))
}

/// Detect the kind of a piece of text and parse it.
///
/// Recognition order: empty, integer, double, time with a unit suffix,
/// boolean words, complex, bracketed sequence, named point. Anything else is
/// returned unchanged as [`Value::String`]. Never fails.
pub fn parse_value(text: &str) -> Value {
    let s = text.trim();
    if s.is_empty() {
        return Value::String(String::new());
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(d) = s.parse::<f64>() {
        return Value::Double(d);
    }
    if let Some(t) = parse_time_with_suffix(s) {
        return Value::Time(t);
    }
    if let Some(b) = parse_bool_word(s) {
        return Value::Bool(b);
    }
    if let Some(c) = parse_complex_inline(s) {
        return Value::Complex(c);
    }
    if s.starts_with('[') && s.ends_with(']') {
        if let Ok(v) = parse_sequence(s) {
            return v;
        }
    }
    if let Some(np) = parse_named_point(s) {
        return Value::NamedPoint(np);
    }
    Value::String(text.to_owned())
}

/// Parse a boolean word: `true/false/on/off/yes/no/t/f/1/0` (case-insensitive).
pub fn parse_bool_word(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "t" | "1" => Some(true),
        "false" | "off" | "no" | "f" | "0" | "" => Some(false),
        _ => None,
    }
}

/// Parse a time: a bare number of seconds or a number with one of the
/// suffixes `ns`, `us`, `ms`, `s`, `min`, `h`.
pub fn parse_time(s: &str) -> Option<Time> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<f64>() {
        return Some(Time::from_secs_f64(secs));
    }
    parse_time_with_suffix(s)
}

fn parse_time_with_suffix(s: &str) -> Option<Time> {
    if let Some(num) = s.strip_suffix("ns") {
        let num = num.trim();
        if let Ok(ns) = num.parse::<i64>() {
            return Some(Time::from_nanos(ns));
        }
        return num.parse::<f64>().ok().map(|v| Time::from_secs_f64(v * 1e-9));
    }
    const SUFFIXES: [(&str, f64); 5] = [
        ("us", 1e-6),
        ("ms", 1e-3),
        ("min", 60.0),
        ("s", 1.0),
        ("h", 3600.0),
    ];
    for (suffix, scale) in SUFFIXES {
        if let Some(num) = s.strip_suffix(suffix) {
            if let Ok(v) = num.trim().parse::<f64>() {
                return Some(Time::from_secs_f64(v * scale));
            }
        }
    }
    None
}

/// Parse a complex number: `a+bj`, `a-bi`, `bj`, `[a,b]`, or a plain real.
pub fn parse_complex(s: &str) -> Option<Complex> {
    let s = s.trim();
    if let Ok(re) = s.parse::<f64>() {
        return Some(Complex::new(re, 0.0));
    }
    if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        let mut parts = inner.split(',');
        let re = parts.next()?.trim().parse::<f64>().ok()?;
        let im = parts.next()?.trim().parse::<f64>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        return Some(Complex::new(re, im));
    }
    parse_complex_inline(s)
}

/// `a+bj` / `bj` / plain real; no bracketed pair (that spelling is a vector).
fn parse_complex_inline(s: &str) -> Option<Complex> {
    if let Ok(re) = s.parse::<f64>() {
        return Some(Complex::new(re, 0.0));
    }
    let body = s.strip_suffix('j').or_else(|| s.strip_suffix('i'))?;
    // Split at the last sign that is not a leading sign or an exponent sign.
    let bytes = body.as_bytes();
    let split = (1..bytes.len())
        .rev()
        .find(|&i| (bytes[i] == b'+' || bytes[i] == b'-') && !matches!(bytes[i - 1], b'e' | b'E'));
    match split {
        Some(pos) => {
            let re = body[..pos].trim().parse::<f64>().ok()?;
            let im = parse_imaginary(&body[pos..])?;
            Some(Complex::new(re, im))
        }
        None => parse_imaginary(body).map(|im| Complex::new(0.0, im)),
    }
}

fn parse_imaginary(s: &str) -> Option<f64> {
    match s.trim() {
        "" | "+" => Some(1.0),
        "-" => Some(-1.0),
        t => t.parse::<f64>().ok(),
    }
}

/// Parse a named point in the `{"name":value}` form.
pub fn parse_named_point(s: &str) -> Option<NamedPoint> {
    let inner = s.trim().strip_prefix('{')?.strip_suffix('}')?;
    let colon = inner.rfind(':')?;
    let name = inner[..colon].trim().trim_matches('"');
    let value = inner[colon + 1..].trim().parse::<f64>().ok()?;
    Some(NamedPoint::new(name, value))
}

/// Parse a bracketed sequence into a vector or a complex vector.
///
/// All-real elements produce [`Value::Vector`]; any complex element produces
/// [`Value::ComplexVector`].
pub fn parse_sequence(s: &str) -> Result<Value, ConversionError> {
    let inner = s
        .trim()
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .ok_or_else(|| ConversionError::MalformedValue {
            detail: format!("'{s}' is not a bracketed sequence"),
        })?;
    if inner.trim().is_empty() {
        return Ok(Value::Vector(Vec::new()));
    }
    let elements: Vec<&str> = inner.split(',').map(str::trim).collect();
    let reals: Option<Vec<f64>> = elements.iter().map(|e| e.parse::<f64>().ok()).collect();
    if let Some(reals) = reals {
        return Ok(Value::Vector(reals));
    }
    let complexes: Option<Vec<Complex>> =
        elements.iter().map(|e| parse_complex_inline(e)).collect();
    complexes
        .map(Value::ComplexVector)
        .ok_or_else(|| ConversionError::MalformedValue {
            detail: format!("'{s}' contains a non-numeric element"),
        })
}
