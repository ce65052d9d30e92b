//! The closed [`Value`] variant and its member types.

use std::fmt;

use crate::time::Time;

/// A complex number as a `(re, im)` pair of doubles.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex {
    /// Real part.
    pub re: f64,
    /// Imaginary part.
    pub im: f64,
}

impl Complex {
    /// Build a complex number.
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Magnitude `sqrt(re² + im²)`.
    pub fn norm(&self) -> f64 {
        self.re.hypot(self.im)
    }
}

impl From<(f64, f64)> for Complex {
    fn from((re, im): (f64, f64)) -> Self {
        Self { re, im }
    }
}

/// A labelled scalar: a string name paired with a double value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NamedPoint {
    /// The label.
    pub name: String,
    /// The value.
    pub value: f64,
}

impl NamedPoint {
    /// Build a named point.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Discriminant of a [`Value`], without payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    /// 64-bit float.
    Double,
    /// 64-bit signed integer.
    Int,
    /// UTF-8 string.
    String,
    /// Complex double pair.
    Complex,
    /// Boolean.
    Bool,
    /// Simulation timestamp.
    Time,
    /// String label + double value.
    NamedPoint,
    /// Sequence of doubles.
    Vector,
    /// Sequence of complex numbers.
    ComplexVector,
}

impl ValueKind {
    /// Every kind, in declaration order.
    pub const ALL: [ValueKind; 9] = [
        ValueKind::Double,
        ValueKind::Int,
        ValueKind::String,
        ValueKind::Complex,
        ValueKind::Bool,
        ValueKind::Time,
        ValueKind::NamedPoint,
        ValueKind::Vector,
        ValueKind::ComplexVector,
    ];

    /// Canonical type name, as used at registration.
    pub fn name(self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::Int => "int",
            Self::String => "string",
            Self::Complex => "complex",
            Self::Bool => "bool",
            Self::Time => "time",
            Self::NamedPoint => "named_point",
            Self::Vector => "vector",
            Self::ComplexVector => "complex_vector",
        }
    }

    /// Parse a registration type name.
    ///
    /// Returns `None` for the "unspecified" names (`""`, `"def"`, `"any"`)
    /// and for names outside the closed set, which are treated as untyped.
    pub fn from_type_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let kind = match lower.as_str() {
            "double" | "float" | "f64" => Self::Double,
            "int" | "integer" | "int64" | "i64" => Self::Int,
            "string" | "str" => Self::String,
            "complex" => Self::Complex,
            "bool" | "boolean" => Self::Bool,
            "time" => Self::Time,
            "named_point" | "point" => Self::NamedPoint,
            "vector" | "double_vector" => Self::Vector,
            "complex_vector" => Self::ComplexVector,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether the kind carries a single real number (unit conversion applies).
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Double | Self::Int)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value of exactly one of the nine canonical kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// 64-bit float.
    Double(f64),
    /// 64-bit signed integer.
    Int(i64),
    /// UTF-8 string.
    String(String),
    /// Complex double pair.
    Complex(Complex),
    /// Boolean.
    Bool(bool),
    /// Simulation timestamp.
    Time(Time),
    /// String label + double value.
    NamedPoint(NamedPoint),
    /// Sequence of doubles.
    Vector(Vec<f64>),
    /// Sequence of complex numbers.
    ComplexVector(Vec<Complex>),
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Double(_) => ValueKind::Double,
            Self::Int(_) => ValueKind::Int,
            Self::String(_) => ValueKind::String,
            Self::Complex(_) => ValueKind::Complex,
            Self::Bool(_) => ValueKind::Bool,
            Self::Time(_) => ValueKind::Time,
            Self::NamedPoint(_) => ValueKind::NamedPoint,
            Self::Vector(_) => ValueKind::Vector,
            Self::ComplexVector(_) => ValueKind::ComplexVector,
        }
    }

    /// The zero value of a kind: `0`, `""`, `false`, empty sequences.
    pub fn zero(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Double => Self::Double(0.0),
            ValueKind::Int => Self::Int(0),
            ValueKind::String => Self::String(String::new()),
            ValueKind::Complex => Self::Complex(Complex::default()),
            ValueKind::Bool => Self::Bool(false),
            ValueKind::Time => Self::Time(Time::ZERO),
            ValueKind::NamedPoint => Self::NamedPoint(NamedPoint::default()),
            ValueKind::Vector => Self::Vector(Vec::new()),
            ValueKind::ComplexVector => Self::ComplexVector(Vec::new()),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Double(0.0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::text::format_value(self))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Double(f64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<Complex> for Value {
    fn from(v: Complex) -> Self {
        Self::Complex(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Time> for Value {
    fn from(v: Time) -> Self {
        Self::Time(v)
    }
}

impl From<NamedPoint> for Value {
    fn from(v: NamedPoint) -> Self {
        Self::NamedPoint(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Self::Vector(v)
    }
}

impl From<&[f64]> for Value {
    fn from(v: &[f64]) -> Self {
        Self::Vector(v.to_vec())
    }
}

impl From<Vec<Complex>> for Value {
    fn from(v: Vec<Complex>) -> Self {
        Self::ComplexVector(v)
    }
}
