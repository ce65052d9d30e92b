//! Multi-input aggregation.
//!
//! An input fed by several sources combines their individually buffered
//! values into one with a [`MultiInputMode`]. Only sources that have
//! delivered a value take part.

use std::fmt;

use skein_core::convert::{to_bool, to_double};
use skein_core::text::parse_bool_word;
use skein_core::{InterfaceError, Value};

/// How an input combines the values of several sources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MultiInputMode {
    /// Exactly one source; more is a configuration error.
    #[default]
    None,
    /// Logical AND of every source read as a boolean.
    And,
    /// Logical OR of every source read as a boolean.
    Or,
    /// Sum of every source read as a double.
    Sum,
    /// First source minus the sum of the rest.
    Difference,
    /// Largest source.
    Max,
    /// Smallest source.
    Min,
    /// Arithmetic mean.
    Average,
    /// A vector with one element per source, in registration order.
    Vectorize,
}

impl MultiInputMode {
    /// Every mode, ordered by code.
    pub const ALL: [MultiInputMode; 9] = [
        MultiInputMode::None,
        MultiInputMode::And,
        MultiInputMode::Or,
        MultiInputMode::Sum,
        MultiInputMode::Difference,
        MultiInputMode::Max,
        MultiInputMode::Min,
        MultiInputMode::Average,
        MultiInputMode::Vectorize,
    ];

    /// Integer code, as carried by
    /// [`HandleOption::MultiInputHandling`](crate::HandleOption::MultiInputHandling).
    pub fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::And => 1,
            Self::Or => 2,
            Self::Sum => 3,
            Self::Difference => 4,
            Self::Max => 5,
            Self::Min => 6,
            Self::Average => 7,
            Self::Vectorize => 8,
        }
    }

    /// Mode for an integer code.
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    /// Mode for a name such as `"and"`, `"sum"` or `"diff"`.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.trim().to_ascii_lowercase().as_str() {
            "none" | "no_op" | "" => Self::None,
            "and" => Self::And,
            "or" => Self::Or,
            "sum" => Self::Sum,
            "diff" | "difference" => Self::Difference,
            "max" => Self::Max,
            "min" => Self::Min,
            "average" | "avg" | "mean" => Self::Average,
            "vectorize" => Self::Vectorize,
            _ => return None,
        })
    }
}

impl fmt::Display for MultiInputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::And => "and",
            Self::Or => "or",
            Self::Sum => "sum",
            Self::Difference => "diff",
            Self::Max => "max",
            Self::Min => "min",
            Self::Average => "average",
            Self::Vectorize => "vectorize",
        };
        f.write_str(s)
    }
}

/// Read a source value as a boolean for AND/OR: nonzero and non-empty are true.
fn truthy(value: &Value, threshold: Option<f64>) -> bool {
    match value {
        Value::String(s) => parse_bool_word(s).unwrap_or(!s.trim().is_empty()),
        Value::Vector(v) => !v.is_empty(),
        Value::ComplexVector(v) => !v.is_empty(),
        Value::NamedPoint(np) if np.value.is_nan() => !np.name.is_empty(),
        other => to_bool(other, threshold).unwrap_or(false),
    }
}

/// Combine source values with `mode`.
///
/// AND over no values is `true` and OR is `false`; the numeric reductions
/// yield `0.0`. [`MultiInputMode::None`] passes a single value through and
/// rejects more than one with [`InterfaceError::ConfigurationError`].
pub fn aggregate(
    mode: MultiInputMode,
    values: &[Value],
    threshold: Option<f64>,
) -> Result<Value, InterfaceError> {
    let doubles = || -> Result<Vec<f64>, InterfaceError> {
        values
            .iter()
            .map(|v| to_double(v).map_err(InterfaceError::from))
            .collect()
    };
    Ok(match mode {
        MultiInputMode::None => match values {
            [] => Value::default(),
            [single] => single.clone(),
            _ => {
                return Err(InterfaceError::ConfigurationError {
                    reason: format!(
                        "multi-input mode none cannot combine {} sources",
                        values.len()
                    ),
                })
            }
        },
        MultiInputMode::And => Value::Bool(values.iter().all(|v| truthy(v, threshold))),
        MultiInputMode::Or => Value::Bool(values.iter().any(|v| truthy(v, threshold))),
        MultiInputMode::Sum => Value::Double(doubles()?.iter().sum()),
        MultiInputMode::Difference => {
            let d = doubles()?;
            match d.split_first() {
                Some((first, rest)) => Value::Double(first - rest.iter().sum::<f64>()),
                None => Value::Double(0.0),
            }
        }
        MultiInputMode::Max => Value::Double(
            doubles()?
                .into_iter()
                .reduce(f64::max)
                .unwrap_or(0.0),
        ),
        MultiInputMode::Min => Value::Double(
            doubles()?
                .into_iter()
                .reduce(f64::min)
                .unwrap_or(0.0),
        ),
        MultiInputMode::Average => {
            let d = doubles()?;
            if d.is_empty() {
                Value::Double(0.0)
            } else {
                Value::Double(d.iter().sum::<f64>() / d.len() as f64)
            }
        }
        MultiInputMode::Vectorize => Value::Vector(doubles()?),
    })
}
