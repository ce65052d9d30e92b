//! Simulation time.

use std::fmt;
use std::ops::{Add, Sub};

/// Simulation time as a signed count of nanoseconds.
///
/// Fixed-point so that equality and ordering are exact; conversions to and
/// from seconds round to the nearest nanosecond and saturate at the
/// representable range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Time(i64);

const NANOS_PER_SEC: f64 = 1e9;

impl Time {
    /// Time zero, the start of every co-simulation.
    pub const ZERO: Self = Self(0);
    /// The largest representable time; used as "never" / "end of simulation".
    pub const MAX: Self = Self(i64::MAX);
    /// The smallest positive step.
    pub const EPSILON: Self = Self(1);

    /// Build a time from a nanosecond count.
    pub const fn from_nanos(ns: i64) -> Self {
        Self(ns)
    }

    /// Build a time from seconds, rounding to the nearest nanosecond.
    ///
    /// NaN maps to zero; out-of-range values saturate.
    pub fn from_secs_f64(secs: f64) -> Self {
        // `as` saturates and maps NaN to 0.
        Self((secs * NANOS_PER_SEC).round() as i64)
    }

    /// Nanosecond count.
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Seconds as a float.
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / NANOS_PER_SEC
    }
}

impl Add for Time {
    type Output = Time;

    fn add(self, rhs: Time) -> Time {
        Time(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Time {
    type Output = Time;

    fn sub(self, rhs: Time) -> Time {
        Time(self.0.saturating_sub(rhs.0))
    }
}

impl From<f64> for Time {
    fn from(secs: f64) -> Self {
        Self::from_secs_f64(secs)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.as_secs_f64())
    }
}
