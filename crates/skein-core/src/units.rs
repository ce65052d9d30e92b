//! Unit descriptors and numeric unit conversion.
//!
//! A [`Unit`] is parsed from a string such as `"kW"`, `"m/s^2"` or `"degC"`
//! into a dimension vector over the seven SI base quantities plus a linear
//! scale and offset to the SI base. Two units convert into each other only
//! when their dimension vectors are equal.
//!
//! Grammar: one or more factors joined by `*` or `/`, each factor a symbol
//! with an optional SI prefix and an optional `^n` power. Offsets (degrees
//! Celsius and Fahrenheit) are only honored for a lone symbol; inside a
//! compound they act as plain temperature intervals.

use std::fmt;

use smallvec::SmallVec;

use crate::error::ConversionError;

/// Exponents over `[m, kg, s, A, K, mol, cd]`.
type Dims = [i8; 7];

const NONE: Dims = [0; 7];
const M: Dims = [1, 0, 0, 0, 0, 0, 0];
const KG: Dims = [0, 1, 0, 0, 0, 0, 0];
const S: Dims = [0, 0, 1, 0, 0, 0, 0];
const A: Dims = [0, 0, 0, 1, 0, 0, 0];
const K: Dims = [0, 0, 0, 0, 1, 0, 0];
const MOL: Dims = [0, 0, 0, 0, 0, 1, 0];
const CD: Dims = [0, 0, 0, 0, 0, 0, 1];
const HZ: Dims = [0, 0, -1, 0, 0, 0, 0];
const NEWTON: Dims = [1, 1, -2, 0, 0, 0, 0];
const PASCAL: Dims = [-1, 1, -2, 0, 0, 0, 0];
const JOULE: Dims = [2, 1, -2, 0, 0, 0, 0];
const WATT: Dims = [2, 1, -3, 0, 0, 0, 0];
const COULOMB: Dims = [0, 0, 1, 1, 0, 0, 0];
const VOLT: Dims = [2, 1, -3, -1, 0, 0, 0];
const OHM: Dims = [2, 1, -3, -2, 0, 0, 0];
const SIEMENS: Dims = [-2, -1, 3, 2, 0, 0, 0];
const FARAD: Dims = [-2, -1, 4, 2, 0, 0, 0];
const HENRY: Dims = [2, 1, -2, -2, 0, 0, 0];
const VOLUME: Dims = [3, 0, 0, 0, 0, 0, 0];

/// `(symbol, dims, scale, offset)`; scale and offset map to SI base units.
const SYMBOLS: &[(&str, Dims, f64, f64)] = &[
    ("1", NONE, 1.0, 0.0),
    ("%", NONE, 0.01, 0.0),
    ("pu", NONE, 1.0, 0.0),
    ("rad", NONE, 1.0, 0.0),
    ("deg", NONE, std::f64::consts::PI / 180.0, 0.0),
    ("m", M, 1.0, 0.0),
    ("ft", M, 0.3048, 0.0),
    ("in", M, 0.0254, 0.0),
    ("mi", M, 1609.344, 0.0),
    ("g", KG, 1e-3, 0.0),
    ("lb", KG, 0.453_592_37, 0.0),
    ("s", S, 1.0, 0.0),
    ("min", S, 60.0, 0.0),
    ("h", S, 3600.0, 0.0),
    ("hr", S, 3600.0, 0.0),
    ("day", S, 86_400.0, 0.0),
    ("A", A, 1.0, 0.0),
    ("K", K, 1.0, 0.0),
    ("degC", K, 1.0, 273.15),
    ("degF", K, 5.0 / 9.0, 459.67 * 5.0 / 9.0),
    ("mol", MOL, 1.0, 0.0),
    ("cd", CD, 1.0, 0.0),
    ("Hz", HZ, 1.0, 0.0),
    ("N", NEWTON, 1.0, 0.0),
    ("Pa", PASCAL, 1.0, 0.0),
    ("bar", PASCAL, 1e5, 0.0),
    ("psi", PASCAL, 6_894.757_293_168, 0.0),
    ("J", JOULE, 1.0, 0.0),
    ("Wh", JOULE, 3600.0, 0.0),
    ("W", WATT, 1.0, 0.0),
    ("VA", WATT, 1.0, 0.0),
    ("VAR", WATT, 1.0, 0.0),
    ("var", WATT, 1.0, 0.0),
    ("hp", WATT, 745.699_871_582_270_2, 0.0),
    ("C", COULOMB, 1.0, 0.0),
    ("V", VOLT, 1.0, 0.0),
    ("ohm", OHM, 1.0, 0.0),
    ("S", SIEMENS, 1.0, 0.0),
    ("F", FARAD, 1.0, 0.0),
    ("H", HENRY, 1.0, 0.0),
    ("L", VOLUME, 1e-3, 0.0),
    ("gal", VOLUME, 3.785_411_784e-3, 0.0),
];

const PREFIXES: &[(char, f64)] = &[
    ('T', 1e12),
    ('G', 1e9),
    ('M', 1e6),
    ('k', 1e3),
    ('h', 1e2),
    ('c', 1e-2),
    ('m', 1e-3),
    ('u', 1e-6),
    ('µ', 1e-6),
    ('n', 1e-9),
    ('p', 1e-12),
];

/// A parsed unit descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    text: String,
    dims: Dims,
    scale: f64,
    offset: f64,
}

impl Unit {
    /// Parse a unit string.
    ///
    /// Fails with [`ConversionError::UnknownUnit`] for empty text, unknown
    /// symbols, a malformed power, or a dimension exponent outside `i8`.
    pub fn parse(text: &str) -> Result<Self, ConversionError> {
        let unknown = || ConversionError::UnknownUnit {
            unit: text.to_owned(),
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(unknown());
        }

        // Split into (factor, sign) pairs on `*` and `/`.
        let mut factors: SmallVec<[(&str, i32); 4]> = SmallVec::new();
        let mut sign = 1;
        let mut start = 0;
        for (i, ch) in trimmed.char_indices() {
            if ch == '*' || ch == '/' {
                factors.push((&trimmed[start..i], sign));
                sign = if ch == '/' { -1 } else { 1 };
                start = i + 1;
            }
        }
        factors.push((&trimmed[start..], sign));

        let single = factors.len() == 1;
        let mut unit = Self {
            text: trimmed.to_owned(),
            dims: NONE,
            scale: 1.0,
            offset: 0.0,
        };
        for (factor, sign) in factors {
            let (symbol, power) = split_power(factor.trim()).ok_or_else(unknown)?;
            let (dims, scale, offset) = lookup(symbol).ok_or_else(unknown)?;
            let power = power.checked_mul(sign).ok_or_else(unknown)?;
            let step = i8::try_from(power).map_err(|_| unknown())?;
            for (d, base) in unit.dims.iter_mut().zip(dims) {
                *d = base
                    .checked_mul(step)
                    .and_then(|add| d.checked_add(add))
                    .ok_or_else(unknown)?;
            }
            unit.scale *= scale.powi(power);
            if single && power == 1 {
                unit.offset = offset;
            }
        }
        Ok(unit)
    }

    /// The text this unit was parsed from.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether values in `self` can be converted to `other`.
    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dims == other.dims
    }

    /// Convert `value` expressed in `self` into `to`.
    pub fn convert(&self, value: f64, to: &Unit) -> Result<f64, ConversionError> {
        if !self.is_compatible(to) {
            return Err(ConversionError::UnitMismatch {
                from: self.text.clone(),
                to: to.text.clone(),
            });
        }
        let base = value * self.scale + self.offset;
        Ok((base - to.offset) / to.scale)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Convert `value` between two unit strings.
///
/// Either string being empty means "no unit" and returns the value unchanged.
pub fn convert_units(value: f64, from: &str, to: &str) -> Result<f64, ConversionError> {
    if from.trim().is_empty() || to.trim().is_empty() || from == to {
        return Ok(value);
    }
    Unit::parse(from)?.convert(value, &Unit::parse(to)?)
}

fn split_power(factor: &str) -> Option<(&str, i32)> {
    match factor.split_once('^') {
        Some((symbol, power)) => Some((symbol.trim(), power.trim().parse().ok()?)),
        None => Some((factor, 1)),
    }
}

fn lookup(symbol: &str) -> Option<(Dims, f64, f64)> {
    if let Some(found) = exact(symbol) {
        return Some(found);
    }
    let first = symbol.chars().next()?;
    let rest = &symbol[first.len_utf8()..];
    let (_, factor) = PREFIXES.iter().find(|(p, _)| *p == first)?;
    let (dims, scale, _) = exact(rest)?;
    // Prefixed offset units would be ambiguous; treat as intervals.
    Some((dims, scale * factor, 0.0))
}

fn exact(symbol: &str) -> Option<(Dims, f64, f64)> {
    SYMBOLS
        .iter()
        .find(|(s, ..)| *s == symbol)
        .map(|&(_, dims, scale, offset)| (dims, scale, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn prefixes_scale() {
        assert!(close(convert_units(1.0, "kW", "W").unwrap(), 1000.0));
        assert!(close(convert_units(2500.0, "mA", "A").unwrap(), 2.5));
        assert!(close(convert_units(1.0, "MWh", "kWh").unwrap(), 1000.0));
        assert!(close(convert_units(1.0, "kg", "g").unwrap(), 1000.0));
    }

    #[test]
    fn exact_symbols_win_over_prefixes() {
        // "min" is minutes, not milli-inches; "h" is hours.
        assert!(close(convert_units(1.0, "min", "s").unwrap(), 60.0));
        assert!(close(convert_units(2.0, "h", "min").unwrap(), 120.0));
        assert!(close(convert_units(1.0, "hPa", "Pa").unwrap(), 100.0));
    }

    #[test]
    fn compound_units() {
        assert!(close(convert_units(36.0, "km/h", "m/s").unwrap(), 10.0));
        assert!(close(convert_units(1.0, "m^2", "cm^2").unwrap(), 1e4));
        assert!(close(convert_units(1.0, "W*s", "J").unwrap(), 1.0));
        assert!(close(convert_units(1.0, "Hz", "s^-1").unwrap(), 1.0));
    }

    #[test]
    fn temperature_offsets() {
        assert!(close(convert_units(100.0, "degC", "K").unwrap(), 373.15));
        assert!(close(convert_units(212.0, "degF", "degC").unwrap(), 100.0));
        assert!(close(convert_units(0.0, "degC", "degF").unwrap(), 32.0));
    }

    #[test]
    fn incompatible_dimensions() {
        assert_eq!(
            convert_units(1.0, "m", "s"),
            Err(ConversionError::UnitMismatch {
                from: "m".into(),
                to: "s".into()
            })
        );
    }

    #[test]
    fn unknown_symbols() {
        assert!(matches!(
            Unit::parse("furlongs"),
            Err(ConversionError::UnknownUnit { .. })
        ));
        assert!(matches!(Unit::parse("m^x"), Err(ConversionError::UnknownUnit { .. })));
        assert!(Unit::parse("").is_err());
    }

    #[test]
    fn oversized_powers_are_rejected() {
        for text in ["m^100*m^100", "m^200", "m^-100/m^100", "m/m^-2147483648"] {
            assert_eq!(
                Unit::parse(text),
                Err(ConversionError::UnknownUnit { unit: text.into() }),
                "{text}"
            );
        }
        assert!(Unit::parse("m^100").is_ok());
    }

    #[test]
    fn empty_side_is_passthrough() {
        assert_eq!(convert_units(3.0, "", "kW"), Ok(3.0));
        assert_eq!(convert_units(3.0, "kW", " "), Ok(3.0));
    }

    proptest! {
        #[test]
        fn there_and_back(v in -1e6f64..1e6, pair in prop::sample::select(vec![
            ("kW", "MW"), ("degC", "degF"), ("mi", "km"), ("psi", "bar"), ("km/h", "m/s"),
        ])) {
            let there = convert_units(v, pair.0, pair.1).unwrap();
            let back = convert_units(there, pair.1, pair.0).unwrap();
            prop_assert!(close(back, v), "{} -> {} -> {}", v, there, back);
        }
    }
}
