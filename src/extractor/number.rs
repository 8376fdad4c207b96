//! Lenient conversion of cell content into numbers.
use crate::spreadsheet::cell::CellValue;
use regex::Regex;
use serde::Serialize;
use serde::Serializer;
use std::cmp::Ordering;
use std::fmt::Display;
use std::hash::Hash;
use std::hash::Hasher;

/// A number read from a cell. Integral values stay integral when displayed or serialized.
///
/// Equality and hashing are by bit pattern so values can key a color matrix; `-0.0`
/// is stored as `0.0` and `NaN` is never constructed.
#[derive(Copy, Clone, Debug)]
pub struct Numeric(f64);

impl Numeric {
    pub const ONE: Numeric = Numeric(1.0);

    /// Wraps a finite or infinite number; `NaN` gives `None`.
    pub fn new(value: f64) -> Option<Numeric> {
        if value.is_nan() {
            None
        } else if value == 0.0 {
            Some(Numeric(0.0))
        } else {
            Some(Numeric(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// True when the value has no fractional part.
    pub fn is_integral(self) -> bool {
        self.0.is_finite() && self.0.fract() == 0.0
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Numeric {}

impl Hash for Numeric {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Numeric {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Display for Numeric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_integral() && self.0.abs() < 1e15 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Serialize for Numeric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_integral() && self.0.abs() < 1e15 {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

/// Converts cell content into a number, or `None` when nothing numeric remains.
///
/// The content is rendered as text first, then commas, whitespace and every
/// character other than digits, `.` and `-` are dropped before parsing. So
/// `" 1,234 "` reads as 1234 and `"฿1,234.50"` as 1234.5, while dates and
/// booleans never parse.
pub fn to_number(value: &CellValue) -> Option<Numeric> {
    if value.is_empty() {
        return None;
    }
    let pattern = Regex::new(r"[^\d.\-]").expect("Hardcode regex pattern");
    let text = value.to_string();
    let stripped: String = text.chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let cleaned = pattern.replace_all(&stripped, "");
    match cleaned.as_ref() {
        "" | "-" | "." => None,
        number => number.parse::<f64>().ok().and_then(Numeric::new),
    }
}

/// Same as [`to_number`] for an optional grid cell.
pub fn cell_number(value: Option<&CellValue>) -> Option<Numeric> {
    value.and_then(to_number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn number(text: &str) -> Option<f64> {
        to_number(&CellValue::from(text)).map(Numeric::value)
    }

    #[test]
    fn strip_separators_and_symbols() {
        assert_eq!(number(" 1,234 "), Some(1234.0));
        assert_eq!(number("1,234.50"), Some(1234.5));
        assert_eq!(number("฿ 2,500"), Some(2500.0));
        assert_eq!(number("-15"), Some(-15.0));
        assert_eq!(number("80 cm"), Some(80.0));
    }

    #[test]
    fn reject_non_numeric_text() {
        assert_eq!(number(""), None);
        assert_eq!(number("-"), None);
        assert_eq!(number("."), None);
        assert_eq!(number("abc"), None);
        assert_eq!(number("1.2.3"), None);
        assert_eq!(number("10-20"), None);
        assert_eq!(to_number(&CellValue::Empty), None);
    }

    #[test]
    fn typed_cells() {
        assert_eq!(to_number(&CellValue::Number(1500.0)).map(Numeric::value), Some(1500.0));
        assert_eq!(to_number(&CellValue::Boolean(true)), None);
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)).unwrap();
        assert_eq!(to_number(&CellValue::DateTime(date)), None);
        assert_eq!(cell_number(None), None);
    }

    #[test]
    fn integral_rendering() {
        let integral = to_number(&CellValue::from("1,200.00")).unwrap();
        assert!(integral.is_integral());
        assert_eq!(integral.to_string(), "1200");
        assert_eq!(serde_json::to_string(&integral).unwrap(), "1200");

        let fractional = to_number(&CellValue::from("99.5")).unwrap();
        assert!(!fractional.is_integral());
        assert_eq!(serde_json::to_string(&fractional).unwrap(), "99.5");
    }

    #[test]
    fn keys_compare_by_value() {
        assert_eq!(Numeric::new(-0.0), Numeric::new(0.0));
        assert_eq!(Numeric::new(f64::NAN), None);
        assert!(Numeric(80.0) < Numeric(120.0));
    }
}
