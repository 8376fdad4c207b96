use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use std::fmt::Display;

/// Types of raw cell data in xlsx worksheets.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Analyzes format codes for date/time patterns.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_color = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_color => is_literal = true,

                ']' if is_color => is_color = false,
                '[' if !is_literal => is_color = true,
                _ if is_literal || is_color => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }

    fn is_1904(&self) -> bool {
        matches!(self, Self::NumberDateTime1904 | Self::NumberDate1904 | Self::NumberTime1904)
    }

    fn is_time(&self) -> bool {
        matches!(self, Self::NumberTime1900 | Self::NumberTime1904)
    }
}

/// Represents a single raw cell read from a worksheet part.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Cell value as string
    pub(crate) value: String,
}

impl Cell {
    /// Resolves the raw value into a typed cell value.
    /// Shared string indexes are looked up in `shared_strings`; unparsable numbers fall back to text.
    pub(crate) fn resolve(&self, shared_strings: &[String]) -> CellValue {
        match self.kind {
            CellType::Empty => CellValue::Empty,
            CellType::Boolean => CellValue::Boolean(self.value.trim() == "1"),
            CellType::InlineString => CellValue::Text(self.value.to_owned()),
            CellType::SharedString => self.value.trim()
                .parse::<usize>()
                .ok()
                .and_then(|index| shared_strings.get(index))
                .map(|text| CellValue::Text(text.to_owned()))
                .unwrap_or(CellValue::Empty),
            CellType::IsoDateTime => CellValue::Text(self.value.replace('T', " ")),
            CellType::Error => CellValue::Error(self.value.to_owned()),
            CellType::Number => match self.value.trim().parse::<f64>() {
                Ok(number) => CellValue::Number(number),
                Err(_) => CellValue::Text(self.value.to_owned()),
            },
            kind => match self.value.trim().parse::<f64>() {
                Ok(serial) if kind.is_time() && (0.0..1.0).contains(&serial) => {
                    CellValue::Time(to_time(serial))
                }
                Ok(serial) => to_datetime(serial, kind.is_1904())
                    .map(CellValue::DateTime)
                    .unwrap_or(CellValue::Number(serial)),
                Err(_) => CellValue::Text(self.value.to_owned()),
            },
        }
    }
}

/// A resolved cell value as seen by the extraction engine.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Boolean(bool),
    Number(f64),
    Text(String),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Error(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Returns the string content of text cells only.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl Display for CellValue {
    /// Renders the value the way it reads in a cell: integral numbers without a
    /// fractional part, booleans as `True`/`False`, dates as `YYYY-MM-DD HH:MM:SS`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(value) => write!(f, "{}", if *value { "True" } else { "False" }),
            CellValue::Number(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 => {
                write!(f, "{}", *value as i64)
            }
            CellValue::Number(value) => write!(f, "{}", value),
            CellValue::Text(value) | CellValue::Error(value) => write!(f, "{}", value),
            CellValue::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Time(value) => write!(f, "{}", value.format("%H:%M:%S")),
        }
    }
}

/// Converts an Excel serial number into a date time.
/// Handles the Lotus 1-2-3 leap year bug for the 1900 epoch.
fn to_datetime(serial: f64, is_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = serial.trunc() as i64;
    let offset = if is_1904 {
        1462
    } else if days < 60 {
        1
    } else {
        0
    };
    let date = NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(days + offset))?;
    Some(date.and_time(to_time(serial.fract())))
}

/// Converts the fractional part of an Excel serial number into a time of day.
fn to_time(fraction: f64) -> NaiveTime {
    let milliseconds = (fraction * 86_400_000f64).round() as i64;
    NaiveTime::default() + Duration::milliseconds(milliseconds.clamp(0, 86_399_999))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell {
            row: 1,
            col: 2,
            kind,
            value: value.to_owned(),
        }
    }

    #[test]
    fn custom_number_formats() {
        assert_eq!(CellType::parse_custom_number_format("yyyy-mm-dd", false), CellType::NumberDate1900);
        assert_eq!(CellType::parse_custom_number_format("yyyy-mm-dd hh:mm", true), CellType::NumberDateTime1904);
        assert_eq!(CellType::parse_custom_number_format("hh:mm:ss", false), CellType::NumberTime1900);
        assert_eq!(CellType::parse_custom_number_format("#,##0.00", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("[Red]#,##0", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format(r#"0 "days""#, false), CellType::Number);
    }

    #[test]
    fn builtin_number_formats() {
        assert_eq!(CellType::parse_builtin_number_format_id("14", false), Some(CellType::NumberDate1900));
        assert_eq!(CellType::parse_builtin_number_format_id("22", true), Some(CellType::NumberDateTime1904));
        assert_eq!(CellType::parse_builtin_number_format_id("3", false), None);
    }

    #[test]
    fn resolve_values() {
        let shared = vec!["h/w".to_owned(), "Glass QTY".to_owned()];
        assert_eq!(cell(CellType::SharedString, "1").resolve(&shared), CellValue::Text("Glass QTY".to_owned()));
        assert_eq!(cell(CellType::SharedString, "9").resolve(&shared), CellValue::Empty);
        assert_eq!(cell(CellType::Number, "1234.5").resolve(&shared), CellValue::Number(1234.5));
        assert_eq!(cell(CellType::Boolean, "1").resolve(&shared), CellValue::Boolean(true));
        assert_eq!(cell(CellType::InlineString, " 1 ").resolve(&shared), CellValue::Text(" 1 ".to_owned()));
    }

    #[test]
    fn resolve_dates() {
        let value = cell(CellType::NumberDate1900, "45292").resolve(&[]);
        assert_eq!(value.to_string(), "2024-01-01 00:00:00");
        let value = cell(CellType::NumberDateTime1900, "45292.5").resolve(&[]);
        assert_eq!(value.to_string(), "2024-01-01 12:00:00");
        let value = cell(CellType::NumberTime1900, "0.25").resolve(&[]);
        assert_eq!(value.to_string(), "06:00:00");
    }

    #[test]
    fn display_values() {
        assert_eq!(CellValue::Number(1.0).to_string(), "1");
        assert_eq!(CellValue::Number(1234.5).to_string(), "1234.5");
        assert_eq!(CellValue::Boolean(false).to_string(), "False");
        assert_eq!(CellValue::Empty.to_string(), "");
    }
}
