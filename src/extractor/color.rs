use crate::spreadsheet::style::FillStyle;
use crate::spreadsheet::style::PatternKind;

/// Sentinel for "no color".
pub const NO_COLOR: &str = "FFFFFF";

/// Transparent black, written by spreadsheet applications for unset fills.
const TRANSPARENT: &str = "00000000";

/// Colors treated as uncolored: transparent black and the light gray theme tint.
const EXCLUDED_COLORS: [&str; 2] = [TRANSPARENT, "F2F2F2"];

/// Outcome of inspecting one raw color attribute.
enum RawColor {
    /// Explicitly transparent; stops the search
    Transparent,
    /// A usable 6-digit color
    Rgb(String),
    /// Nothing usable
    Unset,
}

fn parse_raw_color(raw: Option<&str>) -> RawColor {
    let Some(raw) = raw else {
        return RawColor::Unset;
    };
    let color = raw.trim().to_uppercase();
    if color == TRANSPARENT {
        return RawColor::Transparent;
    }
    match color.chars().count() {
        8 => RawColor::Rgb(color.chars().skip(2).collect()),
        6 => RawColor::Rgb(color),
        _ => RawColor::Unset,
    }
}

/// Reduces a cell fill to an uppercase 6-digit hex color, or [`NO_COLOR`].
///
/// Only solid fills carry a color. The foreground is preferred over the
/// background, and a transparent foreground ends the search.
pub fn normalize_color(fill: Option<&FillStyle>) -> String {
    let Some(fill) = fill else {
        return NO_COLOR.to_owned();
    };
    if fill.pattern != PatternKind::Solid {
        return NO_COLOR.to_owned();
    }

    let mut found = None::<String>;
    for raw in [fill.foreground.as_deref(), fill.background.as_deref()] {
        match parse_raw_color(raw) {
            RawColor::Transparent => return NO_COLOR.to_owned(),
            RawColor::Rgb(color) => {
                found = Some(color);
                break;
            }
            RawColor::Unset => (),
        }
    }

    match found {
        Some(color) if !EXCLUDED_COLORS.contains(&color.as_str()) => color,
        _ => NO_COLOR.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(pattern: PatternKind, foreground: Option<&str>, background: Option<&str>) -> FillStyle {
        FillStyle {
            pattern,
            foreground: foreground.map(str::to_owned),
            background: background.map(str::to_owned),
        }
    }

    #[test]
    fn solid_colors() {
        assert_eq!(normalize_color(Some(&FillStyle::solid("FF92CDDC"))), "92CDDC");
        assert_eq!(normalize_color(Some(&FillStyle::solid("ffc000"))), "FFC000");
    }

    #[test]
    fn six_digit_input_is_stable() {
        for color in ["92CDDC", "FFFF00", "00B050"] {
            let once = normalize_color(Some(&FillStyle::solid(color)));
            assert_eq!(once, color);
            assert_eq!(normalize_color(Some(&FillStyle::solid(&once))), once);
        }
    }

    #[test]
    fn missing_or_non_solid_fills() {
        assert_eq!(normalize_color(None), NO_COLOR);
        assert_eq!(normalize_color(Some(&fill(PatternKind::None, Some("FFFF0000"), None))), NO_COLOR);
        let gray = fill(PatternKind::Other("gray125".to_owned()), Some("FFFF0000"), None);
        assert_eq!(normalize_color(Some(&gray)), NO_COLOR);
    }

    #[test]
    fn excluded_colors() {
        assert_eq!(normalize_color(Some(&FillStyle::solid("FFF2F2F2"))), NO_COLOR);
        assert_eq!(normalize_color(Some(&FillStyle::solid("F2F2F2"))), NO_COLOR);
        assert_eq!(normalize_color(Some(&FillStyle::solid("00000000"))), NO_COLOR);
    }

    #[test]
    fn background_fallback() {
        let solid = fill(PatternKind::Solid, None, Some("FF00B050"));
        assert_eq!(normalize_color(Some(&solid)), "00B050");

        let odd_foreground = fill(PatternKind::Solid, Some("123"), Some("FF00B050"));
        assert_eq!(normalize_color(Some(&odd_foreground)), "00B050");

        let transparent = fill(PatternKind::Solid, Some("00000000"), Some("FF00B050"));
        assert_eq!(normalize_color(Some(&transparent)), NO_COLOR);

        let nothing = fill(PatternKind::Solid, None, None);
        assert_eq!(normalize_color(Some(&nothing)), NO_COLOR);
    }
}
