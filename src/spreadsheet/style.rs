//! Cell fill descriptors and the per-workbook style table.

use crate::spreadsheet::cell::CellType;

/// Pattern of a cell fill.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PatternKind {
    /// A single uniform color
    Solid,
    /// Any other pattern (gray125, darkGrid, ...)
    Other(String),
    /// No pattern at all
    #[default]
    None,
}

impl PatternKind {
    /// Parses the `patternType` attribute of a `patternFill` element.
    pub fn parse(pattern_type: Option<&str>) -> Self {
        match pattern_type.map(str::trim) {
            None | Some("") | Some("none") => PatternKind::None,
            Some("solid") => PatternKind::Solid,
            Some(other) => PatternKind::Other(other.to_owned()),
        }
    }
}

/// Fill attributes of a cell, with colors kept exactly as stored (`AARRGGBB` or `RRGGBB`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FillStyle {
    pub pattern: PatternKind,
    pub foreground: Option<String>,
    pub background: Option<String>,
}

impl FillStyle {
    /// A solid fill with the given foreground color.
    pub fn solid(foreground: &str) -> Self {
        FillStyle {
            pattern: PatternKind::Solid,
            foreground: Some(foreground.to_owned()),
            background: None,
        }
    }
}

/// Styles shared by every worksheet of a workbook, indexed by `cellXfs` position.
#[derive(Clone, Debug, Default)]
pub(crate) struct StyleTable {
    /// Fills in `fills` order
    pub(crate) fills: Vec<FillStyle>,
    /// Per cell format: fill index and number format kind
    pub(crate) formats: Vec<(Option<usize>, CellType)>,
}

impl StyleTable {
    /// Returns the fill applied by the cell format at `index`.
    pub(crate) fn fill(&self, index: usize) -> Option<&FillStyle> {
        self.formats
            .get(index)
            .and_then(|(fill_id, _)| *fill_id)
            .and_then(|fill_id| self.fills.get(fill_id))
    }

    /// Returns the number format kind of the cell format at `index`.
    pub(crate) fn number_format(&self, index: usize) -> CellType {
        self.formats
            .get(index)
            .map(|(_, kind)| *kind)
            .unwrap_or(CellType::Number)
    }
}
