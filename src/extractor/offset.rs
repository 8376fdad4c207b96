//! Reading color matrices, including the search for where a matrix's colors start.
use crate::extractor::color::normalize_color;
use crate::extractor::color::NO_COLOR;
use crate::extractor::number::Numeric;
use crate::spreadsheet::sheet::Worksheet;
use log::debug;
use std::collections::HashMap;

/// Offset from the main header to its first price cell, in style coordinates.
pub const MAIN_OFFSET: (usize, usize) = (2, 2);

/// Offset used for a thickness matrix when no candidate finds any color.
pub const THICKNESS_OFFSET: (usize, usize) = (1, 1);

/// Row and column offsets tried, row offset outermost.
const CANDIDATE_OFFSETS: [usize; 3] = [1, 2, 3];

/// Heights and widths sampled per candidate.
const SAMPLE_SIZE: usize = 2;

/// Colors of one matrix keyed by (height, width).
#[derive(Clone, Debug, Default)]
pub struct ColorMatrix {
    colors: HashMap<(Numeric, Numeric), String>,
}

impl ColorMatrix {
    /// Color at (height, width), [`NO_COLOR`] when absent.
    pub fn get(&self, height: Numeric, width: Numeric) -> &str {
        self.colors
            .get(&(height, width))
            .map(String::as_str)
            .unwrap_or(NO_COLOR)
    }

    pub(crate) fn len(&self) -> usize {
        self.colors.len()
    }

    /// Number of entries with an actual color.
    pub fn colored_count(&self) -> usize {
        self.colors.values().filter(|color| *color != NO_COLOR).count()
    }
}

/// Normalized color at a 1-based style coordinate; outside the used range there is none.
fn color_at(sheet: &Worksheet, row: usize, col: usize) -> String {
    if row > sheet.max_row() || col > sheet.max_col() {
        NO_COLOR.to_owned()
    } else {
        normalize_color(sheet.fill_at(row, col))
    }
}

/// Picks the offset between a matrix anchor and its colored cells.
///
/// Every offset in `{1,2,3} × {1,2,3}` is scored by the number of colored cells among
/// the first two heights and widths. The first strictly best candidate wins; when none
/// finds a color, `default` is returned.
pub fn infer_offset(
    sheet: &Worksheet,
    anchor_row: usize,
    anchor_col: usize,
    widths: &[Numeric],
    heights: &[Numeric],
    default: (usize, usize),
) -> (usize, usize) {
    let sample_heights = heights.len().min(SAMPLE_SIZE);
    let sample_widths = widths.len().min(SAMPLE_SIZE);

    let mut best = default;
    let mut best_count = 0usize;
    for row_offset in CANDIDATE_OFFSETS {
        for col_offset in CANDIDATE_OFFSETS {
            let count = (0..sample_heights)
                .flat_map(|i| (0..sample_widths).map(move |j| (i, j)))
                .filter(|(i, j)| {
                    color_at(sheet, anchor_row + row_offset + i, anchor_col + col_offset + j) != NO_COLOR
                })
                .count();
            if count > best_count {
                best_count = count;
                best = (row_offset, col_offset);
            }
        }
    }
    debug!(
        "Offset for anchor ({}, {}) in '{}': +{},+{} with {} colored samples",
        anchor_row, anchor_col, sheet.name, best.0, best.1, best_count
    );
    best
}

/// Reads the color of every (height, width) pair at `anchor + offset + (i, j)`.
pub fn read_color_matrix(
    sheet: &Worksheet,
    anchor_row: usize,
    anchor_col: usize,
    offset: (usize, usize),
    widths: &[Numeric],
    heights: &[Numeric],
) -> ColorMatrix {
    let mut colors = HashMap::with_capacity(widths.len() * heights.len());
    for (i, height) in heights.iter().enumerate() {
        for (j, width) in widths.iter().enumerate() {
            let color = color_at(sheet, anchor_row + offset.0 + i, anchor_col + offset.1 + j);
            colors.insert((*height, *width), color);
        }
    }
    ColorMatrix { colors }
}
