//! Locating the anchor headers of price and color matrices.
use crate::spreadsheet::sheet::Grid;
use regex::Regex;

/// Kind of matrix introduced by a header cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MatrixKind {
    /// The price matrix, labelled `1` in column A or `h/w` anywhere
    Main,
    /// A secondary color matrix labelled with its index, always 2 or more
    Thickness(usize),
}

impl MatrixKind {
    /// 1-based matrix index, as used in the `<n>_Color` output columns.
    pub fn index(self) -> usize {
        match self {
            MatrixKind::Main => 1,
            MatrixKind::Thickness(index) => index,
        }
    }
}

/// Position of a matrix header in 0-based grid coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MatrixHeader {
    pub row: usize,
    pub col: usize,
    pub kind: MatrixKind,
}

/// Trimmed text of a column A cell, whatever its type.
fn first_column_text(grid: &Grid, row: usize) -> String {
    grid.cell(row, 0)
        .map(|value| value.to_string().trim().to_owned())
        .unwrap_or_default()
}

/// Finds the main matrix header.
///
/// Column A is searched first for a standalone `1`. Failing that, every text cell
/// is searched row by row for an `h/w` label.
pub fn find_main(grid: &Grid) -> Option<MatrixHeader> {
    let one = Regex::new(r"(?i)\b1\b").expect("Hardcode regex pattern");
    let height_width = Regex::new(r"(?i)\bh\s*/\s*w\b").expect("Hardcode regex pattern");

    if grid.col_count() > 0 {
        if let Some(row) = (0..grid.row_count()).find(|row| one.is_match(&first_column_text(grid, *row))) {
            return Some(MatrixHeader { row, col: 0, kind: MatrixKind::Main });
        }
    }

    (0..grid.row_count())
        .flat_map(|row| (0..grid.col_count()).map(move |col| (row, col)))
        .find(|(row, col)| {
            grid.cell(*row, *col)
                .and_then(|value| value.as_text())
                .is_some_and(|text| height_width.is_match(text))
        })
        .map(|(row, col)| MatrixHeader { row, col, kind: MatrixKind::Main })
}

/// Finds the header row of the thickness matrix `index` in column A.
///
/// Accepted labels are `Thk.<n>`, a standalone `<n>`, `Thickness <n>` and the Thai
/// `หนา <n>`, `ชั้น <n>` and `ระดับ <n>`, all case-insensitive.
pub fn find_thickness(grid: &Grid, index: usize) -> Option<MatrixHeader> {
    let pattern = Regex::new(&format!(
        r"(?i)Thk\.{index}|\b{index}\b|Thickness\s*{index}|หนา\s*{index}|ชั้น\s*{index}|ระดับ\s*{index}"
    )).expect("Hardcode regex pattern");

    if grid.col_count() == 0 {
        return None;
    }
    (0..grid.row_count())
        .find(|row| pattern.is_match(&first_column_text(grid, *row)))
        .map(|row| MatrixHeader { row, col: 0, kind: MatrixKind::Thickness(index) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::testing::number;
    use crate::spreadsheet::testing::text;
    use crate::spreadsheet::testing::worksheet;

    #[test]
    fn main_header_in_first_column() {
        let sheet = worksheet("A", &[
            &[text("Series X")],
            &[text(" 1 "), number(60.0), number(80.0)],
            &[number(100.0), number(1200.0), number(1500.0)],
        ]);
        let header = find_main(sheet.grid());
        assert_eq!(header, Some(MatrixHeader { row: 1, col: 0, kind: MatrixKind::Main }));
    }

    #[test]
    fn numeric_one_counts_as_label() {
        let sheet = worksheet("A", &[&[None], &[number(1.0), number(60.0)]]);
        assert_eq!(find_main(sheet.grid()).map(|header| header.row), Some(1));
    }

    #[test]
    fn height_width_fallback() {
        let sheet = worksheet("A", &[
            &[text("Price list")],
            &[None, None, text("H / W"), number(60.0)],
            &[None, text("h/w")],
        ]);
        let header = find_main(sheet.grid());
        assert_eq!(header, Some(MatrixHeader { row: 1, col: 2, kind: MatrixKind::Main }));
    }

    #[test]
    fn no_main_header() {
        let sheet = worksheet("A", &[&[text("10")], &[None, number(1.0)], &[text("hw")]]);
        assert_eq!(find_main(sheet.grid()), None);
        assert_eq!(find_main(worksheet("Empty", &[]).grid()), None);
    }

    #[test]
    fn thickness_labels() {
        let sheet = worksheet("A", &[
            &[text("1")],
            &[text("Thk.2")],
            &[text("thickness 3")],
            &[text("หนา 4")],
            &[text("ชั้น5")],
            &[text("ระดับ 6")],
            &[number(7.0)],
        ]);
        let grid = sheet.grid();
        for (index, row) in [(2, 1), (3, 2), (4, 3), (5, 4), (6, 5), (7, 6)] {
            let header = find_thickness(grid, index);
            assert_eq!(header, Some(MatrixHeader { row, col: 0, kind: MatrixKind::Thickness(index) }), "{index}");
        }
        assert_eq!(find_thickness(grid, 8), None);
    }

    #[test]
    fn thickness_only_in_first_column() {
        let sheet = worksheet("A", &[&[text("1"), text("2")], &[None, text("Thk.2")]]);
        assert_eq!(find_thickness(sheet.grid(), 2), None);
    }

    #[test]
    fn first_match_wins() {
        let sheet = worksheet("A", &[&[text("2")], &[text("Thk.2")]]);
        assert_eq!(find_thickness(sheet.grid(), 2).map(|header| header.row), Some(0));
    }

    #[test]
    fn matrix_indexes() {
        assert_eq!(MatrixKind::Main.index(), 1);
        assert_eq!(MatrixKind::Thickness(4).index(), 4);
    }
}
