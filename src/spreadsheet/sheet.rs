use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::style::FillStyle;
use std::collections::HashMap;

/// Rectangular, 0-indexed view of a sheet's cell values starting at `A1`.
#[derive(Clone, Debug, Default)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
    col_count: usize,
}

impl Grid {
    /// Number of rows, counting leading empty rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns of the widest row.
    pub fn col_count(&self) -> usize {
        self.col_count
    }

    /// Returns the value at (row, col), or `None` for empty or out of range cells.
    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows
            .get(row)
            .and_then(|record| record.get(col))
            .filter(|value| !value.is_empty())
    }

    /// Stores a value, growing the grid as needed.
    pub(crate) fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let record = &mut self.rows[row];
        if record.len() <= col {
            record.resize_with(col + 1, CellValue::default);
        }
        record[col] = value;
        self.col_count = self.col_count.max(col + 1);
    }
}

/// A worksheet loaded into memory: its values plus the fill of every styled cell.
#[derive(Clone, Debug, Default)]
pub struct Worksheet {
    /// Sheet name as stored in the workbook
    pub name: String,
    grid: Grid,
    /// Fills keyed by 0-based (row, col)
    fills: HashMap<(usize, usize), FillStyle>,
    max_row: usize,
    max_col: usize,
}

impl Worksheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    /// Stores a value at 0-based (row, col).
    pub fn push(&mut self, row: usize, col: usize, value: CellValue) {
        self.update_bound(row, col);
        self.grid.set(row, col, value);
    }

    /// Stores the fill of the cell at 0-based (row, col).
    pub fn set_fill(&mut self, row: usize, col: usize, fill: FillStyle) {
        self.update_bound(row, col);
        self.fills.insert((row, col), fill);
    }

    /// Records that a cell element exists at (row, col) even without value or fill.
    pub(crate) fn update_bound(&mut self, row: usize, col: usize) {
        self.max_row = self.max_row.max(row + 1);
        self.max_col = self.max_col.max(col + 1);
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns the fill at 1-based (row, col), following spreadsheet API conventions.
    pub fn fill_at(&self, row: usize, col: usize) -> Option<&FillStyle> {
        if row == 0 || col == 0 {
            return None;
        }
        self.fills.get(&(row - 1, col - 1))
    }

    /// Highest 1-based row holding a cell element.
    pub fn max_row(&self) -> usize {
        self.max_row
    }

    /// Highest 1-based column holding a cell element.
    pub fn max_col(&self) -> usize {
        self.max_col
    }
}
