//! Output records and the run summary.
use crate::extractor::number::Numeric;
use serde::Serialize;

/// Column names of the Type table.
pub const TYPE_COLUMNS: [&str; 8] = [
    "ID", "Serie", "Type", "Description", "width_min", "width_max", "height_min", "height_max",
];

/// Fixed leading columns of the Price table; `<n>_Color` columns follow.
pub const PRICE_COLUMNS: [&str; 7] = ["ID", "Serie", "Type", "Width", "Height", "Price", "Glass_QTY"];

/// Full Price table header for `matrix_count` color columns.
pub fn price_columns(matrix_count: usize) -> Vec<String> {
    PRICE_COLUMNS
        .iter()
        .map(|column| column.to_string())
        .chain((1..=matrix_count).map(|index| format!("{index}_Color")))
        .collect()
}

/// One priced (height, width) cell of a main matrix.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceRecord {
    pub id: usize,
    pub series: String,
    pub type_name: String,
    pub width: Numeric,
    pub height: Numeric,
    pub price: Numeric,
    pub glass_qty: Numeric,
    /// One color per matrix index, `colors[0]` being `1_Color`
    pub colors: Vec<String>,
}

/// One processed sheet.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TypeRecord {
    pub id: usize,
    pub series: String,
    pub type_name: String,
    pub description: String,
    pub width_min: Numeric,
    pub width_max: Numeric,
    pub height_min: Numeric,
    pub height_max: Numeric,
}

/// A sheet left out of the output, with the reason.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedSheet {
    pub sheet: String,
    pub reason: String,
}

/// Result of processing one workbook, printed as JSON by the command line.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Summary {
    pub price_file: String,
    pub type_file: String,
    pub total_records: usize,
    pub processed_sheets: usize,
    pub skipped_sheets: Vec<SkippedSheet>,
    pub warnings: Vec<String>,
}
