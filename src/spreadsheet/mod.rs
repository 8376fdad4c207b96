//! # Spreadsheet Reading Module
//!
//! Reads Office Open XML workbooks (.xlsx, .xlsm) into in-memory worksheets that
//! keep, for every cell, both its resolved value and its fill. The extraction engine
//! only ever sees the [`Spreadsheet`] trait and [`Worksheet`] values.
pub mod cell;
pub(crate) mod excel;
pub mod reference;
pub mod sheet;
pub mod style;
pub mod xlsx;

use crate::error::PriceMatrixError;
use crate::spreadsheet::sheet::Worksheet;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use std::path::Path;
use thiserror::Error;

/// Errors raised while opening or reading a workbook.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// A part the package must contain is missing
    #[error("Missing file '{0}' in workbook package")]
    FileError(String),

    /// The file is not a readable workbook package
    #[error("Invalid workbook file format '{0}': {1}")]
    FileFormatError(String, String),

    /// The workbook declares no worksheets
    #[error("Workbook '{0}' contains no worksheets")]
    SpreadsheetEmptyError(String),

    /// The requested worksheet does not exist
    #[error("Sheet '{1}' not found in '{0}'")]
    SheetNotFound(String, String),
}

/// A workbook whose worksheets can be read one at a time.
pub trait Spreadsheet {
    /// Returns the file name of this spreadsheet
    fn name(&self) -> String;

    /// Returns the worksheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Loads one worksheet with its values and fills
    fn read_sheet(&mut self, sheet_name: &str) -> Result<Worksheet, PriceMatrixError>;
}

/// Opens a workbook, choosing the reader from the file extension.
///
/// Files without an extension are tried as xlsx packages.
pub fn open_spreadsheet(file_name: &str) -> Result<Box<dyn Spreadsheet>, PriceMatrixError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_ascii_lowercase());
    match extension.as_deref() {
        None | Some("xlsx") | Some("xlsm") => Ok(Box::new(XlsxSpreadsheet::open(file_name)?)),
        Some(other) => Err(SpreadsheetError::FileFormatError(
            file_name.to_owned(),
            format!("unsupported extension '.{other}'"),
        ))?,
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_unsupported_extensions() {
        let error = open_spreadsheet("prices.ods").err().map(|e| e.to_string()).unwrap_or_default();
        assert!(error.contains("unsupported extension '.ods'"), "{error}");
    }

    #[test]
    fn report_missing_files() {
        assert!(open_spreadsheet("/nonexistent/prices.xlsx").is_err());
    }
}
