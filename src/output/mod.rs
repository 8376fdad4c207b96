//! # Output Writer
//!
//! Renders the Price and Type tables as single-sheet workbooks. Both workbooks are
//! rendered into memory and staged before either file is put in place.
use crate::error::PriceMatrixError;
use crate::error::ResultMessage;
use crate::extractor::number::Numeric;
use crate::extractor::record::price_columns;
use crate::extractor::record::PriceRecord;
use crate::extractor::record::TypeRecord;
use crate::extractor::record::TYPE_COLUMNS;
use crate::extractor::Extraction;
use log::debug;
use log::info;
use log::warn;
use rust_xlsxwriter::Format;
use rust_xlsxwriter::FormatBorder;
use rust_xlsxwriter::Workbook;
use rust_xlsxwriter::Worksheet;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Name of the only sheet in each output workbook.
pub const SHEET_NAME: &str = "Sheet1";

/// Errors raised while writing output workbooks.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Cannot create output directory '{0}': {1}")]
    CreateDirectory(String, std::io::Error),

    #[error("Cannot write output file '{0}': {1}")]
    WriteFile(String, std::io::Error),

    #[error("Price record {0} has {1} colors, expected {2}")]
    ColorCount(usize, usize, usize),
}

/// File name of the Price table for a job.
pub fn price_file_name(job_id: &str) -> String {
    format!("Price_{job_id}.xlsx")
}

/// File name of the Type table for a job.
pub fn type_file_name(job_id: &str) -> String {
    format!("Type_{job_id}.xlsx")
}

fn header_format() -> Format {
    Format::new().set_bold().set_border(FormatBorder::Thin)
}

/// Writes a bold, bordered header on the first row.
fn write_header<S: AsRef<str>>(worksheet: &mut Worksheet, columns: &[S]) -> Result<(), PriceMatrixError> {
    let format = header_format();
    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name.as_ref(), &format)?;
    }
    Ok(())
}

fn write_numeric(worksheet: &mut Worksheet, row: u32, col: u16, value: Numeric) -> Result<(), PriceMatrixError> {
    worksheet.write_number(row, col, value.value())?;
    Ok(())
}

/// Renders the Price table: fixed columns, then one `<n>_Color` column per matrix index.
pub fn render_prices(records: &[PriceRecord], matrix_count: usize) -> Result<Vec<u8>, PriceMatrixError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    write_header(worksheet, price_columns(matrix_count).as_slice())?;

    for (index, record) in records.iter().enumerate() {
        if record.colors.len() != matrix_count {
            Err(OutputError::ColorCount(record.id, record.colors.len(), matrix_count))?
        }
        let row = index as u32 + 1;
        worksheet.write_number(row, 0, record.id as f64)?;
        worksheet.write_string(row, 1, &record.series)?;
        worksheet.write_string(row, 2, &record.type_name)?;
        write_numeric(worksheet, row, 3, record.width)?;
        write_numeric(worksheet, row, 4, record.height)?;
        write_numeric(worksheet, row, 5, record.price)?;
        write_numeric(worksheet, row, 6, record.glass_qty)?;
        for (offset, color) in record.colors.iter().enumerate() {
            worksheet.write_string(row, 7 + offset as u16, color)?;
        }
    }
    Ok(workbook.save_to_buffer()?)
}

/// Renders the Type table, one row per processed sheet.
pub fn render_types(records: &[TypeRecord]) -> Result<Vec<u8>, PriceMatrixError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    write_header(worksheet, &TYPE_COLUMNS)?;

    for (index, record) in records.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write_number(row, 0, record.id as f64)?;
        worksheet.write_string(row, 1, &record.series)?;
        worksheet.write_string(row, 2, &record.type_name)?;
        worksheet.write_string(row, 3, &record.description)?;
        write_numeric(worksheet, row, 4, record.width_min)?;
        write_numeric(worksheet, row, 5, record.width_max)?;
        write_numeric(worksheet, row, 6, record.height_min)?;
        write_numeric(worksheet, row, 7, record.height_max)?;
    }
    Ok(workbook.save_to_buffer()?)
}

/// Writes rendered bytes to a temporary file in `output_dir`, removed again on drop.
fn stage(output_dir: &Path, target: &Path, bytes: &[u8]) -> Result<NamedTempFile, OutputError> {
    let write_error = |error| OutputError::WriteFile(target.display().to_string(), error);
    let mut file = NamedTempFile::new_in(output_dir).map_err(write_error)?;
    file.write_all(bytes).map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    Ok(file)
}

/// Writes `Price_<job>.xlsx` and `Type_<job>.xlsx` under `output_dir`.
///
/// Both workbooks are rendered and staged next to their targets before either is
/// renamed into place. If the second rename fails the first file is removed, so a
/// failed call leaves neither output behind.
///
/// # Returns
/// Paths of the Price and Type files
pub fn write_tables(
    output_dir: &Path,
    job_id: &str,
    extraction: &Extraction,
) -> Result<(PathBuf, PathBuf), PriceMatrixError> {
    let prices = render_prices(&extraction.prices, extraction.matrix_count).with_prefix("render Price table")?;
    let types = render_types(&extraction.types).with_prefix("render Type table")?;
    debug!("Rendered Price ({} bytes) and Type ({} bytes) workbooks", prices.len(), types.len());

    fs::create_dir_all(output_dir)
        .map_err(|error| OutputError::CreateDirectory(output_dir.display().to_string(), error))?;
    let price_file = output_dir.join(price_file_name(job_id));
    let type_file = output_dir.join(type_file_name(job_id));

    let staged_prices = stage(output_dir, &price_file, &prices)?;
    let staged_types = stage(output_dir, &type_file, &types)?;

    staged_prices
        .persist(&price_file)
        .map_err(|error| OutputError::WriteFile(price_file.display().to_string(), error.error))?;
    if let Err(error) = staged_types.persist(&type_file) {
        if let Err(e) = fs::remove_file(&price_file) {
            warn!("Cannot remove '{}': {}", price_file.display(), e);
        }
        Err(OutputError::WriteFile(type_file.display().to_string(), error.error))?
    }
    info!("Wrote {} and {}", price_file.display(), type_file.display());
    Ok((price_file, type_file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::cell::CellValue;
    use crate::spreadsheet::xlsx::XlsxSpreadsheet;
    use crate::spreadsheet::Spreadsheet;

    fn n(value: f64) -> Numeric {
        Numeric::new(value).unwrap()
    }

    fn price(id: usize, colors: &[&str]) -> PriceRecord {
        PriceRecord {
            id,
            series: "Window".to_owned(),
            type_name: "Type A".to_owned(),
            width: n(60.0),
            height: n(100.0),
            price: n(1234.5),
            glass_qty: n(2.0),
            colors: colors.iter().map(|color| color.to_string()).collect(),
        }
    }

    #[test]
    fn price_table_round_trip() {
        let bytes = render_prices(&[price(1, &["92CDDC", "FFFFFF"])], 2).unwrap();
        let mut spreadsheet = XlsxSpreadsheet::from_bytes("Price.xlsx", bytes).unwrap();
        assert_eq!(spreadsheet.sheet_names(), vec![SHEET_NAME]);

        let sheet = spreadsheet.read_sheet(SHEET_NAME).unwrap();
        let grid = sheet.grid();
        let header: Vec<String> = (0..grid.col_count())
            .filter_map(|col| grid.cell(0, col).map(CellValue::to_string))
            .collect();
        assert_eq!(header, price_columns(2));
        assert_eq!(grid.cell(1, 5), Some(&CellValue::Number(1234.5)));
        assert_eq!(grid.cell(1, 7), Some(&CellValue::Text("92CDDC".to_owned())));
        assert_eq!(grid.cell(1, 8), Some(&CellValue::Text("FFFFFF".to_owned())));
    }

    #[test]
    fn type_table_round_trip() {
        let record = TypeRecord {
            id: 1,
            series: "Window".to_owned(),
            type_name: "Type A".to_owned(),
            description: "Sliding".to_owned(),
            width_min: n(60.0),
            width_max: n(80.0),
            height_min: n(100.0),
            height_max: n(120.0),
        };
        let bytes = render_types(&[record]).unwrap();
        let mut spreadsheet = XlsxSpreadsheet::from_bytes("Type.xlsx", bytes).unwrap();
        let sheet = spreadsheet.read_sheet(SHEET_NAME).unwrap();
        let grid = sheet.grid();
        let header: Vec<String> = (0..grid.col_count())
            .filter_map(|col| grid.cell(0, col).map(CellValue::to_string))
            .collect();
        assert_eq!(header, TYPE_COLUMNS);
        assert_eq!(grid.cell(1, 3), Some(&CellValue::Text("Sliding".to_owned())));
        assert_eq!(grid.cell(1, 7), Some(&CellValue::Number(120.0)));
    }

    #[test]
    fn reject_ragged_colors() {
        let error = render_prices(&[price(3, &["92CDDC"])], 2).unwrap_err();
        assert_eq!(error.to_string(), "Price record 3 has 1 colors, expected 2");
    }

    #[test]
    fn write_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let extraction = Extraction {
            matrix_count: 1,
            prices: vec![price(1, &["92CDDC"])],
            ..Extraction::default()
        };
        let output_dir = dir.path().join("outputs");
        let (price_file, type_file) = write_tables(&output_dir, "20240101_000000_abcdef12", &extraction).unwrap();
        assert_eq!(price_file, output_dir.join("Price_20240101_000000_abcdef12.xlsx"));
        assert_eq!(type_file, output_dir.join("Type_20240101_000000_abcdef12.xlsx"));
        assert!(price_file.is_file());
        assert!(type_file.is_file());
    }

    #[test]
    fn nothing_written_when_rendering_fails() {
        let dir = tempfile::tempdir().unwrap();
        let extraction = Extraction {
            matrix_count: 2,
            prices: vec![price(1, &["92CDDC"])],
            ..Extraction::default()
        };
        assert!(write_tables(dir.path(), "job", &extraction).is_err());
        assert!(!dir.path().join(price_file_name("job")).exists());
        assert!(!dir.path().join(type_file_name("job")).exists());
    }

    #[test]
    fn nothing_left_when_type_file_cannot_be_placed() {
        let dir = tempfile::tempdir().unwrap();
        let extraction = Extraction {
            matrix_count: 1,
            prices: vec![price(1, &["92CDDC"])],
            ..Extraction::default()
        };
        // a directory occupies the Type target
        fs::create_dir(dir.path().join(type_file_name("job"))).unwrap();

        let error = write_tables(dir.path(), "job", &extraction).unwrap_err();
        assert!(error.to_string().contains("Type_job.xlsx"), "{error}");
        assert!(!dir.path().join(price_file_name("job")).exists());
        assert!(!dir.path().join(type_file_name("job")).is_file());

        let leftovers: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(leftovers, vec![type_file_name("job")]);
    }
}
