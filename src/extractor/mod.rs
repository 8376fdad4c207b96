//! # Matrix Extraction Engine
//!
//! Turns a catalog workbook into Price and Type records. The scanner first fixes
//! how many `<n>_Color` columns the output carries, then every sheet is walked once:
//! the main header gives widths, heights and prices, and each matrix index found in
//! column A contributes one color per (height, width).
pub mod color;
pub mod header;
pub mod number;
pub mod offset;
pub mod record;
pub mod scanner;

use crate::config::series_name;
use crate::error::PriceMatrixError;
use crate::extractor::color::NO_COLOR;
use crate::extractor::header::find_main;
use crate::extractor::header::find_thickness;
use crate::extractor::header::MatrixHeader;
use crate::extractor::number::cell_number;
use crate::extractor::number::to_number;
use crate::extractor::number::Numeric;
use crate::extractor::offset::infer_offset;
use crate::extractor::offset::read_color_matrix;
use crate::extractor::offset::ColorMatrix;
use crate::extractor::offset::MAIN_OFFSET;
use crate::extractor::offset::THICKNESS_OFFSET;
use crate::extractor::record::PriceRecord;
use crate::extractor::record::SkippedSheet;
use crate::extractor::record::Summary;
use crate::extractor::record::TypeRecord;
use crate::extractor::scanner::is_contents_sheet;
use crate::extractor::scanner::scan_workbook;
use crate::output;
use crate::spreadsheet::sheet::Grid;
use crate::spreadsheet::sheet::Worksheet;
use crate::spreadsheet::open_spreadsheet;
use crate::spreadsheet::Spreadsheet;
use log::debug;
use log::info;
use log::warn;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;
use thiserror::Error;

/// Errors that stop an extraction before any sheet is read.
#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("Input file '{0}' does not exist")]
    InputNotFound(String),

    #[error("Input file '{0}' is not an .xlsx workbook")]
    UnsupportedInput(String),
}

/// Why a sheet produced no records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    ContentsSheet,
    NoMatrix,
    NoMainMatrix,
    NoDimensions,
    Failed(String),
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::ContentsSheet => write!(f, "contents sheet"),
            SkipReason::NoMatrix => write!(f, "no matrix found"),
            SkipReason::NoMainMatrix => write!(f, "main matrix not found"),
            SkipReason::NoDimensions => write!(f, "dimensions (widths/heights) not found"),
            SkipReason::Failed(message) => write!(f, "processing failed: {message}"),
        }
    }
}

/// Records extracted from one workbook, before they are written.
#[derive(Clone, Debug, Default)]
pub struct Extraction {
    /// Number of `<n>_Color` columns in every price record
    pub matrix_count: usize,
    pub prices: Vec<PriceRecord>,
    pub types: Vec<TypeRecord>,
    pub processed_sheets: usize,
    pub skipped_sheets: Vec<SkippedSheet>,
    pub warnings: Vec<String>,
}

impl Extraction {
    fn skip(&mut self, sheet_name: &str, reason: SkipReason) {
        warn!("Skipping sheet '{}': {}", sheet_name, reason);
        self.skipped_sheets.push(SkippedSheet {
            sheet: sheet_name.to_owned(),
            reason: reason.to_string(),
        });
    }
}

/// Sheet-level values found next to `Glass_QTY` and `Description` labels.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SheetAttributes {
    pub(crate) glass_qty: Numeric,
    pub(crate) description: String,
}

/// Scans the grid for labelled attributes; the first usable value of each wins.
pub(crate) fn read_attributes(grid: &Grid) -> SheetAttributes {
    let mut glass_qty = None::<Numeric>;
    let mut description = None::<String>;
    for row in 0..grid.row_count() {
        for col in 0..grid.col_count().saturating_sub(1) {
            let Some(label) = grid.cell(row, col) else {
                continue;
            };
            let label = label.to_string().trim().to_lowercase();
            let neighbor = grid.cell(row, col + 1);
            if label == "glass_qty" || label == "glass qty" {
                if glass_qty.is_none() {
                    glass_qty = cell_number(neighbor);
                }
            } else if label == "description" && description.is_none() {
                description = neighbor
                    .map(|value| value.to_string().trim().to_owned())
                    .filter(|text| !text.is_empty());
            }
        }
    }
    SheetAttributes {
        glass_qty: glass_qty.unwrap_or(Numeric::ONE),
        description: description.unwrap_or_default(),
    }
}

/// Numbers read from `(row, col)` onwards in one direction, up to the first non-numeric cell.
fn read_dimension<I>(grid: &Grid, cells: I) -> Vec<Numeric>
where
    I: Iterator<Item = (usize, usize)>,
{
    cells
        .map_while(|(row, col)| cell_number(grid.cell(row, col)))
        .collect()
}

fn bounds(values: &[Numeric]) -> Option<(Numeric, Numeric)> {
    values.iter().min().copied().zip(values.iter().max().copied())
}

/// Extracts price and type records from catalog workbooks.
pub struct Extractor {
    job_id: String,
}

impl Extractor {
    pub fn new(job_id: &str) -> Extractor {
        Extractor {
            job_id: job_id.to_owned(),
        }
    }

    /// Processes one workbook file end to end and writes `Price_<job>.xlsx` and
    /// `Type_<job>.xlsx` into `output_dir`.
    ///
    /// # Arguments
    /// * `input` - Path to the `.xlsx` workbook
    /// * `output_dir` - Directory receiving both output workbooks, created if missing
    /// * `original_filename` - Client-side file name, used for the series name
    pub fn process_file(
        &self,
        input: &Path,
        output_dir: &Path,
        original_filename: Option<&str>,
    ) -> Result<Summary, PriceMatrixError> {
        let input_name = input.to_string_lossy().into_owned();
        if !input.is_file() {
            Err(ExtractorError::InputNotFound(input_name.to_owned()))?
        }
        let is_xlsx = input.extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("xlsx"));
        if !is_xlsx {
            Err(ExtractorError::UnsupportedInput(input_name.to_owned()))?
        }

        let series = series_name(input, original_filename);
        info!("Processing '{}' as series '{}' (job {})", input_name, series, self.job_id);
        let mut spreadsheet = open_spreadsheet(&input_name)?;
        let extraction = self.extract(spreadsheet.as_mut(), &series);
        let (price_file, type_file) = output::write_tables(output_dir, &self.job_id, &extraction)?;

        info!(
            "Finished job {}: {} price records, {} type records, {} sheets skipped",
            self.job_id,
            extraction.prices.len(),
            extraction.types.len(),
            extraction.skipped_sheets.len()
        );
        Ok(Summary {
            price_file: price_file.to_string_lossy().into_owned(),
            type_file: type_file.to_string_lossy().into_owned(),
            total_records: extraction.prices.len(),
            processed_sheets: extraction.processed_sheets,
            skipped_sheets: extraction.skipped_sheets,
            warnings: extraction.warnings,
        })
    }

    /// Extracts every sheet of an opened workbook. Sheet failures are recorded, never raised.
    pub fn extract(&self, spreadsheet: &mut dyn Spreadsheet, series: &str) -> Extraction {
        let scan = scan_workbook(spreadsheet);
        let mut extraction = Extraction {
            matrix_count: scan.max_matrix_count,
            warnings: scan.warnings.clone(),
            ..Extraction::default()
        };

        for sheet_name in spreadsheet.sheet_names() {
            if is_contents_sheet(&sheet_name) {
                extraction.skip(&sheet_name, SkipReason::ContentsSheet);
                continue;
            }
            let matrices = scan.matrices(&sheet_name);
            if matrices.is_empty() {
                extraction.skip(&sheet_name, SkipReason::NoMatrix);
                continue;
            }
            let sheet = match spreadsheet.read_sheet(&sheet_name) {
                Ok(sheet) => sheet,
                Err(error) => {
                    extraction.skip(&sheet_name, SkipReason::Failed(error.to_string()));
                    continue;
                }
            };
            if let Err(reason) = self.extract_sheet(&sheet, matrices, series, &mut extraction) {
                extraction.skip(&sheet_name, reason);
            }
        }
        extraction
    }

    /// Appends the records of one sheet, or returns why it has none.
    fn extract_sheet(
        &self,
        sheet: &Worksheet,
        matrices: &[usize],
        series: &str,
        extraction: &mut Extraction,
    ) -> Result<(), SkipReason> {
        let grid = sheet.grid();
        let attributes = read_attributes(grid);
        let MatrixHeader { row: hr, col: hc, .. } = find_main(grid).ok_or(SkipReason::NoMainMatrix)?;

        let widths = read_dimension(grid, (hc + 1..grid.col_count()).map(|col| (hr, col)));
        let heights = read_dimension(grid, (hr + 1..grid.row_count()).map(|row| (row, hc)));
        let ((width_min, width_max), (height_min, height_max)) = bounds(&widths)
            .zip(bounds(&heights))
            .ok_or(SkipReason::NoDimensions)?;
        info!(
            "Sheet '{}': main header at {}, {} heights x {} widths, matrices {:?}",
            sheet.name,
            crate::spreadsheet::reference::index_to_reference(hr, hc),
            heights.len(),
            widths.len(),
            matrices
        );

        let mut colors = BTreeMap::<usize, ColorMatrix>::new();
        for index in matrices {
            let matrix = if *index == 1 {
                read_color_matrix(sheet, hr, hc, MAIN_OFFSET, &widths, &heights)
            } else if let Some(thickness) = find_thickness(grid, *index) {
                let offset = infer_offset(sheet, thickness.row, hc, &widths, &heights, THICKNESS_OFFSET);
                read_color_matrix(sheet, thickness.row, hc, offset, &widths, &heights)
            } else {
                continue;
            };
            debug!(
                "Sheet '{}': matrix {} has {}/{} colored cells",
                sheet.name,
                index,
                matrix.colored_count(),
                matrix.len()
            );
            colors.insert(*index, matrix);
        }

        let type_name = sheet.name.trim().to_owned();
        extraction.types.push(TypeRecord {
            id: extraction.types.len() + 1,
            series: series.to_owned(),
            type_name: type_name.to_owned(),
            description: attributes.description,
            width_min,
            width_max,
            height_min,
            height_max,
        });

        let mut count = 0usize;
        for (i, height) in heights.iter().enumerate() {
            for (j, width) in widths.iter().enumerate() {
                let Some(price) = grid.cell(hr + 1 + i, hc + 1 + j).and_then(to_number) else {
                    continue;
                };
                let row_colors = (1..=extraction.matrix_count)
                    .map(|index| {
                        colors.get(&index)
                            .map(|matrix| matrix.get(*height, *width))
                            .unwrap_or(NO_COLOR)
                            .to_owned()
                    })
                    .collect();
                extraction.prices.push(PriceRecord {
                    id: extraction.prices.len() + 1,
                    series: series.to_owned(),
                    type_name: type_name.to_owned(),
                    width: *width,
                    height: *height,
                    price,
                    glass_qty: attributes.glass_qty,
                    colors: row_colors,
                });
                count += 1;
            }
        }
        extraction.processed_sheets += 1;
        info!("Sheet '{}': {} price records", sheet.name, count);
        Ok(())
    }
}
