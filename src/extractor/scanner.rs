//! Workbook-wide inventory of the matrices each sheet holds.
use crate::extractor::header::find_main;
use crate::extractor::header::find_thickness;
use crate::spreadsheet::sheet::Grid;
use crate::spreadsheet::Spreadsheet;
use log::debug;
use log::info;
use log::warn;

/// Name of the table-of-contents sheet, compared trimmed and lowercased.
pub const CONTENTS_SHEET_NAME: &str = "สารบัญ";

/// Highest thickness index probed.
const MAX_THICKNESS_INDEX: usize = 19;

/// Returns true for the table-of-contents sheet, which never holds matrices.
pub fn is_contents_sheet(name: &str) -> bool {
    name.trim().to_lowercase() == CONTENTS_SHEET_NAME
}

/// Matrix indices of every sheet, plus the widest inventory.
#[derive(Clone, Debug, Default)]
pub struct ScanResult {
    /// Largest inventory length over all sheets, at least 1
    pub max_matrix_count: usize,
    /// Sheet name with its matrix indices, in workbook order
    pub inventory: Vec<(String, Vec<usize>)>,
    /// Sheets that could not be loaded
    pub warnings: Vec<String>,
}

impl ScanResult {
    /// Matrix indices found in `sheet_name`, empty when none or unknown.
    pub fn matrices(&self, sheet_name: &str) -> &[usize] {
        self.inventory
            .iter()
            .find(|(name, _)| name == sheet_name)
            .map(|(_, indices)| indices.as_slice())
            .unwrap_or(&[])
    }
}

/// Matrix indices present in one grid: `[1, 2, ..]` up to the first missing
/// thickness index, or nothing without a main header.
pub fn scan_sheet(grid: &Grid) -> Vec<usize> {
    if find_main(grid).is_none() {
        return Vec::new();
    }
    let mut indices = vec![1];
    for index in 2..=MAX_THICKNESS_INDEX {
        if find_thickness(grid, index).is_none() {
            break;
        }
        indices.push(index);
    }
    indices
}

/// Scans every sheet except the table of contents.
///
/// A sheet that fails to load gets an empty inventory and a warning.
pub fn scan_workbook(spreadsheet: &mut dyn Spreadsheet) -> ScanResult {
    let mut result = ScanResult {
        max_matrix_count: 1,
        ..ScanResult::default()
    };
    for sheet_name in spreadsheet.sheet_names() {
        if is_contents_sheet(&sheet_name) {
            continue;
        }
        let indices = match spreadsheet.read_sheet(&sheet_name) {
            Ok(sheet) => scan_sheet(sheet.grid()),
            Err(error) => {
                warn!("Failed to scan sheet '{}': {}", sheet_name, error);
                result.warnings.push(format!("Failed to scan sheet '{}': {}", sheet_name, error));
                Vec::new()
            }
        };
        debug!("Sheet '{}' holds matrices {:?}", sheet_name, indices);
        result.max_matrix_count = result.max_matrix_count.max(indices.len());
        result.inventory.push((sheet_name, indices));
    }
    info!(
        "Scanned {} sheets, up to {} matrices per sheet",
        result.inventory.len(),
        result.max_matrix_count
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::testing::number;
    use crate::spreadsheet::testing::text;
    use crate::spreadsheet::testing::FailingSpreadsheet;
    use crate::spreadsheet::testing::worksheet;
    use crate::spreadsheet::testing::MemorySpreadsheet;

    #[test]
    fn contents_sheet_names() {
        assert!(is_contents_sheet("สารบัญ"));
        assert!(is_contents_sheet("  สารบัญ "));
        assert!(!is_contents_sheet("Type A"));
    }

    #[test]
    fn inventory_stops_at_first_gap() {
        let sheet = worksheet("A", &[
            &[text("1"), number(60.0)],
            &[number(100.0), number(1000.0)],
            &[text("Thk.2")],
            &[text("Thk.4")],
        ]);
        assert_eq!(scan_sheet(sheet.grid()), vec![1, 2]);
    }

    #[test]
    fn inventory_without_main_header() {
        let sheet = worksheet("A", &[&[text("Thk.2")], &[text("Thk.3")]]);
        assert!(scan_sheet(sheet.grid()).is_empty());
    }

    #[test]
    fn inventories_are_contiguous() {
        let sheet = worksheet("A", &[
            &[text("1")],
            &[text("2")],
            &[text("ชั้น 3")],
            &[text("Thickness 4")],
            &[text("6")],
        ]);
        let indices = scan_sheet(sheet.grid());
        assert_eq!(indices, vec![1, 2, 3, 4]);
        assert!(indices.windows(2).all(|pair| pair[1] == pair[0] + 1));
    }

    #[test]
    fn workbook_scan() {
        let mut spreadsheet = MemorySpreadsheet::default()
            .with(worksheet("สารบัญ", &[&[text("1")], &[text("2")], &[text("3")]]))
            .with(worksheet("Type A", &[&[text("1")], &[text("Thk.2")]]))
            .with(worksheet("Notes", &[&[text("remarks")]]));
        let result = scan_workbook(&mut spreadsheet);

        assert_eq!(result.max_matrix_count, 2);
        assert_eq!(result.inventory.len(), 2);
        assert_eq!(result.matrices("Type A"), &[1, 2]);
        assert!(result.matrices("Notes").is_empty());
        assert!(result.matrices("สารบัญ").is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn at_least_one_matrix_column() {
        let mut spreadsheet = MemorySpreadsheet::default().with(worksheet("Notes", &[&[text("remarks")]]));
        assert_eq!(scan_workbook(&mut spreadsheet).max_matrix_count, 1);
    }

    #[test]
    fn unreadable_sheet_gets_warning() {
        let workbook = MemorySpreadsheet::default()
            .with(worksheet("Bad", &[&[text("1")], &[text("2")], &[text("3")]]))
            .with(worksheet("Good", &[&[text("1"), number(60.0)], &[text("Thk.2")]]));
        let mut spreadsheet = FailingSpreadsheet::new(workbook, "Bad", 0);
        let result = scan_workbook(&mut spreadsheet);

        assert_eq!(result.warnings, vec!["Failed to scan sheet 'Bad': broken sheet"]);
        assert!(result.matrices("Bad").is_empty());
        assert_eq!(result.matrices("Good"), &[1, 2]);
        assert_eq!(result.max_matrix_count, 2);
    }
}
