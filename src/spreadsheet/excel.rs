//! Microsoft Office Excel Helpers
use crate::error::PriceMatrixError;
use crate::helpers::reader::UnifiedReader;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::borrow::Cow;
use std::collections::HashMap;
use zip::ZipArchive;

/// XML tag name for relationship elements in Excel files
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Opens an Excel package and loads its workbook structure
///
/// # Arguments
/// * `file_name` - Name used in error messages
/// * `reader` - Reader over the package bytes
/// * `load_workbook` - Function to load workbook metadata and sheets
///
/// # Returns
/// Tuple containing:
/// - Zip archive handle
/// - List of sheet names and their paths
/// - Whether the workbook uses the 1904 date system
#[allow(clippy::type_complexity)]
pub(super) fn open<W>(file_name: &str, reader: UnifiedReader, load_workbook: W) -> Result<(
    ZipArchive<UnifiedReader>,
    Vec<(String, String)>,
    bool,
), PriceMatrixError>
where
    W: Fn(&mut ZipArchive<UnifiedReader>) -> Result<(Vec<(String, String)>, bool), PriceMatrixError>,
{
    let mut zip = ZipArchive::new(reader)
        .map_err(|error| SpreadsheetError::FileFormatError(file_name.to_owned(), error.to_string()))?;
    let (sheets, is_1904) = load_workbook(&mut zip)?;
    if sheets.is_empty() {
        Err(SpreadsheetError::SpreadsheetEmptyError(file_name.to_owned()))?
    }
    Ok((zip, sheets, is_1904))
}

/// Loads worksheet relationships from an Excel file
///
/// # Arguments
/// * `zip` - Zip archive handle
/// * `path` - Path to the relationships XML file within the archive
///
/// # Returns
/// Mapping of relationship IDs to worksheet paths
pub(super) fn load_relationships(zip: &mut ZipArchive<UnifiedReader>, path: &str) -> Result<HashMap<String, String>, PriceMatrixError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            // Only process worksheet relationships
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Maps format indexes to cell types using custom and built-in formats
///
/// # Arguments
/// * `format_id` - Number format identifier of a cell format
/// * `custom_formats` - Custom format mappings defined in the workbook
/// * `is_1904` - Whether the workbook uses the 1904 date system
pub(super) fn resolve_number_format(format_id: &str, custom_formats: &HashMap<String, CellType>, is_1904: bool) -> CellType {
    custom_formats
        .get(format_id)
        .copied()
        .or_else(|| CellType::parse_builtin_number_format_id(format_id, is_1904))
        .unwrap_or(CellType::Number)
}

/// Normalizes a path to ensure it points to the correct location within the Excel zip archive
///
/// # Arguments
/// * `path` - Original path from relationship or reference
///
/// # Returns
/// Normalized path suitable for accessing files within the zip archive
pub(crate) fn to_zip_path(path: Cow<'_, str>) -> String {
    if let Some(stripped) = path.strip_prefix('/') {
        stripped.to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}
