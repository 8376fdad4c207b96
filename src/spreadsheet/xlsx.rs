use crate::error::PriceMatrixError;
use crate::helpers::reader::UnifiedReader;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::excel;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::Worksheet;
use crate::spreadsheet::style::FillStyle;
use crate::spreadsheet::style::PatternKind;
use crate::spreadsheet::style::StyleTable;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use log::debug;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufReader;
use zip::read::ZipFile;
use zip::ZipArchive;

// XML tag names for parsing Excel XLSX format
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts"); // Custom number formats container
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");   // Individual custom number format
const TAG_FILLS: QName = QName(b"fills");             // Fill definitions container
const TAG_FILL: QName = QName(b"fill");               // Individual fill definition
const TAG_PATTERN_FILL: QName = QName(b"patternFill"); // Pattern of a fill
const TAG_FOREGROUND: QName = QName(b"fgColor");      // Pattern foreground color
const TAG_BACKGROUND: QName = QName(b"bgColor");      // Pattern background color
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");  // Cell format indexes container
const TAG_FORMAT_INDEX: QName = QName(b"xf");         // Individual cell format index
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");   // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");       // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                  // Text content within strings
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr"); // Workbook properties
const TAG_SHEET: QName = QName(b"sheet");             // Worksheet definition
const TAG_ROW: QName = QName(b"row");                 // Row in worksheet
const TAG_CELL: QName = QName(b"c");                  // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");        // Inline string value
const TAG_VALUE: QName = QName(b"v");                 // Cell value content

/// Represents an Excel XLSX workbook with its styles and shared strings loaded
pub struct XlsxSpreadsheet {
    /// File name of the spreadsheet
    pub(crate) name: String,
    /// ZIP archive containing the XLSX file contents
    zip: ZipArchive<UnifiedReader>,
    /// Fills and number formats indexed by cell format
    styles: StyleTable,
    /// Shared string table
    shared_strings: Vec<String>,
    /// List of worksheets with (name, zip_path) pairs
    sheets: Vec<(String, String)>,
}

impl XlsxSpreadsheet {
    /// Opens an XLSX spreadsheet file and parses its structure
    ///
    /// # Arguments
    /// * `file_name` - Path to the XLSX file
    ///
    /// # Returns
    /// Result containing the initialized XlsxSpreadsheet or an error
    pub fn open(file_name: &str) -> Result<XlsxSpreadsheet, PriceMatrixError> {
        Self::load(file_name, UnifiedReader::new(file_name)?)
    }

    /// Parses an XLSX package held in memory
    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> Result<XlsxSpreadsheet, PriceMatrixError> {
        Self::load(name, UnifiedReader::from_bytes(bytes))
    }

    fn load(name: &str, reader: UnifiedReader) -> Result<XlsxSpreadsheet, PriceMatrixError> {
        let (mut zip, sheets, is_1904) = excel::open(name, reader, load_workbook)?;
        let styles = load_styles(&mut zip, is_1904)?;
        let shared_strings = load_shared_strings(&mut zip)?;
        debug!(
            "Opened '{}': {} sheets, {} fills, {} cell formats, {} shared strings",
            name,
            sheets.len(),
            styles.fills.len(),
            styles.formats.len(),
            shared_strings.len()
        );
        Ok(XlsxSpreadsheet {
            name: name.to_owned(),
            zip,
            styles,
            shared_strings,
            sheets,
        })
    }
}

impl Spreadsheet for XlsxSpreadsheet {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.to_owned()).collect()
    }

    /// Reads one worksheet: resolved cell values plus the fill of every cell element
    ///
    /// Cells without an explicit style use cell format 0, as spreadsheet applications do.
    fn read_sheet(&mut self, sheet_name: &str) -> Result<Worksheet, PriceMatrixError> {
        let zip_path = self.sheets.iter()
            .find(|(name, _)| name == sheet_name)
            .map(|(_, path)| path.to_owned())
            .ok_or_else(|| SpreadsheetError::SheetNotFound(self.name.to_owned(), sheet_name.to_owned()))?;

        let mut sheet = Worksheet::new(sheet_name);
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut cell = Cell {
            row: 0,
            col: 0,
            kind: CellType::default(),
            value: String::new(),
        };
        let mut reader = self.zip.xml_reader(&zip_path)?
            .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                if let Some(row) = event.parse_attribute_value::<usize>("r")? {
                    row_count = row.saturating_sub(1);
                }
                col_count = 0;
            }
            Event::End(event) if event.name() == TAG_ROW => {
                row_count += 1;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                let (row, col) = event.get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((row_count, col_count));
                col_count = col + 1;
                let style = event.parse_attribute_value::<usize>("s")?.unwrap_or(0);
                let kind = event.get_attribute_value("t")?.map(|t| {
                    match t.as_ref() {
                        "inlineStr" | "str" => CellType::InlineString,
                        "s" => CellType::SharedString,
                        "d" => CellType::IsoDateTime,
                        "b" => CellType::Boolean,
                        "e" => CellType::Error,
                        _ => CellType::Number,
                    }
                }).unwrap_or(CellType::Number);
                cell = Cell {
                    row,
                    col,
                    kind: if kind == CellType::Number { self.styles.number_format(style) } else { kind },
                    value: String::new(),
                };
                match self.styles.fill(style) {
                    Some(fill) => sheet.set_fill(row, col, fill.clone()),
                    None => sheet.update_bound(row, col),
                }
            }
            Event::Start(event) if event.name() == TAG_INLINE_STRING => {
                cell.value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if event.name() == TAG_VALUE => {
                cell.value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if event.name() == TAG_CELL => {
                if !cell.value.is_empty() {
                    let value = cell.resolve(&self.shared_strings);
                    sheet.push(cell.row, cell.col, value);
                    cell.value.clear();
                }
            },
        });
        debug!(
            "Read sheet '{}': {} x {} grid, max cell {}",
            sheet_name,
            sheet.grid().row_count(),
            sheet.grid().col_count(),
            crate::spreadsheet::reference::index_to_reference(
                sheet.max_row().saturating_sub(1),
                sheet.max_col().saturating_sub(1)
            )
        );
        Ok(sheet)
    }
}

/// Loads workbook structure and worksheet information from XLSX file
///
/// Parses the workbook.xml file to extract worksheet names and their corresponding
/// XML file paths, and determines the date system (1900 vs 1904) used in the file.
///
/// # Arguments
/// * `zip` - ZIP archive containing the XLSX file
///
/// # Returns
/// Tuple of (worksheets, is_1904_date_system) where worksheets are (name, zip_path) pairs
fn load_workbook(zip: &mut ZipArchive<UnifiedReader>) -> Result<(Vec<(String, String)>, bool), PriceMatrixError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::FileError("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&id.to_string()) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event.get_attribute_value("date1904")?
                .map(|value| value.eq("1") || value.eq("true"))
                .unwrap_or(false);
        }
    });
    Ok((sheets, is_1904))
}

/// Loads fills, number formats and cell formats from the XLSX styles.xml file
///
/// Only `<fill>` elements inside `<fills>` and `<xf>` elements inside `<cellXfs>` are
/// considered; differential formats and cell style formats carry their own lists.
/// Only literal `rgb` colors are kept. Theme and indexed colors have no RGB value.
///
/// # Arguments
/// * `zip` - ZIP archive containing the XLSX file
/// * `is_1904` - Whether the file uses the 1904 date system
fn load_styles(zip: &mut ZipArchive<UnifiedReader>, is_1904: bool) -> Result<StyleTable, PriceMatrixError> {
    let mut reader = match zip.xml_reader("xl/styles.xml")? {
        Some(reader) => reader,
        None => return Ok(StyleTable::default()),
    };

    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, CellType>::new();

    let mut fills_context = false;
    let mut fills = Vec::<FillStyle>::new();
    let mut fill = None::<FillStyle>;

    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<(Option<usize>, String)>::new();

    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = true,
        Event::End(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = false,
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                let kind = CellType::parse_custom_number_format(&format, is_1904);
                custom_formats.insert(id.to_string(), kind);
            }
        }

        Event::Start(event) if event.name() == TAG_FILLS => fills_context = true,
        Event::End(event) if event.name() == TAG_FILLS => fills_context = false,
        Event::Start(event) if fills_context && event.name() == TAG_FILL => fill = Some(FillStyle::default()),
        Event::End(event) if fills_context && event.name() == TAG_FILL => {
            fills.push(fill.take().unwrap_or_default());
        }
        Event::Start(event) if fills_context && event.name() == TAG_PATTERN_FILL => {
            if let Some(fill) = fill.as_mut() {
                fill.pattern = PatternKind::parse(event.get_attribute_value("patternType")?.as_deref());
            }
        }
        Event::Start(event) if fills_context && event.name() == TAG_FOREGROUND => {
            if let Some(fill) = fill.as_mut() {
                fill.foreground = event.get_attribute_value("rgb")?.map(|rgb| rgb.to_uppercase());
            }
        }
        Event::Start(event) if fills_context && event.name() == TAG_BACKGROUND => {
            if let Some(fill) = fill.as_mut() {
                fill.background = event.get_attribute_value("rgb")?.map(|rgb| rgb.to_uppercase());
            }
        }

        Event::Start(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = true,
        Event::End(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = false,
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            let fill_id = event.parse_attribute_value::<usize>("fillId")?;
            let format_id = event.get_attribute_value("numFmtId")?
                .map(|id| id.to_string())
                .unwrap_or_else(|| "0".to_owned());
            format_indexes.push((fill_id, format_id));
        }
    });

    let formats = format_indexes
        .into_iter()
        .map(|(fill_id, format_id)| {
            (fill_id, excel::resolve_number_format(&format_id, &custom_formats, is_1904))
        })
        .collect();
    Ok(StyleTable { fills, formats })
}

/// Loads the whole shared string table
fn load_shared_strings(zip: &mut ZipArchive<UnifiedReader>) -> Result<Vec<String>, PriceMatrixError> {
    let mut shared_strings = Vec::<String>::new();
    let mut reader = match zip.xml_reader("xl/sharedStrings.xml")? {
        Some(reader) => reader,
        None => return Ok(shared_strings),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
            shared_strings.push(string);
        }
    });
    Ok(shared_strings)
}

/// Reads string value from XML content, handling text and CDATA sections
///
/// Extracts string content from XML elements, skipping phonetic text annotations
/// and properly handling both text nodes and CDATA sections.
///
/// # Arguments
/// * `reader` - XML reader positioned at the start of the string content
/// * `end_tag` - XML tag that marks the end of the string content
/// * `is_text_content` - Whether to treat the content as text by default
fn read_string_value(
    reader: &mut XmlReader<BufReader<ZipFile<'_, UnifiedReader>>>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, PriceMatrixError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}
