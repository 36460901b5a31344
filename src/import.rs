/*!
 * Spreadsheet import.
 *
 * Reads a workbook (xlsx, xls, ods) and builds untimed rows from it. The first
 * row of every sheet is a header; a column belongs to a language when its
 * header contains the language token (FR, EN or AR, case-insensitive). Ids
 * run on across sheets in reading order.
 */

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::io::Cursor;

use crate::errors::ImportError;
use crate::language_utils::Language;
use crate::timeline::{Row, RowId};

// @const: Header patterns, checked in this order for every header cell
static HEADER_PATTERNS: Lazy<Vec<(Language, Regex)>> = Lazy::new(|| {
    [Language::French, Language::English, Language::Arabic]
        .into_iter()
        .map(|language| {
            let pattern = format!("(?i){}", language.header_token());
            (language, Regex::new(&pattern).expect("static header pattern"))
        })
        .collect()
});

/// One worksheet as plain cell text
#[derive(Debug, Clone, Default)]
pub struct SheetGrid {
    pub name: String,
    pub cells: Vec<Vec<String>>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>, cells: Vec<Vec<String>>) -> Self {
        Self { name: name.into(), cells }
    }
}

/// Map each language to the index of its header column.
///
/// A header cell is assigned to the first matching language (French, then
/// English, then Arabic); if several cells match a language the last one wins.
pub fn language_columns(header: &[String]) -> HashMap<Language, usize> {
    let mut columns = HashMap::new();
    for (index, cell) in header.iter().enumerate() {
        let text = cell.trim();
        if text.is_empty() {
            continue;
        }
        if let Some((language, _)) = HEADER_PATTERNS.iter().find(|(_, re)| re.is_match(text)) {
            columns.insert(*language, index);
        }
    }
    columns
}

/// Build rows from already-decoded sheets
pub fn rows_from_sheets(sheets: &[SheetGrid]) -> Result<Vec<Row>, ImportError> {
    if sheets.is_empty() {
        return Err(ImportError::NoSheets);
    }

    let mut rows = Vec::new();
    let mut matched_any = false;

    for sheet in sheets {
        let Some((header, body)) = sheet.cells.split_first() else {
            debug!("Sheet '{}' is empty", sheet.name);
            continue;
        };

        let columns = language_columns(header);
        if columns.is_empty() {
            warn!("Sheet '{}' has no EN/FR/AR header, skipping it", sheet.name);
            continue;
        }
        matched_any = true;

        let cell = |line: &[String], language: Language| -> String {
            columns
                .get(&language)
                .and_then(|&index| line.get(index))
                .map(|text| text.trim().to_string())
                .unwrap_or_default()
        };

        for line in body {
            let english = cell(line, Language::English);
            let french = cell(line, Language::French);
            let arabic = cell(line, Language::Arabic);
            if english.is_empty() && french.is_empty() && arabic.is_empty() {
                continue;
            }
            let id = RowId(rows.len() as u64 + 1);
            rows.push(Row::imported(id, english, french, arabic));
        }
    }

    if !matched_any {
        return Err(ImportError::NoLanguageColumns {
            sheet: sheets[0].name.clone(),
        });
    }

    info!("Imported {} rows from {} sheet(s)", rows.len(), sheets.len());
    Ok(rows)
}

/// Decode a workbook from raw bytes into plain-text sheets
pub fn read_workbook(bytes: &[u8]) -> Result<Vec<SheetGrid>, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ImportError::Workbook(e.to_string()))?;

    let sheets = workbook
        .worksheets()
        .into_iter()
        .map(|(name, range)| {
            let cells = range
                .rows()
                .map(|line| line.iter().map(cell_text).collect())
                .collect();
            SheetGrid::new(name, cells)
        })
        .collect();

    Ok(sheets)
}

/// Import rows from workbook bytes
pub fn rows_from_workbook(bytes: &[u8]) -> Result<Vec<Row>, ImportError> {
    let sheets = read_workbook(bytes)?;
    rows_from_sheets(&sheets)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
