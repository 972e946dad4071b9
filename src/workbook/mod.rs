//! In-memory workbook model.
//!
//! A `Workbook` owns an ordered list of named `Sheet`s, each holding rows of
//! typed `Cell`s. The model is independent of the file format; see
//! [`xlsx`] for serialization.

pub mod xlsx;

use crate::error::{DumpError, Result};
use std::fmt;
use std::path::Path;

pub use xlsx::XlsxWriter;

/// Maximum length of a sheet name accepted by spreadsheet applications.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Maximum number of rows in a worksheet, header included.
pub const MAX_ROWS: usize = 1_048_576;

/// Maximum number of columns in a worksheet.
pub const MAX_COLUMNS: usize = 16_384;

/// Characters that may not appear in a sheet name.
const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Numeric (floating point) value.
    Numeric(f64),

    /// Text value, stored verbatim.
    Text(String),
}

impl Cell {
    /// Returns the numeric value, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Numeric(v) => Some(*v),
            Cell::Text(_) => None,
        }
    }

    /// Returns the text value, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Numeric(_) => None,
            Cell::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Numeric(v) => write!(f, "{v}"),
            Cell::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Numeric(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

/// A row of cells, one per result column.
pub type Row = Vec<Cell>;

/// A named worksheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    name: String,
    rows: Vec<Row>,
}

impl Sheet {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Returns the sheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns all rows in insertion order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the number of rows, including any header row.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Appends a row.
    ///
    /// Fails with `SheetCreation` once the sheet would exceed the worksheet
    /// row or column limit.
    pub fn push_row(&mut self, row: Row) -> Result<()> {
        if row.len() > MAX_COLUMNS {
            return Err(DumpError::sheet_creation(format!(
                "sheet '{}' has {} columns, more than the {MAX_COLUMNS} a worksheet can hold",
                self.name,
                row.len()
            )));
        }
        if self.rows.len() >= MAX_ROWS {
            return Err(DumpError::sheet_creation(format!(
                "sheet '{}' has more than the {MAX_ROWS} rows a worksheet can hold",
                self.name
            )));
        }

        self.rows.push(row);
        Ok(())
    }

    /// Appends a row of text cells (used for headers).
    pub fn push_text_row<I, S>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_row(values.into_iter().map(|v| Cell::Text(v.into())).collect())
    }
}

/// The output document: an ordered collection of uniquely named sheets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Creates an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sheets in creation order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Returns the number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Returns true if the workbook has no sheets.
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Looks up a sheet by exact name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Adds a new empty sheet and returns a mutable handle to it.
    ///
    /// The name must be valid and must not collide (case-insensitively) with
    /// an existing sheet; the first sheet with a given name wins.
    pub fn add_sheet(&mut self, name: &str) -> Result<&mut Sheet> {
        validate_sheet_name(name)?;

        if self
            .sheets
            .iter()
            .any(|s| s.name.to_lowercase() == name.to_lowercase())
        {
            return Err(DumpError::sheet_creation(format!(
                "a sheet named '{name}' already exists"
            )));
        }

        self.sheets.push(Sheet::new(name));
        let index = self.sheets.len() - 1;
        Ok(&mut self.sheets[index])
    }

    /// Removes a sheet by name, returning it if present.
    pub fn remove_sheet(&mut self, name: &str) -> Option<Sheet> {
        let index = self.sheets.iter().position(|s| s.name == name)?;
        Some(self.sheets.remove(index))
    }

    /// Serializes the workbook as XLSX and writes it to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = XlsxWriter::new(self).generate()?;
        std::fs::write(path, bytes).map_err(|e| {
            DumpError::serialization(format!("Failed to write {}: {e}", path.display()))
        })
    }
}

/// Checks a sheet name against the spreadsheet naming rules.
pub fn validate_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DumpError::sheet_creation("sheet name must not be empty"));
    }

    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(DumpError::sheet_creation(format!(
            "sheet name '{name}' is longer than {MAX_SHEET_NAME_LEN} characters"
        )));
    }

    if let Some(c) = name.chars().find(|c| FORBIDDEN_SHEET_CHARS.contains(c)) {
        return Err(DumpError::sheet_creation(format!(
            "sheet name '{name}' contains invalid character '{c}'"
        )));
    }

    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(DumpError::sheet_creation(format!(
            "sheet name '{name}' must not start or end with an apostrophe"
        )));
    }

    Ok(())
}
