use std::path::{Path, PathBuf};

use umya_spreadsheet::{Spreadsheet, Worksheet, reader, writer};

use crate::{
    error::RirmapError,
    lookup::sheet::{Grid, Workbook},
    net::record::{FIELDS, ResolvedRecord},
};

pub const DEFAULT_XLSX_EXPORT: &str = "out.xlsx";
pub const EXPORT_SHEET: &str = "Data";

const HIGHLIGHT_ARGB: &str = "FFDDEBF7";

fn spreadsheet_error(path: &Path, reason: impl ToString) -> RirmapError {
    RirmapError::Spreadsheet {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

impl Grid for Worksheet {
    fn value(&self, row: u32, col: u32) -> Option<String> {
        self.get_cell((col, row))
            .map(|cell| cell.get_value().to_string())
    }

    fn set_value(&mut self, row: u32, col: u32, value: &str) {
        self.get_cell_mut((col, row)).set_value_string(value);
    }

    fn wrap_text(&mut self, row: u32, col: u32) {
        self.get_style_mut((col, row))
            .get_alignment_mut()
            .set_wrap_text(true);
    }

    fn highlight(&mut self, row: u32, col: u32) {
        self.get_style_mut((col, row))
            .set_background_color(HIGHLIGHT_ARGB);
    }
}

/// An `.xlsx` file opened for in-place annotation
pub struct XlsxWorkbook {
    path: PathBuf,
    book: Spreadsheet,
}

impl XlsxWorkbook {
    pub fn open(path: &Path) -> Result<Self, RirmapError> {
        let book = reader::xlsx::read(path).map_err(|err| spreadsheet_error(path, err))?;
        Ok(Self {
            path: path.to_path_buf(),
            book,
        })
    }

    /// Write the workbook back to the file it was opened from
    pub fn save(&self) -> Result<(), RirmapError> {
        writer::xlsx::write(&self.book, &self.path)
            .map_err(|err| spreadsheet_error(&self.path, err))?;
        log::info!("Saved spreadsheet {}", self.path.display());
        Ok(())
    }
}

impl Workbook for XlsxWorkbook {
    type Sheet = Worksheet;

    fn sheet_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.book.get_sheet_by_name_mut(name)
    }
}

/// Export records to a new workbook with a single `Data` sheet
pub fn write_xlsx(path: &Path, records: &[ResolvedRecord]) -> Result<(), RirmapError> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    let sheet = book
        .new_sheet(EXPORT_SHEET)
        .map_err(|reason| spreadsheet_error(path, reason))?;

    for (col, field) in (1u32..).zip(FIELDS) {
        Grid::set_value(sheet, 1, col, field);
    }
    for (row, record) in (2u32..).zip(records) {
        for (col, value) in (1u32..).zip(record.values()) {
            Grid::set_value(sheet, row, col, value);
        }
    }

    writer::xlsx::write(&book, path).map_err(|err| spreadsheet_error(path, err))?;
    log::info!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}
