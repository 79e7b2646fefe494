//! Spreadsheet (CSV) export.

pub mod sheet;

pub use sheet::{render_sheet, write_sheet, ExportError, SHEET_COLUMNS};
