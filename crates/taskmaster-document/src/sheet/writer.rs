// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Write `Table`s to XLSX worksheets (`rust_xlsxwriter`) and CSV files (`csv`),
// and allocate sheet names that spreadsheet applications accept.

use std::collections::HashSet;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use taskmaster_core::error::{Result, TaskMasterError};
use tracing::debug;

use super::table::{Cell, Table};

/// Longest sheet name a workbook accepts.
pub const MAX_SHEET_NAME: usize = 31;
/// Characters kept from an over-long name before the numeric suffix.
pub const TRUNCATED_SHEET_NAME: usize = 28;

const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;

/// How a table is laid out on its worksheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct SheetStyle {
    /// Size each column to its longest rendered value plus one character.
    pub autofit: bool,
}

/// Hands out unique, valid worksheet names within one workbook.
#[derive(Debug, Default)]
pub struct SheetNamer {
    used: HashSet<String>,
}

impl SheetNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name for the sheet built from `stem`, the `position`-th input (1-based).
    ///
    /// Names over 31 characters keep their first 28 followed by `_<position>`.
    /// A name already taken (compared case-insensitively) gets the same suffix
    /// treatment, counting up from `position` until it is free.
    pub fn assign(&mut self, stem: &str, position: usize) -> String {
        let clean = sanitize_sheet_name(stem);
        let length = clean.chars().count();

        if length <= MAX_SHEET_NAME && !self.is_used(&clean) {
            return self.claim(clean);
        }

        let mut counter = position.max(1);
        loop {
            let suffix = format!("_{counter}");
            let room = MAX_SHEET_NAME.saturating_sub(suffix.len());
            let keep = if length > MAX_SHEET_NAME {
                TRUNCATED_SHEET_NAME.min(room)
            } else {
                room
            };
            let base: String = clean.chars().take(keep).collect();
            let candidate = format!("{base}{suffix}");
            if !self.is_used(&candidate) {
                return self.claim(candidate);
            }
            counter += 1;
        }
    }

    fn is_used(&self, name: &str) -> bool {
        self.used.contains(&name.to_lowercase())
    }

    fn claim(&mut self, name: String) -> String {
        self.used.insert(name.to_lowercase());
        name
    }
}

/// Replace characters workbooks forbid in sheet names and fill in blanks.
fn sanitize_sheet_name(stem: &str) -> String {
    let replaced: String = stem
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    let trimmed = replaced.trim_matches('\'');
    if trimmed.trim().is_empty() {
        "Sheet".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Write `table` to a new worksheet called `name` in `workbook`.
pub fn add_table_sheet(
    workbook: &mut Workbook,
    name: &str,
    table: &Table,
    style: SheetStyle,
) -> Result<()> {
    if table.row_count() + 1 > MAX_ROWS || table.columns().len() > MAX_COLUMNS {
        return Err(TaskMasterError::Spreadsheet(format!(
            "sheet {name} would exceed the worksheet limits ({} rows, {} columns)",
            table.row_count() + 1,
            table.columns().len()
        )));
    }

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(name).map_err(xlsx_error)?;
    write_table(worksheet, table, style).map_err(xlsx_error)?;
    debug!(sheet = name, rows = table.row_count(), "sheet written");
    Ok(())
}

fn write_table(worksheet: &mut Worksheet, table: &Table, style: SheetStyle) -> std::result::Result<(), XlsxError> {
    let bold = Format::new().set_bold();
    let mut widths: Vec<usize> = table.columns().iter().map(|c| c.chars().count()).collect();

    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &bold)?;
    }

    for (index, row) in table.rows().iter().enumerate() {
        let row_num = index as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col_num = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(text) => {
                    worksheet.write_string(row_num, col_num, text)?;
                }
                Cell::Int(int) => {
                    worksheet.write_number(row_num, col_num, *int as f64)?;
                }
                Cell::Float(float) => {
                    worksheet.write_number(row_num, col_num, *float)?;
                }
                Cell::Bool(flag) => {
                    worksheet.write_boolean(row_num, col_num, *flag)?;
                }
            }
            if style.autofit {
                widths[col] = widths[col].max(cell.to_string().chars().count());
            }
        }
    }

    if style.autofit {
        for (col, width) in widths.into_iter().enumerate() {
            worksheet.set_column_width(col as u16, (width + 1) as f64)?;
        }
    }
    Ok(())
}

/// Save a workbook to `path`.
pub fn save_workbook(workbook: &mut Workbook, path: &Path) -> Result<()> {
    workbook.save(path).map_err(|err| {
        TaskMasterError::Spreadsheet(format!("failed to save {}: {err}", path.display()))
    })
}

/// Write `table` as CSV (header first) to `path`.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let csv_err = |err: csv::Error| {
        TaskMasterError::Spreadsheet(format!("failed to write {}: {err}", path.display()))
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(table.columns()).map_err(csv_err)?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.to_string()))
            .map_err(csv_err)?;
    }
    writer.flush()?;
    Ok(())
}

fn xlsx_error(err: XlsxError) -> TaskMasterError {
    TaskMasterError::Spreadsheet(err.to_string())
}
