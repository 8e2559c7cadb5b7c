// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Load CSV and XLSX files into `Table`s. CSV goes through the encoding
// fallback, XLSX through `calamine`.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use taskmaster_core::error::{Result, TaskMasterError};
use taskmaster_core::output::file_name_of;
use taskmaster_core::types::FileKind;
use tracing::{debug, info, instrument};

use super::encoding::decode_csv_bytes;
use super::table::{Cell, Table};

/// Load a spreadsheet, dispatching on the file extension.
pub fn read_table(path: &Path) -> Result<Table> {
    match FileKind::from_path(path) {
        Some(FileKind::Csv) => read_csv(path),
        Some(FileKind::Xlsx) => read_xlsx(path),
        _ => Err(TaskMasterError::UnsupportedFormat(format!(
            "{} is not a CSV or XLSX file",
            path.display()
        ))),
    }
}

/// Load a CSV file, trying the encoding fallback list first.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_csv(path: &Path) -> Result<Table> {
    let bytes = std::fs::read(path)?;
    let name = file_name_of(path);
    let (text, encoding) = decode_csv_bytes(&bytes, &name)?;
    let table = parse_csv_text(&text, &name)?;
    info!(
        encoding,
        rows = table.row_count(),
        columns = table.columns().len(),
        "CSV loaded"
    );
    Ok(table)
}

/// Parse decoded CSV text. The first record is the header.
pub fn parse_csv_text(text: &str, source: &str) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let header: Vec<String> = match records.next() {
        Some(record) => record
            .map_err(|err| csv_error(source, err))?
            .iter()
            .map(str::to_string)
            .collect(),
        None => {
            return Err(TaskMasterError::Spreadsheet(format!(
                "{source}: no columns to parse"
            )));
        }
    };

    let mut rows = Vec::new();
    for (index, record) in records.enumerate() {
        let record = record.map_err(|err| csv_error(source, err))?;
        if record.len() > header.len() {
            return Err(TaskMasterError::Spreadsheet(format!(
                "{source}: line {} has {} fields, expected {}",
                index + 2,
                record.len(),
                header.len()
            )));
        }
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        rows.push(record.iter().map(Cell::from_csv_field).collect());
    }

    Ok(Table::from_parts(header, rows))
}

/// Load the first worksheet of an XLSX workbook.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_xlsx(path: &Path) -> Result<Table> {
    let name = file_name_of(path);
    let mut workbook = open_workbook_auto(path).map_err(|err| {
        TaskMasterError::Spreadsheet(format!("failed to open {name}: {err}"))
    })?;

    let first_sheet = workbook.sheet_names().first().cloned().ok_or_else(|| {
        TaskMasterError::Spreadsheet(format!("{name} contains no worksheets"))
    })?;
    let range = workbook.worksheet_range(&first_sheet).map_err(|err| {
        TaskMasterError::Spreadsheet(format!("failed to read sheet {first_sheet} of {name}: {err}"))
    })?;

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(cells) => cells.iter().map(|cell| convert_cell(cell).to_string()).collect(),
        None => {
            return Err(TaskMasterError::Spreadsheet(format!(
                "{name}: no columns to parse"
            )));
        }
    };
    let body: Vec<Vec<Cell>> = rows
        .map(|cells| cells.iter().map(convert_cell).collect())
        .collect();

    debug!(sheet = %first_sheet, rows = body.len(), "XLSX loaded");
    Ok(Table::from_parts(header, body))
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(text) if text.is_empty() => Cell::Empty,
        Data::String(text) => Cell::Text(text.clone()),
        Data::Int(int) => Cell::Int(*int),
        Data::Float(float) => Cell::Float(*float),
        Data::Bool(flag) => Cell::Bool(*flag),
        Data::DateTime(datetime) => match datetime.as_datetime() {
            Some(naive) => Cell::Text(naive.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Cell::Float(datetime.as_f64()),
        },
        Data::DateTimeIso(text) | Data::DurationIso(text) => Cell::Text(text.clone()),
        Data::Error(err) => Cell::Text(err.to_string()),
    }
}

fn csv_error(source: &str, err: csv::Error) -> TaskMasterError {
    TaskMasterError::Spreadsheet(format!("{source}: {err}"))
}
