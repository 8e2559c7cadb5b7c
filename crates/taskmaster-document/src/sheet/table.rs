// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory table model shared by the spreadsheet reader, writer, and merger.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// Name of the column that records where each merged row came from.
pub const SOURCE_COLUMN: &str = "Source File";

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Cell {
    /// Infer a typed value from a raw CSV field.
    pub fn from_csv_field(field: &str) -> Self {
        if field.is_empty() {
            return Self::Empty;
        }
        let trimmed = field.trim();
        if let Ok(int) = trimmed.parse::<i64>() {
            return Self::Int(int);
        }
        // Rust accepts "inf"/"nan" spellings that spreadsheets would not.
        if trimmed.chars().any(|c| c.is_ascii_digit())
            && let Ok(float) = trimmed.parse::<f64>()
            && float.is_finite()
        {
            return Self::Float(float);
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        Self::Text(field.to_string())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(text) => f.write_str(text),
            Self::Int(int) => write!(f, "{int}"),
            Self::Float(float) => write!(f, "{float}"),
            Self::Bool(true) => f.write_str("TRUE"),
            Self::Bool(false) => f.write_str("FALSE"),
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Rows of cells under named columns. Every row has exactly one cell per
/// column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table from a raw header and raw rows.
    ///
    /// Blank header names become `Unnamed: <index>` and repeated names get
    /// `.1`, `.2`, … suffixes. Short rows are padded with [`Cell::Empty`].
    /// Rows longer than the header are the caller's responsibility to reject.
    pub fn from_parts(header: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let columns = normalize_header(header);
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, top to bottom.
    pub fn column_values(&self, name: &str) -> Option<Vec<&Cell>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Set `name` to `value` on every row, replacing the column if it exists
    /// or appending it as the last column otherwise.
    pub fn fill_column(&mut self, name: &str, value: Cell) {
        match self.column_index(name) {
            Some(index) => {
                for row in &mut self.rows {
                    row[index] = value.clone();
                }
            }
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(value.clone());
                }
            }
        }
    }

    /// Stack tables vertically.
    ///
    /// The result's columns are the union of the inputs' columns in first-seen
    /// order, except `trailing`, which is moved to the end when present. Cells
    /// a table does not have are left empty.
    pub fn stack(tables: Vec<Table>, trailing: Option<&str>) -> Table {
        let mut columns: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for table in &tables {
            for column in &table.columns {
                if Some(column.as_str()) != trailing && seen.insert(column.as_str()) {
                    columns.push(column.clone());
                }
            }
        }
        if let Some(name) = trailing
            && tables.iter().any(|t| t.column_index(name).is_some())
        {
            columns.push(name.to_string());
        }

        let positions: HashMap<&str, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        let total_rows = tables.iter().map(Table::row_count).sum();
        let mut rows = Vec::with_capacity(total_rows);
        for table in &tables {
            let mapping: Vec<usize> = table.columns.iter().map(|c| positions[c.as_str()]).collect();
            for row in &table.rows {
                let mut merged = vec![Cell::Empty; columns.len()];
                for (cell, &target) in row.iter().zip(&mapping) {
                    merged[target] = cell.clone();
                }
                rows.push(merged);
            }
        }

        Table { columns, rows }
    }
}

fn normalize_header(header: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut columns = Vec::with_capacity(header.len());
    for (index, raw) in header.into_iter().enumerate() {
        let base = if raw.trim().is_empty() {
            format!("Unnamed: {index}")
        } else {
            raw
        };
        let mut name = base.clone();
        let mut dup = 0;
        while used.contains(&name) {
            dup += 1;
            name = format!("{base}.{dup}");
        }
        used.insert(name.clone());
        columns.push(name);
    }
    columns
}
