// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spreadsheet module — CSV/XLSX loading with encoding fallback, merging into
// workbooks or a single worksheet, and format conversion.

pub mod encoding;
pub mod merger;
pub mod reader;
pub mod table;
pub mod writer;

pub use merger::{MergeSummary, SpreadsheetMerger};
pub use table::{Cell, SOURCE_COLUMN, Table};
