// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// taskmaster-document — Document operations behind the TaskMaster shell.
//
// Three façades write into the configured output layout: spreadsheets
// (merge CSV/XLSX, convert between them), images (EXIF, compression, resize,
// format conversion, captioned booklets), and PDFs (split, merge, blank-page
// removal, compression, images to PDF).

pub mod image;
pub mod pdf;
pub mod sheet;

// Re-export the façades so callers can use `taskmaster_document::PdfHandler` etc.
pub use image::{BatchReport, ImageHandler, ImageProcessor};
pub use pdf::{MergeReport, PdfHandler, PdfReader, PdfWriter};
pub use sheet::{MergeSummary, SpreadsheetMerger};
