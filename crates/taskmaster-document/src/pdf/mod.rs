// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — reading, splitting, merging, filtering, compressing, and
// creating PDFs.

pub mod handler;
pub mod reader;
pub mod writer;

pub use handler::{BlankReport, CompressReport, MergeReport, PdfHandler};
pub use reader::{PdfAssembler, PdfReader};
pub use writer::PdfWriter;
