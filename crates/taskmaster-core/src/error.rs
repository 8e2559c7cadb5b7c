// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for TaskMaster.

use thiserror::Error;

/// Top-level error type for all TaskMaster operations.
#[derive(Debug, Error)]
pub enum TaskMasterError {
    // -- Input selection --
    #[error("no input selected")]
    NoSelection,

    #[error("no {expected} files found in {folder}")]
    NoMatchingFiles { folder: String, expected: String },

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    // -- Document errors --
    #[error("could not decode {0} with any supported text encoding")]
    Decode(String),

    #[error("spreadsheet operation failed: {0}")]
    Spreadsheet(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("EXIF metadata error: {0}")]
    Exif(String),

    // -- Storage / configuration --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TaskMasterError>;
