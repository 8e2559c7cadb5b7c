// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — EXIF handling, compression, resizing, format conversion, and
// captioned image booklets.

pub mod exif;
pub mod handler;
pub mod processor;

pub use handler::{BatchReport, ImageHandler};
pub use processor::ImageProcessor;
