// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types shared by the document façades and the shell.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// File families recognised by the operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    Csv,
    Xlsx,
    Pdf,
    Image(ImageTarget),
}

impl FileKind {
    /// Infer the file kind from a file extension (case-insensitive, no dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "pdf" => Some(Self::Pdf),
            other => ImageTarget::from_extension(other).map(Self::Image),
        }
    }

    /// Infer the file kind from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Whether the file is an input for the spreadsheet merger.
    pub fn is_spreadsheet(&self) -> bool {
        matches!(self, Self::Csv | Self::Xlsx)
    }

    /// Whether the file is an image the image processor can decode.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }
}

/// Image container formats the converter can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageTarget {
    Jpeg,
    Png,
    Bmp,
    Gif,
    Tiff,
    WebP,
    Ico,
}

impl ImageTarget {
    /// Every target, in menu order.
    pub const ALL: [ImageTarget; 7] = [
        Self::Jpeg,
        Self::Png,
        Self::Bmp,
        Self::Gif,
        Self::Tiff,
        Self::WebP,
        Self::Ico,
    ];

    /// Parse a file extension (case-insensitive, no dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "gif" => Some(Self::Gif),
            "tif" | "tiff" => Some(Self::Tiff),
            "webp" => Some(Self::WebP),
            "ico" => Some(Self::Ico),
            _ => None,
        }
    }

    /// Canonical extension written for this target.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Gif => "gif",
            Self::Tiff => "tiff",
            Self::WebP => "webp",
            Self::Ico => "ico",
        }
    }

    /// Whether the container can store an alpha channel. Images converted to
    /// a target without one are flattened onto an opaque background first.
    pub fn supports_alpha(&self) -> bool {
        !matches!(self, Self::Jpeg | Self::Bmp)
    }

    /// Display label used in menus.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Bmp => "BMP",
            Self::Gif => "GIF",
            Self::Tiff => "TIFF",
            Self::WebP => "WebP",
            Self::Ico => "ICO",
        }
    }
}

/// Standard paper sizes for generated PDFs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PaperSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

impl PaperSize {
    /// Page dimensions in PDF points (width, height), portrait.
    pub fn dimensions_pt(&self) -> (f32, f32) {
        match self {
            Self::A3 => (841.89, 1190.55),
            Self::A4 => (595.28, 841.89),
            Self::A5 => (419.53, 595.28),
            Self::Letter => (612.0, 792.0),
            Self::Legal => (612.0, 1008.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_insensitive() {
        assert_eq!(FileKind::from_extension("CSV"), Some(FileKind::Csv));
        assert_eq!(
            FileKind::from_extension("JpEg"),
            Some(FileKind::Image(ImageTarget::Jpeg))
        );
        assert_eq!(FileKind::from_extension("docx"), None);
    }

    #[test]
    fn jpeg_and_bmp_have_no_alpha() {
        assert!(!ImageTarget::Jpeg.supports_alpha());
        assert!(!ImageTarget::Bmp.supports_alpha());
        assert!(ImageTarget::Png.supports_alpha());
    }

    #[test]
    fn a4_matches_pdf_points() {
        assert_eq!(PaperSize::A4.dimensions_pt(), (595.28, 841.89));
    }
}
