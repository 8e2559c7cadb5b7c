// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output directory layout and the artifact naming convention.
//
// Every file an operation writes is named here, so the names stay identical
// across the façades.

use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::Result;

pub const MERGED_WORKBOOK: &str = "merged_workbook.xlsx";
pub const MERGED_WORKSHEET: &str = "merged_worksheet.xlsx";
pub const MERGED_PDF: &str = "merged.pdf";

/// Output root plus the per-family subfolders.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.output_dir)
    }

    /// `<root>/<name>`, creating the root if needed.
    pub fn file(&self, name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.root)?;
        Ok(self.root.join(name))
    }

    /// EXIF text dumps.
    pub fn exif_dir(&self) -> Result<PathBuf> {
        self.subdir("exif_data")
    }

    /// Format-converted images.
    pub fn converted_dir(&self) -> Result<PathBuf> {
        self.subdir("converted")
    }

    /// Single-page PDFs produced by a split.
    pub fn split_dir(&self) -> Result<PathBuf> {
        self.subdir("split")
    }

    /// Temporary rasters for captioned image booklets.
    pub fn staging_dir(&self) -> Result<PathBuf> {
        self.subdir("pdf_staging")
    }

    fn subdir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.root.join(name);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

/// File stem as UTF-8, lossy for non-UTF-8 names.
pub fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Lowercased extension without the dot, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// File name as UTF-8, lossy for non-UTF-8 names.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn compressed_name(stem: &str, ext: &str) -> String {
    format!("{stem}_compressed.{ext}")
}

pub fn no_exif_name(stem: &str, ext: &str) -> String {
    format!("{stem}_no_exif.{ext}")
}

pub fn resized_name(stem: &str, ext: &str) -> String {
    format!("{stem}_resized.{ext}")
}

pub fn no_blanks_name(stem: &str) -> String {
    format!("{stem}_no_blanks.pdf")
}

pub fn exif_text_name(stem: &str) -> String {
    format!("{stem}_exif_data.txt")
}

pub fn gps_text_name(stem: &str) -> String {
    format!("{stem}_gps_data.txt")
}

/// `page` is 1-based.
pub fn split_page_name(stem: &str, page: u32) -> String {
    format!("{stem}_page_{page}.pdf")
}

pub fn converted_name(stem: &str, new_ext: &str) -> String {
    format!("{stem}.{new_ext}")
}

pub fn images_pdf_name(folder_name: &str) -> String {
    format!("{folder_name}_images.pdf")
}

/// Booklet output name; `.pdf` is appended unless already present.
pub fn booklet_name(output_name: &str) -> String {
    let trimmed = output_name.trim();
    if trimmed.to_ascii_lowercase().ends_with(".pdf") {
        trimmed.to_string()
    } else {
        format!("{trimmed}.pdf")
    }
}
