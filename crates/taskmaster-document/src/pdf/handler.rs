// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF façade — split, merge, blank-page removal, compression, and images to
// PDF, writing results into the output layout.

use std::path::{Path, PathBuf};

use taskmaster_core::error::{Result, TaskMasterError};
use taskmaster_core::inputs::collect_files;
use taskmaster_core::output::{self, OutputLayout, file_name_of, stem_of};
use taskmaster_core::types::FileKind;
use tracing::{error, info, instrument};

use super::reader::{CompressionStats, PdfAssembler, PdfReader};
use super::writer::PdfWriter;

/// Outcome of [`PdfHandler::merge`].
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub output: PathBuf,
    pub merged: Vec<PathBuf>,
    /// Files that could not be opened, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
    pub pages: u32,
}

/// Outcome of [`PdfHandler::remove_blank`].
#[derive(Debug, Clone)]
pub struct BlankReport {
    pub output: PathBuf,
    pub kept: usize,
    pub removed: usize,
}

/// Outcome of [`PdfHandler::compress_pdf`].
#[derive(Debug, Clone)]
pub struct CompressReport {
    pub output: PathBuf,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    pub stats: CompressionStats,
}

/// PDF operations over files on disk.
pub struct PdfHandler {
    layout: OutputLayout,
}

impl PdfHandler {
    pub fn new(layout: OutputLayout) -> Self {
        Self { layout }
    }

    /// One file per page: `split/<stem>_page_<n>.pdf`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn split(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let reader = PdfReader::open(path)?;
        let stem = stem_of(path);
        let dir = self.layout.split_dir()?;

        let mut outputs = Vec::with_capacity(reader.page_count());
        for page in reader.page_numbers() {
            let bytes = reader.extract_page(page)?;
            let output = dir.join(output::split_page_name(&stem, page));
            std::fs::write(&output, bytes)?;
            outputs.push(output);
        }

        info!(files = outputs.len(), "PDF split into {} files", outputs.len());
        Ok(outputs)
    }

    /// Concatenate every PDF in `folder` (sorted) into `merged.pdf`.
    ///
    /// A file that fails to open is logged and skipped. The merge only fails
    /// when no file could be merged at all.
    #[instrument(skip_all, fields(folder = %folder.display()))]
    pub fn merge(&self, folder: &Path) -> Result<MergeReport> {
        let files = collect_files(folder, "PDF", |kind| kind == FileKind::Pdf)?;

        let mut assembler = PdfAssembler::new();
        let mut merged = Vec::new();
        let mut skipped = Vec::new();

        for path in files {
            let appended = PdfReader::open(&path).and_then(|reader| assembler.append_document(&reader));
            match appended {
                Ok(pages) => {
                    info!(file = %file_name_of(&path), pages, "appended PDF");
                    merged.push(path);
                }
                Err(err) => {
                    error!(file = %file_name_of(&path), %err, "skipping PDF that failed to open");
                    skipped.push((path, err.to_string()));
                }
            }
        }

        if merged.is_empty() {
            return Err(TaskMasterError::PdfError(format!(
                "none of the {} PDF files in {} could be opened",
                skipped.len(),
                folder.display()
            )));
        }

        let pages = assembler.page_count();
        let output = self.layout.file(output::MERGED_PDF)?;
        std::fs::write(&output, assembler.into_bytes()?)?;
        info!(output = %output.display(), pages, "PDFs merged successfully");

        Ok(MergeReport {
            output,
            merged,
            skipped,
            pages,
        })
    }

    /// Drop blank pages into `<stem>_no_blanks.pdf`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn remove_blank(&self, path: &Path) -> Result<BlankReport> {
        let reader = PdfReader::open(path)?;
        let pages = reader.page_numbers();
        let keep: Vec<u32> = pages
            .iter()
            .copied()
            .filter(|&page| !reader.is_blank_page(page))
            .collect();

        if keep.is_empty() {
            return Err(TaskMasterError::PdfError(format!(
                "every page of {} is blank",
                file_name_of(path)
            )));
        }

        let bytes = reader.retain_pages(&keep)?;
        let output = self.layout.file(&output::no_blanks_name(&stem_of(path)))?;
        std::fs::write(&output, bytes)?;

        let report = BlankReport {
            output,
            kept: keep.len(),
            removed: pages.len() - keep.len(),
        };
        info!(kept = report.kept, removed = report.removed, "Blank pages removed successfully");
        Ok(report)
    }

    /// Recompress into `<stem>_compressed.pdf`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn compress_pdf(&self, path: &Path) -> Result<CompressReport> {
        let original_bytes = std::fs::metadata(path)?.len();
        let reader = PdfReader::open(path)?;
        let (bytes, stats) = reader.compressed()?;

        let output = self
            .layout
            .file(&output::compressed_name(&stem_of(path), "pdf"))?;
        std::fs::write(&output, &bytes)?;

        info!(original_bytes, compressed_bytes = bytes.len(), "PDF compressed");
        Ok(CompressReport {
            output,
            original_bytes,
            compressed_bytes: bytes.len() as u64,
            stats,
        })
    }

    /// Every image of `folder` (sorted) as one page of
    /// `<folder>_images.pdf`, page size equal to image size.
    #[instrument(skip_all, fields(folder = %folder.display()))]
    pub fn images_to_pdf(&self, folder: &Path) -> Result<PathBuf> {
        let files = collect_files(folder, "image", |kind| kind.is_image())?;

        let mut images = Vec::with_capacity(files.len());
        for path in &files {
            let image = image::open(path).map_err(|err| {
                TaskMasterError::ImageError(format!("failed to open {}: {}", path.display(), err))
            })?;
            images.push(image);
        }

        let mut writer = PdfWriter::a4();
        writer.set_title(file_name_of(folder));
        let output = self
            .layout
            .file(&output::images_pdf_name(&file_name_of(folder)))?;
        writer.write_images_to_file(&images, &output)?;

        info!(output = %output.display(), images = images.len(), "images converted to PDF");
        Ok(output)
    }

    /// Page count of a PDF on disk.
    pub fn page_count(&self, path: &Path) -> Result<usize> {
        Ok(PdfReader::open(path)?.page_count())
    }

    /// Extracted text of every page of a PDF on disk.
    pub fn extract_text(&self, path: &Path) -> Result<String> {
        PdfReader::open(path)?.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::reader::tests::sample_pdf;

    fn setup() -> (tempfile::TempDir, tempfile::TempDir, PdfHandler) {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let handler = PdfHandler::new(OutputLayout::new(out.path()));
        (input, out, handler)
    }

    #[test]
    fn split_writes_one_file_per_page() {
        let (input, _out, handler) = setup();
        let path = input.path().join("report.pdf");
        std::fs::write(&path, sample_pdf(&[Some("one"), Some("two"), Some("three")])).unwrap();

        let outputs = handler.split(&path).unwrap();
        assert_eq!(outputs.len(), 3);
        assert!(outputs[2].ends_with("split/report_page_3.pdf"));
        for (index, output) in outputs.iter().enumerate() {
            let page = PdfReader::open(output).unwrap();
            assert_eq!(page.page_count(), 1);
            let expected = ["one", "two", "three"][index];
            assert!(page.page_text(1).unwrap().contains(expected));
        }
    }

    #[test]
    fn merge_skips_broken_files() {
        let (input, _out, handler) = setup();
        std::fs::write(input.path().join("a.pdf"), sample_pdf(&[Some("a1"), Some("a2")])).unwrap();
        std::fs::write(input.path().join("b.pdf"), b"not a pdf").unwrap();
        std::fs::write(input.path().join("c.pdf"), sample_pdf(&[Some("c1")])).unwrap();

        let report = handler.merge(input.path()).unwrap();
        assert_eq!(report.pages, 3);
        assert_eq!(report.merged.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].0.ends_with("b.pdf"));

        let merged = PdfReader::open(&report.output).unwrap();
        assert_eq!(merged.page_count(), 3);
        assert!(merged.page_text(3).unwrap().contains("c1"));
    }

    #[test]
    fn merge_fails_when_nothing_opens() {
        let (input, _out, handler) = setup();
        std::fs::write(input.path().join("broken.pdf"), b"%PDF-garbage").unwrap();
        assert!(handler.merge(input.path()).is_err());
    }

    #[test]
    fn remove_blank_keeps_text_pages_in_order() {
        let (input, _out, handler) = setup();
        let path = input.path().join("scan.pdf");
        std::fs::write(
            &path,
            sample_pdf(&[Some("first"), None, Some("  "), Some("last")]),
        )
        .unwrap();

        let report = handler.remove_blank(&path).unwrap();
        assert_eq!(report.kept, 2);
        assert_eq!(report.removed, 2);
        assert!(report.output.ends_with("scan_no_blanks.pdf"));

        let cleaned = PdfReader::open(&report.output).unwrap();
        assert_eq!(cleaned.page_count(), 2);
        assert!(cleaned.page_text(1).unwrap().contains("first"));
        assert!(cleaned.page_text(2).unwrap().contains("last"));
    }

    #[test]
    fn remove_blank_refuses_all_blank() {
        let (input, _out, handler) = setup();
        let path = input.path().join("empty.pdf");
        std::fs::write(&path, sample_pdf(&[None, None])).unwrap();
        assert!(handler.remove_blank(&path).is_err());
    }

    #[test]
    fn compress_writes_suffixed_file() {
        let (input, _out, handler) = setup();
        let path = input.path().join("big.pdf");
        std::fs::write(&path, sample_pdf(&[Some("x"), Some("x")])).unwrap();

        let report = handler.compress_pdf(&path).unwrap();
        assert!(report.output.ends_with("big_compressed.pdf"));
        assert_eq!(handler.page_count(&report.output).unwrap(), 2);
    }

    #[test]
    fn images_to_pdf_one_page_per_image() {
        let (input, _out, handler) = setup();
        let folder = input.path().join("photos");
        std::fs::create_dir(&folder).unwrap();
        for name in ["b.png", "a.png"] {
            image::RgbImage::from_pixel(8, 8, image::Rgb([10, 20, 30]))
                .save(folder.join(name))
                .unwrap();
        }

        let output = handler.images_to_pdf(&folder).unwrap();
        assert!(output.ends_with("photos_images.pdf"));
        assert_eq!(handler.page_count(&output).unwrap(), 2);
    }
}
