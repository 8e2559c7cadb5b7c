// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image façade — EXIF dump and removal, compression, resizing, format
// conversion, and captioned image booklets.

use std::path::{Path, PathBuf};

use taskmaster_core::config::AppConfig;
use taskmaster_core::error::{Result, TaskMasterError};
use taskmaster_core::inputs::collect_files;
use taskmaster_core::output::{self, OutputLayout, extension_of, file_name_of, stem_of};
use taskmaster_core::{ImageTarget, PaperSize};
use tracing::{debug, error, info, instrument, warn};

use super::exif::{self, ExifEntry};
use super::processor::ImageProcessor;
use crate::pdf::writer::{BookletPage, PdfWriter, fit_above_caption};

/// Outcome of [`ImageHandler::batch_convert_format`].
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub converted: Vec<PathBuf>,
    /// Files that failed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

/// Image operations over files on disk.
pub struct ImageHandler {
    layout: OutputLayout,
    jpeg_quality: u8,
    paper_size: PaperSize,
    caption_band_pt: f32,
    caption_font_pt: f32,
    staging_dpi: f32,
}

impl ImageHandler {
    pub fn new(layout: OutputLayout) -> Self {
        Self::from_config(layout, &AppConfig::default())
    }

    pub fn from_config(layout: OutputLayout, config: &AppConfig) -> Self {
        Self {
            layout,
            jpeg_quality: config.jpeg_quality,
            paper_size: config.paper_size,
            caption_band_pt: config.caption_band_pt,
            caption_font_pt: config.caption_font_size_pt,
            staging_dpi: config.staging_dpi,
        }
    }

    pub fn default_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Dump the EXIF block to `exif_data/<stem>_exif_data.txt`, plus the GPS
    /// fields to `<stem>_gps_data.txt` when present.
    ///
    /// Returns `false` when the image carries no EXIF block.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn extract_exif_data(&self, path: &Path) -> Result<bool> {
        let bytes = std::fs::read(path)?;
        // Undecodable files are errors even when they would carry EXIF.
        ImageProcessor::from_bytes(&bytes).map_err(|err| {
            TaskMasterError::ImageError(format!("{}: {}", file_name_of(path), err))
        })?;

        let Some(entries) = exif::read_exif(&bytes) else {
            info!("No EXIF data found");
            return Ok(false);
        };

        let stem = stem_of(path);
        let dir = self.layout.exif_dir()?;
        std::fs::write(dir.join(output::exif_text_name(&stem)), exif::render(&entries))?;

        let gps: Vec<&ExifEntry> = entries.iter().filter(|entry| entry.gps).collect();
        if !gps.is_empty() {
            std::fs::write(dir.join(output::gps_text_name(&stem)), exif::render(gps.iter().copied()))?;
            debug!(fields = gps.len(), "GPS data written");
        }

        info!(fields = entries.len(), "EXIF data extracted");
        Ok(true)
    }

    /// Re-encode from raw samples into `<stem>_no_exif.<ext>`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn remove_exif_data(&self, path: &Path) -> Result<PathBuf> {
        let target = target_of(path)?;
        let clean = ImageProcessor::open(path)?.strip_metadata();
        let ext = extension_of(path);
        let output = self.layout.file(&output::no_exif_name(&stem_of(path), &ext))?;
        clean.save_as(&output, target, self.jpeg_quality)?;
        info!(output = %output.display(), "EXIF data removed");
        Ok(output)
    }

    /// Re-save into `<stem>_compressed.<ext>`.
    ///
    /// JPEG uses `quality`; PNG uses the strongest deflate with adaptive
    /// filtering; other formats use their default encoder.
    #[instrument(skip_all, fields(path = %path.display(), quality))]
    pub fn compress_image(&self, path: &Path, quality: u8) -> Result<PathBuf> {
        let target = target_of(path)?;
        let processor = ImageProcessor::open(path)?;
        let bytes = match target {
            ImageTarget::Jpeg => processor.to_jpeg_bytes(quality)?,
            ImageTarget::Png => processor.to_png_bytes_best()?,
            other => processor.encode(other, quality)?,
        };

        let output = self
            .layout
            .file(&output::compressed_name(&stem_of(path), &extension_of(path)))?;
        std::fs::write(&output, &bytes)?;
        info!(output = %output.display(), bytes = bytes.len(), "Image compressed");
        Ok(output)
    }

    /// Fit within the box and save as `<stem>_resized.<ext>`.
    #[instrument(skip_all, fields(path = %path.display(), max_width, max_height))]
    pub fn resize_image(&self, path: &Path, max_width: u32, max_height: u32) -> Result<PathBuf> {
        if max_width == 0 || max_height == 0 {
            return Err(TaskMasterError::ImageError(format!(
                "resize box {max_width}x{max_height} has a zero edge"
            )));
        }
        let target = target_of(path)?;
        let resized = ImageProcessor::open(path)?.resize(max_width, max_height);

        let output = self
            .layout
            .file(&output::resized_name(&stem_of(path), &extension_of(path)))?;
        resized.save_as(&output, target, self.jpeg_quality)?;
        info!(
            output = %output.display(),
            width = resized.width(),
            height = resized.height(),
            "Image resized"
        );
        Ok(output)
    }

    /// Re-save as `converted/<stem>.<target ext>`.
    #[instrument(skip_all, fields(path = %path.display(), target = ?target))]
    pub fn convert_format(&self, path: &Path, target: ImageTarget) -> Result<PathBuf> {
        let processor = ImageProcessor::open(path)?;
        let output = self
            .layout
            .converted_dir()?
            .join(output::converted_name(&stem_of(path), target.extension()));
        processor.save_as(&output, target, self.jpeg_quality)?;
        info!(output = %output.display(), "Image converted to {}", target.label());
        Ok(output)
    }

    /// Convert every image in `folder`. Failures are logged and recorded; the
    /// batch continues.
    #[instrument(skip_all, fields(folder = %folder.display(), target = ?target))]
    pub fn batch_convert_format(&self, folder: &Path, target: ImageTarget) -> Result<BatchReport> {
        let files = collect_files(folder, "image", |kind| kind.is_image())?;
        let mut report = BatchReport::default();

        for path in files {
            match self.convert_format(&path, target) {
                Ok(output) => report.converted.push(output),
                Err(err) => {
                    error!(file = %file_name_of(&path), %err, "conversion failed");
                    report.failed.push((path, err.to_string()));
                }
            }
        }

        info!(
            converted = report.converted.len(),
            failed = report.failed.len(),
            "Batch conversion finished"
        );
        Ok(report)
    }

    /// Lay out every image of `folder` on its own page with the file stem as
    /// caption and write `<output_name>.pdf`.
    ///
    /// Each page's raster is scaled to its placed size at the staging
    /// resolution and written under `pdf_staging/`; those files are removed
    /// whether or not the booklet is written.
    #[instrument(skip_all, fields(folder = %folder.display(), output_name))]
    pub fn images_to_pdf_with_filenames(&self, folder: &Path, output_name: &str) -> Result<PathBuf> {
        let files = collect_files(folder, "image", |kind| kind.is_image())?;

        let mut writer = PdfWriter::new(self.paper_size);
        writer.set_caption(self.caption_band_pt, self.caption_font_pt);
        writer.set_title(output_name.trim());
        let (page_w, page_h) = writer.page_dimensions_pt();

        let mut staging = StagingArea::new(self.layout.staging_dir()?);
        let mut pages = Vec::with_capacity(files.len());

        for (index, path) in files.iter().enumerate() {
            let processor = ImageProcessor::open(path)?;
            let placement = fit_above_caption(
                processor.width() as f32,
                processor.height() as f32,
                page_w,
                page_h,
                self.caption_band_pt,
            );

            let px_w = (placement.width / 72.0 * self.staging_dpi).round() as u32;
            let px_h = (placement.height / 72.0 * self.staging_dpi).round() as u32;
            let raster = staging.path(&format!("{:04}_{}.png", index + 1, stem_of(path)));
            processor.resize_exact(px_w, px_h).save_as(&raster, ImageTarget::Png, self.jpeg_quality)?;

            pages.push(BookletPage {
                raster,
                dpi: self.staging_dpi,
                placement,
                caption: stem_of(path),
            });
        }

        let bytes = writer.create_booklet(&pages)?;
        let output = self.layout.file(&output::booklet_name(output_name))?;
        std::fs::write(&output, bytes)?;

        info!(output = %output.display(), pages = pages.len(), "Image booklet written");
        Ok(output)
    }
}

fn target_of(path: &Path) -> Result<ImageTarget> {
    ImageTarget::from_extension(&extension_of(path))
        .ok_or_else(|| TaskMasterError::UnsupportedFormat(file_name_of(path)))
}

/// Staged rasters for one booklet. Every registered file is removed on drop.
struct StagingArea {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl StagingArea {
    fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            files: Vec::new(),
        }
    }

    /// Register and return the path for a staged file.
    fn path(&mut self, name: &str) -> PathBuf {
        let path = self.dir.join(name);
        self.files.push(path.clone());
        path
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        for file in &self.files {
            if let Err(err) = std::fs::remove_file(file) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!(file = %file.display(), %err, "failed to remove staged raster");
                }
            }
        }
        // Only succeeds when nothing else is staged there.
        let _ = std::fs::remove_dir(&self.dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::exif::tests::jpeg_with_exif;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn setup() -> (tempfile::TempDir, tempfile::TempDir, ImageHandler) {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let handler = ImageHandler::new(OutputLayout::new(out.path()));
        (input, out, handler)
    }

    fn write_png(path: &Path, w: u32, h: u32) {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([30, 60, 90, 128])))
            .save(path)
            .unwrap();
    }

    #[test]
    fn extract_exif_writes_dump_and_gps_file() {
        let (input, out, handler) = setup();
        let path = input.path().join("photo.jpg");
        std::fs::write(&path, jpeg_with_exif()).unwrap();

        assert!(handler.extract_exif_data(&path).unwrap());
        let dump = std::fs::read_to_string(out.path().join("exif_data/photo_exif_data.txt")).unwrap();
        assert!(dump.contains("Orientation: "));
        let gps = std::fs::read_to_string(out.path().join("exif_data/photo_gps_data.txt")).unwrap();
        assert!(gps.contains("GPSLatitudeRef"));
        assert!(!gps.contains("Orientation"));
    }

    #[test]
    fn extract_exif_reports_missing_block() {
        let (input, out, handler) = setup();
        let path = input.path().join("plain.png");
        write_png(&path, 4, 4);
        assert!(!handler.extract_exif_data(&path).unwrap());
        assert!(!out.path().join("exif_data/plain_exif_data.txt").exists());
    }

    #[test]
    fn extract_exif_rejects_undecodable_file() {
        let (input, _out, handler) = setup();
        let path = input.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();
        assert!(handler.extract_exif_data(&path).is_err());
    }

    #[test]
    fn removed_exif_stays_removed() {
        let (input, _out, handler) = setup();
        let path = input.path().join("photo.jpg");
        std::fs::write(&path, jpeg_with_exif()).unwrap();

        let cleaned = handler.remove_exif_data(&path).unwrap();
        assert!(cleaned.ends_with("photo_no_exif.jpg"));
        assert!(!handler.extract_exif_data(&cleaned).unwrap());
        // Source untouched.
        assert!(handler.extract_exif_data(&path).unwrap());
    }

    #[test]
    fn compress_keeps_extension() {
        let (input, _out, handler) = setup();
        let path = input.path().join("art.png");
        write_png(&path, 16, 16);
        let output = handler.compress_image(&path, 50).unwrap();
        assert!(output.ends_with("art_compressed.png"));
        assert_eq!(image::open(&output).unwrap().width(), 16);
    }

    #[test]
    fn resize_fits_box() {
        let (input, _out, handler) = setup();
        let path = input.path().join("wide.png");
        write_png(&path, 200, 100);
        let output = handler.resize_image(&path, 50, 50).unwrap();
        assert!(output.ends_with("wide_resized.png"));
        let resized = image::open(&output).unwrap();
        assert_eq!((resized.width(), resized.height()), (50, 25));
    }

    #[test]
    fn convert_to_jpeg_flattens_alpha() {
        let (input, _out, handler) = setup();
        let path = input.path().join("logo.png");
        write_png(&path, 8, 8);
        let output = handler.convert_format(&path, ImageTarget::Jpeg).unwrap();
        assert!(output.ends_with("converted/logo.jpg"));
        assert!(!image::open(&output).unwrap().color().has_alpha());
    }

    #[test]
    fn batch_convert_continues_past_failures() {
        let (input, _out, handler) = setup();
        write_png(&input.path().join("a.png"), 4, 4);
        std::fs::write(input.path().join("b.png"), b"garbage").unwrap();
        write_png(&input.path().join("c.png"), 4, 4);

        let report = handler.batch_convert_format(input.path(), ImageTarget::Bmp).unwrap();
        assert_eq!(report.converted.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].0.ends_with("b.png"));
    }

    #[test]
    fn booklet_has_one_page_per_image_and_cleans_staging() {
        let (input, out, handler) = setup();
        write_png(&input.path().join("first.png"), 40, 20);
        write_png(&input.path().join("second.png"), 20, 40);

        let output = handler
            .images_to_pdf_with_filenames(input.path(), "album")
            .unwrap();
        assert!(output.ends_with("album.pdf"));

        let doc = lopdf::Document::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 2);

        let staging = out.path().join("pdf_staging");
        let leftover = std::fs::read_dir(&staging).map(|d| d.count()).unwrap_or(0);
        assert_eq!(leftover, 0);
    }

    #[test]
    fn booklet_cleans_staging_on_failure() {
        let (input, out, handler) = setup();
        write_png(&input.path().join("a.png"), 10, 10);
        std::fs::write(input.path().join("b.png"), b"garbage").unwrap();

        assert!(handler.images_to_pdf_with_filenames(input.path(), "album").is_err());
        let staging = out.path().join("pdf_staging");
        let leftover = std::fs::read_dir(&staging).map(|d| d.count()).unwrap_or(0);
        assert_eq!(leftover, 0);
        assert!(!out.path().join("album.pdf").exists());
    }

    #[test]
    fn booklet_needs_images() {
        let (input, _out, handler) = setup();
        std::fs::write(input.path().join("notes.txt"), b"hi").unwrap();
        let err = handler
            .images_to_pdf_with_filenames(input.path(), "album")
            .unwrap_err();
        assert!(matches!(err, TaskMasterError::NoMatchingFiles { .. }));
    }
}
