// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — create new PDF documents from raster images using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, RawImage,
    RawImageData, RawImageFormat, TextItem, XObjectTransform,
};
use taskmaster_core::PaperSize;
use taskmaster_core::error::TaskMasterError;
use tracing::{debug, info, instrument};

/// Where a scaled image lands on a page, in PDF points from the bottom-left
/// corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

/// Fit an image of `image_w` × `image_h` (any unit) onto a page of
/// `page_w` × `page_h` points above a caption band of `caption_band` points.
///
/// The image is scaled up or down to the largest size that fits while
/// preserving its aspect ratio, then centred in the area above the band.
pub fn fit_above_caption(
    image_w: f32,
    image_h: f32,
    page_w: f32,
    page_h: f32,
    caption_band: f32,
) -> Placement {
    let avail_w = page_w.max(0.0);
    let avail_h = (page_h - caption_band).max(0.0);

    if image_w <= 0.0 || image_h <= 0.0 {
        return Placement {
            x: page_w / 2.0,
            y: caption_band + avail_h / 2.0,
            width: 0.0,
            height: 0.0,
            scale: 0.0,
        };
    }

    let scale = (avail_w / image_w).min(avail_h / image_h);
    let width = image_w * scale;
    let height = image_h * scale;

    Placement {
        x: (avail_w - width) / 2.0,
        y: caption_band + (avail_h - height) / 2.0,
        width,
        height,
        scale,
    }
}

/// Approximate rendered width of `text` in Helvetica at `font_size` points.
///
/// Average Helvetica glyph width is roughly 0.5 × the font size.
pub fn estimate_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.5
}

/// One page of a captioned booklet: a staged raster plus its caption.
#[derive(Debug, Clone)]
pub struct BookletPage {
    /// Pre-scaled raster written by the caller.
    pub raster: PathBuf,
    /// Resolution the raster was rendered at.
    pub dpi: f32,
    pub placement: Placement,
    pub caption: String,
}

/// Creates new PDF documents from raster images.
pub struct PdfWriter {
    /// Paper size for booklet pages.
    paper_size: PaperSize,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
    /// Caption band height and font size, in points.
    caption_band_pt: f32,
    caption_font_pt: f32,
}

impl PdfWriter {
    /// Create a new writer targeting the given paper size.
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            title: None,
            caption_band_pt: 40.0,
            caption_font_pt: 12.0,
        }
    }

    /// Create a new writer defaulting to A4.
    pub fn a4() -> Self {
        Self::new(PaperSize::A4)
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Set the caption band height and caption font size, in points.
    pub fn set_caption(&mut self, band_pt: f32, font_pt: f32) {
        self.caption_band_pt = band_pt;
        self.caption_font_pt = font_pt;
    }

    /// Page dimensions in points.
    pub fn page_dimensions_pt(&self) -> (f32, f32) {
        self.paper_size.dimensions_pt()
    }

    // -- Images to PDF --------------------------------------------------------

    /// Create a PDF with one page per image, each page exactly the size of its
    /// image (one pixel per point), no margins and no captions.
    #[instrument(skip_all, fields(images = images.len()))]
    pub fn create_from_images(&self, images: &[DynamicImage]) -> Result<Vec<u8>, TaskMasterError> {
        if images.is_empty() {
            return Err(TaskMasterError::PdfError("no images to place".to_string()));
        }

        let title = self.title.as_deref().unwrap_or("TaskMaster Images");
        info!(title, "Creating image PDF");

        let mut doc = PdfDocument::new(title);
        let mut pages = Vec::with_capacity(images.len());

        for image in images {
            let raw = to_raw_image(image);
            let (w, h) = (image.width() as f32, image.height() as f32);
            let xobject_id = doc.add_image(&raw);

            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(0.0)),
                    translate_y: Some(Pt(0.0)),
                    scale_x: Some(1.0),
                    scale_y: Some(1.0),
                    dpi: Some(72.0),
                    rotate: None,
                },
            }];
            pages.push(PdfPage::new(pt_to_mm(w), pt_to_mm(h), ops));
        }

        doc.with_pages(pages);
        debug!(pages = doc.pages.len(), "Image pages laid out");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
    }

    /// Create a captioned booklet: each staged raster centred at its
    /// placement with its caption centred in the band below.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub fn create_booklet(&self, pages: &[BookletPage]) -> Result<Vec<u8>, TaskMasterError> {
        if pages.is_empty() {
            return Err(TaskMasterError::PdfError("no pages to assemble".to_string()));
        }

        let (page_w, page_h) = self.page_dimensions_pt();
        let title = self.title.as_deref().unwrap_or("TaskMaster Booklet");
        info!(paper = ?self.paper_size, title, "Creating captioned booklet");

        let mut doc = PdfDocument::new(title);
        let mut pdf_pages = Vec::with_capacity(pages.len());

        for page in pages {
            let raster = load_raster(&page.raster)?;
            let raw = to_raw_image(&raster);
            let xobject_id = doc.add_image(&raw);

            // Native size of the raster at its staging resolution.
            let native_w = raster.width() as f32 / page.dpi * 72.0;
            let native_h = raster.height() as f32 / page.dpi * 72.0;
            let scale_x = if native_w > 0.0 { page.placement.width / native_w } else { 1.0 };
            let scale_y = if native_h > 0.0 { page.placement.height / native_h } else { 1.0 };

            let mut ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(page.placement.x)),
                    translate_y: Some(Pt(page.placement.y)),
                    scale_x: Some(scale_x),
                    scale_y: Some(scale_y),
                    dpi: Some(page.dpi),
                    rotate: None,
                },
            }];
            ops.extend(self.caption_ops(&page.caption, page_w));

            pdf_pages.push(PdfPage::new(pt_to_mm(page_w), pt_to_mm(page_h), ops));
        }

        doc.with_pages(pdf_pages);
        debug!(pages = doc.pages.len(), "Booklet laid out");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
    }

    fn caption_ops(&self, caption: &str, page_w: f32) -> Vec<Op> {
        if caption.is_empty() {
            return Vec::new();
        }
        let font_size = self.caption_font_pt;
        let text_w = estimate_text_width(caption, font_size);
        let x = ((page_w - text_w) / 2.0).max(0.0);
        let y = (self.caption_band_pt / 2.0 - font_size * 0.35).max(0.0);

        vec![
            Op::StartTextSection,
            Op::SetTextCursor {
                pos: Point { x: Pt(x), y: Pt(y) },
            },
            Op::SetFontSizeBuiltinFont {
                size: Pt(font_size),
                font: BuiltinFont::Helvetica,
            },
            Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(caption.to_string())],
                font: BuiltinFont::Helvetica,
            },
            Op::EndTextSection,
        ]
    }

    // -- File output convenience ----------------------------------------------

    /// Create an image PDF and write it directly to a file.
    pub fn write_images_to_file(
        &self,
        images: &[DynamicImage],
        path: impl AsRef<Path>,
    ) -> Result<(), TaskMasterError> {
        let bytes = self.create_from_images(images)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote image PDF to {}", path.as_ref().display());
        Ok(())
    }
}

fn pt_to_mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

fn load_raster(path: &Path) -> Result<DynamicImage, TaskMasterError> {
    image::open(path).map_err(|err| {
        TaskMasterError::ImageError(format!("failed to read staged page {}: {}", path.display(), err))
    })
}

/// Convert to RGB8 for printpdf.
fn to_raw_image(image: &DynamicImage) -> RawImage {
    let rgb = image.to_rgb8();
    RawImage {
        width: rgb.width() as usize,
        height: rgb.height() as usize,
        pixels: RawImageData::U8(rgb.into_raw()),
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    const A4: (f32, f32) = (595.28, 841.89);

    fn assert_fits(p: Placement, image_w: f32, image_h: f32) {
        let eps = 0.01;
        assert!(p.x >= -eps && p.x + p.width <= A4.0 + eps);
        assert!(p.y >= 40.0 - eps && p.y + p.height <= A4.1 + eps);
        // Horizontally centred.
        assert!((p.x - (A4.0 - p.x - p.width)).abs() < eps);
        // Aspect ratio preserved.
        assert!((p.width / p.height - image_w / image_h).abs() < 1e-3);
    }

    #[test]
    fn wide_image_is_width_bound() {
        let p = fit_above_caption(4000.0, 1000.0, A4.0, A4.1, 40.0);
        assert!((p.width - A4.0).abs() < 0.01);
        assert_fits(p, 4000.0, 1000.0);
    }

    #[test]
    fn tall_image_is_height_bound() {
        let p = fit_above_caption(1000.0, 5000.0, A4.0, A4.1, 40.0);
        assert!((p.height - (A4.1 - 40.0)).abs() < 0.01);
        assert_fits(p, 1000.0, 5000.0);
    }

    #[test]
    fn small_image_is_scaled_up() {
        let p = fit_above_caption(10.0, 10.0, A4.0, A4.1, 40.0);
        assert!(p.scale > 1.0);
        assert_fits(p, 10.0, 10.0);
    }

    #[test]
    fn degenerate_image_does_not_panic() {
        let p = fit_above_caption(0.0, 10.0, A4.0, A4.1, 40.0);
        assert_eq!(p.width, 0.0);
    }

    #[test]
    fn images_become_pages() {
        let images = vec![
            DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 10, Rgb([255, 0, 0]))),
            DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 30, Rgb([0, 0, 255]))),
        ];
        let bytes = PdfWriter::a4().create_from_images(&images).unwrap();
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }
}
