// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, resize, flatten, strip metadata, and re-encode
// single in-memory images using the `image` crate.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use taskmaster_core::ImageTarget;
use taskmaster_core::error::TaskMasterError;
use tracing::{debug, info, instrument};

/// Largest edge an ICO container can hold.
const ICO_MAX_EDGE: u32 = 256;

/// Image processing pipeline operating on a single in-memory image.
///
/// Transformations consume `self` and return a new `ImageProcessor`, so calls
/// chain:
///
/// ```ignore
/// let bytes = ImageProcessor::open("photo.png")?
///     .resize(800, 600)
///     .flatten_alpha()
///     .to_jpeg_bytes(85)?;
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load and decode an image file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TaskMasterError> {
        let img = image::open(path.as_ref()).map_err(|err| {
            TaskMasterError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        debug!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Decode an image from encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, TaskMasterError> {
        let img = image::load_from_memory(data).map_err(|err| {
            TaskMasterError::ImageError(format!("failed to decode image: {}", err))
        })?;
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Fit within `max_width` x `max_height`, preserving aspect ratio
    /// (Lanczos3).
    #[instrument(skip(self))]
    pub fn resize(self, max_width: u32, max_height: u32) -> Self {
        let resized = self.image.resize(max_width, max_height, FilterType::Lanczos3);
        debug!(
            new_w = resized.width(),
            new_h = resized.height(),
            "Resize complete"
        );
        Self { image: resized }
    }

    /// Resize to exactly `width` x `height`. Callers keep the aspect ratio.
    pub fn resize_exact(self, width: u32, height: u32) -> Self {
        let resized = self
            .image
            .resize_exact(width.max(1), height.max(1), FilterType::Lanczos3);
        Self { image: resized }
    }

    /// Composite onto an opaque white background. Images without alpha pass
    /// through unchanged.
    pub fn flatten_alpha(self) -> Self {
        if !self.image.color().has_alpha() {
            return self;
        }
        let rgba = self.image.to_rgba8();
        let mut canvas = RgbaImage::from_pixel(rgba.width(), rgba.height(), Rgba([255, 255, 255, 255]));
        image::imageops::overlay(&mut canvas, &rgba, 0, 0);
        Self {
            image: DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8()),
        }
    }

    /// Copy the decoded pixel samples into a fresh buffer. Nothing but the
    /// samples survives, so re-encoding the result writes no metadata
    /// blocks.
    pub fn strip_metadata(self) -> Self {
        let fresh = if self.image.color().has_alpha() {
            DynamicImage::ImageRgba8(self.image.to_rgba8())
        } else {
            DynamicImage::ImageRgb8(self.image.to_rgb8())
        };
        Self { image: fresh }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode as JPEG with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, TaskMasterError> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder).map_err(|err| {
            TaskMasterError::ImageError(format!("JPEG encoding failed: {}", err))
        })?;
        Ok(buffer)
    }

    /// Encode as PNG with the strongest compression and adaptive filtering.
    pub fn to_png_bytes_best(&self) -> Result<Vec<u8>, TaskMasterError> {
        let mut buffer = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, PngFilter::Adaptive);
        let result = if self.image.color().has_alpha() {
            self.image.to_rgba8().write_with_encoder(encoder)
        } else {
            self.image.to_rgb8().write_with_encoder(encoder)
        };
        result.map_err(|err| TaskMasterError::ImageError(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Encode for `target`. Targets without alpha get a flattened copy; ICO
    /// output is scaled down to the container's size limit.
    pub fn encode(&self, target: ImageTarget, jpeg_quality: u8) -> Result<Vec<u8>, TaskMasterError> {
        match target {
            ImageTarget::Jpeg => return self.to_jpeg_bytes(jpeg_quality),
            ImageTarget::Ico
                if self.image.width() > ICO_MAX_EDGE || self.image.height() > ICO_MAX_EDGE =>
            {
                info!(
                    width = self.image.width(),
                    height = self.image.height(),
                    "Scaling down for ICO"
                );
                let scaled = self.image.resize(ICO_MAX_EDGE, ICO_MAX_EDGE, FilterType::Lanczos3);
                return encode_to_format(&DynamicImage::ImageRgba8(scaled.to_rgba8()), ImageFormat::Ico);
            }
            _ => {}
        }

        let prepared = if target.supports_alpha() {
            DynamicImage::ImageRgba8(self.image.to_rgba8())
        } else {
            let flat = Self::from_dynamic(self.image.clone()).flatten_alpha();
            DynamicImage::ImageRgb8(flat.image.to_rgb8())
        };
        encode_to_format(&prepared, image_format(target))
    }

    /// Encode for `target` and write to `path`.
    pub fn save_as(
        &self,
        path: impl AsRef<Path>,
        target: ImageTarget,
        jpeg_quality: u8,
    ) -> Result<(), TaskMasterError> {
        let bytes = self.encode(target, jpeg_quality)?;
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }
}

fn image_format(target: ImageTarget) -> ImageFormat {
    match target {
        ImageTarget::Jpeg => ImageFormat::Jpeg,
        ImageTarget::Png => ImageFormat::Png,
        ImageTarget::Bmp => ImageFormat::Bmp,
        ImageTarget::Gif => ImageFormat::Gif,
        ImageTarget::Tiff => ImageFormat::Tiff,
        ImageTarget::WebP => ImageFormat::WebP,
        ImageTarget::Ico => ImageFormat::Ico,
    }
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, TaskMasterError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image.write_to(&mut cursor, format).map_err(|err| {
        TaskMasterError::ImageError(format!("{:?} encoding failed: {}", format, err))
    })?;
    Ok(buffer)
}
