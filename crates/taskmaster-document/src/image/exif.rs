// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// EXIF reading with `kamadak-exif`.

use std::io::Cursor;

use exif::{Context, Reader};
use tracing::{debug, warn};

/// One EXIF field rendered for the text dump.
#[derive(Debug, Clone, PartialEq)]
pub struct ExifEntry {
    pub tag: String,
    pub value: String,
    /// Field lives in the GPS IFD.
    pub gps: bool,
}

impl ExifEntry {
    pub fn line(&self) -> String {
        format!("{}: {}", self.tag, self.value)
    }
}

/// Read every EXIF field of an encoded image.
///
/// `None` when the container carries no EXIF block or the block cannot be
/// parsed.
pub fn read_exif(bytes: &[u8]) -> Option<Vec<ExifEntry>> {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => {
            debug!("no EXIF block");
            return None;
        }
        Err(err) => {
            warn!(%err, "unreadable EXIF block");
            return None;
        }
    };

    let entries: Vec<ExifEntry> = exif
        .fields()
        .map(|field| ExifEntry {
            tag: field.tag.to_string(),
            value: field.display_value().with_unit(&exif).to_string(),
            gps: field.tag.context() == Context::Gps,
        })
        .collect();

    if entries.is_empty() { None } else { Some(entries) }
}

/// Render entries as `<tag>: <value>` lines.
pub fn render<'a>(entries: impl IntoIterator<Item = &'a ExifEntry>) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.line());
        out.push('\n');
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    /// Little-endian TIFF block: IFD0 with Orientation = 1, plus a GPS IFD
    /// holding GPSLatitudeRef = "N".
    fn tiff_block() -> Vec<u8> {
        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"II*\0");
        tiff.extend_from_slice(&8u32.to_le_bytes());
        // IFD0 at offset 8: two entries.
        tiff.extend_from_slice(&2u16.to_le_bytes());
        // Orientation, SHORT, 1, value 1.
        tiff.extend_from_slice(&0x0112u16.to_le_bytes());
        tiff.extend_from_slice(&3u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        // GPSInfo pointer, LONG, 1, offset of the GPS IFD.
        let gps_offset: u32 = 8 + 2 + 2 * 12 + 4;
        tiff.extend_from_slice(&0x8825u16.to_le_bytes());
        tiff.extend_from_slice(&4u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&gps_offset.to_le_bytes());
        tiff.extend_from_slice(&0u32.to_le_bytes());
        // GPS IFD: GPSLatitudeRef, ASCII, 2, "N\0".
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&0x0001u16.to_le_bytes());
        tiff.extend_from_slice(&2u16.to_le_bytes());
        tiff.extend_from_slice(&2u32.to_le_bytes());
        tiff.extend_from_slice(b"N\0\0\0");
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff
    }

    /// A small JPEG with an APP1 EXIF segment spliced in after SOI.
    pub(crate) fn jpeg_with_exif() -> Vec<u8> {
        let mut plain = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, image::Rgb([120, 80, 40])))
            .write_to(&mut Cursor::new(&mut plain), image::ImageFormat::Jpeg)
            .unwrap();

        let mut payload = b"Exif\0\0".to_vec();
        payload.extend_from_slice(&tiff_block());
        let length = (payload.len() + 2) as u16;

        let mut jpeg = plain[..2].to_vec();
        jpeg.extend_from_slice(&[0xFF, 0xE1]);
        jpeg.extend_from_slice(&length.to_be_bytes());
        jpeg.extend_from_slice(&payload);
        jpeg.extend_from_slice(&plain[2..]);
        jpeg
    }

    #[test]
    fn reads_primary_and_gps_fields() {
        let entries = read_exif(&jpeg_with_exif()).unwrap();
        assert!(entries.iter().any(|e| e.tag == "Orientation" && !e.gps));
        assert!(entries.iter().any(|e| e.tag == "GPSLatitudeRef" && e.gps));
    }

    #[test]
    fn plain_png_has_no_exif() {
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(2, 2))
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        assert!(read_exif(&png).is_none());
    }

    #[test]
    fn render_writes_one_line_per_entry() {
        let entries = vec![
            ExifEntry { tag: "Make".into(), value: "\"Acme\"".into(), gps: false },
            ExifEntry { tag: "Model".into(), value: "\"X1\"".into(), gps: false },
        ];
        assert_eq!(render(&entries), "Make: \"Acme\"\nModel: \"X1\"\n");
    }
}
