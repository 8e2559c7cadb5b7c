// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// File name looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "taskmaster.json";

/// Settings shared by every operation. Created once at startup, read-only
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root directory for every output artifact.
    pub output_dir: PathBuf,
    /// Log file name, relative to `output_dir`.
    pub log_file: String,
    /// Default JPEG quality for image compression (1-100).
    pub jpeg_quality: u8,
    /// Page size for captioned image booklets.
    pub paper_size: crate::PaperSize,
    /// Height of the caption band at the bottom of booklet pages, in points.
    pub caption_band_pt: f32,
    /// Caption font size, in points.
    pub caption_font_size_pt: f32,
    /// Resolution of the staged per-page rasters.
    pub staging_dpi: f32,
    /// Duration of the decorative spinner shown while an operation runs.
    /// Zero disables it.
    pub progress_animation_ms: u64,
    /// Clear the terminal before drawing the main menu.
    pub clear_screen: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("Output"),
            log_file: "log.log".into(),
            jpeg_quality: 85,
            paper_size: crate::PaperSize::A4,
            caption_band_pt: 40.0,
            caption_font_size_pt: 12.0,
            staging_dpi: 150.0,
            progress_animation_ms: 600,
            clear_screen: true,
        }
    }
}

impl AppConfig {
    /// Load the config from `dir/taskmaster.json`.
    ///
    /// A missing file yields `Ok(None)`; unreadable or malformed files are
    /// errors so the caller can report them before falling back to defaults.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&data)?;
        Ok(Some(config.sanitized()))
    }

    /// Write the config as pretty JSON to `dir/taskmaster.json`.
    pub fn save_to_dir(&self, dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(dir.join(CONFIG_FILE), json)?;
        Ok(())
    }

    /// Full path of the log file.
    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(&self.log_file)
    }

    fn sanitized(mut self) -> Self {
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
        if !self.caption_band_pt.is_finite() || self.caption_band_pt < 0.0 {
            self.caption_band_pt = 40.0;
        }
        if !self.staging_dpi.is_finite() || self.staging_dpi <= 0.0 {
            self.staging_dpi = 150.0;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(AppConfig::load_from_dir(dir.path()).expect("load").is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "output_dir": "out", "jpeg_quality": 250 }"#,
        )
        .expect("write config");

        let config = AppConfig::load_from_dir(dir.path())
            .expect("load")
            .expect("present");
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.jpeg_quality, 100);
        assert_eq!(config.log_file, "log.log");
        assert_eq!(config.log_path(), PathBuf::from("out").join("log.log"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").expect("write");
        assert!(AppConfig::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig {
            progress_animation_ms: 0,
            ..AppConfig::default()
        };
        config.save_to_dir(dir.path()).expect("save");
        let loaded = AppConfig::load_from_dir(dir.path())
            .expect("load")
            .expect("present");
        assert_eq!(loaded.progress_animation_ms, 0);
    }
}
