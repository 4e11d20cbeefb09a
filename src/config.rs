//! Configuration types for both pipelines.
//!
//! [`CleanConfig`] drives duplicate-page removal, [`VideoConfig`] drives
//! video-to-PDF conversion. Both are plain data with `Default` values that
//! reproduce the reference behaviour, and a consuming builder whose `build()`
//! rejects values the pipeline cannot work with.
//!
//! The similarity threshold is the one knob that is *not* validated: values
//! outside 0–100 are passed straight into the cutoff formula (see
//! [`crate::pipeline::dedup::similarity_cutoff`]).

use crate::error::SiftError;
use serde::{Deserialize, Serialize};

/// File-name suffix appended to the stem of a cleaned PDF.
pub const CLEANED_SUFFIX: &str = "_cleaned";

/// Configuration for near-duplicate page removal.
///
/// # Example
/// ```rust
/// use pdfsift::CleanConfig;
///
/// let config = CleanConfig::builder()
///     .threshold(85.0)
///     .resize_to(64, 64)
///     .build()
///     .unwrap();
/// assert_eq!(config.threshold, 85.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanConfig {
    /// Rasterisation DPI. Range: 72–400. Default: 150.
    ///
    /// Only used to produce an image for hashing, so it is kept low. It is
    /// independent of `resize_to`: pages are always downscaled afterwards.
    pub dpi: u32,

    /// Resize target `(width, height)` applied to the grayscale render before
    /// hashing. Default: 100×100.
    pub resize_to: (u32, u32),

    /// Similarity threshold in percent. Default: 90.
    pub threshold: f64,

    /// Edge length of the square hash bit matrix. Default: 8 (64 bits).
    pub hash_size: u32,

    /// Suffix appended to the file stem of the output. Default: `_cleaned`.
    pub output_suffix: String,

    /// Also process files that look like earlier outputs (`*_cleaned.pdf`).
    /// Default: false.
    pub include_cleaned: bool,

    /// Compute the delete set but write nothing. Default: false.
    pub dry_run: bool,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            dpi: 150,
            resize_to: (100, 100),
            threshold: 90.0,
            hash_size: 8,
            output_suffix: CLEANED_SUFFIX.to_string(),
            include_cleaned: false,
            dry_run: false,
        }
    }
}

impl CleanConfig {
    /// Create a new builder for `CleanConfig`.
    pub fn builder() -> CleanConfigBuilder {
        CleanConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`CleanConfig`].
#[derive(Debug)]
pub struct CleanConfigBuilder {
    config: CleanConfig,
}

impl CleanConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn resize_to(mut self, width: u32, height: u32) -> Self {
        self.config.resize_to = (width, height);
        self
    }

    /// Not clamped: out-of-range thresholds are honoured as given.
    pub fn threshold(mut self, percent: f64) -> Self {
        self.config.threshold = percent;
        self
    }

    pub fn hash_size(mut self, size: u32) -> Self {
        self.config.hash_size = size;
        self
    }

    pub fn output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.output_suffix = suffix.into();
        self
    }

    pub fn include_cleaned(mut self, v: bool) -> Self {
        self.config.include_cleaned = v;
        self
    }

    pub fn dry_run(mut self, v: bool) -> Self {
        self.config.dry_run = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CleanConfig, SiftError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(SiftError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.resize_to.0 == 0 || c.resize_to.1 == 0 {
            return Err(SiftError::InvalidConfig(format!(
                "Resize target must be non-zero, got {}x{}",
                c.resize_to.0, c.resize_to.1
            )));
        }
        if c.hash_size == 0 {
            return Err(SiftError::InvalidConfig("Hash size must be ≥ 1".into()));
        }
        if c.threshold.is_nan() {
            return Err(SiftError::InvalidConfig("Threshold must be a number".into()));
        }
        if c.output_suffix.is_empty() {
            return Err(SiftError::InvalidConfig(
                "Output suffix must not be empty; the original would be overwritten".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Configuration for video-to-PDF conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Seconds of video between two captured frames. Default: 2.
    ///
    /// Converted to a frame count by multiplying with the integer frame rate,
    /// so a 29.97 fps video captures every 58th frame.
    pub seconds_between: u32,

    /// Page size of the assembled PDF. Default: US Letter.
    pub page_size: PageSize,

    /// JPEG quality for frames written to the scratch directory. Default: 90.
    pub jpeg_quality: u8,

    /// Parent directory for scratch frame directories.
    /// If None, scratch directories are created next to each video.
    pub temp_root: Option<std::path::PathBuf>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            seconds_between: 2,
            page_size: PageSize::default(),
            jpeg_quality: 90,
            temp_root: None,
        }
    }
}

impl VideoConfig {
    /// Create a new builder for `VideoConfig`.
    pub fn builder() -> VideoConfigBuilder {
        VideoConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`VideoConfig`].
#[derive(Debug)]
pub struct VideoConfigBuilder {
    config: VideoConfig,
}

impl VideoConfigBuilder {
    pub fn seconds_between(mut self, secs: u32) -> Self {
        self.config.seconds_between = secs;
        self
    }

    pub fn page_size(mut self, size: PageSize) -> Self {
        self.config.page_size = size;
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn temp_root(mut self, dir: impl Into<std::path::PathBuf>) -> Self {
        self.config.temp_root = Some(dir.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<VideoConfig, SiftError> {
        if self.config.seconds_between == 0 {
            return Err(SiftError::InvalidConfig(
                "Seconds between frames must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Output page size for assembled screenshot PDFs.
///
/// Images are stretched to fill the page; aspect ratio is not preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    /// 8.5 × 11 in (612 × 792 pt). (default)
    #[default]
    Letter,
    /// 210 × 297 mm (595 × 842 pt).
    A4,
}

impl PageSize {
    /// Width and height in PDF points.
    pub fn points(self) -> (i64, i64) {
        match self {
            PageSize::Letter => (612, 792),
            PageSize::A4 => (595, 842),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_defaults_match_reference_behaviour() {
        let c = CleanConfig::default();
        assert_eq!(c.dpi, 150);
        assert_eq!(c.resize_to, (100, 100));
        assert_eq!(c.threshold, 90.0);
        assert_eq!(c.hash_size, 8);
        assert_eq!(c.output_suffix, "_cleaned");
        assert!(!c.dry_run);
    }

    #[test]
    fn threshold_is_not_clamped() {
        let c = CleanConfig::builder().threshold(140.0).build().unwrap();
        assert_eq!(c.threshold, 140.0);
        let c = CleanConfig::builder().threshold(-5.0).build().unwrap();
        assert_eq!(c.threshold, -5.0);
    }

    #[test]
    fn rejects_out_of_range_dpi() {
        assert!(CleanConfig::builder().dpi(50).build().is_err());
        assert!(CleanConfig::builder().dpi(401).build().is_err());
        assert!(CleanConfig::builder().dpi(72).build().is_ok());
    }

    #[test]
    fn rejects_zero_resize_and_hash() {
        assert!(CleanConfig::builder().resize_to(0, 100).build().is_err());
        assert!(CleanConfig::builder().hash_size(0).build().is_err());
    }

    #[test]
    fn rejects_empty_suffix() {
        assert!(CleanConfig::builder().output_suffix("").build().is_err());
    }

    #[test]
    fn video_defaults_and_validation() {
        let v = VideoConfig::default();
        assert_eq!(v.seconds_between, 2);
        assert_eq!(v.page_size, PageSize::Letter);
        assert!(VideoConfig::builder().seconds_between(0).build().is_err());
        assert_eq!(
            VideoConfig::builder().jpeg_quality(0).build().unwrap().jpeg_quality,
            1
        );
    }

    #[test]
    fn page_size_points() {
        assert_eq!(PageSize::Letter.points(), (612, 792));
        assert_eq!(PageSize::A4.points(), (595, 842));
    }

    #[test]
    fn config_serialises() {
        let json = serde_json::to_string(&CleanConfig::default()).unwrap();
        assert!(json.contains("\"threshold\":90.0"), "got: {json}");
    }
}
