//! Radiance HDR conversion configuration types

use std::path::Path;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::transform::DEFAULT_GAMMA;

/// How RGBE scanlines are laid out in the output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanlineEncoding {
    /// Four raw bytes per pixel (largest file, trivial to read)
    Flat,
    /// New-style run-length scanlines, used when 8 <= width < 32768 (default)
    RunLength,
}

/// Output container, picked from the destination file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    RadianceHdr,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("hdr") | Some("pic") | Some("rgbe") => Ok(OutputFormat::RadianceHdr),
            Some(other) => Err(ConversionError::UnsupportedFormat(format!(
                "output extension .{}",
                other
            ))),
            None => Err(ConversionError::UnsupportedFormat(format!(
                "output path {} has no extension",
                path.display()
            ))),
        }
    }
}

/// Configuration for TIFF to Radiance HDR conversion
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Apply the gamma-to-linear transform after normalization
    pub to_linear: bool,
    /// Exponent used when `to_linear` is set
    pub gamma: f32,
    /// Scanline layout of the encoded pixels
    pub scanline_encoding: ScanlineEncoding,
    /// Emit a `FORMAT=32-bit_rle_rgbe` line between the signature and the
    /// blank line. Off by default so the header is exactly signature, blank
    /// line, resolution line; some strict readers require it.
    pub format_header: bool,
    /// Whether to validate image dimensions before conversion
    pub validate_dimensions: bool,
    /// Reject images wider or taller than this
    pub max_dimension: Option<usize>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            to_linear: true,
            gamma: DEFAULT_GAMMA,
            scanline_encoding: ScanlineEncoding::RunLength,
            format_header: false,
            validate_dimensions: true,
            max_dimension: None,
        }
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }
}

/// Builder for ConversionConfig
#[derive(Default)]
pub struct ConversionConfigBuilder {
    to_linear: Option<bool>,
    gamma: Option<f32>,
    scanline_encoding: Option<ScanlineEncoding>,
    format_header: Option<bool>,
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<usize>>,
}

impl ConversionConfigBuilder {
    pub fn to_linear(mut self, enable: bool) -> Self {
        self.to_linear = Some(enable);
        self
    }

    pub fn gamma(mut self, gamma: f32) -> Self {
        self.gamma = Some(gamma);
        self
    }

    pub fn scanline_encoding(mut self, encoding: ScanlineEncoding) -> Self {
        self.scanline_encoding = Some(encoding);
        self
    }

    pub fn format_header(mut self, enable: bool) -> Self {
        self.format_header = Some(enable);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<usize>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn build(self) -> ConversionConfig {
        let default = ConversionConfig::default();
        ConversionConfig {
            to_linear: self.to_linear.unwrap_or(default.to_linear),
            gamma: self.gamma.unwrap_or(default.gamma),
            scanline_encoding: self.scanline_encoding.unwrap_or(default.scanline_encoding),
            format_header: self.format_header.unwrap_or(default.format_header),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConversionConfig::default();
        assert!(config.to_linear);
        assert_eq!(config.gamma, 2.2);
        assert_eq!(config.scanline_encoding, ScanlineEncoding::RunLength);
        assert!(!config.format_header);
    }

    #[test]
    fn test_config_builder() {
        let config = ConversionConfig::builder()
            .to_linear(false)
            .gamma(1.8)
            .scanline_encoding(ScanlineEncoding::Flat)
            .format_header(true)
            .validate_dimensions(false)
            .max_dimension(Some(8192))
            .build();

        assert!(!config.to_linear);
        assert_eq!(config.gamma, 1.8);
        assert_eq!(config.scanline_encoding, ScanlineEncoding::Flat);
        assert!(config.format_header);
        assert!(!config.validate_dimensions);
        assert_eq!(config.max_dimension, Some(8192));
    }

    #[test]
    fn test_output_format_from_extension() {
        assert_eq!(
            OutputFormat::from_path(Path::new("sky.hdr")).unwrap(),
            OutputFormat::RadianceHdr
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("SKY.HDR")).unwrap(),
            OutputFormat::RadianceHdr
        );
        assert!(matches!(
            OutputFormat::from_path(Path::new("sky.exr")),
            Err(ConversionError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            OutputFormat::from_path(Path::new("sky")),
            Err(ConversionError::UnsupportedFormat(_))
        ));
    }
}
