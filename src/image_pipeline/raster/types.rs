//! Decoded raster types

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Integer sample depth of a decoded raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    Eight,
    Sixteen,
}

impl BitDepth {
    /// Largest sample value representable at this depth.
    pub fn max_value(self) -> u16 {
        match self {
            BitDepth::Eight => u8::MAX as u16,
            BitDepth::Sixteen => u16::MAX,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
        }
    }
}

/// Represents a decoded, display-encoded raster image
#[derive(Debug, Clone)]
pub struct RasterBuffer {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Samples per pixel (1 = grey, 3 = RGB, 4 = RGBA)
    pub channels: usize,
    /// Bit depth declared by the source container
    pub bit_depth: BitDepth,
    /// Row-major, channel-interleaved samples
    pub samples: Vec<u16>,
}

impl RasterBuffer {
    /// `None` when `width * height` does not fit in `usize`.
    pub fn pixel_count(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    /// Decode-time validation run before any pixel work.
    ///
    /// Checks, in order: non-empty samples, non-zero dimensions, a supported
    /// channel layout, the sample count and that no sample exceeds the
    /// declared bit depth.
    pub fn validate(&self) -> Result<()> {
        if self.samples.is_empty() {
            return Err(ConversionError::DecodeError(
                "source raster contains no samples".to_string(),
            ));
        }

        if self.width == 0 || self.height == 0 {
            return Err(ConversionError::InvalidDimensions(self.width, self.height));
        }

        if !matches!(self.channels, 1 | 3 | 4) {
            return Err(ConversionError::UnsupportedChannelLayout(self.channels));
        }

        let expected = self
            .pixel_count()
            .and_then(|n| n.checked_mul(self.channels))
            .ok_or(ConversionError::InvalidDimensions(self.width, self.height))?;
        if self.samples.len() != expected {
            return Err(ConversionError::DecodeError(format!(
                "{}x{}x{} raster needs {} samples, got {}",
                self.width,
                self.height,
                self.channels,
                expected,
                self.samples.len()
            )));
        }

        let limit = self.bit_depth.max_value();
        if let Some(&sample) = self.samples.iter().find(|&&s| s > limit) {
            return Err(ConversionError::DecodeError(format!(
                "sample value {} exceeds {}-bit range",
                sample,
                self.bit_depth.bits()
            )));
        }

        Ok(())
    }
}
