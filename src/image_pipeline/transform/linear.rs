//! Scene-linear RGB image handed to the Radiance encoder.

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::transform::normalize::NormalizedSamples;
use crate::image_pipeline::transform::transfer::TransferFunction;

/// Linear-light float RGB image, three values per pixel.
///
/// Values are non-negative and may exceed 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearImage {
    pub width: usize,
    pub height: usize,
    /// RGB data interleaved [R, G, B, R, G, B, ...]
    pub pixels: Vec<f32>,
}

impl LinearImage {
    pub const CHANNELS: usize = 3;

    pub fn new(width: usize, height: usize, pixels: Vec<f32>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Reshapes to RGB and applies `transfer`.
    ///
    /// Grey samples are replicated into R, G and B; an alpha channel is
    /// dropped.
    pub fn from_normalized(
        normalized: &NormalizedSamples,
        transfer: TransferFunction,
    ) -> Result<Self> {
        let channels = normalized.channels;
        if !matches!(channels, 1 | 3 | 4) {
            return Err(ConversionError::UnsupportedChannelLayout(channels));
        }

        let mut pixels = Vec::with_capacity(normalized.data.len() / channels * Self::CHANNELS);
        for pixel in normalized.data.chunks_exact(channels) {
            match channels {
                1 => pixels.extend_from_slice(&[pixel[0]; 3]),
                _ => pixels.extend_from_slice(&pixel[..Self::CHANNELS]),
            }
        }
        transfer.apply_in_place(&mut pixels);

        Ok(Self::new(normalized.width, normalized.height, pixels))
    }

    pub fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        let base = (y * self.width + x) * Self::CHANNELS;
        [self.pixels[base], self.pixels[base + 1], self.pixels[base + 2]]
    }
}
