//! Bit-depth normalization into the unit interval.
//!
//! The divisor is chosen from the largest sample actually present, not from
//! the depth the container declares: anything above 255 means 16-bit range,
//! otherwise the buffer is treated as 8-bit. A 16-bit image whose content
//! never exceeds 255 is therefore normalized as if it were 8-bit. This is a
//! known limitation of the heuristic and is kept deliberately so output
//! matches existing conversions.

use tracing::debug;

use crate::image_pipeline::raster::types::{BitDepth, RasterBuffer};

/// Samples mapped into [0, 1], same shape as the source raster.
#[derive(Debug, Clone)]
pub struct NormalizedSamples {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    /// Range picked from the observed maximum
    pub detected: BitDepth,
    pub data: Vec<f32>,
}

/// Picks the sample range from the largest value in `samples`.
pub fn detect_bit_depth(samples: &[u16]) -> BitDepth {
    let max = samples.iter().copied().max().unwrap_or(0);
    if max > u8::MAX as u16 {
        BitDepth::Sixteen
    } else {
        BitDepth::Eight
    }
}

pub fn normalize(raster: &RasterBuffer) -> NormalizedSamples {
    let detected = detect_bit_depth(&raster.samples);

    if detected != raster.bit_depth {
        debug!(
            "Declared {}-bit raster normalized as {}-bit range",
            raster.bit_depth.bits(),
            detected.bits()
        );
    }

    let scale = f32::from(detected.max_value());
    let data = raster.samples.iter().map(|&s| f32::from(s) / scale).collect();

    NormalizedSamples {
        width: raster.width,
        height: raster.height,
        channels: raster.channels,
        detected,
        data,
    }
}
