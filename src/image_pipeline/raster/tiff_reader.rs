//! TIFF raster reader built on the `tiff` crate.
//!
//! Supplies the pipeline with a [`RasterBuffer`] from grey, RGB or RGBA TIFF
//! files stored with 8 or 16 bits per sample. Everything else (palette, CMYK,
//! float samples, ...) is rejected before any pixel data is touched.

use std::io::Cursor;

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::raster::reader::RasterReader;
use crate::image_pipeline::raster::types::{BitDepth, RasterBuffer};

pub struct TiffRasterReader;

fn channel_layout(color_type: ColorType) -> Result<(usize, BitDepth)> {
    let (channels, bits) = match color_type {
        ColorType::Gray(bits) => (1, bits),
        ColorType::RGB(bits) => (3, bits),
        ColorType::RGBA(bits) => (4, bits),
        ColorType::GrayA(_) => return Err(ConversionError::UnsupportedChannelLayout(2)),
        other => {
            return Err(ConversionError::UnsupportedFormat(format!(
                "TIFF colour type {:?}",
                other
            )));
        }
    };

    let depth = match bits {
        8 => BitDepth::Eight,
        16 => BitDepth::Sixteen,
        other => {
            return Err(ConversionError::UnsupportedFormat(format!(
                "{}-bit TIFF samples",
                other
            )));
        }
    };

    Ok((channels, depth))
}

impl RasterReader for TiffRasterReader {
    /// Decodes a complete TIFF file held in memory.
    ///
    /// 8-bit samples are widened to `u16` without rescaling; the declared
    /// depth travels alongside them in [`RasterBuffer::bit_depth`].
    fn read_raster(&self, data: &[u8]) -> Result<RasterBuffer> {
        debug!("Decoding TIFF image, {} bytes", data.len());

        if data.is_empty() {
            return Err(ConversionError::DecodeError("empty TIFF input".to_string()));
        }

        let mut decoder = Decoder::new(Cursor::new(data))
            .map_err(|e| ConversionError::DecodeError(e.to_string()))?;

        let (width, height) = decoder
            .dimensions()
            .map_err(|e| ConversionError::DecodeError(e.to_string()))?;
        let color_type = decoder
            .colortype()
            .map_err(|e| ConversionError::DecodeError(e.to_string()))?;

        let (channels, bit_depth) = channel_layout(color_type)?;
        debug!(
            "TIFF header: {}x{}, {} channels, {} bits",
            width,
            height,
            channels,
            bit_depth.bits()
        );

        let samples: Vec<u16> = match decoder
            .read_image()
            .map_err(|e| ConversionError::DecodeError(e.to_string()))?
        {
            DecodingResult::U8(values) => values.into_iter().map(u16::from).collect(),
            DecodingResult::U16(values) => values,
            _ => {
                return Err(ConversionError::UnsupportedFormat(
                    "TIFF sample format other than unsigned 8/16-bit".to_string(),
                ));
            }
        };

        Ok(RasterBuffer {
            width: width as usize,
            height: height as usize,
            channels,
            bit_depth,
            samples,
        })
    }
}
