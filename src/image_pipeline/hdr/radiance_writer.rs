//! Radiance RGBE (`.hdr`) encoder.
//!
//! Output layout: `#?RADIANCE`, an optional `FORMAT=` line, a blank line,
//! `-Y <height> +X <width>`, then `height` scanlines from top to bottom.

use std::io::Write;

use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::hdr::rgbe::Rgbe;
use crate::image_pipeline::hdr::types::{ConversionConfig, ScanlineEncoding};
use crate::image_pipeline::hdr::writer::HdrWriter;
use crate::image_pipeline::transform::LinearImage;

pub const RADIANCE_SIGNATURE: &str = "#?RADIANCE";
pub const RGBE_FORMAT: &str = "32-bit_rle_rgbe";

/// Widths outside this range cannot be stored as new-style RLE scanlines.
pub const RLE_MIN_WIDTH: usize = 8;
pub const RLE_MAX_WIDTH: usize = 0x7fff;

const MAX_RUN: usize = 127;
const MAX_LITERAL: usize = 128;
const MIN_RUN: usize = 4;

pub struct RadianceHdrWriter;

impl HdrWriter for RadianceHdrWriter {
    /// The stream is assembled in memory and handed to `output` in a single
    /// write, so a rejected image leaves the sink untouched.
    fn write_hdr(&self, image: &LinearImage, output: &mut dyn Write, config: &ConversionConfig) -> Result<()> {
        let buffer = encode_radiance_hdr(image, config)?;
        output.write_all(&buffer)?;
        output.flush()?;
        Ok(())
    }
}

/// Serializes `image` into a complete Radiance HDR byte stream.
pub fn encode_radiance_hdr(image: &LinearImage, config: &ConversionConfig) -> Result<Vec<u8>> {
    let (width, height) = (image.width, image.height);
    if width == 0 || height == 0 {
        return Err(ConversionError::InvalidDimensions(width, height));
    }

    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(LinearImage::CHANNELS))
        .ok_or(ConversionError::InvalidDimensions(width, height))?;
    if image.pixels.len() != expected {
        return Err(ConversionError::EncodeError(format!(
            "{}x{} image needs {} values, got {}",
            width,
            height,
            expected,
            image.pixels.len()
        )));
    }

    let run_length = config.scanline_encoding == ScanlineEncoding::RunLength
        && (RLE_MIN_WIDTH..=RLE_MAX_WIDTH).contains(&width);
    debug!(
        "Encoding Radiance HDR image: {}x{}, {} scanlines",
        width,
        height,
        if run_length { "run-length" } else { "flat" }
    );

    let mut buffer = Vec::with_capacity(64 + width * height * 4);
    write_header(&mut buffer, width, height, config.format_header)?;

    let mut scanline = vec![0u8; width * 4];
    for row in image.pixels.chunks_exact(width * LinearImage::CHANNELS) {
        for (pixel, out) in row
            .chunks_exact(LinearImage::CHANNELS)
            .zip(scanline.chunks_exact_mut(4))
        {
            out.copy_from_slice(&Rgbe::from_linear(pixel[0], pixel[1], pixel[2]).bytes());
        }

        if run_length {
            encode_rle_scanline(&mut buffer, width, &scanline);
        } else {
            buffer.extend_from_slice(&scanline);
        }
    }

    debug!("Radiance HDR encoding complete, {} bytes", buffer.len());
    Ok(buffer)
}

fn write_header(buffer: &mut Vec<u8>, width: usize, height: usize, format_line: bool) -> Result<()> {
    writeln!(buffer, "{}", RADIANCE_SIGNATURE)?;
    if format_line {
        writeln!(buffer, "FORMAT={}", RGBE_FORMAT)?;
    }
    writeln!(buffer)?;
    writeln!(buffer, "-Y {} +X {}", height, width)?;
    Ok(())
}

fn encode_rle_scanline(buffer: &mut Vec<u8>, width: usize, scanline: &[u8]) {
    buffer.extend_from_slice(&[2, 2, (width >> 8) as u8, (width & 0xff) as u8]);

    let mut plane = Vec::with_capacity(width);
    for channel in 0..4 {
        plane.clear();
        plane.extend(scanline.iter().skip(channel).step_by(4));
        encode_rle_plane(buffer, &plane);
    }
}

/// Length of the run of identical bytes starting at `start`, capped at `MAX_RUN`.
fn run_length_at(data: &[u8], start: usize) -> usize {
    data[start..]
        .iter()
        .take(MAX_RUN)
        .take_while(|&&b| b == data[start])
        .count()
}

fn encode_rle_plane(buffer: &mut Vec<u8>, data: &[u8]) {
    let mut i = 0;
    while i < data.len() {
        let run = run_length_at(data, i);
        if run >= MIN_RUN {
            buffer.push((128 + run) as u8);
            buffer.push(data[i]);
            i += run;
            continue;
        }

        let start = i;
        while i < data.len() && i - start < MAX_LITERAL && run_length_at(data, i) < MIN_RUN {
            i += 1;
        }
        buffer.push((i - start) as u8);
        buffer.extend_from_slice(&data[start..i]);
    }
}
