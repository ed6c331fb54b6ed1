//! Radiance RGBE (`.hdr`) decoder.
//!
//! Reads back what [`RadianceHdrWriter`](super::RadianceHdrWriter) produces,
//! plus the common variations: `#?RGBE` signatures, comment and variable
//! lines in the header, and any mix of flat and new-style RLE scanlines.
//! Only the standard `-Y <height> +X <width>` orientation is accepted.

use std::io::{BufRead, Cursor, Read};

use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::hdr::radiance_writer::{RGBE_FORMAT, RLE_MAX_WIDTH, RLE_MIN_WIDTH};
use crate::image_pipeline::hdr::rgbe::Rgbe;
use crate::image_pipeline::transform::LinearImage;

const SIGNATURE_PREFIX: &str = "#?";

fn decode_error(message: impl Into<String>) -> ConversionError {
    ConversionError::DecodeError(message.into())
}

pub fn decode_radiance_hdr(data: &[u8]) -> Result<LinearImage> {
    let mut reader = Cursor::new(data);
    let (width, height) = read_header(&mut reader)?;
    debug!("Decoding Radiance HDR image: {}x{}", width, height);

    let remaining = data.len().saturating_sub(reader.position() as usize);
    check_payload_size(width, height, remaining)?;

    let value_count = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(LinearImage::CHANNELS))
        .ok_or_else(|| decode_error(format!("{}x{} image is too large", width, height)))?;
    let mut pixels = Vec::with_capacity(value_count);
    let mut scanline = vec![0u8; width * 4];
    for y in 0..height {
        read_scanline(&mut reader, width, &mut scanline)
            .map_err(|e| decode_error(format!("scanline {}: {}", y, e)))?;
        for rgbe in scanline.chunks_exact(4) {
            pixels.extend_from_slice(&Rgbe([rgbe[0], rgbe[1], rgbe[2], rgbe[3]]).to_linear());
        }
    }

    Ok(LinearImage::new(width, height, pixels))
}

/// Smallest number of bytes a scanline of `width` pixels can occupy.
fn min_scanline_bytes(width: usize) -> Option<usize> {
    if (RLE_MIN_WIDTH..=RLE_MAX_WIDTH).contains(&width) {
        // marker, then four planes of full-length runs
        Some(4 + 4 * 2 * width.div_ceil(127))
    } else {
        width.checked_mul(4)
    }
}

/// Rejects resolutions the remaining stream cannot possibly hold, before
/// anything is allocated for them.
fn check_payload_size(width: usize, height: usize, remaining: usize) -> Result<()> {
    let needed = min_scanline_bytes(width).and_then(|n| n.checked_mul(height));
    match needed {
        Some(needed) if needed <= remaining => Ok(()),
        _ => Err(decode_error(format!(
            "{}x{} image does not fit in {} bytes of pixel data",
            width, height, remaining
        ))),
    }
}

fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut line = Vec::new();
    if reader.read_until(b'\n', &mut line)? == 0 {
        return Ok(None);
    }
    let text = String::from_utf8_lossy(&line);
    Ok(Some(text.trim_end_matches(['\r', '\n']).to_string()))
}

fn read_header<R: BufRead>(reader: &mut R) -> Result<(usize, usize)> {
    let signature = read_line(reader)?.ok_or_else(|| decode_error("empty input"))?;
    if !signature.starts_with(SIGNATURE_PREFIX) {
        return Err(decode_error("missing Radiance signature"));
    }

    loop {
        let line = read_line(reader)?.ok_or_else(|| decode_error("unterminated header"))?;
        if line.is_empty() {
            break;
        }
        if let Some(format) = line.strip_prefix("FORMAT=") {
            if format.trim() != RGBE_FORMAT {
                return Err(decode_error(format!("unsupported pixel format {}", format)));
            }
        }
    }

    let resolution = read_line(reader)?.ok_or_else(|| decode_error("missing resolution line"))?;
    parse_resolution(&resolution)
        .ok_or_else(|| decode_error(format!("unsupported resolution line '{}'", resolution)))
}

/// Parses `-Y <height> +X <width>` into `(width, height)`.
fn parse_resolution(line: &str) -> Option<(usize, usize)> {
    let mut parts = line.split_whitespace();
    if parts.next()? != "-Y" {
        return None;
    }
    let height: usize = parts.next()?.parse().ok()?;
    if parts.next()? != "+X" {
        return None;
    }
    let width: usize = parts.next()?.parse().ok()?;
    if parts.next().is_some() || width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

fn read_scanline<R: Read>(reader: &mut R, width: usize, out: &mut [u8]) -> Result<()> {
    let mut first = [0u8; 4];
    reader.read_exact(&mut first)?;

    let run_length = (RLE_MIN_WIDTH..=RLE_MAX_WIDTH).contains(&width)
        && first[0] == 2
        && first[1] == 2
        && first[2] & 0x80 == 0;

    if !run_length {
        out[..4].copy_from_slice(&first);
        reader.read_exact(&mut out[4..])?;
        return Ok(());
    }

    let encoded_width = ((first[2] as usize) << 8) | first[3] as usize;
    if encoded_width != width {
        return Err(decode_error(format!(
            "RLE scanline width {} does not match image width {}",
            encoded_width, width
        )));
    }

    let mut plane = vec![0u8; width];
    for channel in 0..4 {
        read_rle_plane(reader, &mut plane)?;
        for (x, &value) in plane.iter().enumerate() {
            out[x * 4 + channel] = value;
        }
    }
    Ok(())
}

fn read_rle_plane<R: Read>(reader: &mut R, plane: &mut [u8]) -> Result<()> {
    let mut idx = 0;
    while idx < plane.len() {
        let mut code = [0u8; 1];
        reader.read_exact(&mut code)?;
        let (count, is_run) = match code[0] {
            0 => return Err(decode_error("zero-length RLE code")),
            c if c > 128 => ((c - 128) as usize, true),
            c => (c as usize, false),
        };

        if idx + count > plane.len() {
            return Err(decode_error("RLE data overruns scanline"));
        }

        if is_run {
            let mut value = [0u8; 1];
            reader.read_exact(&mut value)?;
            plane[idx..idx + count].fill(value[0]);
        } else {
            reader.read_exact(&mut plane[idx..idx + count])?;
        }
        idx += count;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("-Y 2 +X 3"), Some((3, 2)));
        assert_eq!(parse_resolution("+X 3 -Y 2"), None);
        assert_eq!(parse_resolution("-Y 0 +X 3"), None);
        assert_eq!(parse_resolution("-Y 2 +X"), None);
    }

    #[test]
    fn test_accepts_rgbe_signature_and_comments() {
        let mut data = b"#?RGBE\n# Made elsewhere\nFORMAT=32-bit_rle_rgbe\nEXPOSURE=1.0\n\n-Y 1 +X 1\n".to_vec();
        data.extend_from_slice(&[64, 128, 0, 129]);

        let image = decode_radiance_hdr(&data).unwrap();
        assert_eq!(image.pixels, vec![0.5, 1.0, 0.0]);
    }

    #[test]
    fn test_rejects_missing_signature() {
        let err = decode_radiance_hdr(b"P6\n\n-Y 1 +X 1\n\0\0\0\0").unwrap_err();
        assert!(matches!(err, ConversionError::DecodeError(_)));
    }

    #[test]
    fn test_rejects_xyze() {
        let err = decode_radiance_hdr(b"#?RADIANCE\nFORMAT=32-bit_rle_xyze\n\n-Y 1 +X 1\n\0\0\0\0")
            .unwrap_err();
        assert!(matches!(err, ConversionError::DecodeError(_)));
    }

    #[test]
    fn test_rejects_truncated_pixels() {
        let err = decode_radiance_hdr(b"#?RADIANCE\n\n-Y 2 +X 2\n\0\0\0\0").unwrap_err();
        assert!(matches!(err, ConversionError::DecodeError(_)));
    }

    #[test]
    fn test_rejects_oversized_resolution() {
        let overflowing = decode_radiance_hdr(b"#?RADIANCE\n\n-Y 4000000000 +X 4000000000\n\0\0\0\0")
            .unwrap_err();
        assert!(matches!(overflowing, ConversionError::DecodeError(_)));

        let huge = decode_radiance_hdr(b"#?RADIANCE\n\n-Y 100000 +X 100000\n\0\0\0\0").unwrap_err();
        assert!(matches!(huge, ConversionError::DecodeError(_)));

        let tall_rle = decode_radiance_hdr(b"#?RADIANCE\n\n-Y 1000000000 +X 16\n\x02\x02\0\x10")
            .unwrap_err();
        assert!(matches!(tall_rle, ConversionError::DecodeError(_)));
    }

    #[test]
    fn test_min_scanline_bytes() {
        assert_eq!(min_scanline_bytes(4), Some(16));
        assert_eq!(min_scanline_bytes(8), Some(12));
        assert_eq!(min_scanline_bytes(128), Some(20));
        assert_eq!(min_scanline_bytes(usize::MAX), None);
    }

    #[test]
    fn test_rejects_rle_overrun() {
        let mut data = b"#?RADIANCE\n\n-Y 1 +X 8\n".to_vec();
        data.extend_from_slice(&[2, 2, 0, 8, 128 + 9, 0]);
        let err = decode_radiance_hdr(&data).unwrap_err();
        assert!(matches!(err, ConversionError::DecodeError(_)));
    }
}
