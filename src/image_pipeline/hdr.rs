//! Radiance HDR module
//!
//! This module provides the RGBE pixel codec together with a Radiance `.hdr`
//! writer and reader.

mod decoder;
mod radiance_writer;
mod rgbe;
mod writer;
pub mod types;

pub use decoder::decode_radiance_hdr;
pub use radiance_writer::{RADIANCE_SIGNATURE, RadianceHdrWriter, encode_radiance_hdr};
pub use rgbe::{RGBE_ZERO_THRESHOLD, Rgbe};
pub use writer::HdrWriter;
pub use types::{ConversionConfig, ConversionConfigBuilder, OutputFormat, ScanlineEncoding};
