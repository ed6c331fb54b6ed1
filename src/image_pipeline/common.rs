//! Shared pipeline types
//!
//! The error taxonomy used by every stage from raster decoding to HDR output.

pub mod error;

pub use error::{ConversionError, Result};
