//! Decoded raster input module
//!
//! This module defines the in-memory raster handed to the pipeline and the
//! readers that produce it.

mod reader;
mod tiff_reader;
pub mod types;

pub use reader::RasterReader;
pub use tiff_reader::TiffRasterReader;
pub use types::{BitDepth, RasterBuffer};
