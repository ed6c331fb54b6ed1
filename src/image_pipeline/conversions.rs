//! Pipeline conversions module
//!
//! This module contains orchestration logic for raster to Radiance HDR conversion.

mod tiff_to_hdr;
mod timing;


pub use tiff_to_hdr::{TiffToHdrPipeline, convert};
pub use timing::{PipelineTimings, StepTiming, Timer};
