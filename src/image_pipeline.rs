//! Image processing pipeline module
//!
//! This module turns display-encoded integer rasters into scene-linear
//! Radiance HDR images, with separate modules for raster input, pixel
//! transforms, HDR encoding and conversion orchestration.

pub mod raster;
pub mod transform;
pub mod hdr;
pub mod conversions;
pub mod common;

pub use common::{
    ConversionError,
    Result,
};

pub use raster::{
    BitDepth,
    RasterBuffer,
    RasterReader,
    TiffRasterReader,
};

pub use transform::{
    LinearImage,
    TransferFunction,
};

pub use hdr::{
    ConversionConfig,
    ConversionConfigBuilder,
    HdrWriter,
    OutputFormat,
    RadianceHdrWriter,
    ScanlineEncoding,
    decode_radiance_hdr,
    encode_radiance_hdr,
};

pub use conversions::{
    PipelineTimings,
    TiffToHdrPipeline,
    convert,
};
