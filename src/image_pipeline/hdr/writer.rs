use std::io::Write;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::hdr::types::ConversionConfig;
use crate::image_pipeline::transform::LinearImage;

pub trait HdrWriter {
    fn write_hdr(&self, image: &LinearImage, output: &mut dyn Write, config: &ConversionConfig) -> Result<()>;
}
