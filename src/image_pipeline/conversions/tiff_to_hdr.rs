use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{info, instrument, warn};

use crate::image_pipeline::{
    common::error::{ConversionError, Result},
    conversions::timing::{PipelineTimings, Timer},
    hdr::{ConversionConfig, HdrWriter, OutputFormat, RadianceHdrWriter},
    raster::{RasterBuffer, RasterReader, TiffRasterReader},
    transform::{LinearImage, TransferFunction, normalize},
};

pub struct TiffToHdrPipeline<R: RasterReader, W: HdrWriter> {
    reader: R,
    writer: W,
    config: ConversionConfig,
    transfer: TransferFunction,
}

impl TiffToHdrPipeline<TiffRasterReader, RadianceHdrWriter> {
    pub fn new(config: ConversionConfig) -> Result<Self> {
        Self::with_custom(TiffRasterReader, RadianceHdrWriter, config)
    }
}

impl<R: RasterReader, W: HdrWriter> TiffToHdrPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: ConversionConfig) -> Result<Self> {
        let transfer = TransferFunction::from_config(config.to_linear, config.gamma)?;
        Ok(Self {
            reader,
            writer,
            config,
            transfer,
        })
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.config.max_dimension {
            if width > max || height > max {
                warn!("Image dimensions {}x{} exceed maximum {}", width, height, max);
                return Err(ConversionError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }

    /// Decode-time validation, normalization, transfer function and encoding
    /// of an already decoded raster.
    fn run_stages(
        &self,
        raster: &RasterBuffer,
        output: &mut dyn Write,
        timings: &mut PipelineTimings,
    ) -> Result<()> {
        let timer = Timer::start("validate");
        {
            let _span = tracing::info_span!("validate",
                width = raster.width,
                height = raster.height,
                channels = raster.channels
            ).entered();
            raster.validate()?;
            self.validate_dimensions(raster.width, raster.height)?;
        }
        timer.record(timings);

        let timer = Timer::start("normalize");
        let normalized = {
            let _span = tracing::info_span!("normalize").entered();
            normalize(raster)
        };
        timer.record(timings);

        info!(
            width = raster.width,
            height = raster.height,
            channels = raster.channels,
            declared_bits = raster.bit_depth.bits(),
            detected_bits = normalized.detected.bits(),
            "Source raster normalized"
        );

        let timer = Timer::start("transfer_function");
        let linear = {
            let _span = tracing::info_span!("transfer_function", transfer = ?self.transfer).entered();
            LinearImage::from_normalized(&normalized, self.transfer)?
        };
        timer.record(timings);

        let timer = Timer::start("encode_hdr");
        {
            let _span = tracing::info_span!("encode_hdr").entered();
            self.writer
                .write_hdr(&linear, output, &self.config)
                .map_err(|e| encode_failure(e, linear.width, linear.height))?;
        }
        timer.record(timings);

        Ok(())
    }

    /// Converts a decoded raster and writes the Radiance stream to `output`.
    #[instrument(skip(self, raster, output), fields(width = raster.width, height = raster.height))]
    pub fn convert_raster(&self, raster: &RasterBuffer, output: &mut dyn Write) -> Result<()> {
        self.convert_raster_with_timings(raster, output).map(|_| ())
    }

    pub fn convert_raster_with_timings(
        &self,
        raster: &RasterBuffer,
        output: &mut dyn Write,
    ) -> Result<PipelineTimings> {
        let mut timings = PipelineTimings::new();
        self.run_stages(raster, output, &mut timings)?;

        info!(
            width = raster.width,
            height = raster.height,
            "Conversion complete in {:.3}ms",
            timings.total_duration().as_secs_f64() * 1000.0
        );
        Ok(timings)
    }

    /// Decodes `input_data` with the configured reader, then converts it.
    #[instrument(skip(self, input_data, output), fields(input_size = input_data.len()))]
    pub fn convert(&self, input_data: &[u8], output: &mut dyn Write) -> Result<()> {
        self.convert_with_timings(input_data, output).map(|_| ())
    }

    pub fn convert_with_timings(
        &self,
        input_data: &[u8],
        output: &mut dyn Write,
    ) -> Result<PipelineTimings> {
        let mut timings = PipelineTimings::new();
        info!("Starting TIFF to HDR conversion");

        let timer = Timer::start("decode_raster");
        let raster = {
            let _span = tracing::info_span!("decode_raster").entered();
            self.reader.read_raster(input_data)?
        };
        timer.record(&mut timings);

        let conversion = self.convert_raster_with_timings(&raster, output)?;
        timings.extend(&conversion);
        Ok(timings)
    }

    #[instrument(skip(self, input_path, output_path))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<()> {
        self.convert_file_with_timings(input_path, output_path).map(|_| ())
    }

    /// File-to-file conversion.
    ///
    /// The output is fully encoded in memory and then written through a
    /// temporary file that is renamed over `output_path`, so a failed
    /// conversion never leaves a partial `.hdr` behind.
    pub fn convert_file_with_timings<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<PipelineTimings> {
        let mut timings = PipelineTimings::new();
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let format = OutputFormat::from_path(output_path)?;

        let timer = Timer::start("read_input_file");
        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                ConversionError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };
        timer.record(&mut timings);

        let mut encoded = Vec::<u8>::new();
        let conversion = match format {
            OutputFormat::RadianceHdr => self.convert_with_timings(&input_data, &mut encoded)?,
        };
        timings.extend(&conversion);

        let timer = Timer::start("write_output_file");
        {
            let _span = tracing::info_span!("write_output_file", bytes = encoded.len()).entered();
            write_atomically(output_path, &encoded)?;
        }
        timer.record(&mut timings);

        Ok(timings)
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ConversionConfig) -> Result<()> {
        self.transfer = TransferFunction::from_config(config.to_linear, config.gamma)?;
        self.config = config;
        Ok(())
    }
}

/// One-shot conversion of a decoded raster with the default Radiance writer.
pub fn convert(
    source: &RasterBuffer,
    destination: &mut dyn Write,
    apply_gamma: bool,
    gamma: f32,
) -> Result<()> {
    let config = ConversionConfig::builder()
        .to_linear(apply_gamma)
        .gamma(gamma)
        .build();
    TiffToHdrPipeline::new(config)?.convert_raster(source, destination)
}

fn encode_failure(error: ConversionError, width: usize, height: usize) -> ConversionError {
    let detail = match error {
        ConversionError::EncodeError(message) => message,
        other => other.to_string(),
    };
    ConversionError::EncodeError(format!("encode_hdr stage ({}x{}): {}", width, height, detail))
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let output_error =
        |e: std::io::Error| ConversionError::OutputWriteError(format!("{}: {}", path.display(), e));

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(output_error)?;
    file.write_all(bytes).map_err(output_error)?;
    file.as_file().sync_all().map_err(output_error)?;
    file.persist(path).map_err(|e| output_error(e.error))?;
    Ok(())
}
