use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use hdr_skybox_rs::image_pipeline::{ConversionConfig, ScanlineEncoding, TiffToHdrPipeline};
use hdr_skybox_rs::logger;

use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EncodingArg {
    /// Raw 4-byte RGBE pixels
    Flat,
    /// New-style run-length scanlines
    Rle,
}

impl From<EncodingArg> for ScanlineEncoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Flat => ScanlineEncoding::Flat,
            EncodingArg::Rle => ScanlineEncoding::RunLength,
        }
    }
}

/// Convert an 8/16-bit TIFF panorama into a linear Radiance HDR skybox
#[derive(Parser, Debug)]
#[command(name = "hdr_skybox_rs", version, about)]
struct Cli {
    /// Source TIFF image
    input: PathBuf,

    /// Destination Radiance file (.hdr, .pic or .rgbe)
    output: PathBuf,

    /// Keep display-encoded values instead of converting to linear
    #[arg(long)]
    no_linear: bool,

    /// Exponent of the gamma-to-linear transform
    #[arg(long, default_value_t = 2.2)]
    gamma: f32,

    /// Scanline layout of the output
    #[arg(long, value_enum, default_value = "rle")]
    encoding: EncodingArg,

    /// Write a FORMAT=32-bit_rle_rgbe header line
    #[arg(long)]
    format_header: bool,

    /// Reject images wider or taller than this
    #[arg(long)]
    max_dimension: Option<usize>,

    /// Print a per-stage timing summary
    #[arg(long)]
    timings: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let config = ConversionConfig::builder()
        .to_linear(!cli.no_linear)
        .gamma(cli.gamma)
        .scanline_encoding(cli.encoding.into())
        .format_header(cli.format_header)
        .max_dimension(cli.max_dimension)
        .build();
    let pipeline = TiffToHdrPipeline::new(config).context("invalid conversion settings")?;

    info!(
        "Gamma to linear: {}",
        if pipeline.config().to_linear {
            format!("enabled (gamma {})", pipeline.config().gamma)
        } else {
            "disabled".to_string()
        }
    );
    info!("Scanline encoding: {:?}", pipeline.config().scanline_encoding);

    let timings = pipeline
        .convert_file_with_timings(&cli.input, &cli.output)
        .with_context(|| {
            format!(
                "failed to convert {} to {}",
                cli.input.display(),
                cli.output.display()
            )
        })?;

    info!("Saved {}", cli.output.display());
    if cli.timings {
        timings.print_summary();
    }

    Ok(())
}
