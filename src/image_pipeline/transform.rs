//! Pixel transform module
//!
//! Normalization of integer samples and the optional gamma-to-linear step
//! that together turn a decoded raster into a [`LinearImage`].

mod linear;
mod normalize;
mod transfer;

pub use linear::LinearImage;
pub use normalize::{NormalizedSamples, detect_bit_depth, normalize};
pub use transfer::{DEFAULT_GAMMA, TransferFunction};
