//! # hdrshot-core
//!
//! Core types shared by every hdrshot crate.
//!
//! - [`Cicp`] - Coding-independent code points (primaries, transfer, matrix, range)
//! - [`Samples`] - Sum type over the sample arrays a decoder can produce
//! - [`DecodedImage`] - The per-file decoded container record
//! - [`GamutCoverage`], [`LuminanceStats`] - Statistics emitted next to output bytes
//!
//! ## Crate Structure
//!
//! This crate has no internal dependencies. All other hdrshot crates depend on it:
//!
//! ```text
//! hdrshot-core (this crate)
//!    ^
//!    +-- hdrshot-math (matrices, chromatic adaptation)
//!    +-- hdrshot-transfer (PQ, sRGB, half floats)
//!    +-- hdrshot-primaries (precomposed colorspace matrices)
//!    +-- hdrshot-color (tone-mapping, peak estimation, gamut classification)
//!    +-- hdrshot-io (container decoders and the PNG encoder)
//!    +-- hdrshot-convert (conversion orchestrators)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cicp;
pub mod error;
pub mod image;
pub mod samples;
pub mod stats;

pub use cicp::Cicp;
pub use error::{Error, Result};
pub use image::{ChannelLayout, DecodedImage, SampleType};
pub use samples::Samples;
pub use stats::{GamutCoverage, LuminanceStats};

/// Rec.709 luma weights (R, G, B) used for every luminance computation.
pub const REC709_LUMA: [f64; 3] = [0.212639, 0.715169, 0.072192];

/// Luminance of linear Rec.709 RGB.
#[inline]
pub fn luminance_rec709(rgb: [f64; 3]) -> f64 {
    REC709_LUMA[0] * rgb[0] + REC709_LUMA[1] * rgb[1] + REC709_LUMA[2] * rgb[2]
}

/// cd/m2 represented by scRGB linear 1.0.
pub const SCRGB_WHITE_NITS: f64 = 80.0;
