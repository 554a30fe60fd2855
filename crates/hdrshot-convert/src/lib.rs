//! # hdrshot-convert
//!
//! Turns one HDR screenshot into the canonical BT.2020/PQ 16-bit image, an
//! SDR preview and a thumbnail, with gamut and luminance statistics taken
//! from the same per-pixel pass.
//!
//! | Input | Decoder | Colour path |
//! |-------|---------|-------------|
//! | `.hdr`, `.exr` | built in | linear Rec.709 floats |
//! | `.jxr` | [`JxrDecoder`] | scRGB floats, or integer pass-through |
//! | `.png` | built in, [`ImageBackend`] for other layouts | PQ tagged, or integer pass-through |
//! | `.avif`, other | [`ImageBackend`] | PQ tagged, or integer pass-through |
//!
//! # Example
//!
//! ```rust
//! use hdrshot_convert::{ConvertOptions, Converter};
//! use hdrshot_core::{ChannelLayout, DecodedImage, Samples};
//!
//! let image = DecodedImage::new(2, 1, ChannelLayout::Rgb, Samples::F32(vec![
//!     0.5, 0.5, 0.5,
//!     12.0, 9.0, 4.0,
//! ]))?;
//! let converter = Converter::new(ConvertOptions::default().with_thumbnail(false));
//! let out = converter.convert_image(&image)?;
//! assert!(out.sdr.is_some());
//! assert!(out.gamut.is_some());
//! # Ok::<(), hdrshot_convert::ConvertError>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod analyze;
pub mod backend;
pub mod batch;
pub mod converter;
mod error;
pub mod naming;
pub mod options;
pub mod pipeline;
pub mod thumbnail;

pub use analyze::{analyze_png, Analysis};
pub use backend::{ImageBackend, JxrBitDepth, JxrDecoder, JxrImage, JxrPixelInfo};
pub use batch::BatchResult;
pub use converter::{Conversion, Converter, EncodedImage};
pub use error::{ConvertError, FileFailure, Result};
pub use naming::{output_stem, OutputNames};
pub use options::{ConvertOptions, OutputContainer};
