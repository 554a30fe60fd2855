//! # hdrshot-io
//!
//! Container codecs for the HDR screenshot pipeline. Everything works on
//! in-memory byte buffers; no function here touches the filesystem.
//!
//! | Format | Read | Write | Notes |
//! |--------|------|-------|-------|
//! | Radiance RGBE | Yes | No | flat and RLE scanlines, linear Rec.709 floats |
//! | OpenEXR | Yes | No | scan-line, NONE/ZIPS/ZIP, HALF/FLOAT |
//! | PNG | 8/16-bit RGB(A) | 8/16-bit RGB(A) | cICP tag, re-injection |
//! | AVIF | metadata | `nclx` patch | pixels come from an external codec |
//!
//! # Quick Start
//!
//! ```rust
//! use hdrshot_core::{Cicp, Samples};
//! use hdrshot_io::png::{self, ColorType};
//!
//! let samples = Samples::U16(vec![65535, 0, 0, 0, 65535, 0]);
//! let bytes = png::encode_png(&samples, 2, 1, ColorType::Rgb, Some(Cicp::BT2020_PQ))?;
//! let image = png::decode(&bytes)?;
//! assert_eq!(image.samples, samples);
//! # Ok::<(), hdrshot_io::IoError>(())
//! ```
//!
//! # Modules
//!
//! - [`hdr`] - Radiance RGBE reader
//! - [`exr`] - OpenEXR scan-line reader
//! - [`png`] - PNG reader, encoder, cICP re-injection
//! - [`isobmff`] - Bounded ISOBMFF box walker
//! - [`avif`] - AVIF colour metadata and `nclx` patching
//! - [`detect`] - Format detection
//! - [`probe`] - Header-only SDR rejection

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod avif;
pub mod detect;
mod error;
pub mod exr;
pub mod hdr;
pub mod isobmff;
pub mod png;
pub mod probe;
pub mod zlib;

pub use avif::AvifMetadata;
pub use detect::Format;
pub use error::{IoError, IoResult};
pub use probe::{probe, Verdict};
