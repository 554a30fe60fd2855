//! # hdrshot-transfer
//!
//! Transfer functions (OETF/EOTF) and half-float decoding.
//!
//! # Terminology
//!
//! - **OETF**: Linear -> Encoded
//! - **EOTF**: Encoded -> Linear
//!
//! # Linear scale
//!
//! Linear values are **scRGB**: 1.0 is 80 cd/m2. PQ code 1.0 is 10,000 cd/m2,
//! so the two scales differ by [`pq::MAX_PQ`] = 125.
//!
//! | Function | Use Case | Range |
//! |----------|----------|-------|
//! | [`srgb`] | SDR previews | [0, 1] |
//! | [`pq`] | Canonical HDR output (ST 2084) | scRGB [0, 125] |
//! | [`binary16`] | EXR / JPEG-XR half samples | - |
//!
//! None of these functions fail: negative light and NaN are clamped to 0.
//!
//! # Usage
//!
//! ```rust
//! use hdrshot_transfer::{pq, srgb};
//!
//! let code = pq::oetf(1.0); // 80 cd/m2
//! let back = pq::eotf(code);
//! assert!((back - 1.0).abs() < 1e-9);
//!
//! let display = srgb::oetf(0.18);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod binary16;
pub mod pq;
pub mod srgb;

pub use binary16::half_to_f32;
pub use pq::{eotf as pq_eotf, oetf as pq_oetf, MAX_PQ};
pub use srgb::{eotf as srgb_eotf, oetf as srgb_oetf, SrgbLut};
