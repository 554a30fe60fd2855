//! # hdrshot-math
//!
//! Math primitives for color conversion.
//!
//! - [`Mat3`] - 3x3 matrices for color space transformations
//! - [`adapt_matrix`] - Bradford chromatic adaptation
//!
//! # Design
//!
//! All matrix operations assume **row-major** storage and **column vectors**:
//!
//! ```text
//! result = matrix * vector
//! ```
//!
//! A matrix taken from a system using the row-vector convention (`v * M`)
//! must be transposed before use. For a matrix between two RGB spaces
//! sharing a white point, every row sums to 1.0; [`Mat3::row_sums`] is the
//! check.
//!
//! Everything is `f64`: the ICtCp round trip has to close to 1e-9.
//!
//! # Usage
//!
//! ```rust
//! use hdrshot_math::Mat3;
//!
//! let rgb_to_xyz = Mat3::from_rows([
//!     [0.4124564, 0.3575761, 0.1804375],
//!     [0.2126729, 0.7151522, 0.0721750],
//!     [0.0193339, 0.1191920, 0.9503041],
//! ]);
//!
//! let xyz = rgb_to_xyz * [1.0, 0.5, 0.25];
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod adapt;
mod mat3;

pub use adapt::*;
pub use mat3::*;
