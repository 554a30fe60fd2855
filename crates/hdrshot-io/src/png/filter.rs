//! Scanline filter reconstruction.
//!
//! Each row starts with a filter byte; reconstruction is per byte against
//! `a` (the byte `bpp` to the left), `b` (above) and `c` (above-left), all
//! already reconstructed.

use crate::{IoError, IoResult};

/// Filter type of a scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    /// Raw bytes.
    None,
    /// Difference to the left.
    Sub,
    /// Difference to above.
    Up,
    /// Difference to the floor average of left and above.
    Average,
    /// Difference to the Paeth predictor.
    Paeth,
}

impl FilterType {
    /// Maps the filter byte.
    pub fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            0 => Self::None,
            1 => Self::Sub,
            2 => Self::Up,
            3 => Self::Average,
            4 => Self::Paeth,
            _ => return None,
        })
    }
}

/// Paeth predictor, branch-light formulation.
#[inline]
pub fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let a = i32::from(a);
    let b = i32::from(b);
    let c = i32::from(c);
    let thresh = c * 3 - (a + b);
    let lo = a.min(b);
    let hi = a.max(b);
    let t0 = if hi <= thresh { lo } else { c };
    let t1 = if thresh <= lo { hi } else { t0 };
    t1 as u8
}

/// Reconstructs `height` filtered rows of `row_bytes` each.
///
/// `data` holds `height * (1 + row_bytes)` bytes; `bpp` is bytes per
/// complete pixel (at least 1).
pub fn unfilter(data: &[u8], height: usize, row_bytes: usize, bpp: usize) -> IoResult<Vec<u8>> {
    let stride = row_bytes + 1;
    if data.len() < height * stride {
        return Err(IoError::DecodeError(format!(
            "PNG image data holds {} bytes, expected {}",
            data.len(),
            height * stride
        )));
    }

    let mut out = vec![0u8; height * row_bytes];
    for y in 0..height {
        let line = &data[y * stride..(y + 1) * stride];
        let filter = FilterType::from_byte(line[0])
            .ok_or_else(|| IoError::DecodeError(format!("PNG row {y} has filter {}", line[0])))?;
        let src = &line[1..];

        let (done, rest) = out.split_at_mut(y * row_bytes);
        let prev = if y == 0 { None } else { Some(&done[(y - 1) * row_bytes..]) };
        let cur = &mut rest[..row_bytes];

        for i in 0..row_bytes {
            let a = if i >= bpp { cur[i - bpp] } else { 0 };
            let b = prev.map_or(0, |p| p[i]);
            let c = match prev {
                Some(p) if i >= bpp => p[i - bpp],
                _ => 0,
            };
            let predicted = match filter {
                FilterType::None => 0,
                FilterType::Sub => a,
                FilterType::Up => b,
                FilterType::Average => ((a as u16 + b as u16) / 2) as u8,
                FilterType::Paeth => paeth(a, b, c),
            };
            cur[i] = src[i].wrapping_add(predicted);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paeth_reference(a: u8, b: u8, c: u8) -> u8 {
        let p = a as i32 + b as i32 - c as i32;
        let pa = (p - a as i32).abs();
        let pb = (p - b as i32).abs();
        let pc = (p - c as i32).abs();
        if pa <= pb && pa <= pc {
            a
        } else if pb <= pc {
            b
        } else {
            c
        }
    }

    #[test]
    fn test_paeth_matches_reference() {
        for a in (0..=255u8).step_by(5) {
            for b in (0..=255u8).step_by(7) {
                for c in (0..=255u8).step_by(3) {
                    assert_eq!(paeth(a, b, c), paeth_reference(a, b, c), "{a} {b} {c}");
                }
            }
        }
    }

    /// Filters `rows` with `filter` the way an encoder would.
    fn filter_rows(rows: &[Vec<u8>], filter: u8, bpp: usize) -> Vec<u8> {
        let mut out = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            out.push(filter);
            for i in 0..row.len() {
                let a = if i >= bpp { row[i - bpp] } else { 0 };
                let b = if y > 0 { rows[y - 1][i] } else { 0 };
                let c = if y > 0 && i >= bpp { rows[y - 1][i - bpp] } else { 0 };
                let p = match filter {
                    0 => 0,
                    1 => a,
                    2 => b,
                    3 => ((a as u16 + b as u16) / 2) as u8,
                    _ => paeth_reference(a, b, c),
                };
                out.push(row[i].wrapping_sub(p));
            }
        }
        out
    }

    #[test]
    fn test_all_filters_reconstruct() {
        let rows: Vec<Vec<u8>> = (0..5)
            .map(|y| (0..24).map(|x| ((x * 31 + y * 17) % 256) as u8).collect())
            .collect();
        let expected: Vec<u8> = rows.concat();
        for filter in 0..=4 {
            for bpp in [3, 6, 8] {
                let filtered = filter_rows(&rows, filter, bpp);
                assert_eq!(unfilter(&filtered, 5, 24, bpp).unwrap(), expected, "filter {filter}");
            }
        }
    }

    #[test]
    fn test_bad_filter_byte() {
        assert!(unfilter(&[5, 0, 0, 0], 1, 3, 3).is_err());
        assert!(unfilter(&[0, 0], 1, 3, 3).is_err());
    }
}
