//! Nearest-neighbor thumbnails of the 16-bit PQ buffer.
//!
//! Sampling picks existing code values, so PQ data is never averaged in
//! the non-linear domain.

/// Target size for a longest edge of `max_edge`, or `None` when the image
/// already fits.
pub fn fit(width: u32, height: u32, max_edge: u32) -> Option<(u32, u32)> {
    let max_edge = max_edge.max(1);
    let longest = width.max(height);
    if longest <= max_edge {
        return None;
    }
    let scale = |short: u32| {
        let v = (short as u64 * max_edge as u64 + longest as u64 / 2) / longest as u64;
        (v as u32).max(1)
    };
    Some(if width >= height {
        (max_edge, scale(height))
    } else {
        (scale(width), max_edge)
    })
}

/// Nearest-neighbor resample of interleaved samples.
///
/// Each destination pixel takes the source pixel under its center.
pub fn resize_nearest<T: Copy>(
    src: &[T],
    width: u32,
    height: u32,
    channels: usize,
    dst_width: u32,
    dst_height: u32,
) -> Vec<T> {
    let (w, h) = (width as usize, height as usize);
    let (dw, dh) = (dst_width as usize, dst_height as usize);
    let src_x: Vec<usize> = (0..dw).map(|x| ((2 * x + 1) * w / (2 * dw)).min(w - 1)).collect();

    let mut out = Vec::with_capacity(dw * dh * channels);
    for y in 0..dh {
        let sy = ((2 * y + 1) * h / (2 * dh)).min(h - 1);
        let row = &src[sy * w * channels..(sy + 1) * w * channels];
        for &sx in &src_x {
            out.extend_from_slice(&row[sx * channels..(sx + 1) * channels]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit() {
        assert_eq!(fit(1280, 720, 1280), None);
        assert_eq!(fit(3840, 2160, 1280), Some((1280, 720)));
        assert_eq!(fit(1000, 4000, 1280), Some((320, 1280)));
        assert_eq!(fit(100_000, 1, 1280), Some((1280, 1)));
    }

    #[test]
    fn test_halving_picks_existing_values() {
        // 4x2, one channel
        let src: Vec<u16> = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let out = resize_nearest(&src, 4, 2, 1, 2, 1);
        assert_eq!(out, vec![6, 8]);
    }

    #[test]
    fn test_channels_stay_together() {
        let src: Vec<u16> = (0..3 * 9).collect();
        let out = resize_nearest(&src, 3, 3, 3, 1, 1);
        // center pixel (1, 1)
        assert_eq!(out, vec![12, 13, 14]);
    }
}
