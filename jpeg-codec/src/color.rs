//! YCbCr <-> RGB colour conversion, per ITU-T T.81 Annex A.4 / E.1.

#[inline]
fn clamp_to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Converts one YCbCr pixel to RGB.
#[inline]
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let y = f32::from(y);
    let cb = f32::from(cb) - 128.0;
    let cr = f32::from(cr) - 128.0;

    let r = y + 1.402 * cr;
    let g = y - 0.344_14 * cb - 0.714_14 * cr;
    let b = y + 1.772 * cb;

    [clamp_to_u8(r), clamp_to_u8(g), clamp_to_u8(b)]
}

/// Converts one RGB pixel to YCbCr.
#[inline]
pub fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> [u8; 3] {
    let r = f32::from(r);
    let g = f32::from(g);
    let b = f32::from(b);

    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = 128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b;
    let cr = 128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b;

    [clamp_to_u8(y), clamp_to_u8(cb), clamp_to_u8(cr)]
}

/// Converts a full plane of YCbCr samples to interleaved RGB.
pub fn ycbcr_slice_to_rgb(y: &[u8], cb: &[u8], cr: &[u8], out: &mut [u8]) {
    debug_assert_eq!(y.len(), cb.len());
    debug_assert_eq!(y.len(), cr.len());
    debug_assert_eq!(out.len(), y.len() * 3);

    for (i, ((&y, &cb), &cr)) in y.iter().zip(cb.iter()).zip(cr.iter()).enumerate() {
        let [r, g, b] = ycbcr_to_rgb(y, cb, cr);
        out[i * 3] = r;
        out[i * 3 + 1] = g;
        out[i * 3 + 2] = b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_pixels_round_trip_exactly() {
        for level in [0u8, 16, 128, 200, 255] {
            let ycbcr = rgb_to_ycbcr(level, level, level);
            assert_eq!(ycbcr, [level, 128, 128]);
            let rgb = ycbcr_to_rgb(ycbcr[0], ycbcr[1], ycbcr[2]);
            assert_eq!(rgb, [level, level, level]);
        }
    }

    #[test]
    fn primary_colors_round_trip_within_rounding_error() {
        for rgb in [[255u8, 0, 0], [0, 255, 0], [0, 0, 255], [12, 200, 90]] {
            let [y, cb, cr] = rgb_to_ycbcr(rgb[0], rgb[1], rgb[2]);
            let restored = ycbcr_to_rgb(y, cb, cr);
            for (a, b) in rgb.iter().zip(restored.iter()) {
                assert!((i32::from(*a) - i32::from(*b)).abs() <= 2);
            }
        }
    }
}
