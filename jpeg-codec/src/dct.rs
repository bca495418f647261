//! Forward and inverse 8x8 discrete cosine transform, computed directly
//! from the textbook formula with a precomputed cosine table rather than a
//! fixed-point fast algorithm; this codec favours clarity over raw speed.

use std::f32::consts::PI;
use std::sync::OnceLock;

const BLOCK_DIM: usize = 8;
const BLOCK_SIZE: usize = BLOCK_DIM * BLOCK_DIM;

fn alpha(u: usize) -> f32 {
    if u == 0 {
        1.0 / std::f32::consts::SQRT_2
    } else {
        1.0
    }
}

struct CosineTable {
    /// `cos[x][u]` = `cos((2x + 1) * u * PI / 16)`
    cos: [[f32; BLOCK_DIM]; BLOCK_DIM],
}

fn cosine_table() -> &'static CosineTable {
    static TABLE: OnceLock<CosineTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut cos = [[0f32; BLOCK_DIM]; BLOCK_DIM];
        for (x, row) in cos.iter_mut().enumerate() {
            for (u, value) in row.iter_mut().enumerate() {
                *value = (((2 * x + 1) as f32) * (u as f32) * PI / 16.0).cos();
            }
        }
        CosineTable { cos }
    })
}

/// Levels-shifts samples into `[-128, 127]` and runs the forward 8x8 DCT,
/// per ITU-T T.81 equation (A-3).
pub fn forward_dct(samples: &[u8; BLOCK_SIZE]) -> [f32; BLOCK_SIZE] {
    let table = cosine_table();
    let mut shifted = [0f32; BLOCK_SIZE];
    for (i, &s) in samples.iter().enumerate() {
        shifted[i] = f32::from(s) - 128.0;
    }

    let mut out = [0f32; BLOCK_SIZE];
    for v in 0..BLOCK_DIM {
        for u in 0..BLOCK_DIM {
            let mut sum = 0.0f32;
            for y in 0..BLOCK_DIM {
                for x in 0..BLOCK_DIM {
                    sum += table.cos[x][u] * table.cos[y][v] * shifted[y * BLOCK_DIM + x];
                }
            }
            out[v * BLOCK_DIM + u] = 0.25 * alpha(u) * alpha(v) * sum;
        }
    }
    out
}

/// Runs the inverse 8x8 DCT and undoes the level shift, clamping back to a
/// valid sample range, per ITU-T T.81 equation (A-4).
pub fn inverse_dct(coefficients: &[f32; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    let table = cosine_table();
    let mut out = [0u8; BLOCK_SIZE];

    for y in 0..BLOCK_DIM {
        for x in 0..BLOCK_DIM {
            let mut sum = 0.0f32;
            for v in 0..BLOCK_DIM {
                for u in 0..BLOCK_DIM {
                    sum += alpha(u)
                        * alpha(v)
                        * coefficients[v * BLOCK_DIM + u]
                        * table.cos[x][u]
                        * table.cos[y][v];
                }
            }
            let sample = (0.25 * sum + 128.0).round();
            out[y * BLOCK_DIM + x] = sample.clamp(0.0, 255.0) as u8;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_block_round_trips_through_forward_and_inverse() {
        let samples = [128u8; BLOCK_SIZE];
        let coefficients = forward_dct(&samples);
        // a constant block has energy only in the DC term
        assert!(coefficients[1..].iter().all(|&c| c.abs() < 1e-3));
        let restored = inverse_dct(&coefficients);
        assert_eq!(restored, samples);
    }

    #[test]
    fn gradient_block_round_trips_within_rounding_error() {
        let mut samples = [0u8; BLOCK_SIZE];
        for (i, s) in samples.iter_mut().enumerate() {
            *s = (i * 3 % 256) as u8;
        }
        let coefficients = forward_dct(&samples);
        let restored = inverse_dct(&coefficients);
        for (a, b) in samples.iter().zip(restored.iter()) {
            assert!((i32::from(*a) - i32::from(*b)).abs() <= 1);
        }
    }
}
