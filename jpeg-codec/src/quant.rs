//! Quantization tables and the (de)quantization step, per ITU-T T.81
//! section A.3.4 and Annex K.1.

/// A quantization table, stored in natural (row-major) order.
#[derive(Copy, Clone)]
pub struct QTable {
    pub values: [u16; 64],
}

impl QTable {
    pub const fn new(values: [u16; 64]) -> Self {
        Self { values }
    }

    /// Multiply a natural-order dequantized block back down by this table,
    /// used on the encode side after the forward DCT.
    pub fn quantize(&self, block: &[f32; 64]) -> [i32; 64] {
        let mut out = [0i32; 64];
        for i in 0..64 {
            out[i] = (block[i] / f32::from(self.values[i])).round() as i32;
        }
        out
    }

    /// Scale a natural-order coefficient block back up into the DCT
    /// domain, used on the decode side before the inverse DCT.
    #[allow(clippy::cast_precision_loss)]
    pub fn dequantize(&self, block: &[i32; 64]) -> [f32; 64] {
        let mut out = [0f32; 64];
        for i in 0..64 {
            out[i] = block[i] as f32 * f32::from(self.values[i]);
        }
        out
    }
}

/// Annex K.1 Table K.1, the base (quality 50) luminance quantization table.
#[rustfmt::skip]
pub const BASE_LUMA_QTABLE: [u16; 64] = [
    16, 11, 10, 16,  24,  40,  51,  61,
    12, 12, 14, 19,  26,  58,  60,  55,
    14, 13, 16, 24,  40,  57,  69,  56,
    14, 17, 22, 29,  51,  87,  80,  62,
    18, 22, 37, 56,  68, 109, 103,  77,
    24, 35, 55, 64,  81, 104, 113,  92,
    49, 64, 78, 87, 103, 121, 120, 101,
    72, 92, 95, 98, 112, 100, 103,  99,
];

/// Annex K.1 Table K.2, the base (quality 50) chrominance quantization table.
#[rustfmt::skip]
pub const BASE_CHROMA_QTABLE: [u16; 64] = [
    17, 18, 24, 47, 99, 99, 99, 99,
    18, 21, 26, 66, 99, 99, 99, 99,
    24, 26, 56, 99, 99, 99, 99, 99,
    47, 66, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
];

/// Scales a base quantization table to a given 1-100 quality level, per the
/// standard Annex K.1 scaling factor used by reference encoders.
pub fn scale_qtable(base: &[u16; 64], quality: u8) -> [u16; 64] {
    let quality = u32::from(quality.clamp(1, 100));
    let scale = if quality < 50 {
        5000 / quality
    } else {
        200 - quality * 2
    };

    let mut out = [0u16; 64];
    for (i, &value) in base.iter().enumerate() {
        let scaled = (u32::from(value) * scale + 50) / 100;
        out[i] = scaled.clamp(1, 255) as u16;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dequantize_then_quantize_round_trips() {
        let table = QTable::new(BASE_LUMA_QTABLE);
        let mut block = [0i32; 64];
        for (i, v) in block.iter_mut().enumerate() {
            *v = (i as i32) - 32;
        }
        let dequantized = table.dequantize(&block);
        assert_eq!(table.quantize(&dequantized), block);
    }

    #[test]
    fn quality_100_produces_the_mildest_table() {
        let scaled = scale_qtable(&BASE_LUMA_QTABLE, 100);
        assert!(scaled.iter().all(|&v| v <= 2));
    }
}
