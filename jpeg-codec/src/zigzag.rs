//! Zig-zag ordering of the 64 DCT coefficients in an 8x8 block, per
//! ITU-T T.81 Figure A.6.

/// Maps a zig-zag scan position to its natural (row-major) position.
#[rustfmt::skip]
pub const UN_ZIGZAG: [usize; 64] = [
     0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Maps a natural (row-major) position to its zig-zag scan position; the
/// inverse permutation of [`UN_ZIGZAG`].
pub const ZIGZAG: [usize; 64] = {
    let mut table = [0usize; 64];
    let mut i = 0;
    while i < 64 {
        table[UN_ZIGZAG[i]] = i;
        i += 1;
    }
    table
};

/// Reorders a zig-zag scanned block into natural (row-major) order.
pub fn un_zigzag(block: &[i32; 64]) -> [i32; 64] {
    let mut out = [0i32; 64];
    for (i, &value) in block.iter().enumerate() {
        out[UN_ZIGZAG[i]] = value;
    }
    out
}

/// Reorders a natural (row-major) block into zig-zag scan order.
pub fn to_zigzag(block: &[i32; 64]) -> [i32; 64] {
    let mut out = [0i32; 64];
    for (i, &value) in block.iter().enumerate() {
        out[ZIGZAG[i]] = value;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zigzag_and_un_zigzag_are_inverses() {
        let mut block = [0i32; 64];
        for (i, v) in block.iter_mut().enumerate() {
            *v = i as i32;
        }
        let zig = to_zigzag(&block);
        assert_eq!(un_zigzag(&zig), block);
    }
}
