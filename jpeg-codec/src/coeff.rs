//! DC differential and AC run-length coefficient coding, per ITU-T T.81
//! section F.1.2 / F.2.2.

use crate::bitstream::{extend, magnitude_and_bits, BitReader, BitWriter};
use crate::errors::DecodeErrors;
use crate::huffman::HuffmanTable;
use crate::zigzag::UN_ZIGZAG;

/// Run length of 16 zero coefficients with no following nonzero value,
/// coded as symbol `0xF0` (run=15, size=0).
const ZRL: u8 = 0xF0;
/// End-of-block: all remaining coefficients in the zig-zag scan are zero.
const EOB: u8 = 0x00;

/// Decodes one 8x8 block's worth of coefficients (DC + 63 AC) in natural
/// (row-major) order, ready for dequantization.
pub fn decode_block(
    reader: &mut BitReader,
    dc_table: &HuffmanTable,
    ac_table: &HuffmanTable,
    dc_predictor: &mut i32,
) -> Result<[i32; 64], DecodeErrors> {
    let mut zigzag = [0i32; 64];

    let dc_size = dc_table.decode(reader)?;
    if dc_size > 11 {
        return Err(DecodeErrors::InvalidCode(
            "dc coefficient magnitude over 11 bits",
        ));
    }
    let dc_diff = extend(reader.get_bits(dc_size), dc_size);
    *dc_predictor += dc_diff;
    zigzag[0] = *dc_predictor;

    let mut k = 1usize;
    while k < 64 {
        let rs = ac_table.decode(reader)?;
        let run = rs >> 4;
        let size = rs & 0x0F;

        if size == 0 {
            if run == 15 {
                // ZRL: skip 16 zero coefficients and keep scanning
                k += 16;
                continue;
            }
            // EOB: everything from here on is zero
            break;
        }

        k += run as usize;
        if k >= 64 {
            return Err(DecodeErrors::Format(
                "ac run length ran past the end of a block".into(),
            ));
        }
        zigzag[k] = extend(reader.get_bits(size), size);
        k += 1;
    }

    let mut block = [0i32; 64];
    for (i, &value) in zigzag.iter().enumerate() {
        block[UN_ZIGZAG[i]] = value;
    }
    Ok(block)
}

/// Encodes one 8x8 block's coefficients (given in natural order) into
/// `writer`, updating `dc_predictor` for the next block in this component.
pub fn encode_block(
    writer: &mut BitWriter,
    block: &[i32; 64],
    dc_table: &HuffmanTable,
    ac_table: &HuffmanTable,
    dc_predictor: &mut i32,
) {
    let mut zigzag = [0i32; 64];
    for (i, &natural_index) in UN_ZIGZAG.iter().enumerate() {
        zigzag[i] = block[natural_index];
    }

    let dc_diff = zigzag[0] - *dc_predictor;
    *dc_predictor = zigzag[0];
    let (dc_size, dc_bits) = magnitude_and_bits(dc_diff);
    let dc_code = dc_table.code_for(dc_size).expect("dc table missing symbol");
    writer.put_bits(dc_code.code, dc_code.length);
    writer.put_bits(dc_bits, dc_size);

    let last_nonzero = zigzag[1..].iter().rposition(|&v| v != 0).map(|i| i + 1);
    let Some(last_nonzero) = last_nonzero else {
        let eob = ac_table.code_for(EOB).expect("ac table missing eob symbol");
        writer.put_bits(eob.code, eob.length);
        return;
    };

    let mut run = 0u8;
    for &value in &zigzag[1..=last_nonzero] {
        if value == 0 {
            run += 1;
            if run == 16 {
                let zrl = ac_table.code_for(ZRL).expect("ac table missing zrl symbol");
                writer.put_bits(zrl.code, zrl.length);
                run = 0;
            }
            continue;
        }
        let (size, bits) = magnitude_and_bits(value);
        let symbol = (run << 4) | size;
        let code = ac_table
            .code_for(symbol)
            .expect("ac table missing ac symbol");
        writer.put_bits(code.code, code.length);
        writer.put_bits(bits, size);
        run = 0;
    }

    if last_nonzero < 63 {
        let eob = ac_table.code_for(EOB).expect("ac table missing eob symbol");
        writer.put_bits(eob.code, eob.length);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_tables::*;

    #[test]
    fn encode_then_decode_recovers_a_sparse_block() {
        let dc_table = HuffmanTable::build(DC_LUMA_BITS, DC_LUMA_VALUES.to_vec()).unwrap();
        let ac_table = HuffmanTable::build(AC_LUMA_BITS, AC_LUMA_VALUES.to_vec()).unwrap();

        let mut block = [0i32; 64];
        block[0] = 40;
        block[1] = -3;
        block[8] = 5;
        block[63] = 1;

        let mut writer = BitWriter::new();
        let mut predictor = 0;
        encode_block(&mut writer, &block, &dc_table, &ac_table, &mut predictor);
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        let mut decode_predictor = 0;
        let decoded =
            decode_block(&mut reader, &dc_table, &ac_table, &mut decode_predictor).unwrap();
        assert_eq!(decoded, block);
        assert_eq!(decode_predictor, 40);
    }

    #[test]
    fn all_zero_block_round_trips_as_a_bare_eob() {
        let dc_table = HuffmanTable::build(DC_LUMA_BITS, DC_LUMA_VALUES.to_vec()).unwrap();
        let ac_table = HuffmanTable::build(AC_LUMA_BITS, AC_LUMA_VALUES.to_vec()).unwrap();

        let block = [0i32; 64];
        let mut writer = BitWriter::new();
        let mut predictor = 5;
        encode_block(&mut writer, &block, &dc_table, &ac_table, &mut predictor);
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        let mut decode_predictor = 5;
        let decoded =
            decode_block(&mut reader, &dc_table, &ac_table, &mut decode_predictor).unwrap();
        assert_eq!(decoded, block);
    }

    #[test]
    fn run_of_exactly_sixteen_zeros_uses_zrl() {
        let dc_table = HuffmanTable::build(DC_LUMA_BITS, DC_LUMA_VALUES.to_vec()).unwrap();
        let ac_table = HuffmanTable::build(AC_LUMA_BITS, AC_LUMA_VALUES.to_vec()).unwrap();

        let mut block = [0i32; 64];
        block[0] = 1;
        block[UN_ZIGZAG[17]] = 7; // nonzero after 16 leading zero ACs

        let mut writer = BitWriter::new();
        let mut predictor = 0;
        encode_block(&mut writer, &block, &dc_table, &ac_table, &mut predictor);
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        let mut decode_predictor = 0;
        let decoded =
            decode_block(&mut reader, &dc_table, &ac_table, &mut decode_predictor).unwrap();
        assert_eq!(decoded, block);
    }
}
