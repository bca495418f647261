//! Canonical Huffman table construction and symbol coding, per ITU-T T.81
//! Annex C.

use crate::bitstream::BitReader;
use crate::errors::DecodeErrors;

/// A single symbol's canonical code, used on the encode side.
#[derive(Copy, Clone, Debug, Default)]
pub struct HCode {
    pub code: u16,
    pub length: u8,
}

/// A Huffman table as it appears in a `DHT` segment: up to 16 code lengths
/// and the symbols assigned to them in order, plus the tables derived from
/// that specification needed for decoding and encoding.
pub struct HuffmanTable {
    /// `bits[l]` = number of symbols with an `l`-bit code, 1-indexed.
    bits: [u8; 17],
    /// Symbols ordered by increasing code length, then by code value.
    values: Vec<u8>,

    /// Annex F.2.2.3 `DECODE` procedure tables, one entry per code length.
    mincode: [i32; 17],
    maxcode: [i32; 17],
    valptr: [i32; 17],

    /// Canonical code assigned to every possible symbol value (0..=255),
    /// `None` if the symbol isn't present in this table. Used for encoding.
    codes: [Option<HCode>; 256],
}

impl HuffmanTable {
    /// Build decode and encode tables from a `DHT` segment's `bits`/`values`
    /// arrays, following Annex C Figures C.1-C.3.
    pub fn build(bits: [u8; 17], values: Vec<u8>) -> Result<Self, DecodeErrors> {
        let mut huff_size = [0u8; 257];
        let mut huff_code = [0u32; 257];

        // Figures C.1/C.2: one canonical code per symbol, assigned in table
        // order, shortest codes first and incrementing within a length;
        // `code` doubles at every length boundary whether or not that length
        // carries any symbols, so gaps in the length distribution are handled
        // for free.
        let mut code = 0u32;
        let mut p = 0usize;
        for (length, &count) in bits.iter().enumerate().skip(1) {
            for _ in 0..count {
                huff_code[p] = code;
                huff_size[p] = length as u8;
                code += 1;
                p += 1;
            }
            if code > (1u32 << length) {
                return Err(DecodeErrors::Format(
                    "huffman table codes overflow their bit length".into(),
                ));
            }
            code <<= 1;
        }
        let num_symbols = p;
        if num_symbols != values.len() {
            return Err(DecodeErrors::Format(format!(
                "huffman table declares {num_symbols} codes but carries {} values",
                values.len()
            )));
        }

        // Figure F.15 / F.16: per-length decode tables.
        let mut mincode = [0i32; 17];
        let mut maxcode = [-1i32; 17];
        let mut valptr = [0i32; 17];
        p = 0;
        for length in 1..=16usize {
            if bits[length] == 0 {
                continue;
            }
            valptr[length] = p as i32;
            mincode[length] = huff_code[p] as i32;
            p += bits[length] as usize;
            maxcode[length] = huff_code[p - 1] as i32;
        }

        let mut codes: [Option<HCode>; 256] = [None; 256];
        for i in 0..num_symbols {
            codes[values[i] as usize] = Some(HCode {
                code: huff_code[i] as u16,
                length: huff_size[i],
            });
        }

        Ok(Self {
            bits,
            values,
            mincode,
            maxcode,
            valptr,
            codes,
        })
    }

    /// Decode one symbol from `reader`, per Annex F.2.2.3.
    pub fn decode(&self, reader: &mut BitReader) -> Result<u8, DecodeErrors> {
        let mut code = i32::from(reader.get_bit());
        let mut length = 1usize;

        while length <= 16 && (self.maxcode[length] == -1 || code > self.maxcode[length]) {
            code = (code << 1) | i32::from(reader.get_bit());
            length += 1;
        }

        if length > 16 {
            return Err(DecodeErrors::InvalidCode(
                "huffman code longer than 16 bits",
            ));
        }

        let index = (self.valptr[length] + (code - self.mincode[length])) as usize;
        self.values
            .get(index)
            .copied()
            .ok_or(DecodeErrors::InvalidCode(
                "huffman code decoded to no symbol",
            ))
    }

    /// Canonical code for `symbol`, used by the entropy encoder.
    pub fn code_for(&self, symbol: u8) -> Option<HCode> {
        self.codes[symbol as usize]
    }

    pub fn bits(&self) -> &[u8; 17] {
        &self.bits
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream::BitWriter;

    fn single_letter_table() -> HuffmanTable {
        // 'a' -> 2 bits, 'b' -> 1 bit, 'c' -> 2 bits (a tiny valid tree)
        let mut bits = [0u8; 17];
        bits[1] = 1;
        bits[2] = 2;
        HuffmanTable::build(bits, vec![b'b', b'a', b'c']).unwrap()
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let table = single_letter_table();
        let mut writer = BitWriter::new();
        for symbol in [b'a', b'b', b'c', b'b'] {
            let code = table.code_for(symbol).unwrap();
            writer.put_bits(code.code, code.length);
        }
        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);

        for expected in [b'a', b'b', b'c', b'b'] {
            assert_eq!(table.decode(&mut reader).unwrap(), expected);
        }
    }
}
