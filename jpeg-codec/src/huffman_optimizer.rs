//! Builds an optimal Huffman table from observed symbol frequencies,
//! following the procedure described in ITU-T T.81 Annex K.2.
//!
//! This is the encoder-side counterpart to [`crate::huffman::HuffmanTable`]:
//! rather than reading `bits`/`values` out of a `DHT` segment, it derives
//! them from how often each symbol actually occurred in the image being
//! encoded, which shortens the codes that matter most.

/// One more than the largest symbol value a DC or AC table can carry
/// (`0..=255`). Frequency index `256` is a sentinel: the algorithm gives it
/// exactly one occurrence so a "all ones" code is always reserved for it and
/// never assigned to a real symbol, satisfying the Annex K.2 requirement
/// that no codeword consist entirely of 1-bits.
const SENTINEL: usize = 256;
const TABLE_LEN: usize = 257;

/// One more than the deepest a merge tree over [`TABLE_LEN`] leaves can ever
/// get (a chain of `TABLE_LEN - 1` pairwise merges, Fibonacci-skewed
/// frequencies being the textbook way to hit that bound).
const MAX_CODE_LENGTH: usize = TABLE_LEN;

/// Accumulates symbol frequencies, then emits canonical `bits`/`values`
/// arrays suitable for [`HuffmanTable::build`](crate::huffman::HuffmanTable::build).
#[derive(Clone)]
pub struct FrequencyTable {
    freq: [u32; TABLE_LEN],
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self {
            freq: [0; TABLE_LEN],
        }
    }

    pub fn bump(&mut self, symbol: u8) {
        self.freq[symbol as usize] += 1;
    }

    /// Runs the Annex K.2 algorithm and returns `(bits, values)`.
    pub fn build_table(mut self) -> ([u8; 17], Vec<u8>) {
        self.freq[SENTINEL] = 1;

        let mut code_size = [0u32; TABLE_LEN];
        let mut others: [i32; TABLE_LEN] = [-1; TABLE_LEN];

        loop {
            // find the least-frequent nonzero entry, preferring the
            // largest index on ties so low symbol values stay shorter
            let mut c1 = None;
            for i in 0..TABLE_LEN {
                if self.freq[i] == 0 {
                    continue;
                }
                if c1.is_none_or(|c: usize| self.freq[i] <= self.freq[c]) {
                    c1 = Some(i);
                }
            }
            let Some(c1) = c1 else { break };

            // find the second least-frequent nonzero entry
            let mut c2 = None;
            for i in 0..TABLE_LEN {
                if i == c1 || self.freq[i] == 0 {
                    continue;
                }
                if c2.is_none_or(|c: usize| self.freq[i] <= self.freq[c]) {
                    c2 = Some(i);
                }
            }
            // only one live symbol left, done merging
            let Some(c2) = c2 else { break };

            self.freq[c1] += self.freq[c2];
            self.freq[c2] = 0;

            // every symbol already chained under c1 or c2 gets one more bit
            let mut node = c1 as i32;
            loop {
                code_size[node as usize] += 1;
                if others[node as usize] == -1 {
                    break;
                }
                node = others[node as usize];
            }
            others[node as usize] = c2 as i32;

            let mut node = c2 as i32;
            loop {
                code_size[node as usize] += 1;
                if others[node as usize] == -1 {
                    break;
                }
                node = others[node as usize];
            }
        }

        // tally every node, sentinel included: the sentinel always lands at
        // whichever length is currently deepest (it's the first and
        // smallest-frequency leaf merged), which is what keeps that bucket's
        // count even going into `limit_code_lengths` below.
        let mut bits_count = vec![0u32; MAX_CODE_LENGTH + 1];
        for &size in &code_size {
            if size > 0 {
                bits_count[size as usize] += 1;
            }
        }

        limit_code_lengths(&mut bits_count);

        // drop the sentinel's own slot now that limiting is done, so it
        // never shows up as a real symbol in `bits`/`values`. No real symbol
        // was ever bumped when nothing merged at all (a table nobody wrote
        // to), in which case there's no slot to drop.
        if bits_count.iter().any(|&count| count > 0) {
            let mut deepest = 16;
            while bits_count[deepest] == 0 {
                deepest -= 1;
            }
            bits_count[deepest] -= 1;
        }

        // `values` is ordered by each symbol's *pre-fold* merge depth, not
        // its post-fold one: `limit_code_lengths` only ever redistributes
        // counts across `bits_count`, so a symbol's original code_size no
        // longer names its final length once codes longer than 16 bits get
        // folded. Canonical code assignment in `HuffmanTable::build` derives
        // the actual length of each `values` entry purely from its position
        // against `bits`, so all that matters here is preserving the
        // frequency-based ordering (shortest original depth first, ties
        // broken by ascending symbol value) and emitting exactly as many
        // entries as `bits` calls for in total.
        let mut values = Vec::new();
        for length in 1..=MAX_CODE_LENGTH {
            let mut at_length: Vec<u8> = (0..=255u16)
                .filter(|&s| code_size[s as usize] == length as u32)
                .map(|s| s as u8)
                .collect();
            at_length.sort_unstable();
            values.extend(at_length);
        }

        let mut bits = [0u8; 17];
        for length in 1..=16usize {
            bits[length] = bits_count[length] as u8;
        }

        (bits, values)
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Redistributes code lengths longer than 16 bits, per Annex K.3 Figure
/// K.3's "limit to 16 bits" adjustment. Two sibling codes at the longest
/// length get merged into one code one bit shorter (`bits[i] -= 2;
/// bits[i-1] += 1`), and to keep the total code count unchanged, the
/// shortest code below the cutoff that still has room gets split into two
/// codes one bit longer (`bits[j] -= 1; bits[j+1] += 2`). Repeating this
/// until nothing remains above length 16 preserves the Kraft inequality.
fn limit_code_lengths(bits_count: &mut [u32]) {
    let max_length = bits_count.len() - 1;
    let mut i = max_length;
    while i > 16 {
        if bits_count[i] > 0 {
            let mut j = i - 2;
            while bits_count[j] == 0 {
                j -= 1;
            }
            bits_count[i] -= 2;
            bits_count[i - 1] += 1;
            bits_count[j + 1] += 2;
            bits_count[j] -= 1;
        } else {
            i -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman::HuffmanTable;

    #[test]
    fn skewed_frequencies_produce_a_valid_table() {
        let mut freq = FrequencyTable::new();
        for _ in 0..1000 {
            freq.bump(0);
        }
        for _ in 0..10 {
            freq.bump(5);
        }
        for symbol in 1..=4u8 {
            freq.bump(symbol);
        }

        let (bits, values) = freq.build_table();
        let table = HuffmanTable::build(bits, values).unwrap();
        // the most frequent symbol should get the shortest code
        assert_eq!(table.code_for(0).unwrap().length, 1);
    }

    #[test]
    fn fibonacci_skew_forces_code_lengths_past_16_bits_and_still_builds() {
        let mut freq = FrequencyTable::new();
        // Fibonacci-weighted frequencies are the classic way to force a
        // maximally unbalanced ("caterpillar") Huffman tree, one level
        // deeper per extra symbol. Starting at 2/3 (rather than the usual
        // 1/1) keeps every real symbol's frequency above the sentinel's
        // fixed count of 1, so the merge order isn't at the mercy of a tie
        // between the sentinel and symbol 0.
        let mut a: u32 = 2;
        let mut b: u32 = 3;
        let symbol_count = 40usize;
        for symbol in 0..symbol_count as u8 {
            freq.freq[symbol as usize] = a;
            let next = a + b;
            a = b;
            b = next;
        }

        let (bits, values) = freq.build_table();
        assert_eq!(values.len(), symbol_count);
        assert_eq!(
            bits[1..=16].iter().map(|&b| b as usize).sum::<usize>(),
            symbol_count
        );
        // the whole point of the skew: some code genuinely needs the full
        // 16 bits, which only happens once limit_code_lengths has folded a
        // merge depth greater than 16 back down.
        assert!(bits[16] > 0);

        let table = HuffmanTable::build(bits, values.clone()).unwrap();
        for &symbol in &values {
            assert!(table.code_for(symbol).unwrap().length <= 16);
        }
    }
}
