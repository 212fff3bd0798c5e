//! `LookaheadSet`: a fixed-width, word-packed bitset over `{eof} ∪ terminals`.
//!
//! Bit 0 is eof; bit `i + 1` is terminal `i`. Every set created for the same
//! grammar has the same width, so bulk bitwise ops touch the same number of
//! words regardless of which terminals happen to be present — this is what
//! lets `merge` be a plain elementwise OR instead of a set union with
//! resizing.
//!
//! The eof bit is overloaded: `FirstSets` (see `first.rs`) reuses it to mean
//! "this symbol sequence can derive the empty string," not "the end of
//! input follows." The bitset itself is value-neutral; callers must know
//! which meaning applies in their context. This overload is the design
//! documented in spec §4.3/§4.1/§9 rather than an oversight.

use crate::symbol::Lookahead;
use std::fmt;

const WORD_BITS: usize = u64::BITS as usize;

/// Dense bitset over lookahead elements, sized `ceil((terminal_count + 1) / 64)`
/// machine words wide.
#[derive(Clone, PartialEq, Eq)]
pub struct LookaheadSet {
    words: Vec<u64>,
    width_bits: usize,
}

impl LookaheadSet {
    /// A zero-initialized set sized for a grammar with `terminal_count` terminals.
    pub fn empty(terminal_count: usize) -> Self {
        let width_bits = terminal_count + 1;
        let word_count = width_bits.div_ceil(WORD_BITS);
        Self {
            words: vec![0; word_count],
            width_bits,
        }
    }

    fn bit_index(&self, la: Lookahead) -> usize {
        match la {
            Lookahead::Eof => 0,
            Lookahead::Terminal(t) => t + 1,
        }
    }

    pub fn insert(&mut self, la: Lookahead) -> bool {
        let bit = self.bit_index(la);
        let word = bit / WORD_BITS;
        let mask = 1u64 << (bit % WORD_BITS);
        let before = self.words[word];
        self.words[word] |= mask;
        self.words[word] != before
    }

    pub fn remove(&mut self, la: Lookahead) -> bool {
        let bit = self.bit_index(la);
        let word = bit / WORD_BITS;
        let mask = 1u64 << (bit % WORD_BITS);
        let before = self.words[word];
        self.words[word] &= !mask;
        self.words[word] != before
    }

    pub fn contains(&self, la: Lookahead) -> bool {
        let bit = self.bit_index(la);
        let word = bit / WORD_BITS;
        let mask = 1u64 << (bit % WORD_BITS);
        self.words[word] & mask != 0
    }

    pub fn clear(&mut self) {
        for w in &mut self.words {
            *w = 0;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Elementwise OR. Returns `true` iff any word actually gained bits —
    /// fixed-point loops terminate on this return being `false`.
    pub fn merge(&mut self, other: &Self) -> bool {
        debug_assert_eq!(self.width_bits, other.width_bits);
        let mut changed = false;
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            let before = *a;
            *a |= b;
            if *a != before {
                changed = true;
            }
        }
        changed
    }

    /// Yields elements in ascending bit order, skipping all-zero words in bulk.
    pub fn iter(&self) -> impl Iterator<Item = Lookahead> + '_ {
        self.words.iter().enumerate().flat_map(move |(wi, &word)| {
            let base = wi * WORD_BITS;
            (0..WORD_BITS).filter_map(move |b| {
                if word & (1u64 << b) == 0 {
                    return None;
                }
                let bit = base + b;
                if bit >= self.width_bits {
                    return None;
                }
                Some(if bit == 0 {
                    Lookahead::Eof
                } else {
                    Lookahead::Terminal(bit - 1)
                })
            })
        })
    }
}

impl fmt::Debug for LookaheadSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_contains_roundtrip() {
        let mut set = LookaheadSet::empty(3);
        assert!(!set.contains(Lookahead::Eof));
        assert!(set.insert(Lookahead::Terminal(2)));
        assert!(set.contains(Lookahead::Terminal(2)));
        assert!(!set.insert(Lookahead::Terminal(2)));
    }

    #[test]
    fn merge_reports_change() {
        let mut a = LookaheadSet::empty(4);
        let mut b = LookaheadSet::empty(4);
        b.insert(Lookahead::Terminal(1));
        assert!(a.merge(&b));
        assert!(!a.merge(&b));
        assert!(a.contains(Lookahead::Terminal(1)));
    }

    #[test]
    fn iter_order_spans_word_boundary() {
        let mut set = LookaheadSet::empty(130);
        set.insert(Lookahead::Eof);
        set.insert(Lookahead::Terminal(63));
        set.insert(Lookahead::Terminal(64));
        set.insert(Lookahead::Terminal(129));
        let got: Vec<_> = set.iter().collect();
        assert_eq!(
            got,
            vec![
                Lookahead::Eof,
                Lookahead::Terminal(63),
                Lookahead::Terminal(64),
                Lookahead::Terminal(129),
            ]
        );
    }

    #[test]
    fn clear_empties_all_words() {
        let mut set = LookaheadSet::empty(200);
        set.insert(Lookahead::Terminal(150));
        set.clear();
        assert!(set.is_empty());
    }
}
