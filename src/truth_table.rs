// SPDX-License-Identifier: Apache-2.0

//! Dynamically sized single-output Boolean function truth tables.
//!
//! Bit `i` of the table holds the output value on the input assignment
//! encoded by `i`, where variable `0` is the least-significant selector bit
//! and toggles fastest. Tables with fewer than six variables live in the low
//! bits of a single word and the unused high bits are always zero.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const MAX_VARS: usize = 20;

const VAR_PATTERNS: [u64; 6] = [
    0xAAAA_AAAA_AAAA_AAAA,
    0xCCCC_CCCC_CCCC_CCCC,
    0xF0F0_F0F0_F0F0_F0F0,
    0xFF00_FF00_FF00_FF00,
    0xFFFF_0000_FFFF_0000,
    0xFFFF_FFFF_0000_0000,
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TruthTable {
    num_vars: usize,
    words: Vec<u64>,
}

fn num_words(num_vars: usize) -> usize {
    if num_vars <= 6 {
        1
    } else {
        1 << (num_vars - 6)
    }
}

fn word_mask(num_vars: usize) -> u64 {
    if num_vars >= 6 {
        u64::MAX
    } else {
        (1u64 << (1u32 << num_vars)) - 1
    }
}

impl Default for TruthTable {
    fn default() -> Self {
        Self::const0(0)
    }
}

impl TruthTable {
    pub fn const0(num_vars: usize) -> Self {
        assert!(
            num_vars <= MAX_VARS,
            "truth table with {} variables exceeds the limit of {}",
            num_vars,
            MAX_VARS
        );
        Self {
            num_vars,
            words: vec![0; num_words(num_vars)],
        }
    }

    pub fn const1(num_vars: usize) -> Self {
        Self::const0(num_vars).not()
    }

    /// Projection onto variable `index`.
    pub fn var(num_vars: usize, index: usize) -> Self {
        assert!(
            index < num_vars,
            "variable index {} out of range for {} variables",
            index,
            num_vars
        );
        let mut tt = Self::const0(num_vars);
        if index < 6 {
            for w in tt.words.iter_mut() {
                *w = VAR_PATTERNS[index];
            }
        } else {
            let stride = index - 6;
            for (i, w) in tt.words.iter_mut().enumerate() {
                if (i >> stride) & 1 == 1 {
                    *w = u64::MAX;
                }
            }
        }
        tt.mask_off();
        tt
    }

    /// Builds a table with up to six variables from its raw bit pattern.
    pub fn from_u64(num_vars: usize, bits: u64) -> Self {
        assert!(num_vars <= 6, "from_u64 supports at most 6 variables");
        let mut tt = Self::const0(num_vars);
        tt.words[0] = bits;
        tt.mask_off();
        tt
    }

    fn mask_off(&mut self) {
        if self.num_vars < 6 {
            self.words[0] &= word_mask(self.num_vars);
        }
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_bits(&self) -> usize {
        1 << self.num_vars
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    #[inline]
    pub fn get_bit(&self, index: usize) -> bool {
        debug_assert!(index < self.num_bits());
        (self.words[index >> 6] >> (index & 63)) & 1 == 1
    }

    #[inline]
    pub fn set_bit(&mut self, index: usize, value: bool) {
        debug_assert!(index < self.num_bits());
        let mask = 1u64 << (index & 63);
        if value {
            self.words[index >> 6] |= mask;
        } else {
            self.words[index >> 6] &= !mask;
        }
    }

    pub fn is_const0(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    pub fn is_const1(&self) -> bool {
        self.not().is_const0()
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn not(&self) -> Self {
        let mut out = Self {
            num_vars: self.num_vars,
            words: self.words.iter().map(|w| !w).collect(),
        };
        out.mask_off();
        out
    }

    fn binary(&self, other: &Self, op: impl Fn(u64, u64) -> u64) -> Self {
        assert_eq!(
            self.num_vars, other.num_vars,
            "binary operation on truth tables of different arity"
        );
        let mut out = Self {
            num_vars: self.num_vars,
            words: self
                .words
                .iter()
                .zip(other.words.iter())
                .map(|(a, b)| op(*a, *b))
                .collect(),
        };
        out.mask_off();
        out
    }

    pub fn and(&self, other: &Self) -> Self {
        self.binary(other, |a, b| a & b)
    }

    pub fn or(&self, other: &Self) -> Self {
        self.binary(other, |a, b| a | b)
    }

    pub fn xor(&self, other: &Self) -> Self {
        self.binary(other, |a, b| a ^ b)
    }

    pub fn maj(a: &Self, b: &Self, c: &Self) -> Self {
        a.and(b).or(&a.and(c)).or(&b.and(c))
    }

    pub fn ite(cond: &Self, then: &Self, els: &Self) -> Self {
        cond.and(then).or(&cond.not().and(els))
    }

    /// Negates the table when `negate` is set.
    pub fn with_polarity(&self, negate: bool) -> Self {
        if negate { self.not() } else { self.clone() }
    }

    /// Negative cofactor with respect to `var`; the result keeps the arity.
    pub fn cofactor0(&self, var: usize) -> Self {
        assert!(var < self.num_vars);
        let mut out = self.clone();
        if var < 6 {
            let shift = 1u32 << var;
            for w in out.words.iter_mut() {
                let low = *w & !VAR_PATTERNS[var];
                *w = low | (low << shift);
            }
        } else {
            let step = 1usize << (var - 6);
            for i in 0..out.words.len() {
                if (i >> (var - 6)) & 1 == 1 {
                    out.words[i] = out.words[i - step];
                }
            }
        }
        out.mask_off();
        out
    }

    /// Positive cofactor with respect to `var`; the result keeps the arity.
    pub fn cofactor1(&self, var: usize) -> Self {
        assert!(var < self.num_vars);
        let mut out = self.clone();
        if var < 6 {
            let shift = 1u32 << var;
            for w in out.words.iter_mut() {
                let high = *w & VAR_PATTERNS[var];
                *w = high | (high >> shift);
            }
        } else {
            let step = 1usize << (var - 6);
            for i in 0..out.words.len() {
                if (i >> (var - 6)) & 1 == 1 {
                    out.words[i - step] = out.words[i];
                }
            }
        }
        out.mask_off();
        out
    }

    pub fn has_var(&self, var: usize) -> bool {
        self.cofactor0(var) != self.cofactor1(var)
    }

    /// Variables the function actually depends on, in ascending order.
    pub fn support(&self) -> Vec<usize> {
        (0..self.num_vars).filter(|v| self.has_var(*v)).collect()
    }

    /// Shrinks the table onto its support.
    ///
    /// Returns the shrunk table and, for each of its variables, the index of
    /// the original variable it stands for.
    pub fn min_base(&self) -> (TruthTable, Vec<usize>) {
        let support = self.support();
        if support.len() == self.num_vars {
            return (self.clone(), support);
        }
        let mut out = TruthTable::const0(support.len());
        for j in 0..out.num_bits() {
            let mut i = 0usize;
            for (k, var) in support.iter().enumerate() {
                if (j >> k) & 1 == 1 {
                    i |= 1 << var;
                }
            }
            out.set_bit(j, self.get_bit(i));
        }
        (out, support)
    }

    /// Re-expresses the table over `num_vars` variables where variable `k`
    /// of `self` becomes variable `positions[k]` of the result.
    pub fn expand(&self, positions: &[usize], num_vars: usize) -> TruthTable {
        assert_eq!(
            positions.len(),
            self.num_vars,
            "expand needs one position per variable"
        );
        debug_assert!(positions.iter().all(|p| *p < num_vars));
        let mut out = TruthTable::const0(num_vars);
        for j in 0..out.num_bits() {
            let mut i = 0usize;
            for (k, p) in positions.iter().enumerate() {
                if (j >> p) & 1 == 1 {
                    i |= 1 << k;
                }
            }
            if self.get_bit(i) {
                out.set_bit(j, true);
            }
        }
        out
    }

    /// Evaluates this function with each variable replaced by a table.
    pub fn compose(&self, inputs: &[TruthTable]) -> TruthTable {
        assert_eq!(inputs.len(), self.num_vars);
        let arity = inputs.first().map_or(0, |t| t.num_vars);
        let mut out = TruthTable::const0(arity);
        for m in 0..self.num_bits() {
            if !self.get_bit(m) {
                continue;
            }
            let mut term = TruthTable::const1(arity);
            for (k, input) in inputs.iter().enumerate() {
                term = term.and(&input.with_polarity((m >> k) & 1 == 0));
            }
            out = out.or(&term);
        }
        out
    }

    /// Word-parallel evaluation: bit lane `b` of the result is the function
    /// applied to bit lane `b` of each input word.
    pub fn compose_word(&self, inputs: &[u64]) -> u64 {
        assert_eq!(inputs.len(), self.num_vars);
        let mut out = 0u64;
        for m in 0..self.num_bits() {
            if !self.get_bit(m) {
                continue;
            }
            let mut term = u64::MAX;
            for (k, input) in inputs.iter().enumerate() {
                term &= if (m >> k) & 1 == 1 { *input } else { !*input };
            }
            out |= term;
        }
        out
    }
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = (self.num_bits() / 4).max(1);
        for d in (0..digits).rev() {
            let word = self.words[d / 16];
            let nibble = (word >> ((d % 16) * 4)) & 0xF;
            write!(f, "{:x}", nibble)?;
        }
        Ok(())
    }
}
