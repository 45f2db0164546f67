// SPDX-License-Identifier: Apache-2.0

//! Interning cache for node functions.
//!
//! A function is addressed by a literal `2 * index + complement`. Entries are
//! stored with output bit 0 cleared, so a function and its complement share
//! one entry and differ only in the low literal bit.

use ahash::AHashMap;

use crate::truth_table::TruthTable;

pub const LIT_CONST0: u32 = 0;
pub const LIT_CONST1: u32 = 1;
pub const LIT_BUFFER: u32 = 2;
pub const LIT_NOT: u32 = 3;

#[derive(Debug, Clone)]
pub struct TruthTableCache {
    entries: Vec<TruthTable>,
    index: AHashMap<TruthTable, u32>,
}

impl Default for TruthTableCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TruthTableCache {
    pub fn new() -> Self {
        let mut cache = Self {
            entries: Vec::new(),
            index: AHashMap::new(),
        };
        let zero = cache.insert(TruthTable::const0(0));
        let buffer = cache.insert(TruthTable::var(1, 0));
        debug_assert_eq!(zero, LIT_CONST0);
        debug_assert_eq!(buffer, LIT_BUFFER);
        cache
    }

    pub fn insert(&mut self, tt: TruthTable) -> u32 {
        let complement = tt.num_bits() > 0 && tt.get_bit(0);
        let normal = if complement { tt.not() } else { tt };
        let index = match self.index.get(&normal) {
            Some(index) => *index,
            None => {
                let index = self.entries.len() as u32;
                self.entries.push(normal.clone());
                self.index.insert(normal, index);
                index
            }
        };
        2 * index + complement as u32
    }

    pub fn get(&self, literal: u32) -> TruthTable {
        let entry = &self.entries[(literal >> 1) as usize];
        entry.with_polarity(literal & 1 == 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
