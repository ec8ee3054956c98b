// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// Number of bits packed into one storage word.
pub const WORD_BITS: u64 = u64::BITS as u64;

/// Fixed-size bit array packed into `AtomicU64` words.
///
/// Bits are set and tested through `&self`, so any number of threads may share one array.
/// Each operation is atomic on the word containing the bit; there is no ordering across words.
///
/// Bit `i` lives in word `i / 64` at offset `i % 64`:
///
/// ```text
/// Word 0: [bit 0][bit 1]...[bit 63]
/// Word 1: [bit 64][bit 65]...[bit 127]
/// ```
#[derive(Debug)]
pub struct AtomicBitArray {
    num_bits: u64,
    words: Box<[AtomicU64]>,
}

impl AtomicBitArray {
    /// Allocates `ceil(num_bits / 64)` zeroed words.
    pub fn new(num_bits: u64) -> Self {
        let num_words = num_bits.div_ceil(WORD_BITS) as usize;
        let words = (0..num_words).map(|_| AtomicU64::new(0)).collect();
        AtomicBitArray { num_bits, words }
    }

    /// Sets the bit at `index` to 1 and returns its previous value.
    ///
    /// Runs a compare-and-swap loop on the containing word, so concurrent writers to the same
    /// word never lose each other's bits. Lock-free but not wait-free.
    ///
    /// # Panics
    ///
    /// Panics if `index` falls outside the allocated words. Callers reduce indices modulo
    /// [`len()`](Self::len) first.
    pub fn set_bit(&self, index: u64) -> bool {
        let (word, mask) = self.locate(index);

        let mut current = word.load(Ordering::Relaxed);
        loop {
            if current & mask != 0 {
                return true;
            }
            match word.compare_exchange_weak(
                current,
                current | mask,
                Ordering::Release,
                Ordering::Relaxed,
            ) {
                Ok(_) => return false,
                Err(observed) => current = observed,
            }
        }
    }

    /// Returns the current value of the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` falls outside the allocated words.
    pub fn test_bit(&self, index: u64) -> bool {
        let (word, mask) = self.locate(index);
        word.load(Ordering::Acquire) & mask != 0
    }

    /// Returns the number of addressable bits.
    pub fn len(&self) -> u64 {
        self.num_bits
    }

    /// Returns `true` if the array has no addressable bits.
    pub fn is_empty(&self) -> bool {
        self.num_bits == 0
    }

    /// Returns the number of backing words.
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// Counts the bits currently set.
    ///
    /// Under concurrent writes the result is a snapshot of each word at a slightly different
    /// moment.
    pub fn count_ones(&self) -> u64 {
        self.words
            .iter()
            .map(|word| u64::from(word.load(Ordering::Relaxed).count_ones()))
            .sum()
    }

    #[inline]
    fn locate(&self, index: u64) -> (&AtomicU64, u64) {
        let word = &self.words[(index / WORD_BITS) as usize];
        (word, 1u64 << (index % WORD_BITS))
    }
}
