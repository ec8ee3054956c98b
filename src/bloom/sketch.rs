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

use crate::hash::HashFunctions;

use super::bits::AtomicBitArray;
use super::bits::WORD_BITS;
use super::builder::BloomFilterBuilder;
use super::params::DEFAULT_NUM_BITS;
use super::params::MAX_NUM_BITS;

/// A Bloom filter that many threads can update and query at once.
///
/// Provides membership queries with:
/// - No false negatives (inserted items always return `true`)
/// - Tunable false positive rate
/// - Lock-free inserts through `&self`
///
/// The k bit writes of one [`put`](Self::put) are not applied as a single transaction; a
/// concurrent reader may briefly see some of them. That can only delay a `true`, never cause a
/// false negative once the `put` has happened-before the query.
#[derive(Debug)]
pub struct BloomFilter {
    /// Total number of bits in the filter (m), a multiple of 64
    capacity_bits: u64,
    /// Hash functions addressing the bits, fixed at construction
    hash_functions: HashFunctions,
    /// Bit array packed into atomic u64 words
    bits: AtomicBitArray,
}

impl BloomFilter {
    /// Creates a filter with `num_bits` bits and the default hash functions (FNV-1a 64,
    /// FNV-1 32, CRC-32).
    ///
    /// A size of 0 is replaced with [`DEFAULT_NUM_BITS`]. The size is rounded up to a multiple
    /// of 64; sizes past [`MAX_NUM_BITS`] are clamped to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_bloom::bloom::BloomFilter;
    ///
    /// let filter = BloomFilter::new(640);
    /// assert_eq!(filter.capacity(), 640);
    /// assert_eq!(filter.num_hashes(), 3);
    ///
    /// let filter = BloomFilter::new(0);
    /// assert_eq!(filter.capacity(), 10_048);
    /// ```
    pub fn new(num_bits: u64) -> Self {
        Self::with_hash_functions(num_bits, HashFunctions::default())
    }

    /// Creates a filter with `num_bits` bits and an explicit list of hash functions.
    ///
    /// Applies the same size policy as [`new()`](Self::new).
    pub fn with_hash_functions(num_bits: u64, hash_functions: HashFunctions) -> Self {
        let capacity_bits = capacity_for(num_bits);
        let bits = AtomicBitArray::new(capacity_bits);

        tracing::debug!(
            capacity_bits,
            words = bits.num_words(),
            hash_functions = %hash_functions,
            "created bloom filter"
        );

        BloomFilter {
            capacity_bits,
            hash_functions,
            bits,
        }
    }

    /// Returns a builder for creating a Bloom filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_bloom::bloom::BloomFilter;
    /// use atomic_bloom::bloom::BloomFilterBuilder;
    ///
    /// // By accuracy
    /// let filter = BloomFilterBuilder::with_accuracy(1000, 0.01).build().unwrap();
    ///
    /// // By size, with an explicit hash count
    /// let filter = BloomFilter::builder().num_hashes(5).build().unwrap();
    /// assert_eq!(filter.capacity(), 10_048);
    /// ```
    pub fn builder() -> BloomFilterBuilder {
        BloomFilterBuilder::default()
    }

    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Inserts an item into the filter.
    ///
    /// After insertion, `might_contain(item)` will always return `true`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use atomic_bloom::bloom::BloomFilter;
    /// let filter = BloomFilter::new(640);
    /// filter.put("apple");
    /// filter.put(b"raw bytes");
    /// filter.put(42_u64.to_le_bytes());
    ///
    /// assert!(filter.might_contain("apple"));
    /// ```
    pub fn put(&self, item: impl AsRef<[u8]>) {
        for index in self.indices(item.as_ref()) {
            self.bits.set_bit(index);
        }
    }

    /// Inserts an item and returns whether it was possibly already present.
    ///
    /// The answer is `true` only if every one of the item's bits was set before this call.
    ///
    /// # Examples
    ///
    /// ```
    /// # use atomic_bloom::bloom::BloomFilter;
    /// let filter = BloomFilter::new(640);
    /// assert!(!filter.put_and_check("apple"));
    /// assert!(filter.put_and_check("apple"));
    /// ```
    pub fn put_and_check(&self, item: impl AsRef<[u8]>) -> bool {
        let mut was_present = true;
        for index in self.indices(item.as_ref()) {
            // Every bit is set; no short-circuit here.
            was_present &= self.bits.set_bit(index);
        }
        was_present
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Tests whether an item is possibly in the set.
    ///
    /// Returns:
    /// - `true`: Item was **possibly** inserted (or false positive)
    /// - `false`: Item was **definitely not** inserted
    pub fn might_contain(&self, item: impl AsRef<[u8]>) -> bool {
        self.indices(item.as_ref())
            .all(|index| self.bits.test_bit(index))
    }

    /// Returns the bit indices `item` maps to, one per hash function, in hash-function order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use atomic_bloom::bloom::BloomFilter;
    /// let filter = BloomFilter::new(640);
    /// let indices: Vec<u64> = filter.indices(b"apple").collect();
    /// assert_eq!(indices, vec![575, 343, 208]);
    /// ```
    pub fn indices<'a>(&'a self, item: &'a [u8]) -> impl Iterator<Item = u64> + 'a {
        self.hash_functions
            .hash_all(item)
            .map(move |hash| hash % self.capacity_bits)
    }

    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns whether no bit has been set yet.
    pub fn is_empty(&self) -> bool {
        self.bits_used() == 0
    }

    /// Returns the number of bits set to 1.
    ///
    /// Useful for monitoring filter saturation.
    pub fn bits_used(&self) -> u64 {
        self.bits.count_ones()
    }

    /// Returns the total number of bits in the filter (capacity).
    pub fn capacity(&self) -> u64 {
        self.capacity_bits
    }

    /// Returns the number of hash functions used.
    pub fn num_hashes(&self) -> usize {
        self.hash_functions.len()
    }

    /// Returns the hash functions, in the order they are applied.
    pub fn hash_functions(&self) -> &HashFunctions {
        &self.hash_functions
    }

    /// Returns the current load factor (fraction of bits set).
    pub fn load_factor(&self) -> f64 {
        self.bits_used() as f64 / self.capacity_bits as f64
    }

    /// Estimates the current false positive probability from the load factor.
    ///
    /// A query for an absent item is positive when all k of its bits happen to be set, so the
    /// estimate is `load_factor^k`, assuming uniformly spread bits.
    pub fn estimated_fpp(&self) -> f64 {
        self.load_factor().powi(self.num_hashes() as i32)
    }
}

/// Applies the size policy: 0 means [`DEFAULT_NUM_BITS`], anything else is rounded up to a whole
/// word without exceeding [`MAX_NUM_BITS`].
fn capacity_for(num_bits: u64) -> u64 {
    let requested = if num_bits == 0 {
        DEFAULT_NUM_BITS
    } else {
        num_bits
    };
    requested
        .min(MAX_NUM_BITS)
        .checked_next_multiple_of(WORD_BITS)
        .unwrap_or(MAX_NUM_BITS)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashFunction;

    #[test]
    fn test_size_policy() {
        assert_eq!(BloomFilter::new(0).capacity(), 10_048);
        assert_eq!(BloomFilter::new(1).capacity(), 64);
        assert_eq!(BloomFilter::new(64).capacity(), 64);
        assert_eq!(BloomFilter::new(65).capacity(), 128);
        assert_eq!(BloomFilter::new(640).capacity(), 640);
    }

    #[test]
    fn test_capacity_near_u64_max() {
        assert_eq!(capacity_for(u64::MAX), MAX_NUM_BITS);
        assert_eq!(capacity_for(MAX_NUM_BITS + 1), MAX_NUM_BITS);
        assert_eq!(capacity_for(MAX_NUM_BITS), MAX_NUM_BITS);
        assert_eq!(capacity_for(MAX_NUM_BITS - 63), MAX_NUM_BITS);
        assert_eq!(MAX_NUM_BITS % WORD_BITS, 0);
    }

    #[test]
    fn test_put_and_might_contain() {
        let filter = BloomFilter::new(1024);
        assert!(filter.is_empty());
        assert!(!filter.might_contain("apple"));

        filter.put("apple");
        assert!(filter.might_contain("apple"));
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_empty_item() {
        let filter = BloomFilter::new(1024);
        filter.put(b"");
        assert!(filter.might_contain(b""));
    }

    #[test]
    fn test_put_and_check() {
        let filter = BloomFilter::new(1024);
        assert!(!filter.put_and_check(42_u64.to_le_bytes()));
        assert!(filter.put_and_check(42_u64.to_le_bytes()));
        assert!(filter.might_contain(42_u64.to_le_bytes()));
    }

    #[test]
    fn test_indices_are_in_range() {
        let filter = BloomFilter::with_hash_functions(192, HashFunctions::with_count(9).unwrap());
        for i in 0..1000u32 {
            let bytes = i.to_le_bytes();
            let indices: Vec<u64> = filter.indices(&bytes).collect();
            assert_eq!(indices.len(), 9);
            assert!(indices.iter().all(|&idx| idx < 192));
        }
    }

    #[test]
    fn test_single_hash_function() {
        let functions = HashFunctions::new(vec![HashFunction::Murmur3]).unwrap();
        let filter = BloomFilter::with_hash_functions(256, functions);
        filter.put("x");
        assert_eq!(filter.num_hashes(), 1);
        assert_eq!(filter.bits_used(), 1);
        assert!(filter.might_contain("x"));
    }

    #[test]
    fn test_statistics() {
        let filter = BloomFilter::new(1000);
        assert_eq!(filter.bits_used(), 0);
        assert_eq!(filter.load_factor(), 0.0);
        assert_eq!(filter.estimated_fpp(), 0.0);

        filter.put("test");
        assert!(filter.bits_used() > 0);
        assert!(filter.bits_used() <= 3);
        assert!(filter.load_factor() > 0.0);
        assert!(filter.estimated_fpp() > 0.0);
    }

    #[test]
    fn test_filter_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BloomFilter>();
    }
}
