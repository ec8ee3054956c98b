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

use crate::error::Error;
use crate::hash::HashFunctions;

use super::params::FilterParams;
use super::sketch::BloomFilter;

/// Builder for creating [`BloomFilter`] instances.
///
/// Provides two construction modes:
/// - [`with_accuracy()`](Self::with_accuracy): Specify target items and false positive rate
/// - [`with_size()`](Self::with_size): Specify the bit count directly
///
/// The hash functions default to the sizing-derived count for accuracy builders and to the
/// three default functions otherwise. Either can be overridden with
/// [`num_hashes()`](Self::num_hashes) or [`hash_functions()`](Self::hash_functions).
#[derive(Debug, Clone, Default)]
pub struct BloomFilterBuilder {
    num_bits: u64,
    accuracy: Option<(u64, f64)>,
    num_hashes: Option<u32>,
    hash_functions: Option<HashFunctions>,
}

impl BloomFilterBuilder {
    /// Creates a builder sized for `max_items` insertions at false positive probability `fpp`.
    ///
    /// The parameters are validated in [`build()`](Self::build).
    ///
    /// # Examples
    ///
    /// ```
    /// # use atomic_bloom::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_accuracy(10_000, 0.01).build().unwrap();
    /// assert_eq!(filter.capacity(), 95_872);
    /// assert_eq!(filter.num_hashes(), 7);
    /// ```
    pub fn with_accuracy(max_items: u64, fpp: f64) -> Self {
        BloomFilterBuilder {
            accuracy: Some((max_items, fpp)),
            ..Default::default()
        }
    }

    /// Creates a builder for a filter of `num_bits` bits.
    ///
    /// 0 selects the default size; other values are rounded up to a multiple of 64.
    pub fn with_size(num_bits: u64) -> Self {
        BloomFilterBuilder {
            num_bits,
            ..Default::default()
        }
    }

    /// Uses the first `num_hashes` functions of the canonical order.
    ///
    /// See [`HashFunctions::with_count`].
    pub fn num_hashes(mut self, num_hashes: u32) -> Self {
        self.num_hashes = Some(num_hashes);
        self
    }

    /// Uses an explicit list of hash functions. Takes precedence over
    /// [`num_hashes()`](Self::num_hashes).
    pub fn hash_functions(mut self, hash_functions: HashFunctions) -> Self {
        self.hash_functions = Some(hash_functions);
        self
    }

    /// Builds the Bloom filter.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if:
    /// - the accuracy has `max_items == 0` or `fpp` outside `(0, 1)`
    /// - `num_hashes` is 0
    pub fn build(self) -> Result<BloomFilter, Error> {
        let (num_bits, suggested_hashes) = match self.accuracy {
            Some((max_items, fpp)) => {
                let params = FilterParams::compute(max_items, fpp).ok_or_else(|| {
                    tracing::warn!(max_items, fpp, "rejected bloom filter accuracy");
                    Error::config_invalid(
                        "max_items must be positive, fpp must be between 0.0 and 1.0 (exclusive) and the resulting size must fit in u64",
                    )
                    .with_context("max_items", max_items)
                    .with_context("fpp", fpp)
                })?;
                tracing::debug!(
                    max_items,
                    fpp,
                    num_bits = params.num_bits,
                    num_hashes = params.num_hashes,
                    "sized bloom filter from accuracy"
                );
                (params.num_bits, Some(params.num_hashes))
            }
            None => (self.num_bits, None),
        };

        let hash_functions = match (self.hash_functions, self.num_hashes.or(suggested_hashes)) {
            (Some(functions), _) => functions,
            (None, Some(k)) => HashFunctions::with_count(k)?,
            (None, None) => HashFunctions::default(),
        };

        Ok(BloomFilter::with_hash_functions(num_bits, hash_functions))
    }
}
