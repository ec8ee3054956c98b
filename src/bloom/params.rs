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

use std::f64::consts::LN_2;

use super::bits::WORD_BITS;

/// Bit length used when a filter is requested with size 0.
pub const DEFAULT_NUM_BITS: u64 = 10_000;

/// Largest bit length a filter can have: `u64::MAX` rounded down to a whole word.
pub const MAX_NUM_BITS: u64 = u64::MAX & !(WORD_BITS - 1);

/// Computes the bit length and hash count for `expected_items` insertions at a target false
/// positive probability.
///
/// - `m = ceil(-n * ln(p) / ln(2)^2)`, rounded up to a multiple of 64
/// - `k = round(ln(2) * m / n)` using the rounded `m`, at least 1
///
/// Returns the sentinel `(0, 0)` when `expected_items` is 0, when `fpp` is not strictly between
/// 0 and 1, or when the resulting `m` would not fit in a `u64`. Validating the result is left to
/// the caller.
///
/// # Examples
///
/// ```
/// use atomic_bloom::bloom::compute_params;
///
/// assert_eq!(compute_params(10_000, 0.01), (95_872, 7));
/// assert_eq!(compute_params(0, 0.01), (0, 0));
/// ```
pub fn compute_params(expected_items: u64, fpp: f64) -> (u64, u32) {
    // Written as a negated range check so NaN is rejected too.
    if expected_items == 0 || !(fpp > 0.0 && fpp < 1.0) {
        return (0, 0);
    }

    let n = expected_items as f64;
    let raw_bits = (-n * fpp.ln() / (LN_2 * LN_2)).ceil();
    // `as u64` saturates, so anything at or past 2^64 has to be caught before the cast.
    if !raw_bits.is_finite() || raw_bits >= u64::MAX as f64 {
        return (0, 0);
    }
    let Some(num_bits) = (raw_bits as u64).max(1).checked_next_multiple_of(WORD_BITS) else {
        return (0, 0);
    };

    // k must come from the word-aligned m.
    let num_hashes = (LN_2 * num_bits as f64 / n).round() as u32;

    (num_bits, num_hashes.max(1))
}

/// Expected false positive probability `(1 - e^(-k*n/m))^k` of a filter with `num_bits` bits and
/// `num_hashes` hash functions after `num_items` distinct insertions.
pub fn expected_fpp(num_hashes: u32, num_bits: u64, num_items: u64) -> f64 {
    if num_bits == 0 {
        return 1.0;
    }
    let k = f64::from(num_hashes);
    let exponent = -k * num_items as f64 / num_bits as f64;
    (1.0 - exponent.exp()).powf(k)
}

/// Validated result of [`compute_params`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterParams {
    /// Bit-array length (m), a multiple of 64.
    pub num_bits: u64,
    /// Hash-function count (k).
    pub num_hashes: u32,
}

impl FilterParams {
    /// Like [`compute_params`], but reports the invalid-input sentinel as `None`.
    pub fn compute(expected_items: u64, fpp: f64) -> Option<FilterParams> {
        let params = Self::from(compute_params(expected_items, fpp));
        params.is_valid().then_some(params)
    }

    /// Returns `false` for the `(0, 0)` sentinel or any other unusable pair.
    pub fn is_valid(&self) -> bool {
        self.num_bits > 0 && self.num_bits % WORD_BITS == 0 && self.num_hashes > 0
    }
}

impl From<(u64, u32)> for FilterParams {
    fn from((num_bits, num_hashes): (u64, u32)) -> Self {
        FilterParams {
            num_bits,
            num_hashes,
        }
    }
}
