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

//! Filter configuration read from the environment at startup.
//!
//! | variable | meaning |
//! |---|---|
//! | `BLOOM_EXPECTED_ITEMS` | expected number of distinct items (`u64`) |
//! | `BLOOM_FALSE_POSITIVE_RATE` | target false positive probability (`f64`) |
//! | `BLOOM_NUM_BITS` | explicit bit count (`u64`), used when no accuracy is given |
//! | `BLOOM_HASH_FUNCTIONS` | comma separated hash function names, e.g. `fnv1a64,crc32` |
//!
//! Unset variables keep their defaults. A set but malformed variable is an error.
//!
//! ```rust
//! use atomic_bloom::config::FilterConfig;
//!
//! let config = FilterConfig::from_lookup(|key| match key {
//!     "BLOOM_EXPECTED_ITEMS" => Some("1000".to_string()),
//!     "BLOOM_FALSE_POSITIVE_RATE" => Some("0.01".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//!
//! let filter = config.build_filter().unwrap();
//! assert_eq!(filter.capacity(), 9_600);
//! ```

use std::str::FromStr;

use crate::bloom::BloomFilter;
use crate::bloom::BloomFilterBuilder;
use crate::error::Error;
use crate::hash::HashFunctions;

/// Environment variable holding the expected item count.
pub const ENV_EXPECTED_ITEMS: &str = "BLOOM_EXPECTED_ITEMS";
/// Environment variable holding the target false positive probability.
pub const ENV_FALSE_POSITIVE_RATE: &str = "BLOOM_FALSE_POSITIVE_RATE";
/// Environment variable holding an explicit bit count.
pub const ENV_NUM_BITS: &str = "BLOOM_NUM_BITS";
/// Environment variable holding the hash function names.
pub const ENV_HASH_FUNCTIONS: &str = "BLOOM_HASH_FUNCTIONS";

/// Startup parameters for a [`BloomFilter`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterConfig {
    /// Expected number of distinct items.
    pub expected_items: Option<u64>,
    /// Target false positive probability.
    pub false_positive_rate: Option<f64>,
    /// Explicit bit count, ignored when both accuracy fields are set.
    pub num_bits: Option<u64>,
    /// Explicit hash functions.
    pub hash_functions: Option<HashFunctions>,
}

impl FilterConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if a
    /// variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if a
    /// variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = FilterConfig {
            expected_items: parse_var(&lookup, ENV_EXPECTED_ITEMS)?,
            false_positive_rate: parse_var(&lookup, ENV_FALSE_POSITIVE_RATE)?,
            num_bits: parse_var(&lookup, ENV_NUM_BITS)?,
            hash_functions: lookup(ENV_HASH_FUNCTIONS)
                .map(|value| {
                    value
                        .parse::<HashFunctions>()
                        .map_err(|err| err.with_context("key", ENV_HASH_FUNCTIONS))
                })
                .transpose()?,
        };
        tracing::debug!(?config, "loaded bloom filter config");
        Ok(config)
    }

    /// Builds a filter from this configuration.
    ///
    /// Accuracy sizing is used when both `expected_items` and `false_positive_rate` are set;
    /// otherwise `num_bits` (or the default size).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if the
    /// accuracy parameters are out of range.
    pub fn build_filter(&self) -> Result<BloomFilter, Error> {
        let builder = match (self.expected_items, self.false_positive_rate) {
            (Some(items), Some(fpp)) => BloomFilterBuilder::with_accuracy(items, fpp),
            (None, None) => BloomFilterBuilder::with_size(self.num_bits.unwrap_or(0)),
            _ => {
                tracing::warn!(
                    expected_items = ?self.expected_items,
                    false_positive_rate = ?self.false_positive_rate,
                    "incomplete accuracy config, falling back to bit count"
                );
                BloomFilterBuilder::with_size(self.num_bits.unwrap_or(0))
            }
        };

        match &self.hash_functions {
            Some(functions) => builder.hash_functions(functions.clone()).build(),
            None => builder.build(),
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim().parse::<T>().map(Some).map_err(|err| {
        Error::config_invalid("failed to parse config value")
            .with_context("key", key)
            .with_context("value", &raw)
            .set_source(err)
    })
}
