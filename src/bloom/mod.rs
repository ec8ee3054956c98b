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

//! Concurrent Bloom filter for probabilistic set membership testing.
//!
//! A Bloom filter is a space-efficient probabilistic data structure used to test whether
//! an element is a member of a set. False positive matches are possible, but false negatives
//! are not. In other words, a query returns either "possibly in set" or "definitely not in set".
//!
//! # Properties
//!
//! - **No false negatives**: If an item was inserted, `might_contain()` returns `true`
//! - **Possible false positives**: `might_contain()` may return `true` for items never inserted
//! - **Fixed size**: the filter never resizes and never forgets an item
//! - **Shared writes**: `put()` takes `&self`; threads insert concurrently without locks
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//!
//! use atomic_bloom::bloom::BloomFilterBuilder;
//!
//! // Create a filter optimized for 1000 items with 1% false positive rate
//! let filter = Arc::new(BloomFilterBuilder::with_accuracy(1000, 0.01).build().unwrap());
//!
//! let writers: Vec<_> = (0..4)
//!     .map(|t| {
//!         let filter = Arc::clone(&filter);
//!         thread::spawn(move || {
//!             for i in 0..250 {
//!                 filter.put(format!("item-{t}-{i}"));
//!             }
//!         })
//!     })
//!     .collect();
//! for writer in writers {
//!     writer.join().unwrap();
//! }
//!
//! assert!(filter.might_contain("item-3-249"));
//! println!("Est. FPP: {:.4}%", filter.estimated_fpp() * 100.0);
//! ```
//!
//! # Sizing
//!
//! [`compute_params`] derives the bit count and hash count from an expected item count and
//! a target false positive probability; invalid input yields the sentinel `(0, 0)`:
//!
//! ```rust
//! use atomic_bloom::bloom::compute_params;
//!
//! let (num_bits, num_hashes) = compute_params(10_000, 0.01);
//! assert_eq!((num_bits, num_hashes), (95_872, 7));
//! assert_eq!(compute_params(1000, 1.0), (0, 0));
//! ```
//!
//! # Implementation Details
//!
//! - Bits packed in `AtomicU64` words; bits are set with a compare-and-swap loop
//! - Each item is hashed with a fixed list of named hash functions
//!   (see [`HashFunctions`](crate::hash::HashFunctions)); bit index is `hash % capacity`
//! - Atomicity is per word only: the k bits of one insert are not published together
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/time trade-offs in hash coding with allowable errors"
//! - Kirsch and Mitzenmacher (2008). "Less Hashing, Same Performance: Building a Better Bloom
//!   Filter"

mod bits;
mod builder;
mod params;
mod sketch;

pub use self::bits::AtomicBitArray;
pub use self::bits::WORD_BITS;
pub use self::builder::BloomFilterBuilder;
pub use self::params::DEFAULT_NUM_BITS;
pub use self::params::MAX_NUM_BITS;
pub use self::params::FilterParams;
pub use self::params::compute_params;
pub use self::params::expected_fpp;
pub use self::sketch::BloomFilter;
