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

//! Named hash functions used to address filter bits.
//!
//! A filter hashes every item with a fixed, ordered list of [`HashFunction`]s. Each function is
//! a plain enum variant rather than a function pointer, so a filter's configuration can be
//! printed, parsed, compared and reproduced exactly.
//!
//! ```rust
//! use atomic_bloom::hash::HashFunction;
//! use atomic_bloom::hash::HashFunctions;
//!
//! let functions = HashFunctions::default();
//! assert_eq!(
//!     functions.as_slice(),
//!     &[HashFunction::Fnv1a64, HashFunction::Fnv1_32, HashFunction::Crc32]
//! );
//!
//! let hashes: Vec<u64> = functions.hash_all(b"apple").collect();
//! assert_eq!(hashes.len(), 3);
//! ```
//!
//! None of these functions are cryptographic. They are fast, deterministic and distinct enough
//! that the k outputs for one item are not strongly correlated.

mod murmurhash;
mod xxhash;

use std::fmt;
use std::hash::Hasher;
use std::str::FromStr;

use fnv::FnvHasher;

use crate::error::Error;

pub(crate) use self::murmurhash::murmur3_64;
pub(crate) use self::xxhash::xxhash64;

const FNV32_OFFSET_BASIS: u32 = 0x811c9dc5;
const FNV32_PRIME: u32 = 0x01000193;

/// Base functions in the order [`HashFunctions::with_count`] hands them out.
const CANONICAL_ORDER: [HashFunction; 5] = [
    HashFunction::Fnv1a64,
    HashFunction::Fnv1_32,
    HashFunction::Crc32,
    HashFunction::XxHash64,
    HashFunction::Murmur3,
];

/// A deterministic byte-sequence-to-`u64` hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashFunction {
    /// FNV-1a, 64-bit.
    Fnv1a64,
    /// FNV-1, 32-bit, widened to 64 bits.
    Fnv1_32,
    /// CRC-32 with the IEEE polynomial, widened to 64 bits.
    Crc32,
    /// xxHash64 with seed 0.
    XxHash64,
    /// Lower 64 bits of MurmurHash3 x64/128 with seed 0.
    Murmur3,
    /// The `i`-th Kirsch-Mitzenmacher combination `fnv1a64 + i * xxhash64`.
    ///
    /// Lets a filter use more hash functions than there are base algorithms. `Derived(0)` hashes
    /// exactly like [`Fnv1a64`](Self::Fnv1a64), so parsing only accepts `derived5` and up, the
    /// indices [`HashFunctions::with_count`] hands out.
    Derived(u32),
}

impl HashFunction {
    /// Hashes `bytes`.
    pub fn hash(self, bytes: &[u8]) -> u64 {
        match self {
            HashFunction::Fnv1a64 => fnv1a_64(bytes),
            HashFunction::Fnv1_32 => u64::from(fnv1_32(bytes)),
            HashFunction::Crc32 => u64::from(crc32fast::hash(bytes)),
            HashFunction::XxHash64 => xxhash64(bytes, 0),
            HashFunction::Murmur3 => murmur3_64(bytes),
            HashFunction::Derived(i) => {
                let h1 = fnv1a_64(bytes);
                let h2 = xxhash64(bytes, 0);
                h1.wrapping_add(u64::from(i).wrapping_mul(h2))
            }
        }
    }
}

impl fmt::Display for HashFunction {
    /// Writes the canonical lowercase name, as accepted by [`FromStr`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashFunction::Fnv1a64 => f.write_str("fnv1a64"),
            HashFunction::Fnv1_32 => f.write_str("fnv1_32"),
            HashFunction::Crc32 => f.write_str("crc32"),
            HashFunction::XxHash64 => f.write_str("xxhash64"),
            HashFunction::Murmur3 => f.write_str("murmur3"),
            HashFunction::Derived(i) => write!(f, "derived{i}"),
        }
    }
}

impl FromStr for HashFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "fnv1a64" => Ok(HashFunction::Fnv1a64),
            "fnv1_32" => Ok(HashFunction::Fnv1_32),
            "crc32" => Ok(HashFunction::Crc32),
            "xxhash64" => Ok(HashFunction::XxHash64),
            "murmur3" => Ok(HashFunction::Murmur3),
            other => match other.strip_prefix("derived").map(str::parse::<u32>) {
                Some(Ok(i)) if i as usize >= CANONICAL_ORDER.len() => Ok(HashFunction::Derived(i)),
                Some(Ok(_)) => Err(Error::config_invalid(
                    "derived hash function index must be at least 5",
                )
                .with_context("name", s)),
                _ => Err(Error::config_invalid("unknown hash function").with_context("name", s)),
            },
        }
    }
}

/// A fixed, ordered, non-empty list of hash functions.
///
/// The list is chosen once when a filter is built and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashFunctions {
    functions: Box<[HashFunction]>,
}

impl HashFunctions {
    /// Creates a hash function list.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if
    /// `functions` is empty.
    pub fn new(functions: Vec<HashFunction>) -> Result<Self, Error> {
        if functions.is_empty() {
            return Err(Error::config_invalid(
                "hash function list must not be empty",
            ));
        }
        Ok(HashFunctions {
            functions: functions.into_boxed_slice(),
        })
    }

    /// Creates a list of exactly `k` functions.
    ///
    /// The first five are the base algorithms in the order `fnv1a64, fnv1_32, crc32, xxhash64,
    /// murmur3`; any further functions are [`HashFunction::Derived`].
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if `k` is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// # use atomic_bloom::hash::{HashFunction, HashFunctions};
    /// let functions = HashFunctions::with_count(7).unwrap();
    /// assert_eq!(functions.len(), 7);
    /// assert_eq!(functions.as_slice()[6], HashFunction::Derived(6));
    /// ```
    pub fn with_count(k: u32) -> Result<Self, Error> {
        if k == 0 {
            return Err(Error::config_invalid("number of hash functions must be at least 1")
                .with_context("num_hashes", k));
        }
        let functions = (0..k)
            .map(|i| {
                CANONICAL_ORDER
                    .get(i as usize)
                    .copied()
                    .unwrap_or(HashFunction::Derived(i))
            })
            .collect();
        Self::new(functions)
    }

    /// Hashes `bytes` with every function, in list order.
    pub fn hash_all<'a>(&'a self, bytes: &'a [u8]) -> impl Iterator<Item = u64> + 'a {
        self.functions.iter().map(move |f| f.hash(bytes))
    }

    /// Returns the number of functions (k).
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Always `false`: a list is never empty once constructed.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Returns an iterator over the functions.
    pub fn iter(&self) -> impl Iterator<Item = HashFunction> + '_ {
        self.functions.iter().copied()
    }

    /// Returns the functions as a slice.
    pub fn as_slice(&self) -> &[HashFunction] {
        &self.functions
    }
}

impl Default for HashFunctions {
    /// FNV-1a 64, FNV-1 32 and CRC-32.
    fn default() -> Self {
        HashFunctions {
            functions: Box::new([
                HashFunction::Fnv1a64,
                HashFunction::Fnv1_32,
                HashFunction::Crc32,
            ]),
        }
    }
}

impl fmt::Display for HashFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, function) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{function}")?;
        }
        Ok(())
    }
}

impl FromStr for HashFunctions {
    type Err = Error;

    /// Parses a comma separated list such as `"fnv1a64, crc32"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let functions = s
            .split(',')
            .filter(|name| !name.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<HashFunction>, _>>()?;
        Self::new(functions).map_err(|err| err.with_context("input", s))
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(bytes);
    hasher.finish()
}

fn fnv1_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV32_OFFSET_BASIS, |hash, &byte| {
        hash.wrapping_mul(FNV32_PRIME) ^ u32::from(byte)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_known_vectors() {
        assert_eq!(HashFunction::Fnv1a64.hash(b""), 0xcbf29ce484222325);
        assert_eq!(HashFunction::Fnv1a64.hash(b"a"), 0xaf63dc4c8601ec8c);
        assert_eq!(HashFunction::Fnv1_32.hash(b""), 0x811c9dc5);
        assert_eq!(HashFunction::Fnv1_32.hash(b"a"), 0x050c5d7e);
        assert_eq!(HashFunction::Crc32.hash(b"123456789"), 0xcbf43926);
        assert_eq!(HashFunction::XxHash64.hash(b"apple"), 0x5889a1c15c94729f);
    }

    #[test]
    fn test_derived_zero_is_fnv1a64() {
        assert_eq!(
            HashFunction::Derived(0).hash(b"apple"),
            HashFunction::Fnv1a64.hash(b"apple")
        );
        assert_ne!(
            HashFunction::Derived(1).hash(b"apple"),
            HashFunction::Derived(2).hash(b"apple")
        );
    }

    #[test]
    fn test_name_round_trip() {
        for f in CANONICAL_ORDER.into_iter().chain([HashFunction::Derived(11)]) {
            assert_eq!(f.to_string().parse::<HashFunction>().unwrap(), f);
        }
        assert_eq!(HashFunction::Murmur3.to_string(), "murmur3");
        assert_eq!(HashFunction::Derived(11).to_string(), "derived11");
        assert_eq!(" CRC32 ".parse::<HashFunction>().unwrap(), HashFunction::Crc32);
    }

    #[test]
    fn test_unknown_name() {
        let err = "sha256".parse::<HashFunction>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert_eq!(err.context_value("name"), Some("sha256"));
        assert!("derivedx".parse::<HashFunction>().is_err());
    }

    #[test]
    fn test_derived_aliases_rejected() {
        for i in 0..5 {
            let name = format!("derived{i}");
            let err = name.parse::<HashFunction>().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
            assert_eq!(err.context_value("name"), Some(name.as_str()));
        }
        assert_eq!(
            "derived5".parse::<HashFunction>().unwrap(),
            HashFunction::Derived(5)
        );
        assert!("fnv1a64,derived0".parse::<HashFunctions>().is_err());
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(HashFunctions::new(vec![]).is_err());
        assert!(HashFunctions::with_count(0).is_err());
        assert!(" , ".parse::<HashFunctions>().is_err());
    }

    #[test]
    fn test_with_count() {
        let three = HashFunctions::with_count(3).unwrap();
        assert_eq!(three, HashFunctions::default());

        let eight = HashFunctions::with_count(8).unwrap();
        assert_eq!(&eight.as_slice()[..5], &CANONICAL_ORDER);
        assert_eq!(
            &eight.as_slice()[5..],
            &[
                HashFunction::Derived(5),
                HashFunction::Derived(6),
                HashFunction::Derived(7)
            ]
        );
    }

    #[test]
    fn test_hash_all_preserves_order() {
        let functions = HashFunctions::new(vec![HashFunction::Crc32, HashFunction::Fnv1a64])
            .unwrap();
        let hashes: Vec<u64> = functions.hash_all(b"apple").collect();
        assert_eq!(
            hashes,
            vec![
                HashFunction::Crc32.hash(b"apple"),
                HashFunction::Fnv1a64.hash(b"apple")
            ]
        );
    }

    #[test]
    fn test_list_display_and_parse() {
        let functions: HashFunctions = "fnv1a64, xxhash64,murmur3".parse().unwrap();
        assert_eq!(functions.len(), 3);
        assert_eq!(functions.to_string(), "fnv1a64,xxhash64,murmur3");
        assert_eq!(functions.to_string().parse::<HashFunctions>().unwrap(), functions);
    }
}
