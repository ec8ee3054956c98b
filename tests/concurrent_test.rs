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

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use atomic_bloom::bloom::AtomicBitArray;
use atomic_bloom::bloom::BloomFilter;
use atomic_bloom::bloom::BloomFilterBuilder;
use googletest::assert_that;
use googletest::prelude::eq;

const WRITERS: u64 = 8;
const ITEMS_PER_WRITER: u64 = 5_000;

fn item(writer: u64, i: u64) -> String {
    format!("writer-{writer}-item-{i}")
}

#[test]
fn test_concurrent_writers_lose_no_updates() {
    let filter = Arc::new(
        BloomFilterBuilder::with_accuracy(WRITERS * ITEMS_PER_WRITER, 0.01)
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let filter = Arc::clone(&filter);
            thread::spawn(move || {
                for i in 0..ITEMS_PER_WRITER {
                    filter.put(item(writer, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for writer in 0..WRITERS {
        for i in 0..ITEMS_PER_WRITER {
            assert!(
                filter.might_contain(item(writer, i)),
                "lost insert of {}",
                item(writer, i)
            );
        }
    }
}

#[test]
fn test_heavy_contention_on_tiny_filter() {
    // Two words shared by every writer maximises CAS failures.
    let filter = BloomFilter::new(128);
    thread::scope(|s| {
        for writer in 0..16 {
            let filter = &filter;
            s.spawn(move || {
                for i in 0..2_000 {
                    filter.put(item(writer, i));
                }
            });
        }
    });

    for writer in 0..16 {
        for i in 0..2_000 {
            assert!(filter.might_contain(item(writer, i)));
        }
    }
}

#[test]
fn test_readers_alongside_writers() {
    let filter = BloomFilter::new(1 << 16);
    thread::scope(|s| {
        for writer in 0..4 {
            let filter = &filter;
            s.spawn(move || {
                for i in 0..2_000 {
                    let it = item(writer, i);
                    filter.put(&it);
                    // Same thread: the insert happens-before this read.
                    assert!(filter.might_contain(&it));
                }
            });
        }
        for _ in 0..4 {
            let filter = &filter;
            s.spawn(move || {
                for i in 0..2_000 {
                    let _ = filter.might_contain(item(99, i));
                }
            });
        }
    });
}

#[test]
fn test_insert_visible_through_channel() {
    let filter = Arc::new(BloomFilter::new(4096));
    let (tx, rx) = mpsc::channel();

    let writer = {
        let filter = Arc::clone(&filter);
        thread::spawn(move || {
            for i in 0..500 {
                filter.put(item(0, i));
                tx.send(i).unwrap();
            }
        })
    };

    for i in rx {
        assert!(filter.might_contain(item(0, i)));
    }
    writer.join().unwrap();
}

#[test]
fn test_concurrent_set_bit_counts_every_bit() {
    let bits = AtomicBitArray::new(4096);
    thread::scope(|s| {
        for t in 0..8u64 {
            let bits = &bits;
            s.spawn(move || {
                for index in (t..4096).step_by(8) {
                    assert!(!bits.set_bit(index));
                }
            });
        }
    });
    assert_that!(bits.count_ones(), eq(4096_u64));
}
