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

use std::hash::Hash;
use std::io::Cursor;

use crate::codec::Family;
use crate::counter_vector::CounterVector;
use crate::error::Error;
use crate::filter::serialization::read_preamble;
use crate::filter::serialization::write_preamble;
use crate::filter::Filter;
use crate::hash::HashFamily;

/// A counting Bloom filter for approximate frequency queries.
///
/// Each cell is a `width`-bit saturating counter. Adding an element
/// increments the `k` counters its digests select; a query returns the
/// minimum of those `k` counters — the conservative point estimate, since
/// an element's true count cannot exceed the smallest of its slots, and
/// the minimum suppresses overcounting from collisions with other
/// elements.
///
/// # Examples
///
/// ```
/// use probloom::filter::CountingBloomFilter;
/// use probloom::hash::DoubleHashFamily;
///
/// let family = DoubleHashFamily::new(3);
/// let mut filter = CountingBloomFilter::new(&family, 50, 3);
///
/// filter.add("bar");
/// filter.add("bar");
/// assert_eq!(filter.count("bar"), 2);
/// ```
#[derive(Debug)]
pub struct CountingBloomFilter<'h, H> {
    hasher: &'h H,
    cells: CounterVector,
}

impl<'h, H: HashFamily> CountingBloomFilter<'h, H> {
    /// Creates a filter with `cells` zeroed counters of `width` bits
    /// each, fed by `hasher`.
    ///
    /// The hash family is borrowed for the filter's whole lifetime; the
    /// filter never takes ownership of it or mutates it. All parameters
    /// are fixed here forever.
    ///
    /// # Panics
    ///
    /// Panics if `cells` is zero or `width` is not in `1..=64`.
    pub fn new(hasher: &'h H, cells: usize, width: usize) -> Self {
        assert!(cells > 0, "cells must be at least 1");
        Self {
            hasher,
            cells: CounterVector::new(width, cells),
        }
    }

    /// Adds an element, incrementing each of its `k` counters by one.
    ///
    /// Counters pin at [`max()`](Self::max) instead of overflowing.
    pub fn add<T: Hash + ?Sized>(&mut self, value: &T) {
        let digests = self.hasher.digest_vector(value);
        self.add_digests(&digests);
    }

    /// Returns the conservative frequency estimate for `value`.
    ///
    /// The estimate is an upper bound on the element's true count (never
    /// an undercount, up to saturation), and is 0 only for elements whose
    /// cells were never touched.
    pub fn count<T: Hash + ?Sized>(&self, value: &T) -> u64 {
        let digests = self.hasher.digest_vector(value);
        self.count_digests(&digests)
    }

    /// Returns the number of cells.
    pub fn cells(&self) -> usize {
        self.cells.size()
    }

    /// Returns the number of bits per counter.
    pub fn width(&self) -> usize {
        self.cells.width()
    }

    /// Returns the saturation ceiling of each counter.
    pub fn max(&self) -> u64 {
        self.cells.max()
    }

    /// Returns the number of hash functions applied per element.
    pub fn k(&self) -> usize {
        self.hasher.k()
    }

    /// Checks whether `other` can be merged with this filter: same cell
    /// count, same counter width, and same number of hash functions.
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.cells() == other.cells() && self.width() == other.width() && self.k() == other.k()
    }

    /// Combines two filters into a new one whose estimate for any element
    /// is an upper bound on the sum of the inputs' estimates, saturating
    /// cellwise where the counter width is exceeded.
    ///
    /// Neither input is modified; the result borrows `x`'s hash family.
    ///
    /// # Errors
    ///
    /// Returns an [`Incompatible`](crate::error::ErrorKind::Incompatible)
    /// error if the operands differ in cell count, width, or hash count.
    /// The check runs before any storage is touched.
    pub fn merge(x: &Self, y: &Self) -> Result<Self, Error> {
        if !x.is_compatible(y) {
            return Err(Error::incompatible("cannot merge incompatible filters")
                .with_context("left_cells", x.cells())
                .with_context("right_cells", y.cells())
                .with_context("left_width", x.width())
                .with_context("right_width", y.width())
                .with_context("left_k", x.k())
                .with_context("right_k", y.k()));
        }

        Ok(Self {
            hasher: x.hasher,
            cells: CounterVector::combine(&x.cells, &y.cells),
        })
    }

    /// Serializes the filter to a byte vector.
    ///
    /// The stream records the hash count, counter width, and every
    /// counter. The hash family itself is not serialized: the same family
    /// must be supplied again on [`deserialize`](Self::deserialize).
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_preamble(&mut bytes, &Family::COUNTING_BLOOM, self.k() as u32);
        self.cells.write_into(&mut bytes);
        bytes
    }

    /// Deserializes a filter from bytes, wiring it to `hasher`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is truncated or corrupt, carries the
    /// wrong family or serial version, or records a hash count different
    /// from `hasher`'s. No partially populated filter is ever produced.
    pub fn deserialize(bytes: &[u8], hasher: &'h H) -> Result<Self, Error> {
        let mut cursor = Cursor::new(bytes);
        let k = read_preamble(&mut cursor, &Family::COUNTING_BLOOM)?;
        if k as usize != hasher.k() {
            return Err(Error::deserial(format!(
                "hash count mismatch: stream has {k}, hash family has {}",
                hasher.k()
            )));
        }

        let cells = CounterVector::read_from(&mut cursor)?;
        if cells.size() == 0 {
            return Err(Error::deserial("filter must have at least one cell"));
        }

        Ok(Self { hasher, cells })
    }
}

impl<H: HashFamily> Filter for CountingBloomFilter<'_, H> {
    fn add_digests(&mut self, digests: &[u64]) {
        for &digest in digests {
            let index = (digest % self.cells.size() as u64) as usize;
            self.cells.increment(index, 1);
        }
    }

    fn count_digests(&self, digests: &[u64]) -> u64 {
        let mut min = u64::MAX;
        for &digest in digests {
            let index = (digest % self.cells.size() as u64) as usize;
            let value = self.cells.count(index);
            if value < min {
                min = value;
            }
        }
        min
    }

    fn cells(&self) -> usize {
        self.cells.size()
    }
}
