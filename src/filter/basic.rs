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

use crate::bit_vector::BitVector;
use crate::codec::Family;
use crate::error::Error;
use crate::filter::serialization::read_preamble;
use crate::filter::serialization::write_preamble;
use crate::filter::Filter;
use crate::hash::HashFamily;

/// A membership-only Bloom filter.
///
/// Each cell is a single bit. Adding an element sets the `k` bits its
/// digests select; a query counts 1 exactly when all `k` bits are set.
/// Bits are never cleared, so an added element can never be reported
/// absent, while unrelated insertions may coincidentally set all of a
/// query's bits (a false positive).
///
/// # Examples
///
/// ```
/// use probloom::filter::BasicBloomFilter;
/// use probloom::hash::DoubleHashFamily;
///
/// let family = DoubleHashFamily::new(3);
/// let mut filter = BasicBloomFilter::new(&family, 100);
///
/// filter.add("foo");
/// assert_eq!(filter.count("foo"), 1);
/// assert!(filter.contains("foo"));
/// ```
#[derive(Debug)]
pub struct BasicBloomFilter<'h, H> {
    hasher: &'h H,
    bits: BitVector,
}

impl<'h, H: HashFamily> BasicBloomFilter<'h, H> {
    /// Creates a filter with `cells` bits, all clear, fed by `hasher`.
    ///
    /// The hash family is borrowed for the filter's whole lifetime; the
    /// filter never takes ownership of it or mutates it. Cell count and
    /// hash count are fixed here forever — capacity planning happens
    /// beforehand via [`sizing`](crate::sizing).
    ///
    /// # Panics
    ///
    /// Panics if `cells` is zero.
    pub fn new(hasher: &'h H, cells: usize) -> Self {
        assert!(cells > 0, "cells must be at least 1");
        Self {
            hasher,
            bits: BitVector::new(cells),
        }
    }

    /// Adds an element to the filter.
    pub fn add<T: Hash + ?Sized>(&mut self, value: &T) {
        let digests = self.hasher.digest_vector(value);
        self.add_digests(&digests);
    }

    /// Returns 1 if every one of the element's bits is set, else 0.
    ///
    /// A result of 1 may be a false positive; a result of 0 is always
    /// correct, since storage is never cleared.
    pub fn count<T: Hash + ?Sized>(&self, value: &T) -> u64 {
        let digests = self.hasher.digest_vector(value);
        self.count_digests(&digests)
    }

    /// Returns whether the element is possibly in the set.
    pub fn contains<T: Hash + ?Sized>(&self, value: &T) -> bool {
        self.count(value) == 1
    }

    /// Returns the number of cells.
    pub fn cells(&self) -> usize {
        self.bits.len()
    }

    /// Returns the number of hash functions applied per element.
    pub fn k(&self) -> usize {
        self.hasher.k()
    }

    /// Returns the number of bits currently set.
    ///
    /// Useful for monitoring filter saturation.
    pub fn bits_set(&self) -> u64 {
        self.bits.count_ones()
    }

    /// Returns the fraction of bits set.
    ///
    /// Values above 0.5 indicate the filter is past its design capacity
    /// and its false-positive rate is degrading.
    pub fn load_factor(&self) -> f64 {
        self.bits.count_ones() as f64 / self.bits.len() as f64
    }

    /// Estimates the current false-positive probability as
    /// `load_factor ^ k`.
    pub fn estimated_fpp(&self) -> f64 {
        self.load_factor().powf(self.k() as f64)
    }

    /// Checks whether `other` can be merged with this filter: same cell
    /// count and same number of hash functions.
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.cells() == other.cells() && self.k() == other.k()
    }

    /// Combines two filters into a new one that answers membership as if
    /// every element of both inputs had been added to it.
    ///
    /// The merge is the bitwise OR of the operands' storage and is exact:
    /// the result's false-positive rate is no worse than each input's own
    /// rate. Neither input is modified; the result borrows `x`'s hash
    /// family.
    ///
    /// # Errors
    ///
    /// Returns an [`Incompatible`](crate::error::ErrorKind::Incompatible)
    /// error if the operands differ in cell count or hash count. The
    /// check runs before any storage is touched.
    pub fn merge(x: &Self, y: &Self) -> Result<Self, Error> {
        if !x.is_compatible(y) {
            return Err(Error::incompatible("cannot merge incompatible filters")
                .with_context("left_cells", x.cells())
                .with_context("right_cells", y.cells())
                .with_context("left_k", x.k())
                .with_context("right_k", y.k()));
        }

        let mut bits = x.bits.clone();
        bits.merge_or(&y.bits);
        Ok(Self {
            hasher: x.hasher,
            bits,
        })
    }

    /// Serializes the filter to a byte vector.
    ///
    /// The stream records the hash count and the full bit array. The hash
    /// family itself is not serialized: the same family must be supplied
    /// again on [`deserialize`](Self::deserialize).
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_preamble(&mut bytes, &Family::BASIC_BLOOM, self.k() as u32);
        self.bits.write_into(&mut bytes);
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
        let k = read_preamble(&mut cursor, &Family::BASIC_BLOOM)?;
        if k as usize != hasher.k() {
            return Err(Error::deserial(format!(
                "hash count mismatch: stream has {k}, hash family has {}",
                hasher.k()
            )));
        }

        let bits = BitVector::read_from(&mut cursor)?;
        if bits.is_empty() {
            return Err(Error::deserial("filter must have at least one cell"));
        }

        Ok(Self { hasher, bits })
    }
}

impl<H: HashFamily> Filter for BasicBloomFilter<'_, H> {
    fn add_digests(&mut self, digests: &[u64]) {
        for &digest in digests {
            let index = (digest % self.bits.len() as u64) as usize;
            self.bits.set(index, true);
        }
    }

    fn count_digests(&self, digests: &[u64]) -> u64 {
        for &digest in digests {
            let index = (digest % self.bits.len() as u64) as usize;
            if !self.bits.get(index) {
                return 0;
            }
        }
        1
    }

    fn cells(&self) -> usize {
        self.bits.len()
    }
}
