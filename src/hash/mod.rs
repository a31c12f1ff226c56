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

//! Hash families that map input values to digest vectors.
//!
//! Filters never hash values themselves: each filter borrows a
//! [`HashFamily`] and asks it for a fixed number of digests per value.
//! The family's internal algorithm and seeding are its own business; the
//! filters only require determinism and a fixed digest count, and they
//! reduce each digest to a cell index modulo their own cell count.

use std::hash::Hash;
use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

/// The digests one hash family produces for one value.
pub type DigestVector = Vec<u64>;

/// The default seed used by [`DoubleHashFamily::new`].
///
/// The seed 9001 is a prime that was chosen very early on in experimental
/// testing; nothing proves it superior to other seeds. What matters is
/// that set operations require every participating filter to hash with
/// the same function and seed, so once filters are stored the seed is
/// effectively frozen.
pub const DEFAULT_HASH_SEED: u64 = 9001;

/// A family of `k` hash functions evaluated together.
///
/// Implementations must be deterministic: the same instance and the same
/// value always produce the same digest vector, and the vector's length
/// always equals [`k()`](HashFamily::k). Filters borrow a family for
/// their whole lifetime and never mutate it, so one family instance is
/// typically shared by every filter that should be merge-compatible.
pub trait HashFamily {
    /// Returns the number of digests produced per value.
    fn k(&self) -> usize;

    /// Computes the `k` digests for `value`.
    fn digest_vector<T: Hash + ?Sized>(&self, value: &T) -> DigestVector;
}

/// The default hash family: two XXH3 passes expanded to `k` digests.
///
/// Computes `h0 = xxh3(value, seed)` and `h1 = xxh3(value, h0)`, then
/// derives digest `i` as `(h0 + (i + 1) * h1) >> 1` with wrapping
/// arithmetic. The right shift improves the distribution of the combined
/// hash.
///
/// # Examples
///
/// ```
/// # use probloom::hash::DoubleHashFamily;
/// # use probloom::hash::HashFamily;
/// let family = DoubleHashFamily::new(3);
/// let digests = family.digest_vector("event");
/// assert_eq!(digests.len(), 3);
/// assert_eq!(digests, family.digest_vector("event"));
/// ```
#[derive(Debug, Clone)]
pub struct DoubleHashFamily {
    k: usize,
    seed: u64,
}

impl DoubleHashFamily {
    /// Creates a family of `k` hash functions with the default seed.
    ///
    /// # Panics
    ///
    /// Panics if `k` is zero.
    pub fn new(k: usize) -> Self {
        Self::with_seed(k, DEFAULT_HASH_SEED)
    }

    /// Creates a family of `k` hash functions with a custom seed.
    ///
    /// Families with different seeds produce unrelated digests, so
    /// filters fed by them must never be merged.
    ///
    /// # Panics
    ///
    /// Panics if `k` is zero.
    pub fn with_seed(k: usize, seed: u64) -> Self {
        assert!(k > 0, "k must be at least 1");
        Self { k, seed }
    }

    /// Returns the seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Computes the two base hash values.
    fn compute_hash<T: Hash + ?Sized>(&self, value: &T) -> (u64, u64) {
        let mut hasher = Xxh3::with_seed(self.seed);
        value.hash(&mut hasher);
        let h0 = hasher.finish();

        // Second pass seeded with the first, so h0 and h1 are
        // quasi-independent.
        let mut hasher = Xxh3::with_seed(h0);
        value.hash(&mut hasher);
        let h1 = hasher.finish();

        (h0, h1)
    }
}

impl HashFamily for DoubleHashFamily {
    fn k(&self) -> usize {
        self.k
    }

    fn digest_vector<T: Hash + ?Sized>(&self, value: &T) -> DigestVector {
        let (h0, h1) = self.compute_hash(value);
        (0..self.k as u64)
            .map(|i| h0.wrapping_add((i + 1).wrapping_mul(h1)) >> 1)
            .collect()
    }
}
