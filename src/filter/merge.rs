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

use std::fmt;
use std::hash::Hash;

use crate::codec::Family;
use crate::error::Error;
use crate::filter::BasicBloomFilter;
use crate::filter::CountingBloomFilter;
use crate::hash::HashFamily;

/// The concrete variant of an [`AnyBloomFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Membership-only filter backed by single bits.
    Basic,
    /// Approximate-count filter backed by saturating counters.
    Counting,
}

impl FilterKind {
    /// Convert this kind into static str.
    pub const fn into_static(self) -> &'static str {
        match self {
            FilterKind::Basic => "basic",
            FilterKind::Counting => "counting",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.into_static())
    }
}

/// A filter held as an opaque value, with the variant decided at runtime.
///
/// Callers that cannot name the concrete filter type — a scripting layer,
/// a heterogeneous registry — hold this enum. The variant set is closed,
/// so merge and serialization dispatch are exhaustive matches, and
/// combining two values of different variants is rejected before any
/// storage work happens.
#[derive(Debug)]
pub enum AnyBloomFilter<'h, H> {
    /// A membership-only filter.
    Basic(BasicBloomFilter<'h, H>),
    /// An approximate-count filter.
    Counting(CountingBloomFilter<'h, H>),
}

impl<'h, H: HashFamily> AnyBloomFilter<'h, H> {
    /// Returns which variant this value holds.
    pub fn kind(&self) -> FilterKind {
        match self {
            AnyBloomFilter::Basic(_) => FilterKind::Basic,
            AnyBloomFilter::Counting(_) => FilterKind::Counting,
        }
    }

    /// Adds an element to the underlying filter.
    pub fn add<T: Hash + ?Sized>(&mut self, value: &T) {
        match self {
            AnyBloomFilter::Basic(filter) => filter.add(value),
            AnyBloomFilter::Counting(filter) => filter.add(value),
        }
    }

    /// Returns the underlying filter's estimate for `value`.
    pub fn count<T: Hash + ?Sized>(&self, value: &T) -> u64 {
        match self {
            AnyBloomFilter::Basic(filter) => filter.count(value),
            AnyBloomFilter::Counting(filter) => filter.count(value),
        }
    }

    /// Returns the number of storage cells.
    pub fn cells(&self) -> usize {
        match self {
            AnyBloomFilter::Basic(filter) => filter.cells(),
            AnyBloomFilter::Counting(filter) => filter.cells(),
        }
    }

    /// Combines two filter values into a new one.
    ///
    /// The variant tags are compared first: merging a basic filter with a
    /// counting filter fails with an
    /// [`Incompatible`](crate::error::ErrorKind::Incompatible) error
    /// before either operand's storage is examined. Matching variants
    /// delegate to the variant's own merge, which validates cell count
    /// (and, for counting filters, width) in turn. Neither operand is
    /// modified.
    pub fn merge(x: &Self, y: &Self) -> Result<Self, Error> {
        match (x, y) {
            (AnyBloomFilter::Basic(a), AnyBloomFilter::Basic(b)) => {
                BasicBloomFilter::merge(a, b).map(AnyBloomFilter::Basic)
            }
            (AnyBloomFilter::Counting(a), AnyBloomFilter::Counting(b)) => {
                CountingBloomFilter::merge(a, b).map(AnyBloomFilter::Counting)
            }
            _ => Err(
                Error::incompatible("cannot merge different filter variants")
                    .with_context("left", x.kind())
                    .with_context("right", y.kind()),
            ),
        }
    }

    /// Serializes the underlying filter.
    ///
    /// The family byte in the preamble records the variant, so
    /// [`deserialize`](Self::deserialize) can restore the right one.
    pub fn serialize(&self) -> Vec<u8> {
        match self {
            AnyBloomFilter::Basic(filter) => filter.serialize(),
            AnyBloomFilter::Counting(filter) => filter.serialize(),
        }
    }

    /// Deserializes a filter value, dispatching on the family byte.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is too short to carry a family byte,
    /// names an unknown family, or fails the chosen variant's own
    /// validation.
    pub fn deserialize(bytes: &[u8], hasher: &'h H) -> Result<Self, Error> {
        // Byte 2 of the preamble is the family ID.
        let family_id = *bytes
            .get(2)
            .ok_or_else(|| Error::insufficient_data("family_id"))?;

        if family_id == Family::BASIC_BLOOM.id {
            BasicBloomFilter::deserialize(bytes, hasher).map(AnyBloomFilter::Basic)
        } else if family_id == Family::COUNTING_BLOOM.id {
            CountingBloomFilter::deserialize(bytes, hasher).map(AnyBloomFilter::Counting)
        } else {
            Err(Error::deserial(format!(
                "unknown filter family: {family_id}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::hash::DoubleHashFamily;

    #[test]
    fn test_kind() {
        let family = DoubleHashFamily::new(3);
        let basic = AnyBloomFilter::Basic(BasicBloomFilter::new(&family, 100));
        let counting = AnyBloomFilter::Counting(CountingBloomFilter::new(&family, 100, 2));
        assert_eq!(basic.kind(), FilterKind::Basic);
        assert_eq!(counting.kind(), FilterKind::Counting);
    }

    #[test]
    fn test_merge_variant_mismatch() {
        let family = DoubleHashFamily::new(3);
        let basic = AnyBloomFilter::Basic(BasicBloomFilter::new(&family, 100));
        let counting = AnyBloomFilter::Counting(CountingBloomFilter::new(&family, 100, 2));

        let err = AnyBloomFilter::merge(&basic, &counting).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Incompatible);
    }

    #[test]
    fn test_deserialize_dispatches_on_family() {
        let family = DoubleHashFamily::new(3);
        let mut counting = CountingBloomFilter::new(&family, 50, 3);
        counting.add("bar");
        let bytes = counting.serialize();

        let restored = AnyBloomFilter::deserialize(&bytes, &family).unwrap();
        assert_eq!(restored.kind(), FilterKind::Counting);
        assert_eq!(restored.count("bar"), 1);
    }

    #[test]
    fn test_deserialize_unknown_family() {
        let family = DoubleHashFamily::new(3);
        let mut bytes = BasicBloomFilter::new(&family, 100).serialize();
        bytes[2] = 200;
        let err = AnyBloomFilter::deserialize(&bytes, &family).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }
}
