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

//! Bloom-filter variants over a shared digest contract.
//!
//! A Bloom filter is a space-efficient probabilistic structure for
//! set-membership queries. False positives are possible; false negatives
//! are not. This module provides two variants over one contract:
//!
//! - [`BasicBloomFilter`] stores one bit per cell and answers membership
//!   (a count of 0 or 1).
//! - [`CountingBloomFilter`] stores a fixed-width saturating counter per
//!   cell and answers approximate frequencies.
//!
//! Both variants borrow a [`HashFamily`](crate::hash::HashFamily) that
//! maps each value to `k` digests; each digest selects a cell by
//! reduction modulo the cell count. A filter's parameters are fixed at
//! construction and it is never resized or cleared — capacity planning
//! happens beforehand with [`sizing`](crate::sizing).
//!
//! # Properties
//!
//! - **No false negatives**: once added, an element always counts as
//!   present.
//! - **Merge without replay**: filters built with compatible parameters
//!   combine into a new filter that answers as if every element of both
//!   inputs had been added to it. Inputs are never modified.
//! - **Exact round-trip**: filters and their storage serialize to a
//!   compact byte format and restore bit-for-bit.
//!
//! # Usage
//!
//! ```
//! use probloom::filter::BasicBloomFilter;
//! use probloom::hash::DoubleHashFamily;
//! use probloom::sizing;
//!
//! // Size for 1000 elements at a 1% false-positive rate.
//! let cells = sizing::optimal_cells(0.01, 1000)?;
//! let k = sizing::optimal_hash_count(cells, 1000)?;
//!
//! let family = DoubleHashFamily::new(k as usize);
//! let mut filter = BasicBloomFilter::new(&family, cells as usize);
//!
//! filter.add("event:login");
//! assert_eq!(filter.count("event:login"), 1);
//! # Ok::<(), probloom::error::Error>(())
//! ```
//!
//! When the concrete variant is decided at runtime, hold an
//! [`AnyBloomFilter`]: its merge rejects mismatched variants before any
//! storage work happens.
//!
//! All operations are synchronous and bounded: `O(k)` per add or count,
//! `O(cells * width)` per merge or serialize. A filter is not safe for
//! concurrent mutation — exactly what `&mut self` on `add` already
//! enforces — while merge only reads its operands, so it may run
//! alongside other reads.

mod basic;
mod counting;
mod merge;
mod serialization;

pub use self::basic::BasicBloomFilter;
pub use self::counting::CountingBloomFilter;
pub use self::merge::AnyBloomFilter;
pub use self::merge::FilterKind;

/// The digest-level contract shared by every filter variant.
///
/// `add` and `count` on the concrete types push each value through the
/// borrowed hash family and feed the resulting digest vector into these
/// methods. Implementations map each digest to a cell index modulo
/// [`cells()`](Filter::cells) and apply their variant-specific storage
/// update or estimate.
pub trait Filter {
    /// Applies one element's digest vector to the backing storage.
    fn add_digests(&mut self, digests: &[u64]);

    /// Returns the estimate for one element's digest vector.
    fn count_digests(&self, digests: &[u64]) -> u64;

    /// Returns the number of storage cells.
    fn cells(&self) -> usize;
}
