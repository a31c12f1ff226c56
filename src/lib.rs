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

//! # probloom
//!
//! Bloom-filter family data structures: approximate, space-efficient
//! set-membership and frequency estimation for event-processing pipelines.
//!
//! Two filter variants share one digest-level contract.
//! [`filter::BasicBloomFilter`] answers membership queries from a bit per
//! cell; [`filter::CountingBloomFilter`] answers approximate frequency
//! queries from packed saturating counters. Filters built with compatible
//! parameters can be combined without re-adding their elements, and every
//! filter and its storage round-trips through a compact byte format.
//!
//! Filters do not hash values themselves. They borrow a
//! [`hash::HashFamily`] that maps each value to a fixed number of digests,
//! so every filter that should be merge-compatible is typically fed by the
//! same shared family instance.

#![deny(missing_docs)]

pub mod bit_vector;
pub(crate) mod codec;
pub mod counter_vector;
pub mod error;
pub mod filter;
pub mod hash;
pub mod sizing;
pub mod value;
