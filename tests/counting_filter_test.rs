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

use googletest::assert_that;
use googletest::prelude::ge;
use googletest::prelude::le;
use probloom::error::ErrorKind;
use probloom::filter::CountingBloomFilter;
use probloom::hash::DoubleHashFamily;

#[test]
fn test_add_and_count() {
    let family = DoubleHashFamily::new(3);
    let mut filter = CountingBloomFilter::new(&family, 50, 3);
    assert_eq!(filter.cells(), 50);
    assert_eq!(filter.width(), 3);
    assert_eq!(filter.max(), 7);
    assert_eq!(filter.count("bar"), 0);

    filter.add("bar");
    filter.add("bar");
    assert_eq!(filter.count("bar"), 2);
}

#[test]
fn test_no_false_negatives() {
    let family = DoubleHashFamily::new(4);
    let mut filter = CountingBloomFilter::new(&family, 4096, 4);
    for i in 0..500u64 {
        filter.add(&i);
    }
    for i in 0..500u64 {
        assert!(filter.count(&i) >= 1, "added element {i} reported absent");
    }
}

#[test]
fn test_min_estimator_bounds_the_true_count() {
    let family = DoubleHashFamily::new(3);
    let mut filter = CountingBloomFilter::new(&family, 1024, 8);
    for _ in 0..5 {
        filter.add("a");
    }
    filter.add("b");

    // The minimum over "a"'s cells can only exceed 5 where "b" collides.
    assert_that!(filter.count("a"), ge(5u64));
    assert_that!(filter.count("a"), le(6u64));
    assert_that!(filter.count("b"), ge(1u64));
}

#[test]
fn test_merge_adds_estimates() {
    let family = DoubleHashFamily::new(3);
    let mut left = CountingBloomFilter::new(&family, 50, 3);
    let mut right = CountingBloomFilter::new(&family, 50, 3);
    left.add("bar");
    left.add("bar");
    right.add("bar");
    right.add("bar");

    let merged = CountingBloomFilter::merge(&left, &right).unwrap();
    assert_eq!(merged.count("bar"), 4);
}

#[test]
fn test_merge_saturates_where_width_is_exceeded() {
    // Width 2 pins at 3, so 2 + 2 saturates in every touched cell.
    let family = DoubleHashFamily::new(3);
    let mut left = CountingBloomFilter::new(&family, 64, 2);
    let mut right = CountingBloomFilter::new(&family, 64, 2);
    for _ in 0..2 {
        left.add("x");
        right.add("x");
    }

    let merged = CountingBloomFilter::merge(&left, &right).unwrap();
    assert_eq!(merged.count("x"), merged.max());
}

#[test]
fn test_merge_is_commutative() {
    let family = DoubleHashFamily::new(3);
    let mut left = CountingBloomFilter::new(&family, 50, 3);
    let mut right = CountingBloomFilter::new(&family, 50, 3);
    left.add("a");
    left.add("a");
    right.add("b");

    let xy = CountingBloomFilter::merge(&left, &right).unwrap();
    let yx = CountingBloomFilter::merge(&right, &left).unwrap();
    assert_eq!(xy.serialize(), yx.serialize());
}

#[test]
fn test_merge_leaves_inputs_unmodified() {
    let family = DoubleHashFamily::new(3);
    let mut left = CountingBloomFilter::new(&family, 50, 3);
    let mut right = CountingBloomFilter::new(&family, 50, 3);
    left.add("a");
    right.add("b");
    let left_before = left.serialize();
    let right_before = right.serialize();

    CountingBloomFilter::merge(&left, &right).unwrap();
    assert_eq!(left.serialize(), left_before);
    assert_eq!(right.serialize(), right_before);
}

#[test]
fn test_merge_incompatible_width() {
    let family = DoubleHashFamily::new(3);
    let left = CountingBloomFilter::new(&family, 50, 3);
    let right = CountingBloomFilter::new(&family, 50, 4);

    let err = CountingBloomFilter::merge(&left, &right).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Incompatible);
}

#[test]
fn test_merge_incompatible_cells() {
    let family = DoubleHashFamily::new(3);
    let left = CountingBloomFilter::new(&family, 50, 3);
    let right = CountingBloomFilter::new(&family, 60, 3);

    let err = CountingBloomFilter::merge(&left, &right).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Incompatible);
}

#[test]
fn test_serialize_roundtrip_empty() {
    let family = DoubleHashFamily::new(3);
    let filter = CountingBloomFilter::new(&family, 50, 3);
    let restored = CountingBloomFilter::deserialize(&filter.serialize(), &family).unwrap();

    assert_eq!(restored.cells(), 50);
    assert_eq!(restored.width(), 3);
    assert_eq!(restored.serialize(), filter.serialize());
}

#[test]
fn test_serialize_roundtrip_with_saturated_cells() {
    let family = DoubleHashFamily::new(3);
    let mut filter = CountingBloomFilter::new(&family, 256, 2);
    for _ in 0..10 {
        filter.add("hot");
    }
    assert_eq!(filter.count("hot"), filter.max());

    let restored = CountingBloomFilter::deserialize(&filter.serialize(), &family).unwrap();
    assert_eq!(restored.count("hot"), restored.max());
    assert_eq!(restored.count("cold"), 0);
    assert_eq!(restored.serialize(), filter.serialize());
}

#[test]
fn test_deserialize_truncated() {
    let family = DoubleHashFamily::new(3);
    let mut filter = CountingBloomFilter::new(&family, 50, 3);
    filter.add("bar");
    let bytes = filter.serialize();

    for len in 0..bytes.len() {
        let err = CountingBloomFilter::deserialize(&bytes[..len], &family).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }
}

#[test]
fn test_deserialize_wrong_family() {
    use probloom::filter::BasicBloomFilter;

    let family = DoubleHashFamily::new(3);
    let basic = BasicBloomFilter::new(&family, 100);
    let err = CountingBloomFilter::deserialize(&basic.serialize(), &family).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}
