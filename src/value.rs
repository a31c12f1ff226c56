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

//! Schema-tagged filter values for host-language integration.
//!
//! A host that exposes filters as opaque first-class values must remember
//! what element type each filter was built for, so that merges across
//! differently typed filters are rejected. [`TypedFilter`] pairs an
//! [`AnyBloomFilter`] with an optional [`Schema`] that is bound exactly
//! once and carried forward through merges.

use std::hash::Hash;

use crate::error::Error;
use crate::filter::AnyBloomFilter;
use crate::hash::HashFamily;

/// Describes the element type a filter was typed with.
///
/// Schemas compare by value; two typed filters are merge-compatible only
/// when their schemas are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
}

impl Schema {
    /// Creates a schema from an element-type name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the element-type name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A filter value with an optional element schema.
///
/// # Examples
///
/// ```
/// use probloom::filter::AnyBloomFilter;
/// use probloom::filter::BasicBloomFilter;
/// use probloom::hash::DoubleHashFamily;
/// use probloom::value::Schema;
/// use probloom::value::TypedFilter;
///
/// let family = DoubleHashFamily::new(3);
/// let filter = AnyBloomFilter::Basic(BasicBloomFilter::new(&family, 100));
///
/// let mut value = TypedFilter::untyped(filter);
/// value.typify(Schema::new("string"))?;
/// value.add("foo");
/// assert_eq!(value.count("foo"), 1);
/// # Ok::<(), probloom::error::Error>(())
/// ```
#[derive(Debug)]
pub struct TypedFilter<'h, H> {
    schema: Option<Schema>,
    filter: AnyBloomFilter<'h, H>,
}

impl<'h, H: HashFamily> TypedFilter<'h, H> {
    /// Wraps a freshly constructed filter with no schema bound yet.
    pub fn untyped(filter: AnyBloomFilter<'h, H>) -> Self {
        Self {
            schema: None,
            filter,
        }
    }

    /// Binds `schema` to this filter.
    ///
    /// A schema can be bound exactly once over the filter's lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter is already typed.
    pub fn typify(&mut self, schema: Schema) -> Result<(), Error> {
        if let Some(existing) = &self.schema {
            return Err(Error::invalid_argument("filter is already typed")
                .with_context("schema", existing.name()));
        }
        self.schema = Some(schema);
        Ok(())
    }

    /// Returns the bound schema, if any.
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Returns the wrapped filter.
    pub fn filter(&self) -> &AnyBloomFilter<'h, H> {
        &self.filter
    }

    /// Adds an element to the wrapped filter.
    pub fn add<T: Hash + ?Sized>(&mut self, value: &T) {
        self.filter.add(value);
    }

    /// Returns the wrapped filter's estimate for `value`.
    pub fn count<T: Hash + ?Sized>(&self, value: &T) -> u64 {
        self.filter.count(value)
    }

    /// Merges two typed filters into a new one carrying the same schema.
    ///
    /// Schema equality is part of the compatibility check: operands whose
    /// schemas differ — including one typed and one untyped — are
    /// rejected before the variant dispatch of [`AnyBloomFilter::merge`]
    /// runs. On success the result carries the operands' schema, so
    /// downstream identity checks treat it like its inputs. Neither
    /// operand is modified.
    ///
    /// # Errors
    ///
    /// Returns an [`Incompatible`](crate::error::ErrorKind::Incompatible)
    /// error on any schema, variant, or parameter mismatch.
    pub fn merge(x: &Self, y: &Self) -> Result<Self, Error> {
        if x.schema != y.schema {
            return Err(
                Error::incompatible("cannot merge filters with different schemas")
                    .with_context("left", schema_name(&x.schema))
                    .with_context("right", schema_name(&y.schema)),
            );
        }

        let filter = AnyBloomFilter::merge(&x.filter, &y.filter)?;
        Ok(Self {
            schema: x.schema.clone(),
            filter,
        })
    }
}

fn schema_name(schema: &Option<Schema>) -> &str {
    schema.as_ref().map_or("<untyped>", Schema::name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::filter::BasicBloomFilter;
    use crate::hash::DoubleHashFamily;

    fn basic_value<'h>(family: &'h DoubleHashFamily) -> TypedFilter<'h, DoubleHashFamily> {
        TypedFilter::untyped(AnyBloomFilter::Basic(BasicBloomFilter::new(family, 100)))
    }

    #[test]
    fn test_typify_exactly_once() {
        let family = DoubleHashFamily::new(3);
        let mut value = basic_value(&family);
        assert!(value.schema().is_none());

        value.typify(Schema::new("string")).unwrap();
        assert_eq!(value.schema().unwrap().name(), "string");

        let err = value.typify(Schema::new("count")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(value.schema().unwrap().name(), "string");
    }

    #[test]
    fn test_merge_requires_equal_schemas() {
        let family = DoubleHashFamily::new(3);
        let mut left = basic_value(&family);
        let mut right = basic_value(&family);
        left.typify(Schema::new("string")).unwrap();
        right.typify(Schema::new("count")).unwrap();

        let err = TypedFilter::merge(&left, &right).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Incompatible);
    }

    #[test]
    fn test_merge_rejects_typed_with_untyped() {
        let family = DoubleHashFamily::new(3);
        let mut left = basic_value(&family);
        let right = basic_value(&family);
        left.typify(Schema::new("string")).unwrap();

        let err = TypedFilter::merge(&left, &right).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Incompatible);
    }

    #[test]
    fn test_merge_carries_schema_forward() {
        let family = DoubleHashFamily::new(3);
        let mut left = basic_value(&family);
        let mut right = basic_value(&family);
        left.typify(Schema::new("string")).unwrap();
        right.typify(Schema::new("string")).unwrap();
        left.add("a");
        right.add("b");

        let merged = TypedFilter::merge(&left, &right).unwrap();
        assert_eq!(merged.schema().unwrap().name(), "string");
        assert_eq!(merged.count("a"), 1);
        assert_eq!(merged.count("b"), 1);
    }

    #[test]
    fn test_merge_untyped_pair() {
        let family = DoubleHashFamily::new(3);
        let merged = TypedFilter::merge(&basic_value(&family), &basic_value(&family)).unwrap();
        assert!(merged.schema().is_none());
    }
}
