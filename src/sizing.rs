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

//! Closed-form sizing for Bloom filters.
//!
//! Pure, stateless helpers callers run before constructing a filter; the
//! filters themselves never call them. Both derive from the standard
//! Bloom-filter analysis: for `capacity` elements at a target
//! false-positive rate `fp`, the optimal cell count is
//! `-capacity * ln(fp) / ln(2)^2`, and the optimal number of hash
//! functions for `cells` cells is `cells / capacity * ln(2)`.

use std::f64::consts::LN_2;

use crate::error::Error;

/// Returns the smallest cell count that supports `capacity` elements at
/// an expected false-positive rate of at most `fp`.
///
/// # Errors
///
/// Returns an error unless `fp` lies in `(0, 1)` and `capacity` is
/// positive.
///
/// # Examples
///
/// ```
/// let cells = probloom::sizing::optimal_cells(0.01, 1000)?;
/// assert_eq!(cells, 9586);
/// # Ok::<(), probloom::error::Error>(())
/// ```
pub fn optimal_cells(fp: f64, capacity: u64) -> Result<u64, Error> {
    if !(fp > 0.0 && fp < 1.0) {
        return Err(Error::invalid_argument(
            "false-positive rate must be between 0 and 1 (exclusive)",
        )
        .with_context("fp", fp));
    }
    if capacity == 0 {
        return Err(Error::invalid_argument("capacity must be at least 1"));
    }

    let cells = (-(capacity as f64) * fp.ln() / (LN_2 * LN_2)).ceil();
    Ok(cells as u64)
}

/// Returns the optimal number of hash functions for `cells` cells and
/// `capacity` elements, never less than one.
///
/// # Errors
///
/// Returns an error unless both `cells` and `capacity` are positive.
///
/// # Examples
///
/// ```
/// let k = probloom::sizing::optimal_hash_count(9586, 1000)?;
/// assert_eq!(k, 7);
/// # Ok::<(), probloom::error::Error>(())
/// ```
pub fn optimal_hash_count(cells: u64, capacity: u64) -> Result<u64, Error> {
    if cells == 0 {
        return Err(Error::invalid_argument("cells must be at least 1"));
    }
    if capacity == 0 {
        return Err(Error::invalid_argument("capacity must be at least 1"));
    }

    let k = (cells as f64 / capacity as f64 * LN_2).round();
    Ok(k.max(1.0) as u64)
}
