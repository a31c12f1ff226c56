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

//! Packed fixed-width saturating counters.

use std::io::Cursor;

use byteorder::ReadBytesExt;
use byteorder::LE;

use crate::bit_vector::BitVector;
use crate::codec::Family;
use crate::error::Error;

/// An array of fixed-width saturating counters packed over a
/// [`BitVector`].
///
/// Each of the `cells` counters occupies `width` bits, so counter values
/// live in `[0, 2^width - 1]`. Addition ripples carries through the
/// cell's bits explicitly and clamps the cell to its maximum on overflow.
/// Subtraction wraps modulo `2^width` instead of clamping; the asymmetry
/// between the two policies is an intentional part of the contract.
///
/// # Examples
///
/// ```
/// # use probloom::counter_vector::CounterVector;
/// let mut counters = CounterVector::new(4, 8);
/// counters.increment(3, 14);
/// assert!(counters.increment(3, 1)); // 15, the maximum for width 4
/// assert!(!counters.increment(3, 1)); // overflow: saturates
/// assert_eq!(counters.count(3), counters.max());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterVector {
    bits: BitVector,
    width: usize,
}

impl CounterVector {
    /// Creates `cells` zeroed counters of `width` bits each.
    ///
    /// # Panics
    ///
    /// Panics if `width` is not in `1..=64` or `width * cells` overflows.
    pub fn new(width: usize, cells: usize) -> Self {
        assert!(
            (1..=64).contains(&width),
            "width must be between 1 and 64, got {width}"
        );
        let num_bits = width
            .checked_mul(cells)
            .expect("width * cells overflows usize");
        Self {
            bits: BitVector::new(num_bits),
            width,
        }
    }

    /// Adds `value` to the counter at `cell`.
    ///
    /// Only the low `width` bits of `value` participate in the
    /// ripple-carry addition. If the final carry overflows the width, the
    /// cell saturates: all of its bits are forced to one. Returns `true`
    /// when no overflow occurred and `false` when the cell saturated.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is out of range or `value` is zero.
    pub fn increment(&mut self, cell: usize, value: u64) -> bool {
        assert!(
            cell < self.size(),
            "cell index {cell} out of range for {} cells",
            self.size()
        );
        assert_ne!(value, 0, "increment amount must be nonzero");

        let carry = self.ripple_add(cell, value);
        if carry {
            self.saturate(cell);
        }
        !carry
    }

    /// Subtracts `value` from the counter at `cell`.
    ///
    /// Subtraction is two's-complement addition of the negated amount,
    /// restricted to the cell's `width` bits. The cell is not clamped on
    /// underflow: going below zero wraps modulo `2^width`. Returns the
    /// raw carry-out of that addition, which is `true` exactly when the
    /// subtraction did not wrap (`value` was at most the stored count).
    ///
    /// # Panics
    ///
    /// Panics if `cell` is out of range or `value` is zero.
    pub fn decrement(&mut self, cell: usize, value: u64) -> bool {
        assert!(
            cell < self.size(),
            "cell index {cell} out of range for {} cells",
            self.size()
        );
        assert_ne!(value, 0, "decrement amount must be nonzero");

        self.ripple_add(cell, value.wrapping_neg())
    }

    /// Returns the value of the counter at `cell`.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is out of range.
    pub fn count(&self, cell: usize) -> u64 {
        assert!(
            cell < self.size(),
            "cell index {cell} out of range for {} cells",
            self.size()
        );
        let lsb = cell * self.width;
        let mut value = 0u64;
        for i in 0..self.width {
            if self.bits.get(lsb + i) {
                value |= 1u64 << i;
            }
        }
        value
    }

    /// Returns the number of cells.
    pub fn size(&self) -> usize {
        self.bits.len() / self.width
    }

    /// Returns the number of bits per cell.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the largest value one cell can hold, `2^width - 1`.
    pub fn max(&self) -> u64 {
        u64::MAX >> (64 - self.width)
    }

    /// Adds `other` into `self`, cell by cell, saturating each cell on
    /// overflow. Returns `self` so combinations can be chained.
    ///
    /// # Panics
    ///
    /// Panics if the operands differ in cell count or width.
    pub fn merge(&mut self, other: &CounterVector) -> &mut Self {
        assert_eq!(
            self.size(),
            other.size(),
            "cannot merge counter vectors with different cell counts"
        );
        assert_eq!(
            self.width, other.width,
            "cannot merge counter vectors with different widths"
        );

        for cell in 0..self.size() {
            let lsb = cell * self.width;
            let mut carry = false;
            for i in 0..self.width {
                let b1 = self.bits.get(lsb + i);
                let b2 = other.bits.get(lsb + i);
                self.bits.set(lsb + i, b1 ^ b2 ^ carry);
                carry = (b1 && b2) || (carry && (b1 != b2));
            }
            if carry {
                self.saturate(cell);
            }
        }
        self
    }

    /// Returns a new counter vector equal to `left` with `right` merged
    /// in. Neither input is modified.
    pub fn combine(left: &CounterVector, right: &CounterVector) -> CounterVector {
        let mut merged = left.clone();
        merged.merge(right);
        merged
    }

    /// Serializes the counter vector to a byte vector.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.write_into(&mut bytes);
        bytes
    }

    /// Appends the serialized form to `out`.
    pub(crate) fn write_into(&self, out: &mut Vec<u8>) {
        out.push(Family::COUNTER_VECTOR.id);
        out.extend_from_slice(&(self.width as u64).to_le_bytes());
        self.bits.write_into(out);
    }

    /// Deserializes a counter vector from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is truncated, carries the wrong
    /// family ID, or records a width that does not divide the bit length.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = Cursor::new(bytes);
        Self::read_from(&mut cursor)
    }

    /// Reads a counter vector starting at the cursor position.
    pub(crate) fn read_from(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        let family_id = cursor
            .read_u8()
            .map_err(|_| Error::insufficient_data("family_id"))?;
        Family::COUNTER_VECTOR.validate_id(family_id)?;

        let width = cursor
            .read_u64::<LE>()
            .map_err(|_| Error::insufficient_data("width"))?;
        if !(1..=64).contains(&width) {
            return Err(Error::deserial(format!(
                "width must be between 1 and 64, got {width}"
            )));
        }
        let width = width as usize;

        let bits = BitVector::read_from(cursor)?;
        if bits.len() % width != 0 {
            return Err(Error::deserial(format!(
                "bit length {} is not a multiple of width {width}",
                bits.len()
            )));
        }

        Ok(Self { bits, width })
    }

    /// Ripple-carry addition of `value`'s low `width` bits into `cell`.
    /// Returns the final carry-out.
    fn ripple_add(&mut self, cell: usize, value: u64) -> bool {
        let lsb = cell * self.width;
        let mut carry = false;
        for i in 0..self.width {
            let b1 = self.bits.get(lsb + i);
            let b2 = value & (1u64 << i) != 0;
            self.bits.set(lsb + i, b1 ^ b2 ^ carry);
            carry = (b1 && b2) || (carry && (b1 != b2));
        }
        carry
    }

    fn saturate(&mut self, cell: usize) {
        let lsb = cell * self.width;
        for i in 0..self.width {
            self.bits.set(lsb + i, true);
        }
    }
}
