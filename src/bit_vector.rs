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

//! Fixed-size mutable bit storage.

use std::io::Cursor;

use byteorder::ReadBytesExt;
use byteorder::LE;

use crate::codec::Family;
use crate::error::Error;

const WORD_BITS: usize = 64;

/// A fixed-size array of individually addressable bits.
///
/// The length is fixed at construction and never changes. Bits are packed
/// into `u64` words; unused high bits of the last word are kept zero, so
/// equality and serialization always operate on canonical contents.
///
/// Out-of-range access is a caller bug and panics. Recoverable failures
/// exist only on the deserialization path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitVector {
    num_bits: usize,
    words: Vec<u64>,
}

impl BitVector {
    /// Creates an all-false bit vector of exactly `num_bits` bits.
    pub fn new(num_bits: usize) -> Self {
        Self {
            num_bits,
            words: vec![0u64; num_bits.div_ceil(WORD_BITS)],
        }
    }

    /// Returns the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn get(&self, index: usize) -> bool {
        assert!(
            index < self.num_bits,
            "bit index {index} out of range for length {}",
            self.num_bits
        );
        let mask = 1u64 << (index & (WORD_BITS - 1));
        (self.words[index / WORD_BITS] & mask) != 0
    }

    /// Sets the bit at `index` to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn set(&mut self, index: usize, value: bool) {
        assert!(
            index < self.num_bits,
            "bit index {index} out of range for length {}",
            self.num_bits
        );
        let mask = 1u64 << (index & (WORD_BITS - 1));
        let word = &mut self.words[index / WORD_BITS];
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Returns the number of bits.
    pub fn len(&self) -> usize {
        self.num_bits
    }

    /// Returns whether the vector holds no bits at all.
    pub fn is_empty(&self) -> bool {
        self.num_bits == 0
    }

    /// Returns the number of bits currently set.
    pub fn count_ones(&self) -> u64 {
        self.words.iter().map(|w| w.count_ones() as u64).sum()
    }

    /// ORs every bit of `other` into `self`.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    pub fn merge_or(&mut self, other: &BitVector) {
        assert_eq!(
            self.num_bits, other.num_bits,
            "cannot OR bit vectors of different lengths"
        );
        for (word, other_word) in self.words.iter_mut().zip(&other.words) {
            *word |= *other_word;
        }
    }

    /// Serializes the bit vector to a byte vector.
    ///
    /// # Examples
    ///
    /// ```
    /// # use probloom::bit_vector::BitVector;
    /// let mut bits = BitVector::new(130);
    /// bits.set(0, true);
    /// bits.set(129, true);
    ///
    /// let restored = BitVector::deserialize(&bits.serialize()).unwrap();
    /// assert_eq!(bits, restored);
    /// ```
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + 8 + self.words.len() * 8);
        self.write_into(&mut bytes);
        bytes
    }

    /// Appends the serialized form to `out`.
    pub(crate) fn write_into(&self, out: &mut Vec<u8>) {
        out.push(Family::BIT_VECTOR.id);
        out.extend_from_slice(&(self.num_bits as u64).to_le_bytes());
        for &word in &self.words {
            out.extend_from_slice(&word.to_le_bytes());
        }
    }

    /// Deserializes a bit vector from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is truncated, carries the wrong
    /// family ID, or sets bits beyond the stored length.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = Cursor::new(bytes);
        Self::read_from(&mut cursor)
    }

    /// Reads a bit vector starting at the cursor position.
    pub(crate) fn read_from(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        let family_id = cursor
            .read_u8()
            .map_err(|_| Error::insufficient_data("family_id"))?;
        Family::BIT_VECTOR.validate_id(family_id)?;

        let num_bits = cursor
            .read_u64::<LE>()
            .map_err(|_| Error::insufficient_data("num_bits"))?;
        let num_bits = usize::try_from(num_bits)
            .map_err(|_| Error::deserial("num_bits does not fit in usize"))?;
        let num_words = num_bits.div_ceil(WORD_BITS);

        // Check the payload length before allocating word storage, so a
        // corrupt length cannot trigger a huge allocation.
        let remaining = cursor.get_ref().len() as u64 - cursor.position();
        if (num_words as u64).saturating_mul(8) > remaining {
            return Err(Error::insufficient_data("words"));
        }

        let mut words = vec![0u64; num_words];
        for word in words.iter_mut() {
            *word = cursor
                .read_u64::<LE>()
                .map_err(|_| Error::insufficient_data("words"))?;
        }

        let used_bits = num_bits % WORD_BITS;
        if used_bits != 0 && words[num_words - 1] >> used_bits != 0 {
            return Err(Error::deserial("bits set beyond the stored length"));
        }

        Ok(Self { num_bits, words })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_get_set() {
        let mut bits = BitVector::new(100);
        assert_eq!(bits.len(), 100);
        assert!(!bits.get(0));
        assert!(!bits.get(99));

        bits.set(0, true);
        bits.set(63, true);
        bits.set(64, true);
        bits.set(99, true);
        assert!(bits.get(0));
        assert!(bits.get(63));
        assert!(bits.get(64));
        assert!(bits.get(99));
        assert!(!bits.get(1));
        assert_eq!(bits.count_ones(), 4);

        bits.set(63, false);
        assert!(!bits.get(63));
        assert_eq!(bits.count_ones(), 3);
    }

    #[test]
    #[should_panic(expected = "bit index 100 out of range")]
    fn test_get_out_of_range() {
        let bits = BitVector::new(100);
        bits.get(100);
    }

    #[test]
    #[should_panic(expected = "bit index 100 out of range")]
    fn test_set_out_of_range() {
        let mut bits = BitVector::new(100);
        bits.set(100, true);
    }

    #[test]
    fn test_merge_or() {
        let mut left = BitVector::new(70);
        let mut right = BitVector::new(70);
        left.set(1, true);
        right.set(1, true);
        right.set(69, true);

        left.merge_or(&right);
        assert!(left.get(1));
        assert!(left.get(69));
        assert_eq!(left.count_ones(), 2);

        // The argument is untouched.
        assert_eq!(right.count_ones(), 2);
        assert!(!right.get(0));
    }

    #[test]
    #[should_panic(expected = "different lengths")]
    fn test_merge_or_length_mismatch() {
        let mut left = BitVector::new(70);
        let right = BitVector::new(71);
        left.merge_or(&right);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut bits = BitVector::new(10);
        bits.set(3, true);
        let copy = bits.clone();
        bits.set(4, true);

        assert!(copy.get(3));
        assert!(!copy.get(4));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let mut bits = BitVector::new(130);
        bits.set(0, true);
        bits.set(64, true);
        bits.set(129, true);

        let restored = BitVector::deserialize(&bits.serialize()).unwrap();
        assert_eq!(bits, restored);
    }

    #[test]
    fn test_serialize_roundtrip_empty() {
        let bits = BitVector::new(64);
        let restored = BitVector::deserialize(&bits.serialize()).unwrap();
        assert_eq!(bits, restored);
    }

    #[test]
    fn test_deserialize_truncated() {
        let bits = BitVector::new(130);
        let bytes = bits.serialize();

        for len in 0..bytes.len() {
            let err = BitVector::deserialize(&bytes[..len]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidData);
        }
    }

    #[test]
    fn test_deserialize_wrong_family() {
        let mut bytes = BitVector::new(8).serialize();
        bytes[0] = 99;
        let err = BitVector::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_deserialize_rejects_stray_high_bits() {
        let mut bits = BitVector::new(65);
        bits.set(64, true);
        let mut bytes = bits.serialize();

        // Flip a bit above the stored length in the last word.
        let last = bytes.len() - 8;
        bytes[last] |= 0x02;
        let err = BitVector::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }
}
