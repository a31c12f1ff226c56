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

use crate::error::Error;

/// Identifies the serialized form of each probloom type.
///
/// Every serializable type writes its family ID into its header; decoders
/// validate the ID before reading anything else, so a byte stream written
/// for one type can never be revived as another.
pub(crate) struct Family {
    /// The byte ID for this family.
    pub id: u8,
    /// The name for this family.
    pub name: &'static str,
}

impl Family {
    /// Fixed-size bit array storage.
    pub const BIT_VECTOR: Family = Family {
        id: 1,
        name: "BITVECTOR",
    };

    /// Packed saturating-counter storage.
    pub const COUNTER_VECTOR: Family = Family {
        id: 2,
        name: "COUNTERVECTOR",
    };

    /// Membership-only Bloom filter.
    pub const BASIC_BLOOM: Family = Family {
        id: 3,
        name: "BASICBLOOM",
    };

    /// Counting Bloom filter.
    pub const COUNTING_BLOOM: Family = Family {
        id: 4,
        name: "COUNTINGBLOOM",
    };
}

impl Family {
    pub fn validate_id(&self, family_id: u8) -> Result<(), Error> {
        if family_id != self.id {
            Err(Error::invalid_family(self.id, family_id, self.name))
        } else {
            Ok(())
        }
    }
}
