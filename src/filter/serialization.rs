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

use std::io::Cursor;

use byteorder::ReadBytesExt;
use byteorder::LE;

use crate::codec::Family;
use crate::error::Error;

pub(super) const PREAMBLE_LONGS: u8 = 1;
pub(super) const SERIAL_VERSION: u8 = 1;

// Preamble layout, one long:
//   byte 0: preamble longs
//   byte 1: serial version
//   byte 2: family ID
//   byte 3: flags (reserved, zero)
//   bytes 4-7: number of hash functions (u32 LE)
// The variant-specific storage payload follows.

pub(super) fn write_preamble(out: &mut Vec<u8>, family: &Family, k: u32) {
    out.push(PREAMBLE_LONGS);
    out.push(SERIAL_VERSION);
    out.push(family.id);
    out.push(0u8);
    out.extend_from_slice(&k.to_le_bytes());
}

pub(super) fn read_preamble(cursor: &mut Cursor<&[u8]>, family: &Family) -> Result<u32, Error> {
    let preamble_longs = cursor
        .read_u8()
        .map_err(|_| Error::insufficient_data("preamble_longs"))?;
    let serial_version = cursor
        .read_u8()
        .map_err(|_| Error::insufficient_data("serial_version"))?;
    let family_id = cursor
        .read_u8()
        .map_err(|_| Error::insufficient_data("family_id"))?;
    let _flags = cursor
        .read_u8()
        .map_err(|_| Error::insufficient_data("flags"))?;

    family.validate_id(family_id)?;
    if serial_version != SERIAL_VERSION {
        return Err(Error::unsupported_serial_version(
            SERIAL_VERSION,
            serial_version,
        ));
    }
    if preamble_longs != PREAMBLE_LONGS {
        return Err(Error::invalid_preamble_longs(PREAMBLE_LONGS, preamble_longs));
    }

    let k = cursor
        .read_u32::<LE>()
        .map_err(|_| Error::insufficient_data("k"))?;
    if k == 0 {
        return Err(Error::deserial("hash count must be at least 1"));
    }
    Ok(k)
}
