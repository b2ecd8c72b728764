//! Data structures representing XLL header components.
//!
//! Contains the asset descriptor handed in by the demultiplexer, the common
//! header, per channel set headers, the navigation table, the optional DTS:X
//! marker and the root [`header::XllHeader`] aggregating them.

use anyhow::Result;

use crate::utils::bitstream_io::BsIoSliceReader;
use crate::utils::crc::CRC_XLL_HEADER;

pub mod asset;
pub mod channel_set;
pub mod common;
pub mod extension;
pub mod header;
pub mod navi;

/// Checksum read result: the value stored in the stream and the one computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc16Read {
    pub read: u16,
    pub calculated: u16,
}

impl Crc16Read {
    pub fn is_valid(&self) -> bool {
        self.read == self.calculated
    }
}

/// Computes the CRC over `len_bytes` bytes at bit `start` and reads the 16-bit
/// checksum stored immediately after them.
///
/// With `restore` the cursor returns to where it was, otherwise it is left
/// right after the checksum.
pub(crate) fn read_crc16(
    reader: &mut BsIoSliceReader,
    start: u64,
    len_bytes: u64,
    restore: bool,
) -> Result<Crc16Read> {
    let position = reader.position()?;
    let len = len_bytes << 3;

    let calculated = reader.crc16_check(&CRC_XLL_HEADER, start, len)?;

    reader.set_position(start + len)?;
    let read = reader.get_n(16)?;

    if restore {
        reader.set_position(position)?;
    }

    Ok(Crc16Read { read, calculated })
}
