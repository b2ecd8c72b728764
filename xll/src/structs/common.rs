//! Common XLL header.
//!
//! Fixed-position prologue of the lossless extension: sync word, version,
//! header size and the stream-wide parameters later structures depend on
//! (channel set count, segment count, navigation and channel mask widths).
//!
//! ## Layout
//!
//! ```text
//! sync_word(32) version(4) header_size(8) frame_size_bits(5)
//! frame_size(frame_size_bits) num_channel_sets(4) num_segments(4)
//! samples_per_segment(4) navi_data_size_bits(5) band_data_crc(2)
//! scalable_lsb(1) channel_mask_bits(5) [num_fixed_lsb_width(4)]
//! reserved ... crc16(16)
//! ```
//!
//! The checksum covers everything after the first four bytes up to itself.

use anyhow::{Result, bail};
use log::{debug, trace};

use crate::process::frame::transact;
use crate::structs::read_crc16;
use crate::utils::bitstream_io::BsIoSliceReader;
use crate::utils::dump::DumpTable;
use crate::utils::errors::{Structure, XllError};

/// Sync word opening every XLL header.
pub const SYNC_XLL: u32 = 0x41_A2_95_47;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonHeader {
    pub sync_word: u32,
    pub version: u8,
    /// Header length in bytes, including sync word and checksum.
    pub header_size: u16,
    pub frame_size_bits: u8,
    pub frame_size: u64,
    pub num_channel_sets: u8,
    pub num_segments: u16,
    pub samples_per_segment: u32,
    pub navi_data_size_bits: u8,
    pub band_data_crc: u8,
    pub scalable_lsb: bool,
    pub channel_mask_bits: u8,
    pub num_fixed_lsb_width: u8,
    pub crc16: u16,
    pub crc16_valid: bool,
}

impl CommonHeader {
    pub fn read(reader: &mut BsIoSliceReader) -> Result<Self> {
        transact(reader, |reader, start| {
            let sync_word = reader.get_n(32)?;

            if sync_word != SYNC_XLL {
                bail!(XllError::SyncMismatch {
                    structure: Structure::Common,
                    expected: SYNC_XLL,
                    read: sync_word,
                });
            }

            let version = reader.get_n::<u8>(4)? + 1;
            let header_size = reader.get_n::<u16>(8)? + 1;

            if header_size < 6 {
                bail!(XllError::InvalidHeaderSize {
                    structure: Structure::Common,
                    size: header_size,
                });
            }

            let crc = read_crc16(reader, start + 32, header_size as u64 - 6, true)?;

            if !crc.is_valid() {
                bail!(XllError::CrcMismatch {
                    structure: Structure::Common,
                    calculated: crc.calculated,
                    read: crc.read,
                });
            }

            let frame_size_bits = reader.get_n::<u8>(5)? + 1;

            let mut h = Self {
                sync_word,
                version,
                header_size,
                frame_size_bits,
                frame_size: reader.get_n::<u64>(frame_size_bits as u32)? + 1,
                num_channel_sets: reader.get_n::<u8>(4)? + 1,
                num_segments: 1 << reader.get_n::<u8>(4)?,
                samples_per_segment: 1 << reader.get_n::<u8>(4)?,
                navi_data_size_bits: reader.get_n::<u8>(5)? + 1,
                band_data_crc: reader.get_n(2)?,
                scalable_lsb: reader.get()?,
                channel_mask_bits: reader.get_n::<u8>(5)? + 1,
                crc16: crc.read,
                crc16_valid: true,
                ..Default::default()
            };

            if h.scalable_lsb {
                h.num_fixed_lsb_width = reader.get_n(4)?;
            }

            let declared = (header_size as u64) << 3;
            let consumed = reader.position()? - start;

            if consumed > declared - 16 {
                debug!(
                    "common header: fields overrun the checksum by {} bits",
                    consumed - (declared - 16)
                );
            } else if consumed < declared - 16 {
                trace!(
                    "common header: skipping {} reserved bits",
                    declared - 16 - consumed
                );
            }

            // header_size is authoritative, seeking back if needed
            reader.set_position(start + declared)?;

            Ok(h)
        })
    }

    /// Header length in bits; the cursor always ends exactly this far from the sync word.
    pub fn size_in_bits(&self) -> u64 {
        (self.header_size as u64) << 3
    }

    pub fn dump(&self, table: DumpTable) {
        table.field("sync_word", format_args!("{:#010x}", self.sync_word));
        table.field("version", self.version);
        table.field("header_size", self.header_size);
        table.field("frame_size_bits", self.frame_size_bits);
        table.field("frame_size", self.frame_size);
        table.field("num_channel_sets", self.num_channel_sets);
        table.field("num_segments", self.num_segments);
        table.field("samples_per_segment", self.samples_per_segment);
        table.field("navi_data_size_bits", self.navi_data_size_bits);
        table.field("band_data_crc", self.band_data_crc);
        table.field("scalable_lsb", self.scalable_lsb);
        table.field("channel_mask_bits", self.channel_mask_bits);
        if self.scalable_lsb {
            table.field("num_fixed_lsb_width", self.num_fixed_lsb_width);
        }
        table.field(
            "crc16",
            format_args!(
                "{:#06x} ({})",
                self.crc16,
                if self.crc16_valid { "valid" } else { "invalid" }
            ),
        );
    }
}
