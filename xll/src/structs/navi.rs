//! Navigation table.
//!
//! Lists the coded size of every (frequency band, segment, channel set) chunk
//! of band data so the payload can be located without decoding it. Entries
//! are stored back to back in band-major, then segment, then channel set
//! order, with no separators; a channel set only contributes to bands it
//! declares.
//!
//! Unlike the other checksums, the 16 bits following the table stay consumed.

use anyhow::{Result, bail};

use crate::process::frame::transact;
use crate::structs::channel_set::ChannelSet;
use crate::structs::common::CommonHeader;
use crate::structs::read_crc16;
use crate::utils::bitstream_io::BsIoSliceReader;
use crate::utils::dump::DumpTable;
use crate::utils::errors::{Structure, XllError};

/// Size of one band data chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSize {
    pub band: u8,
    pub segment: u16,
    pub channel_set: u8,
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NaviHeader {
    /// Sum of all chunk sizes in bytes.
    pub total_band_data_size: u64,
    /// Chunk sizes in stream order.
    pub segment_sizes: Vec<SegmentSize>,
    pub crc16: u16,
    pub crc16_valid: bool,
}

impl NaviHeader {
    pub fn read(
        reader: &mut BsIoSliceReader,
        common: &CommonHeader,
        channel_sets: &[ChannelSet],
    ) -> Result<Self> {
        transact(reader, |reader, start| {
            let num_bands = channel_sets
                .iter()
                .map(|cs| cs.num_frequency_bands)
                .max()
                .unwrap_or(0);

            let mut navi = Self::default();

            for band in 0..num_bands {
                for segment in 0..common.num_segments {
                    for (channel_set, cs) in channel_sets.iter().enumerate() {
                        if cs.num_frequency_bands <= band {
                            continue;
                        }

                        let size = reader.get_n::<u64>(common.navi_data_size_bits as u32)? + 1;
                        navi.total_band_data_size += size;
                        navi.segment_sizes.push(SegmentSize {
                            band,
                            segment,
                            channel_set: channel_set as u8,
                            size,
                        });
                    }
                }
            }

            reader.byte_align();

            let len_bytes = (reader.position()? - start) >> 3;
            let crc = read_crc16(reader, start, len_bytes, false)?;

            if !crc.is_valid() {
                bail!(XllError::CrcMismatch {
                    structure: Structure::Navi,
                    calculated: crc.calculated,
                    read: crc.read,
                });
            }

            navi.crc16 = crc.read;
            navi.crc16_valid = true;

            Ok(navi)
        })
    }

    pub fn dump(&self, table: DumpTable) {
        table.field("total_band_data_size", self.total_band_data_size);
        table.field("segment_sizes", self.segment_sizes.len());
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
