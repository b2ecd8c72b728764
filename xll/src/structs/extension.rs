//! DTS:X extension marker.
//!
//! Object-based DTS:X streams append a 32-bit sync word, aligned to four
//! bytes, after the XLL band data. Its absence simply means a plain lossless
//! stream.

use anyhow::{Result, bail};

use crate::process::frame::transact;
use crate::utils::bitstream_io::BsIoSliceReader;
use crate::utils::dump::DumpTable;
use crate::utils::errors::{Structure, XllError};

/// Sync word announcing DTS:X metadata.
pub const SYNC_X: u32 = 0x02_00_08_50;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XHeader {
    pub sync_word: u32,
}

impl XHeader {
    pub fn read(reader: &mut BsIoSliceReader) -> Result<Self> {
        transact(reader, |reader, _| {
            // align at 4-byte
            reader.align_to(32)?;

            let available = reader.available()?;
            if available < 32 {
                bail!(XllError::Truncated {
                    structure: Structure::Extension,
                    needed: 32,
                    available,
                });
            }

            let sync_word = reader.get_n(32)?;

            if sync_word != SYNC_X {
                bail!(XllError::SyncMismatch {
                    structure: Structure::Extension,
                    expected: SYNC_X,
                    read: sync_word,
                });
            }

            Ok(Self { sync_word })
        })
    }

    pub fn dump(&self, table: DumpTable) {
        table.field("sync_word", format_args!("{:#010x}", self.sync_word));
    }
}
