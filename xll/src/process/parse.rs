use anyhow::{Result, bail};
use log::{Level, debug, log_enabled, trace};

use crate::process::frame::transact;
use crate::structs::asset::SubstreamAsset;
use crate::structs::channel_set::{ChannelSet, HierarchyAccumulator};
use crate::structs::common::CommonHeader;
use crate::structs::extension::XHeader;
use crate::structs::header::XllHeader;
use crate::structs::navi::NaviHeader;
use crate::utils::bitstream_io::BsIoSliceReader;
use crate::utils::errors::{Structure, XllError};

/// Decodes the XLL header of `asset`.
///
/// The reader is positioned at the asset's XLL sync word first. An asset
/// without XLL sync yields an empty header. On any error the reader is back
/// at the position it had on entry.
pub fn try_decode_xll_header(
    reader: &mut BsIoSliceReader,
    asset: &SubstreamAsset,
) -> Result<XllHeader> {
    transact(reader, |reader, _| {
        // when sync not present simply return success with empty result
        if !asset.xll_sync_present {
            return Ok(XllHeader::default());
        }

        let Some(start_bit) = asset.start_bit() else {
            bail!(XllError::Truncated {
                structure: Structure::Common,
                needed: u64::MAX,
                available: reader.len(),
            });
        };

        reader.set_position(start_bit)?;

        let common = CommonHeader::read(reader)?;

        let mut channel_sets = Vec::with_capacity(common.num_channel_sets as usize);
        let mut hierarchy = HierarchyAccumulator::new();

        for index in 0..common.num_channel_sets as usize {
            let cs = ChannelSet::read(reader, index, asset, &common, &hierarchy)?;
            hierarchy.push(&cs);
            channel_sets.push(cs);
        }

        let navi = NaviHeader::read(reader, &common, &channel_sets)?;

        // skip band data
        let band_data_bits = navi.total_band_data_size << 3;
        let available = reader.available()?;

        if band_data_bits > available {
            bail!(XllError::Truncated {
                structure: Structure::BandData,
                needed: band_data_bits,
                available,
            });
        }

        reader.skip_n(band_data_bits)?;

        // presence is optional
        let dtsx = match XHeader::read(reader) {
            Ok(x) => Some(x),
            Err(e) => {
                trace!("No DTS:X marker: {e}");
                None
            }
        };

        let header = XllHeader {
            common: Some(common),
            channel_sets,
            navi: Some(navi),
            dtsx,
        };

        if log_enabled!(Level::Debug) {
            header.dump(asset);
        }

        Ok(header)
    })
}

/// Like [`try_decode_xll_header`], reporting only presence.
///
/// The rejection reason is logged at debug level.
pub fn decode_xll_header(reader: &mut BsIoSliceReader, asset: &SubstreamAsset) -> Option<XllHeader> {
    match try_decode_xll_header(reader, asset) {
        Ok(header) => Some(header),
        Err(e) => {
            debug!("XLL header rejected: {e}");
            None
        }
    }
}

/// Decodes the XLL header of `asset` inside `data`.
///
/// Touches nothing but its own reader, so independent buffers can be decoded
/// concurrently.
pub fn decode_xll_header_from_slice(data: &[u8], asset: &SubstreamAsset) -> Option<XllHeader> {
    let reader = &mut BsIoSliceReader::from_slice(data);
    decode_xll_header(reader, asset)
}

/// Running totals over the headers seen by a [`Parser`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserState {
    pub decoded: usize,
    pub empty: usize,
    pub rejected: usize,
    pub dtsx: usize,
}

/// Decodes a sequence of XLL headers, keeping statistics.
#[derive(Debug, Default)]
pub struct Parser {
    state: ParserState,
}

impl Parser {
    /// Decodes the XLL header of `asset` inside `data`.
    pub fn parse(&mut self, data: &[u8], asset: &SubstreamAsset) -> Result<XllHeader> {
        let reader = &mut BsIoSliceReader::from_slice(data);

        match try_decode_xll_header(reader, asset) {
            Ok(header) => {
                if header.is_empty() {
                    self.state.empty += 1;
                } else {
                    self.state.decoded += 1;
                }

                if header.has_dtsx() {
                    self.state.dtsx += 1;
                }

                Ok(header)
            }
            Err(e) => {
                self.state.rejected += 1;
                Err(e)
            }
        }
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }
}
