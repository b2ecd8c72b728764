//! Root XLL header aggregate.

use crate::structs::asset::SubstreamAsset;
use crate::structs::channel_set::ChannelSet;
use crate::structs::common::CommonHeader;
use crate::structs::extension::XHeader;
use crate::structs::navi::NaviHeader;
use crate::utils::dump::DumpTable;

/// Decoded XLL header of one asset.
///
/// Either empty (the asset carries no XLL sync) or fully populated and
/// checksum verified; `channel_sets` then holds exactly
/// `common.num_channel_sets` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XllHeader {
    pub common: Option<CommonHeader>,
    pub channel_sets: Vec<ChannelSet>,
    pub navi: Option<NaviHeader>,
    /// Present when a DTS:X sync word follows the band data.
    pub dtsx: Option<XHeader>,
}

impl XllHeader {
    /// True for the "no XLL sync in this asset" outcome.
    pub fn is_empty(&self) -> bool {
        self.common.is_none()
    }

    pub fn has_dtsx(&self) -> bool {
        self.dtsx.is_some()
    }

    pub fn total_band_data_size(&self) -> u64 {
        self.navi
            .as_ref()
            .map_or(0, |navi| navi.total_band_data_size)
    }

    /// Channels of all channel sets combined.
    pub fn total_channels(&self) -> u32 {
        self.channel_sets
            .iter()
            .map(|cs| cs.num_channels as u32)
            .sum()
    }

    /// Logs every field at debug level.
    pub fn dump(&self, asset: &SubstreamAsset) {
        let root = DumpTable::new(0, 0);

        let Some(common) = &self.common else {
            root.title("DTS XLL HEADER (empty)");
            return;
        };

        root.title("DTS XLL HEADER");
        root.nested(2).title("COMMON");
        common.dump(DumpTable::new(4, 19));

        for (i, cs) in self.channel_sets.iter().enumerate() {
            root.nested(2).title(format_args!("CHANNEL SET[{i}]"));
            cs.dump(DumpTable::new(4, 35), asset);
        }

        if let Some(navi) = &self.navi {
            root.nested(2).title("NAVI");
            navi.dump(DumpTable::new(4, 21));
        }

        if let Some(dtsx) = &self.dtsx {
            root.nested(2).title("DTS:X");
            dtsx.dump(DumpTable::new(4, 9));
        }
    }
}
