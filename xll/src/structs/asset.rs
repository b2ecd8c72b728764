//! Substream asset descriptor.
//!
//! The DTS-HD extension substream header describes one or more assets. The
//! fields below are the subset the XLL header decoder needs; locating and
//! parsing the asset descriptor itself is the demultiplexer's job.

/// Location and mapping mode of the XLL data inside one asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstreamAsset {
    /// Byte offset of the XLL component within the buffer.
    pub xll_offset: usize,
    /// Byte offset of the XLL sync word relative to `xll_offset`.
    pub xll_sync_offset: usize,
    pub xll_sync_present: bool,
    /// Each coded channel feeds exactly one loudspeaker.
    pub one_to_one_map_channel_to_speaker: bool,
}

impl SubstreamAsset {
    /// Asset whose XLL sync word sits at `offset` with one-to-one mapping.
    pub fn at(offset: usize) -> Self {
        Self {
            xll_offset: offset,
            xll_sync_offset: 0,
            xll_sync_present: true,
            one_to_one_map_channel_to_speaker: true,
        }
    }

    /// Absolute byte offset of the XLL sync word, `None` if it overflows.
    pub fn sync_position(&self) -> Option<usize> {
        self.xll_offset.checked_add(self.xll_sync_offset)
    }

    /// Absolute bit position of the XLL sync word, `None` if it overflows.
    pub fn start_bit(&self) -> Option<u64> {
        u64::try_from(self.sync_position()?).ok()?.checked_mul(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_bit() {
        let asset = SubstreamAsset {
            xll_offset: 10,
            xll_sync_offset: 6,
            ..SubstreamAsset::at(0)
        };

        assert_eq!(asset.sync_position(), Some(16));
        assert_eq!(asset.start_bit(), Some(128));
    }

    #[test]
    fn test_overflowing_offsets() {
        let asset = SubstreamAsset {
            xll_offset: usize::MAX,
            xll_sync_offset: 1,
            ..SubstreamAsset::at(0)
        };
        assert_eq!(asset.sync_position(), None);
        assert_eq!(asset.start_bit(), None);

        let asset = SubstreamAsset::at(usize::MAX);
        assert_eq!(asset.sync_position(), Some(usize::MAX));
        assert_eq!(asset.start_bit(), None);
    }
}
