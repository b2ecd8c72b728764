use crate::structs::asset::SubstreamAsset;
use crate::structs::common::SYNC_XLL;

const SYNC_BYTES: [u8; 4] = SYNC_XLL.to_be_bytes();

/// Byte offset of the first XLL sync word at or after `from`.
pub fn find_sync(data: &[u8], from: usize) -> Option<usize> {
    let mut state = 0;

    for (i, &byte) in data.get(from..)?.iter().enumerate() {
        state = match (state, byte) {
            (3, 0x47) => return Some(from + i - 3),
            (2, 0x95) => 3,
            (1, 0xA2) => 2,
            (_, 0x41) => 1,
            _ => 0,
        };
    }

    None
}

/// Iterates over the byte offsets of every XLL sync word in a buffer.
///
/// The search resumes right after each hit, so a sync pattern occurring
/// inside band data is reported too; whether a candidate is a real header is
/// for the decoder to tell.
///
/// ```rust
/// use xll::process::scan::SyncScanner;
///
/// let data = [0x00, 0x41, 0xA2, 0x95, 0x47, 0x41, 0xA2, 0x95, 0x47];
/// let offsets: Vec<_> = SyncScanner::new(&data).collect();
/// assert_eq!(offsets, [1, 5]);
/// ```
#[derive(Debug, Clone)]
pub struct SyncScanner<'a> {
    data: &'a [u8],
    next: usize,
}

impl<'a> SyncScanner<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, next: 0 }
    }

    /// Turns each hit into an asset whose XLL sync sits at that offset.
    pub fn assets(self) -> impl Iterator<Item = SubstreamAsset> + 'a {
        self.map(SubstreamAsset::at)
    }
}

impl Iterator for SyncScanner<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let offset = find_sync(self.data, self.next)?;
        self.next = offset + SYNC_BYTES.len();

        Some(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_sync() {
        let data = [0x41, 0x41, 0xA2, 0x95, 0x47, 0x00];

        assert_eq!(find_sync(&data, 0), Some(1));
        assert_eq!(find_sync(&data, 1), Some(1));
        assert_eq!(find_sync(&data, 2), None);
        assert_eq!(find_sync(&data, 7), None);
    }

    #[test]
    fn test_partial_match_restarts() {
        let data = [0x41, 0xA2, 0x41, 0xA2, 0x95, 0x47];
        assert_eq!(find_sync(&data, 0), Some(2));

        let data = [0x41, 0xA2, 0x95, 0x46];
        assert_eq!(find_sync(&data, 0), None);
    }

    #[test]
    fn test_scanner_reports_every_hit() {
        let mut data = vec![0xFFu8; 3];
        data.extend(SYNC_BYTES);
        data.extend([0u8; 10]);
        data.extend(SYNC_BYTES);

        let hits: Vec<_> = SyncScanner::new(&data).collect();
        assert_eq!(hits, [3, 17]);

        let assets: Vec<_> = SyncScanner::new(&data).assets().collect();
        assert_eq!(assets[1], SubstreamAsset::at(17));
    }
}
