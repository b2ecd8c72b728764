//! Synthetic XLL headers for unit tests.
//!
//! Builds byte-exact structures with valid checksums so the decoders can be
//! exercised without binary fixtures.

use bitstream_io::{BigEndian, BitWrite, BitWriter};

use crate::structs::channel_set::{DOWNMIX_TABLE, FREQUENCY_TABLE};
use crate::structs::common::SYNC_XLL;
use crate::structs::extension::SYNC_X;
use crate::utils::crc::CRC_XLL_HEADER;

pub struct BitPacker {
    bw: BitWriter<Vec<u8>, BigEndian>,
}

impl BitPacker {
    pub fn new() -> Self {
        Self {
            bw: BitWriter::new(Vec::new()),
        }
    }

    pub fn put(&mut self, bits: u32, value: u64) -> &mut Self {
        self.bw
            .write_unsigned_var::<u64>(bits, value)
            .expect("value fits in field");
        self
    }

    pub fn flag(&mut self, value: bool) -> &mut Self {
        self.bw.write_bit(value).expect("write bit");
        self
    }

    pub fn zeros(&mut self, mut bits: u64) -> &mut Self {
        while bits > 0 {
            let n = bits.min(32);
            self.put(n as u32, 0);
            bits -= n;
        }
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.bw.byte_align().expect("byte align");
        self.bw.into_writer()
    }
}

#[derive(Debug, Clone)]
pub struct CommonFields {
    pub version: u8,
    pub frame_size_bits: u8,
    pub frame_size: u64,
    pub num_channel_sets: u8,
    pub segments_log2: u8,
    pub samples_log2: u8,
    pub navi_bits: u8,
    pub band_data_crc: u8,
    pub scalable_lsb: bool,
    pub fixed_lsb_width: u8,
    pub channel_mask_bits: u8,
    pub trailing_bytes: usize,
}

impl Default for CommonFields {
    fn default() -> Self {
        Self {
            version: 1,
            frame_size_bits: 16,
            frame_size: 1000,
            num_channel_sets: 1,
            segments_log2: 0,
            samples_log2: 9,
            navi_bits: 16,
            band_data_crc: 0,
            scalable_lsb: false,
            fixed_lsb_width: 0,
            channel_mask_bits: 16,
            trailing_bytes: 0,
        }
    }
}

pub fn common_block(f: &CommonFields) -> Vec<u8> {
    let mut p = BitPacker::new();
    p.put(32, SYNC_XLL as u64)
        .put(4, f.version as u64 - 1)
        .put(8, 0)
        .put(5, f.frame_size_bits as u64 - 1)
        .put(f.frame_size_bits as u32, f.frame_size - 1)
        .put(4, f.num_channel_sets as u64 - 1)
        .put(4, f.segments_log2 as u64)
        .put(4, f.samples_log2 as u64)
        .put(5, f.navi_bits as u64 - 1)
        .put(2, f.band_data_crc as u64)
        .flag(f.scalable_lsb)
        .put(5, f.channel_mask_bits as u64 - 1);
    if f.scalable_lsb {
        p.put(4, f.fixed_lsb_width as u64);
    }

    let mut bytes = p.finish();
    bytes.resize(bytes.len() + f.trailing_bytes, 0);

    seal_common(bytes)
}

/// Declares `bytes` plus a checksum as the common header and appends the
/// checksum.
fn seal_common(mut bytes: Vec<u8>) -> Vec<u8> {
    let header_size = bytes.len() + 2;
    assert!(header_size <= 256);
    let v = (header_size - 1) as u8;
    bytes[4] = (bytes[4] & 0xF0) | (v >> 4);
    bytes[5] = (bytes[5] & 0x0F) | (v << 4);

    let crc = CRC_XLL_HEADER.checksum(&bytes[4..]);
    bytes.extend(crc.to_be_bytes());
    bytes
}

/// Re-declares a common header block as `size` bytes, cutting or zero padding
/// its fields, with a matching checksum.
pub fn resize_common(block: &[u8], size: usize) -> Vec<u8> {
    let mut bytes = block[..block.len() - 2].to_vec();
    bytes.resize(size - 2, 0);
    seal_common(bytes)
}

#[derive(Debug, Clone)]
pub struct DownmixFields {
    pub embedded: bool,
    pub downmix_type: u8,
    /// Channels of earlier hierarchical sets, sizes a non-primary matrix.
    pub prior_hierarchical_channels: u64,
}

#[derive(Debug, Clone)]
pub struct SpeakerConfigFields {
    pub active_channel_mask: u32,
    pub num_speakers: u8,
    pub speaker_mask: Option<u32>,
}

#[derive(Debug, Clone)]
pub enum MappingFields {
    Direct {
        primary: bool,
        downmix: Option<DownmixFields>,
        hierarchical: bool,
        channel_mask: Option<u32>,
    },
    Coefficients(Option<(u8, Vec<SpeakerConfigFields>)>),
}

#[derive(Debug, Clone)]
pub struct ChannelSetFields {
    pub num_channels: u8,
    pub residual_channel_encode: u16,
    pub bit_resolution: u8,
    pub bit_width: u8,
    pub frequency_index: u8,
    pub ifactor_index: u8,
    pub replacement_set: u8,
    pub active_replace_set: bool,
    pub mapping: MappingFields,
    pub extra_frequency_bands: bool,
    pub channel_mask_bits: u8,
    pub trailing_bytes: usize,
}

impl Default for ChannelSetFields {
    fn default() -> Self {
        Self {
            num_channels: 2,
            residual_channel_encode: 0,
            bit_resolution: 24,
            bit_width: 24,
            frequency_index: 12,
            ifactor_index: 0,
            replacement_set: 0,
            active_replace_set: false,
            mapping: MappingFields::Direct {
                primary: true,
                downmix: None,
                hierarchical: true,
                channel_mask: Some(0x000F),
            },
            extra_frequency_bands: false,
            channel_mask_bits: 16,
            trailing_bytes: 0,
        }
    }
}

pub fn channel_set_block(f: &ChannelSetFields) -> Vec<u8> {
    let nch = f.num_channels as u32;

    let mut p = BitPacker::new();
    p.put(10, 0)
        .put(4, nch as u64 - 1)
        .put(nch, f.residual_channel_encode as u64)
        .put(5, f.bit_resolution as u64 - 1)
        .put(5, f.bit_width as u64 - 1)
        .put(4, f.frequency_index as u64)
        .put(2, f.ifactor_index as u64)
        .put(2, f.replacement_set as u64);
    if f.replacement_set != 0 {
        p.flag(f.active_replace_set);
    }

    match &f.mapping {
        MappingFields::Direct {
            primary,
            downmix,
            hierarchical,
            channel_mask,
        } => {
            p.flag(*primary).flag(downmix.is_some());
            if let Some(dm) = downmix {
                p.flag(dm.embedded);
                if *primary {
                    p.put(3, dm.downmix_type as u64);
                }
            }
            p.flag(*hierarchical);
            if let Some(dm) = downmix {
                let (n, m) = if *primary {
                    (nch as u64, DOWNMIX_TABLE[dm.downmix_type as usize].channels as u64)
                } else {
                    (nch as u64 + 1, dm.prior_hierarchical_channels)
                };
                p.zeros(n * m * 9);
            }
            p.flag(channel_mask.is_some());
            match channel_mask {
                Some(mask) => {
                    p.put(f.channel_mask_bits as u32, *mask as u64);
                }
                None => {
                    p.zeros(nch as u64 * 25);
                }
            }
        }
        MappingFields::Coefficients(coeffs) => {
            p.flag(coeffs.is_some());
            if let Some((sel, configs)) = coeffs {
                let coeff_bits = 6 + 2 * *sel as u64;
                p.put(3, *sel as u64).put(2, configs.len() as u64 - 1);
                for lc in configs {
                    p.put(nch, lc.active_channel_mask as u64)
                        .put(6, lc.num_speakers as u64 - 1)
                        .flag(lc.speaker_mask.is_some());
                    if let Some(mask) = lc.speaker_mask {
                        p.put(f.channel_mask_bits as u32, mask as u64);
                    }
                    for _ in 0..configs.len() {
                        if lc.speaker_mask.is_none() {
                            p.zeros(25);
                        }
                        let active = lc.active_channel_mask.count_ones() as u64;
                        p.zeros(active * coeff_bits);
                    }
                }
            }
        }
    }

    if FREQUENCY_TABLE[f.frequency_index as usize] > 96000 {
        p.flag(f.extra_frequency_bands);
    }

    let mut bytes = p.finish();
    bytes.resize(bytes.len() + f.trailing_bytes, 0);

    seal_channel_set(bytes)
}

fn seal_channel_set(mut bytes: Vec<u8>) -> Vec<u8> {
    let header_size = bytes.len() + 2;
    assert!(header_size <= 1024);
    let v = (header_size - 1) as u16;
    bytes[0] = (v >> 2) as u8;
    bytes[1] = (bytes[1] & 0x3F) | (((v & 3) as u8) << 6);

    let crc = CRC_XLL_HEADER.checksum(&bytes);
    bytes.extend(crc.to_be_bytes());
    bytes
}

/// Re-declares a channel set block as `size` bytes, cutting or zero padding
/// its fields, with a matching checksum.
pub fn resize_channel_set(block: &[u8], size: usize) -> Vec<u8> {
    let mut bytes = block[..block.len() - 2].to_vec();
    bytes.resize(size - 2, 0);
    seal_channel_set(bytes)
}

/// Navigation table holding `sizes` in stream order.
pub fn navi_block(sizes: &[u32], navi_bits: u8) -> Vec<u8> {
    let mut p = BitPacker::new();
    for &size in sizes {
        p.put(navi_bits as u32, size as u64 - 1);
    }

    let mut bytes = p.finish();
    let crc = CRC_XLL_HEADER.checksum(&bytes);
    bytes.extend(crc.to_be_bytes());
    bytes
}

/// Complete XLL header followed by zeroed band data and an optional
/// 4-byte aligned extension sync word. Offsets are relative to byte 0.
pub fn xll_stream(
    common: &CommonFields,
    channel_sets: &[ChannelSetFields],
    navi_sizes: &[u32],
    dtsx: bool,
) -> Vec<u8> {
    let mut bytes = common_block(common);
    for cs in channel_sets {
        bytes.extend(channel_set_block(cs));
    }
    bytes.extend(navi_block(navi_sizes, common.navi_bits));

    let band_data: u64 = navi_sizes.iter().map(|&s| s as u64).sum();
    bytes.resize(bytes.len() + band_data as usize, 0);

    if dtsx {
        bytes.resize(bytes.len().next_multiple_of(4), 0);
        bytes.extend(SYNC_X.to_be_bytes());
    }

    bytes
}
