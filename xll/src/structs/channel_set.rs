//! Channel set sub-headers.
//!
//! An XLL frame carries `num_channel_sets` channel sets, each a group of coded
//! channels sharing resolution, sampling rate and speaker mapping.
//!
//! ## Speaker Mapping
//!
//! - **One-to-one** (asset level flag set): every channel maps onto one
//!   speaker. The set may carry an embedded downmix matrix and an explicit
//!   channel mask.
//! - **Mapping coefficients**: up to four loudspeaker configurations, each
//!   with its own channel-to-speaker coefficient matrix.
//!
//! Matrices are never interpreted, only sized and skipped. Sizing the matrix
//! of a non-primary set needs the channel counts of every hierarchical set
//! decoded before it, see [`HierarchyAccumulator`].

use anyhow::{Result, bail};
use log::{debug, trace};

use crate::process::frame::transact;
use crate::structs::asset::SubstreamAsset;
use crate::structs::common::CommonHeader;
use crate::structs::read_crc16;
use crate::utils::bitstream_io::BsIoSliceReader;
use crate::utils::dump::DumpTable;
use crate::utils::errors::{Structure, XllError};

/// Sampling frequency by 4-bit frequency index.
pub const FREQUENCY_TABLE: [u32; 16] = [
    8000, 16000, 32000, 64000, 128000, 22050, 44100, 88200, 176400, 352800, 12000, 24000, 48000,
    96000, 192000, 384000,
];

/// Interpolation factor by 2-bit `ifactor_index`.
pub const INTERPOLATION_TABLE: [u8; 4] = [1, 2, 4, 8];

/// Sampling rates above this carry more than one frequency band.
pub const SINGLE_BAND_MAX_FREQUENCY: u32 = 96000;

const DOWNMIX_COEFF_BITS: u64 = 9;

/// Per-channel bits skipped when no channel mask is transmitted.
const CHANNEL_POSITION_BITS: u64 = 9 + 9 + 7;

const SPEAKER_POSITION_BITS: u64 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownmixDescriptor {
    pub channels: u8,
    pub label: &'static str,
}

/// Target layout by 3-bit `downmix_type`.
pub const DOWNMIX_TABLE: [DownmixDescriptor; 8] = [
    DownmixDescriptor { channels: 1, label: "1/0" },
    DownmixDescriptor { channels: 2, label: "Lo/Ro" },
    DownmixDescriptor { channels: 2, label: "Lt/Rt" },
    DownmixDescriptor { channels: 3, label: "3/0" },
    DownmixDescriptor { channels: 3, label: "2/1" },
    DownmixDescriptor { channels: 4, label: "2/2" },
    DownmixDescriptor { channels: 4, label: "3/1" },
    DownmixDescriptor { channels: 0, label: "unused" },
];

/// Running channel count of the hierarchical channel sets committed so far
/// in one header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HierarchyAccumulator {
    channels: u64,
}

impl HierarchyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channels(&self) -> u64 {
        self.channels
    }

    /// Accounts for a committed channel set.
    pub fn push(&mut self, cs: &ChannelSet) {
        if cs.hierarchical_channel_set {
            self.channels += cs.num_channels as u64;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoudspeakerConfig {
    pub active_channel_mask: u32,
    pub num_speakers: u8,
    pub speaker_mask_enabled: bool,
    pub speaker_mask: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelSet {
    /// Header length in bytes, including the checksum.
    pub header_size: u16,
    pub num_channels: u8,
    pub residual_channel_encode: u16,
    pub bit_resolution: u8,
    pub bit_width: u8,
    pub frequency_index: u8,
    pub frequency: u32,
    pub ifactor_index: u8,
    pub interpolation_factor: u8,
    pub replacement_set: u8,
    pub active_replace_set: bool,

    pub primary_channel_set: bool,
    pub downmix_coeffs_present: bool,
    pub downmix_embedded: bool,
    pub downmix_type: u8,
    pub hierarchical_channel_set: bool,
    pub channel_mask_enabled: bool,
    pub channel_mask: u32,

    pub mapping_coefficient_present: bool,
    pub chan_to_speaker_mapping_coeff_bits: u8,
    pub loudspeaker_configs: Vec<LoudspeakerConfig>,

    pub extra_frequency_bands: bool,
    pub num_frequency_bands: u8,
    pub crc16: u16,
    pub crc16_valid: bool,
}

impl ChannelSet {
    /// Reads channel set `index` of the header described by `common`.
    ///
    /// `hierarchy` must cover exactly the channel sets committed before this
    /// one.
    pub fn read(
        reader: &mut BsIoSliceReader,
        index: usize,
        asset: &SubstreamAsset,
        common: &CommonHeader,
        hierarchy: &HierarchyAccumulator,
    ) -> Result<Self> {
        let structure = Structure::ChannelSet(index);

        transact(reader, |reader, start| {
            let header_size = reader.get_n::<u16>(10)? + 1;

            if header_size < 2 {
                bail!(XllError::InvalidHeaderSize {
                    structure,
                    size: header_size,
                });
            }

            let crc = read_crc16(reader, start, header_size as u64 - 2, true)?;

            if !crc.is_valid() {
                bail!(XllError::CrcMismatch {
                    structure,
                    calculated: crc.calculated,
                    read: crc.read,
                });
            }

            let num_channels = reader.get_n::<u8>(4)? + 1;

            let mut cs = Self {
                header_size,
                num_channels,
                residual_channel_encode: reader.get_n(num_channels as u32)?,
                bit_resolution: reader.get_n::<u8>(5)? + 1,
                bit_width: reader.get_n::<u8>(5)? + 1,
                frequency_index: reader.get_n(4)?,
                crc16: crc.read,
                crc16_valid: true,
                ..Default::default()
            };

            cs.frequency = FREQUENCY_TABLE[cs.frequency_index as usize];

            cs.ifactor_index = reader.get_n(2)?;
            cs.interpolation_factor = INTERPOLATION_TABLE[cs.ifactor_index as usize];

            cs.replacement_set = reader.get_n(2)?;

            if cs.replacement_set != 0 {
                cs.active_replace_set = reader.get()?;
            }

            if asset.one_to_one_map_channel_to_speaker {
                cs.read_direct_mapping(reader, common, hierarchy)?;
            } else {
                cs.read_mapping_coefficients(reader, common)?;
            }

            cs.num_frequency_bands = if cs.frequency > SINGLE_BAND_MAX_FREQUENCY {
                cs.extra_frequency_bands = reader.get()?;

                if cs.extra_frequency_bands { 4 } else { 2 }
            } else {
                1
            };

            let declared = (header_size as u64) << 3;
            let consumed = reader.position()? - start;

            if consumed > declared - 16 {
                debug!(
                    "{structure}: fields overrun the checksum by {} bits",
                    consumed - (declared - 16)
                );
            } else {
                trace!(
                    "{structure}: {} of {} header bits used",
                    consumed,
                    declared - 16
                );
            }

            // header_size is authoritative, seeking back if needed
            reader.set_position(start + declared)?;

            Ok(cs)
        })
    }

    fn read_direct_mapping(
        &mut self,
        reader: &mut BsIoSliceReader,
        common: &CommonHeader,
        hierarchy: &HierarchyAccumulator,
    ) -> Result<()> {
        self.primary_channel_set = reader.get()?;
        self.downmix_coeffs_present = reader.get()?;

        if self.downmix_coeffs_present {
            self.downmix_embedded = reader.get()?;

            if self.primary_channel_set {
                self.downmix_type = reader.get_n(3)?;
            }
        }

        self.hierarchical_channel_set = reader.get()?;

        if self.downmix_coeffs_present {
            let (n, m) = self.downmix_matrix_dimensions(hierarchy);
            reader.skip_n(n * m * DOWNMIX_COEFF_BITS)?;
        }

        self.channel_mask_enabled = reader.get()?;

        if self.channel_mask_enabled {
            self.channel_mask = reader.get_n(common.channel_mask_bits as u32)?;
        } else {
            reader.skip_n(self.num_channels as u64 * CHANNEL_POSITION_BITS)?;
        }

        Ok(())
    }

    fn read_mapping_coefficients(
        &mut self,
        reader: &mut BsIoSliceReader,
        common: &CommonHeader,
    ) -> Result<()> {
        self.primary_channel_set = true;
        self.downmix_coeffs_present = false;
        self.hierarchical_channel_set = true;

        self.mapping_coefficient_present = reader.get()?;

        if !self.mapping_coefficient_present {
            return Ok(());
        }

        self.chan_to_speaker_mapping_coeff_bits = 6 + 2 * reader.get_n::<u8>(3)?;
        let num_loudspeaker_configs = reader.get_n::<u8>(2)? as usize + 1;

        let coeff_bits = self.chan_to_speaker_mapping_coeff_bits as u64;

        for _ in 0..num_loudspeaker_configs {
            let mut lc = LoudspeakerConfig {
                active_channel_mask: reader.get_n(self.num_channels as u32)?,
                num_speakers: reader.get_n::<u8>(6)? + 1,
                speaker_mask_enabled: reader.get()?,
                ..Default::default()
            };

            if lc.speaker_mask_enabled {
                lc.speaker_mask = reader.get_n(common.channel_mask_bits as u32)?;
            }

            let active_channels = lc.active_channel_mask.count_ones() as u64;

            for _ in 0..num_loudspeaker_configs {
                if !lc.speaker_mask_enabled {
                    reader.skip_n(SPEAKER_POSITION_BITS)?;
                }

                reader.skip_n(active_channels * coeff_bits)?;
            }

            self.loudspeaker_configs.push(lc);
        }

        Ok(())
    }

    /// Rows and columns of the embedded downmix matrix.
    ///
    /// A primary set folds its own channels into the signalled downmix
    /// layout. A non-primary set folds its channels (plus one) into all
    /// hierarchical channels decoded before it.
    pub fn downmix_matrix_dimensions(&self, hierarchy: &HierarchyAccumulator) -> (u64, u64) {
        if self.primary_channel_set {
            (
                self.num_channels as u64,
                DOWNMIX_TABLE[self.downmix_type as usize].channels as u64,
            )
        } else {
            (self.num_channels as u64 + 1, hierarchy.channels())
        }
    }

    /// Label of the signalled downmix layout, primary sets only.
    pub fn downmix_description(&self) -> Option<&'static str> {
        (self.downmix_coeffs_present && self.primary_channel_set)
            .then(|| DOWNMIX_TABLE[self.downmix_type as usize].label)
    }

    pub fn dump(&self, table: DumpTable, asset: &SubstreamAsset) {
        table.field("header_size", self.header_size);
        table.field("num_channels", self.num_channels);
        table.field(
            "residual_channel_encode",
            format_args!("{:#06x}", self.residual_channel_encode),
        );
        table.field("bit_resolution", self.bit_resolution);
        table.field("bit_width", self.bit_width);
        table.field("frequency_index", self.frequency_index);
        table.field("frequency", self.frequency);
        table.field("ifactor_index", self.ifactor_index);
        table.field("interpolation_factor", self.interpolation_factor);
        table.field("replacement_set", self.replacement_set);
        if self.replacement_set != 0 {
            table.field("active_replace_set", self.active_replace_set);
        }

        table.field(
            "(one_to_one_map_channel_to_speaker)",
            asset.one_to_one_map_channel_to_speaker,
        );
        table.field("primary_channel_set", self.primary_channel_set);
        table.field("downmix_coeffs_present", self.downmix_coeffs_present);

        if asset.one_to_one_map_channel_to_speaker {
            if self.downmix_coeffs_present {
                table.field("downmix_embedded", self.downmix_embedded);
                if let Some(label) = self.downmix_description() {
                    table.field(
                        "downmix_type",
                        format_args!("{} ({label})", self.downmix_type),
                    );
                }
            }
            table.field("hierarchical_channel_set", self.hierarchical_channel_set);
            table.field("channel_mask_enabled", self.channel_mask_enabled);
            if self.channel_mask_enabled {
                table.field("channel_mask", format_args!("{:#06x}", self.channel_mask));
            }
        } else {
            table.field("hierarchical_channel_set", self.hierarchical_channel_set);
            table.field(
                "mapping_coefficient_present",
                self.mapping_coefficient_present,
            );
            if self.mapping_coefficient_present {
                table.field(
                    "chan_to_speaker_mapping_coeff_bits",
                    format_args!("{:#04x}", self.chan_to_speaker_mapping_coeff_bits),
                );
                table.field("num_loudspeaker_configs", self.loudspeaker_configs.len());

                let nested = table.nested(2);
                for (i, lc) in self.loudspeaker_configs.iter().enumerate() {
                    nested.title(format_args!("loudspeaker_config[{i}]"));
                    nested.field(
                        "active_channel_mask",
                        format_args!("{:#06x}", lc.active_channel_mask),
                    );
                    nested.field("num_speakers", lc.num_speakers);
                    nested.field("speaker_mask_enabled", lc.speaker_mask_enabled);
                    if lc.speaker_mask_enabled {
                        nested.field("speaker_mask", format_args!("{:#08x}", lc.speaker_mask));
                    }
                }
            }
        }

        table.field("extra_frequency_bands", self.extra_frequency_bands);
        table.field("num_frequency_bands", self.num_frequency_bands);
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
