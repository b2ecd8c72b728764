use anyhow::{Result, bail};
use serde::Serialize;

use super::command::{Cli, InfoArgs, OutputFormat};
use crate::input::InputReader;
use xll::process::parse::{Parser, ParserState};
use xll::process::scan::SyncScanner;
use xll::structs::asset::SubstreamAsset;
use xll::structs::channel_set::ChannelSet;
use xll::structs::header::XllHeader;

pub fn cmd_info(args: &InfoArgs, cli: &Cli) -> Result<()> {
    log::info!("Analyzing XLL headers: {}", args.input.display());

    let input = InputReader::new(&args.input)?;
    if input.is_stdin() {
        log::debug!("Reading input from stdin");
    }
    let data = input.read_to_vec()?;
    let assets = collect_assets(args, &data)?;

    if assets.is_empty() {
        log::warn!("No XLL sync word found in the input");
    }

    let mut parser = Parser::default();
    let mut headers = Vec::new();

    for asset in &assets {
        // checked when the assets were built
        let offset = asset.sync_position().unwrap_or(usize::MAX);

        match parser.parse(&data, asset) {
            Ok(header) => headers.push(HeaderReport::new(offset, &header)),
            // stray sync patterns inside band data are expected while scanning
            Err(e) if args.scan => log::debug!("Candidate at byte {offset} rejected: {e}"),
            Err(e) => log::warn!("XLL header at byte {offset} rejected: {e}"),
        }
    }

    let report = InfoReport {
        headers,
        summary: Summary::new(parser.state(), data.len()),
    };

    match args.format {
        OutputFormat::Text => display_report(&report),
        OutputFormat::Yaml => print!("{}", serde_yaml_ng::to_string(&report)?),
    }

    if cli.strict && report.summary.decoded == 0 {
        bail!("No XLL header could be decoded");
    }

    Ok(())
}

fn collect_assets(args: &InfoArgs, data: &[u8]) -> Result<Vec<SubstreamAsset>> {
    let one_to_one = !args.mapping_coefficients;

    if args.scan {
        return Ok(SyncScanner::new(data)
            .assets()
            .map(|asset| SubstreamAsset {
                one_to_one_map_channel_to_speaker: one_to_one,
                ..asset
            })
            .collect());
    }

    let asset = SubstreamAsset {
        xll_offset: args.offset,
        xll_sync_offset: args.sync_offset,
        xll_sync_present: !args.no_sync,
        one_to_one_map_channel_to_speaker: one_to_one,
    };

    if asset.sync_position().is_none() {
        bail!(
            "--offset {} plus --sync-offset {} overflows",
            args.offset,
            args.sync_offset
        );
    }

    Ok(vec![asset])
}

#[derive(Debug, Serialize)]
struct InfoReport {
    headers: Vec<HeaderReport>,
    summary: Summary,
}

#[derive(Debug, Serialize)]
struct Summary {
    decoded: usize,
    empty: usize,
    rejected: usize,
    dtsx: usize,
    input_bytes: usize,
}

impl Summary {
    fn new(state: &ParserState, input_bytes: usize) -> Self {
        Self {
            decoded: state.decoded,
            empty: state.empty,
            rejected: state.rejected,
            dtsx: state.dtsx,
            input_bytes,
        }
    }
}

#[derive(Debug, Serialize)]
struct HeaderReport {
    offset: usize,
    sync_present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    common: Option<CommonReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    channel_sets: Vec<ChannelSetReport>,
    band_data_size: u64,
    band_data_chunks: usize,
    dtsx: bool,
}

#[derive(Debug, Serialize)]
struct CommonReport {
    version: u8,
    header_size: u16,
    frame_size: u64,
    num_channel_sets: u8,
    num_segments: u16,
    samples_per_segment: u32,
    band_data_crc: u8,
    scalable_lsb: bool,
    fixed_lsb_width: u8,
    channel_mask_bits: u8,
}

#[derive(Debug, Serialize)]
struct ChannelSetReport {
    channels: u8,
    sampling_frequency: u32,
    interpolation_factor: u8,
    bit_resolution: u8,
    bit_width: u8,
    primary: bool,
    hierarchical: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    downmix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel_mask: Option<String>,
    loudspeaker_configs: usize,
    frequency_bands: u8,
}

impl HeaderReport {
    fn new(offset: usize, header: &XllHeader) -> Self {
        Self {
            offset,
            sync_present: !header.is_empty(),
            common: header.common.as_ref().map(|c| CommonReport {
                version: c.version,
                header_size: c.header_size,
                frame_size: c.frame_size,
                num_channel_sets: c.num_channel_sets,
                num_segments: c.num_segments,
                samples_per_segment: c.samples_per_segment,
                band_data_crc: c.band_data_crc,
                scalable_lsb: c.scalable_lsb,
                fixed_lsb_width: c.num_fixed_lsb_width,
                channel_mask_bits: c.channel_mask_bits,
            }),
            channel_sets: header.channel_sets.iter().map(ChannelSetReport::new).collect(),
            band_data_size: header.total_band_data_size(),
            band_data_chunks: header.navi.as_ref().map_or(0, |n| n.segment_sizes.len()),
            dtsx: header.has_dtsx(),
        }
    }
}

impl ChannelSetReport {
    fn new(cs: &ChannelSet) -> Self {
        let downmix = cs.downmix_coeffs_present.then(|| {
            let layout = cs.downmix_description().unwrap_or("hierarchical");
            if cs.downmix_embedded {
                format!("{layout} (embedded)")
            } else {
                layout.to_string()
            }
        });

        Self {
            channels: cs.num_channels,
            sampling_frequency: cs.frequency,
            interpolation_factor: cs.interpolation_factor,
            bit_resolution: cs.bit_resolution,
            bit_width: cs.bit_width,
            primary: cs.primary_channel_set,
            hierarchical: cs.hierarchical_channel_set,
            downmix,
            channel_mask: cs
                .channel_mask_enabled
                .then(|| format!("{:#06X}", cs.channel_mask)),
            loudspeaker_configs: cs.loudspeaker_configs.len(),
            frequency_bands: cs.num_frequency_bands,
        }
    }
}

fn display_report(report: &InfoReport) {
    for header in &report.headers {
        display_header(header);
    }

    let summary = &report.summary;
    println!("Analysis Summary");
    println!("  Headers decoded           {}", summary.decoded);
    if summary.empty > 0 {
        println!("  Without XLL sync          {}", summary.empty);
    }
    println!("  Headers rejected          {}", summary.rejected);
    println!("  DTS:X headers             {}", summary.dtsx);
    println!("  Size                      {} bytes", summary.input_bytes);
    println!();
}

fn display_header(header: &HeaderReport) {
    let title = format!("XLL Header at byte {}", header.offset);
    println!();
    println!("{title}");
    println!("{}", "=".repeat(title.len()));
    println!();

    let Some(common) = &header.common else {
        println!("No XLL sync present");
        println!();
        return;
    };

    println!("Common Header");
    println!("  Version                   {}", common.version);
    println!("  Header size               {} bytes", common.header_size);
    println!("  Frame size                {} bytes", common.frame_size);
    println!("  Channel sets              {}", common.num_channel_sets);
    println!(
        "  Segments                  {} x {} samples",
        common.num_segments, common.samples_per_segment
    );
    println!("  Band data CRC             {}", common.band_data_crc);
    if common.scalable_lsb {
        println!("  Fixed LSB width           {}", common.fixed_lsb_width);
    } else {
        println!("  Scalable LSB              false");
    }
    println!();

    for (i, cs) in header.channel_sets.iter().enumerate() {
        display_channel_set(i, cs);
    }

    println!("Navigation");
    println!(
        "  Band data                 {} bytes in {} chunks",
        header.band_data_size, header.band_data_chunks
    );
    println!("  DTS:X                     {}", header.dtsx);
    println!();
}

fn display_channel_set(index: usize, cs: &ChannelSetReport) {
    println!("Channel Set {index}");
    println!("  Channels                  {}", cs.channels);
    println!(
        "  Sampling rate             {} Hz (x{} interpolation)",
        cs.sampling_frequency, cs.interpolation_factor
    );
    println!(
        "  Bit resolution            {} bits ({} bit samples)",
        cs.bit_resolution, cs.bit_width
    );
    println!("  Primary                   {}", cs.primary);
    println!("  Hierarchical              {}", cs.hierarchical);
    if let Some(downmix) = &cs.downmix {
        println!("  Downmix                   {downmix}");
    }
    if let Some(mask) = &cs.channel_mask {
        println!("  Channel mask              {mask}");
    }
    if cs.loudspeaker_configs > 0 {
        println!("  Loudspeaker configs       {}", cs.loudspeaker_configs);
    }
    println!("  Frequency bands           {}", cs.frequency_bands);
    println!();
}
