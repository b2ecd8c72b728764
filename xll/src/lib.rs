#![doc = include_str!("../README.md")]
//!
//! ## Technical Overview
//!
//! Header decoder for the DTS-HD lossless extension (XLL).
//!
//! ### Bitstream Organization
//!
//! An XLL component starts with a common header, followed by one header per
//! channel set and a navigation table listing the size of every band data
//! chunk. The band data itself is skipped. DTS:X streams append a 4-byte
//! aligned sync word after it.
//!
//! Every header carries a CRC16 checksum. A single checksum failure rejects
//! the whole header and leaves the reader where it was.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use xll::process::parse::Parser;
//! use xll::process::scan::SyncScanner;
//!
//! let data = std::fs::read("stream.dtshd")?;
//! let mut parser = Parser::default();
//!
//! for asset in SyncScanner::new(&data).assets() {
//!     match parser.parse(&data, &asset) {
//!         Ok(header) => println!(
//!             "{} channel sets, {} bytes of band data",
//!             header.channel_sets.len(),
//!             header.total_band_data_size()
//!         ),
//!         Err(e) => eprintln!("rejected: {e}"),
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Header decoding.
///
/// 1. **Frames** ([`process::frame`]): Transactional cursor handling.
///
/// 2. **Parsing** ([`process::parse`]): Decodes a complete XLL header.
///
/// 3. **Scanning** ([`process::scan`]): Locates XLL sync words.
pub mod process;

/// Data structures representing XLL header components.
///
/// - **Asset** ([`structs::asset`]): Where the XLL data sits
/// - **Common Header** ([`structs::common`]): Frame-wide parameters
/// - **Channel Sets** ([`structs::channel_set`]): Per channel set parameters
/// - **Navigation** ([`structs::navi`]): Band data chunk sizes
/// - **Extension** ([`structs::extension`]): DTS:X marker
/// - **Header** ([`structs::header`]): The decoded aggregate
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Bitstream I/O** ([`utils::bitstream_io`]): Bit-level reading
/// - **CRC Validation** ([`utils::crc`]): Header checksums
/// - **Error Handling** ([`utils::errors`]): Error types
/// - **Dump** ([`utils::dump`]): Debug field listing
pub mod utils;
