//! Utility functions and supporting infrastructure.
//!
//! Provides bitstream I/O, CRC validation, error types and the field dump
//! used for debug logging.

pub mod bitstream_io;
pub mod crc;
pub mod dump;
pub mod errors;

#[cfg(test)]
pub(crate) mod test_stream;
