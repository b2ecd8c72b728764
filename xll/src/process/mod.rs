/// Checkpoint and rollback around a single decode attempt.
///
/// Every structure decoder runs inside a [`DecodeFrame`](frame::DecodeFrame),
/// usually through [`transact`](frame::transact).
pub mod frame;

/// XLL header decoding.
///
/// Provides [`try_decode_xll_header`](parse::try_decode_xll_header) and its
/// boolean-style counterparts, plus the [`Parser`](parse::Parser) for
/// decoding a run of headers.
pub mod parse;

/// XLL sync word search for raw buffers without an asset descriptor.
pub mod scan;
