//! Checkpoint/commit/rollback around a single decode attempt.
//!
//! Every header structure is decoded inside exactly one [`DecodeFrame`]. A
//! frame remembers the cursor position at entry; aborting restores it, so a
//! rejected structure leaves the reader exactly where it found it and the
//! caller can try another interpretation or give up cleanly.

use anyhow::Result;
use log::trace;

use crate::utils::bitstream_io::BsIoSliceReader;

#[derive(Debug)]
#[must_use = "a decode frame must be committed or aborted"]
pub struct DecodeFrame {
    start: u64,
}

impl DecodeFrame {
    pub fn begin(reader: &mut BsIoSliceReader) -> Result<Self> {
        Ok(Self {
            start: reader.position()?,
        })
    }

    /// Bit position the frame was opened at.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Hands out the decoded value, leaving the cursor where decoding stopped.
    pub fn commit<T>(self, value: T) -> T {
        value
    }

    /// Restores the cursor to the checkpoint.
    pub fn abort(self, reader: &mut BsIoSliceReader) -> Result<()> {
        trace!("abort: rewinding to bit {}", self.start);
        reader.set_position(self.start)?;

        Ok(())
    }
}

/// Runs `decode` inside a frame: `Ok` commits, `Err` rewinds and propagates.
///
/// `decode` receives the reader and the checkpoint position. Its value only
/// escapes on success, so no half-built structure is ever visible.
pub fn transact<T, F>(reader: &mut BsIoSliceReader, decode: F) -> Result<T>
where
    F: FnOnce(&mut BsIoSliceReader, u64) -> Result<T>,
{
    let frame = DecodeFrame::begin(reader)?;
    let start = frame.start();

    match decode(reader, start) {
        Ok(value) => Ok(frame.commit(value)),
        Err(e) => {
            frame.abort(reader)?;
            Err(e)
        }
    }
}
