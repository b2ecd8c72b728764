//! Bitstream I/O utilities for header parsing.
//!
//! Wraps a big-endian [`BitReader`] with absolute positioning, alignment,
//! bounds-checked skipping and CRC validation over arbitrary bit ranges.

use std::io;
use std::io::SeekFrom;

use bitstream_io::{BigEndian, BitRead, BitReader, UnsignedInteger};

use crate::utils::crc::{Crc16, crc16_bits};

const STACK_BUF_SIZE: usize = 256;

#[derive(Debug)]
pub struct BitstreamIoReader<R: io::Read + io::Seek> {
    bs: BitReader<R, BigEndian>,
    len: u64,
}

pub type BsIoSliceReader<'a> = BitstreamIoReader<io::Cursor<&'a [u8]>>;

fn out_of_bounds(op: &str, n: u64, position: u64) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("{op}({n}): out of bounds bits at {position}"),
    )
}

impl<R> BitstreamIoReader<R>
where
    R: io::Read + io::Seek,
{
    pub fn new(read: R, len_bytes: u64) -> Self {
        Self {
            bs: BitReader::new(read),
            len: len_bytes << 3,
        }
    }

    /// Total length of the underlying buffer in bits.
    #[inline(always)]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn get(&mut self) -> io::Result<bool> {
        self.bs.read_bit()
    }

    #[inline(always)]
    pub fn get_n<I: UnsignedInteger>(&mut self, n: u32) -> io::Result<I> {
        match self.bs.read_unsigned_var(n) {
            Ok(val) => Ok(val),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                // Only call position() on error path to avoid overhead
                Err(out_of_bounds(
                    "get_n",
                    n as u64,
                    self.bs.position_in_bits().unwrap_or(0),
                ))
            }
            Err(e) => Err(e),
        }
    }

    /// Absolute seek in bits. Positioning exactly at the end is allowed.
    #[inline(always)]
    pub fn set_position(&mut self, position: u64) -> io::Result<()> {
        if position > self.len {
            return Err(out_of_bounds("set_position", position, self.position()?));
        }

        self.bs.seek_bits(SeekFrom::Start(position))?;

        Ok(())
    }

    #[inline(always)]
    pub fn skip_n(&mut self, n: u64) -> io::Result<()> {
        if n > self.available()? {
            return Err(out_of_bounds("skip_n", n, self.position()?));
        }

        if n <= u32::MAX as u64 {
            self.bs.skip(n as u32)
        } else {
            self.bs.seek_bits(SeekFrom::Current(n as i64)).map(|_| ())
        }
    }

    #[inline(always)]
    pub fn byte_align(&mut self) {
        self.bs.byte_align();
    }

    /// Advances to the next multiple of `bits` measured from the buffer start.
    #[inline(always)]
    pub fn align_to(&mut self, bits: u32) -> io::Result<()> {
        let position = self.position()?;
        let rem = position % bits as u64;

        if rem != 0 {
            self.skip_n(bits as u64 - rem)?;
        }

        Ok(())
    }

    /// CRC16 over `len` bits starting at absolute bit `start`.
    ///
    /// The cursor is left where it was before the call.
    #[inline(always)]
    pub fn crc16_check(&mut self, crc: &Crc16, start: u64, len: u64) -> io::Result<u16> {
        let position = self.position()?;

        if start + len > self.len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "crc16_check: out of bounds bits",
            ));
        }

        self.bs.seek_bits(SeekFrom::Start(start))?;

        let mut checksum = crc.init;

        let prefix_len = (8 - (start & 7)) & 7;
        let prefix_len = prefix_len.min(len);
        let suffix_len = (len - prefix_len) & 7;
        let middle_len = (len - prefix_len - suffix_len) as usize;

        if prefix_len != 0 {
            let prefix: u16 = self.bs.read_var(prefix_len as u32)?;
            checksum = crc16_bits(crc.poly, checksum, prefix, prefix_len as usize);
        }

        let bytes_len = middle_len >> 3;
        if bytes_len <= STACK_BUF_SIZE {
            let mut stack_buf = [0u8; STACK_BUF_SIZE];
            let buf = &mut stack_buf[..bytes_len];
            self.bs.read_bytes(buf)?;
            checksum = crc.update(checksum, buf);
        } else {
            let mut heap_buf = vec![0; bytes_len];
            self.bs.read_bytes(&mut heap_buf)?;
            checksum = crc.update(checksum, &heap_buf);
        };

        if suffix_len != 0 {
            let suffix: u16 = self.bs.read_var(suffix_len as u32)?;
            checksum = crc16_bits(crc.poly, checksum, suffix, suffix_len as usize);
        }

        self.bs.seek_bits(SeekFrom::Start(position))?;

        Ok(checksum)
    }

    #[inline(always)]
    pub fn available(&mut self) -> io::Result<u64> {
        self.bs
            .position_in_bits()
            .map(|pos| self.len.saturating_sub(pos))
    }

    #[inline(always)]
    pub fn position(&mut self) -> io::Result<u64> {
        self.bs.position_in_bits()
    }
}

impl<'a> BsIoSliceReader<'a> {
    pub fn from_slice(buf: &'a [u8]) -> Self {
        let len = buf.len() as u64;
        let read = io::Cursor::new(buf);

        Self::new(read, len)
    }
}

impl Default for BsIoSliceReader<'_> {
    fn default() -> Self {
        Self::from_slice(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::crc::CRC_XLL_HEADER;

    #[test]
    fn test_positioning() -> io::Result<()> {
        let data = [0xA5u8, 0x0F, 0xF0, 0x55];
        let mut reader = BsIoSliceReader::from_slice(&data);

        assert_eq!(reader.len(), 32);
        assert_eq!(reader.get_n::<u8>(4)?, 0xA);
        assert_eq!(reader.position()?, 4);

        reader.byte_align();
        assert_eq!(reader.position()?, 8);
        assert_eq!(reader.get_n::<u16>(12)?, 0x0FF);

        reader.set_position(2)?;
        assert_eq!(reader.get_n::<u8>(2)?, 0b10);
        assert_eq!(reader.available()?, 28);

        reader.set_position(32)?;
        assert_eq!(reader.available()?, 0);
        assert!(reader.set_position(33).is_err());

        Ok(())
    }

    #[test]
    fn test_skip_bounds() -> io::Result<()> {
        let data = [0u8; 4];
        let mut reader = BsIoSliceReader::from_slice(&data);

        reader.skip_n(30)?;
        assert!(reader.skip_n(3).is_err());
        assert_eq!(reader.position()?, 30);
        assert!(reader.get_n::<u8>(3).is_err());

        Ok(())
    }

    #[test]
    fn test_align_to() -> io::Result<()> {
        let data = [0u8; 8];
        let mut reader = BsIoSliceReader::from_slice(&data);

        reader.align_to(32)?;
        assert_eq!(reader.position()?, 0);

        reader.skip_n(9)?;
        reader.align_to(32)?;
        assert_eq!(reader.position()?, 32);

        reader.skip_n(1)?;
        reader.align_to(32)?;
        assert_eq!(reader.position()?, 64);

        Ok(())
    }

    #[test]
    fn test_crc16_check_restores_position() -> io::Result<()> {
        let data = b"x123456789y";
        let mut reader = BsIoSliceReader::from_slice(data);

        reader.skip_n(5)?;
        let crc = reader.crc16_check(&CRC_XLL_HEADER, 8, 72)?;

        assert_eq!(crc, 0x29B1);
        assert_eq!(reader.position()?, 5);

        Ok(())
    }

    #[test]
    fn test_crc16_check_unaligned_range() -> io::Result<()> {
        // Same bytes as above shifted right by four bits.
        let payload = b"123456789";
        let mut shifted = vec![0u8; payload.len() + 1];
        for (i, &b) in payload.iter().enumerate() {
            shifted[i] |= b >> 4;
            shifted[i + 1] |= b << 4;
        }

        let mut reader = BsIoSliceReader::from_slice(&shifted);
        assert_eq!(reader.crc16_check(&CRC_XLL_HEADER, 4, 72)?, 0x29B1);

        Ok(())
    }
}
