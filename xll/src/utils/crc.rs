//! CRC validation utilities for XLL headers.
//!
//! The common header, every channel set header and the navigation table are
//! protected by a 16-bit CRC-CCITT (polynomial 0x1021, seed 0xFFFF, MSB
//! first, no final xor). Checksums are produced in stream byte order so they
//! compare directly against the 16 bits stored after each protected range.

/// CRC algorithm specification with polynomial and initial value.
pub struct Algorithm<T> {
    poly: T,
    init: T,
}

/// CRC-16 algorithm shared by all XLL header structures.
pub const CRC_XLL_HEADER_ALG: Algorithm<u16> = Algorithm {
    poly: 0x1021,
    init: 0xFFFF,
};

/// Feeds the low `len` bits of `bits` (MSB first) into `crc`.
#[inline(always)]
pub const fn crc16_bits(poly: u16, mut crc: u16, bits: u16, len: usize) -> u16 {
    let mut i = len;
    while i > 0 {
        i -= 1;
        let feedback = ((crc >> 15) ^ (bits >> i)) & 1;
        crc = (crc << 1) ^ (feedback * poly);
    }

    crc
}

#[inline(always)]
const fn crc16_table(poly: u16) -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < table.len() {
        table[i] = crc16_bits(poly, (i as u16) << 8, 0, 8);
        i += 1;
    }

    table
}

#[derive(Debug)]
pub struct Crc16 {
    pub poly: u16,
    pub init: u16,
    table: [u16; 256],
}

impl Crc16 {
    pub const fn new(algorithm: &Algorithm<u16>) -> Self {
        Self {
            poly: algorithm.poly,
            init: algorithm.init,
            table: crc16_table(algorithm.poly),
        }
    }

    const fn table_entry(&self, index: u16) -> u16 {
        self.table[(index & 0xFF) as usize]
    }

    #[inline(always)]
    pub const fn update(&self, mut crc: u16, bytes: &[u8]) -> u16 {
        let mut i = 0;

        while i < bytes.len() {
            crc = self.table_entry((crc >> 8) ^ bytes[i] as u16) ^ (crc << 8);
            i += 1;
        }

        crc
    }

    /// Checksum of a whole byte slice starting from the algorithm seed.
    pub const fn checksum(&self, bytes: &[u8]) -> u16 {
        self.update(self.init, bytes)
    }
}

/// Shared instance, the table is built at compile time.
pub static CRC_XLL_HEADER: Crc16 = Crc16::new(&CRC_XLL_HEADER_ALG);
