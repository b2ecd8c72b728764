use std::fmt;

/// Header structure a decode error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
    Common,
    ChannelSet(usize),
    Navi,
    BandData,
    Extension,
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Structure::Common => write!(f, "common header"),
            Structure::ChannelSet(i) => write!(f, "channel set {i}"),
            Structure::Navi => write!(f, "navigation table"),
            Structure::BandData => write!(f, "band data"),
            Structure::Extension => write!(f, "DTS:X extension"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum XllError {
    #[error("Invalid sync word in {structure}. Read {read:#010X}, expected {expected:#010X}")]
    SyncMismatch {
        structure: Structure,
        expected: u32,
        read: u32,
    },

    #[error("CRC failed on {structure}. Calculated {calculated:#06X}, Read {read:#06X}")]
    CrcMismatch {
        structure: Structure,
        calculated: u16,
        read: u16,
    },

    #[error("Header size of {structure} is too small to hold its checksum. Read {size}")]
    InvalidHeaderSize { structure: Structure, size: u16 },

    #[error("Not enough data for {structure}: {needed} bits needed, {available} available")]
    Truncated {
        structure: Structure,
        needed: u64,
        available: u64,
    },
}
