use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

/// Source of the bytes holding the XLL component: a file, or stdin for "-".
pub struct InputReader {
    source: Box<dyn Read>,
    stdin: bool,
}

impl InputReader {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let stdin = path.as_os_str() == "-";

        let source: Box<dyn Read> = if stdin {
            Box::new(io::stdin().lock())
        } else {
            let file = File::open(path)
                .with_context(|| format!("Cannot open input {}", path.display()))?;
            Box::new(BufReader::new(file))
        };

        Ok(Self { source, stdin })
    }

    pub fn is_stdin(&self) -> bool {
        self.stdin
    }

    /// Buffers the whole input. Headers are addressed by absolute byte
    /// offset, so nothing can be decoded before the data is in memory.
    pub fn read_to_vec(mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.source.read_to_end(&mut data)?;
        Ok(data)
    }
}
