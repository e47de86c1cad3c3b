//! Streaming record writer.

use std::io::Write;

use crate::error::Error;

use super::SequenceBlock;

/// Writes records one at a time, byte for byte as their lines hold them.
pub struct BlockWriter<W: Write> {
    inner: W,
    blocks_written: usize,
}

impl<W: Write> BlockWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            blocks_written: 0,
        }
    }

    pub fn write_block(&mut self, block: &SequenceBlock) -> Result<(), Error> {
        for line in &block.lines {
            self.inner.write_all(line.as_bytes())?;
        }
        self.blocks_written += 1;
        Ok(())
    }

    #[must_use]
    pub fn blocks_written(&self) -> usize {
        self.blocks_written
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> Result<W, Error> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Writes all records, in order, to `destination`.
pub fn write<'a, W, I>(blocks: I, destination: W) -> Result<W, Error>
where
    W: Write,
    I: IntoIterator<Item = &'a SequenceBlock>,
{
    let mut writer = BlockWriter::new(destination);
    for block in blocks {
        writer.write_block(block)?;
    }
    writer.finish()
}
