//! Streaming record reader.

use std::io::BufRead;

use crate::error::Error;

use super::SequenceBlock;
use super::line::{self, LineCode};

/// Yields flat-file records one at a time without loading the whole file.
///
/// An `ID` line opens a record and `//` closes it. Lines outside any record are
/// dropped. Reaching end of input inside a record is an error.
pub struct BlockReader<R> {
    reader: R,
    line_num: usize,
    finished: bool,
}

impl<R: BufRead> BlockReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_num: 0,
            finished: false,
        }
    }

    fn read_block(&mut self) -> Result<Option<SequenceBlock>, Error> {
        let mut open: Option<(usize, Vec<String>)> = None;

        loop {
            let mut buf = String::new();
            if self.reader.read_line(&mut buf)? == 0 {
                return match open {
                    Some((start, _)) => Err(Error::Parse(format!(
                        "unterminated record starting at line {start}"
                    ))),
                    None => Ok(None),
                };
            }
            self.line_num += 1;

            match line::line_code(&buf) {
                LineCode::Id => {
                    if let Some((start, _)) = &open {
                        log::warn!(
                            "line {}: record starting at line {start} has no terminator, discarding it",
                            self.line_num
                        );
                    }
                    open = Some((self.line_num, vec![buf]));
                }
                LineCode::Terminator => match open.take() {
                    Some((_, mut lines)) => {
                        lines.push(buf);
                        return Ok(Some(SequenceBlock::from_lines(lines)));
                    }
                    None => log::debug!("line {}: terminator outside a record", self.line_num),
                },
                _ => match open.as_mut() {
                    Some((_, lines)) => lines.push(buf),
                    None => log::debug!("line {}: skipping line outside a record", self.line_num),
                },
            }
        }
    }
}

impl<R: BufRead> Iterator for BlockReader<R> {
    type Item = Result<SequenceBlock, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_block() {
            Ok(Some(block)) => Some(Ok(block)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
