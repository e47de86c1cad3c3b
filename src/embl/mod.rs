//! EMBL flat-file records: fixed-column line handling, record segmentation and output.

pub mod line;
pub mod reader;
pub mod writer;

use std::io::BufRead;

use crate::error::Error;

use line::LineCode;
use reader::BlockReader;

/// One flat-file record, from its `ID` line through its `//` terminator.
/// Lines keep their original terminators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceBlock {
    pub accession: Option<String>,
    pub lines: Vec<String>,
}

impl SequenceBlock {
    /// Builds a block, taking the contig accession from its first `AC * ` line.
    #[must_use]
    pub fn from_lines(lines: Vec<String>) -> Self {
        let accession = lines.iter().find_map(|l| line::contig_accession(l));
        Self { accession, lines }
    }

    /// Terminator used by the record's lines, `\n` unless the `ID` line ends in `\r\n`.
    #[must_use]
    pub fn line_ending(&self) -> &'static str {
        match self.lines.first().map(|l| line::line_ending(l)) {
            Some("\r\n") => "\r\n",
            _ => "\n",
        }
    }

    /// Number of feature-table (`FT`) lines.
    #[must_use]
    pub fn feature_line_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| line::line_code(l) == LineCode::Ft)
            .count()
    }

    /// Concatenated record text.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.concat()
    }
}

/// Splits a flat-file into records, in file order.
pub fn segment<R: BufRead>(reader: R) -> Result<Vec<SequenceBlock>, Error> {
    BlockReader::new(reader).collect()
}
