//! Strand orientation of covariance-model hits.

use std::fmt;

use crate::error::Error;

/// Strand on which a hit was found, relative to the target sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    /// Parse the cmsearch strand column. Only `+` and `-` are accepted.
    pub fn from_cmsearch(s: &str) -> Result<Self, Error> {
        match s {
            "+" => Ok(Self::Forward),
            "-" => Ok(Self::Reverse),
            _ => Err(Error::Parse(format!(
                "invalid strand '{s}', expected '+' or '-'"
            ))),
        }
    }

    #[must_use]
    pub fn is_forward(self) -> bool {
        self == Self::Forward
    }

    #[must_use]
    pub fn is_reverse(self) -> bool {
        self == Self::Reverse
    }

    /// Orders a pair of hit coordinates into `(start, end)` on the forward strand.
    /// Reverse-strand hits report `seq_from > seq_to`, so the pair is swapped;
    /// the lower coordinate always ends up first.
    #[must_use]
    pub fn orient(self, seq_from: u64, seq_to: u64) -> (u64, u64) {
        match self {
            Self::Forward => (seq_from, seq_to),
            Self::Reverse => (seq_to.min(seq_from), seq_to.max(seq_from)),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "+"),
            Self::Reverse => write!(f, "-"),
        }
    }
}
