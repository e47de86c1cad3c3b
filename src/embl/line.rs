//! Fixed-column EMBL line handling.
//!
//! Columns 1-2 hold the line code and columns 3-5 are blank. Data starts at
//! column 6. On `FT` lines the feature key occupies columns 6-20 and the
//! location or qualifier starts at column 22.

/// Record terminator.
pub const TERMINATOR: &str = "//";

/// Byte offset where line data starts (column 6).
const DATA_OFFSET: usize = 5;

/// Width of the feature key field on `FT` lines.
const FEATURE_KEY_WIDTH: usize = 16;

/// Blank columns between `FT` and a qualifier (qualifiers start at column 22).
const QUALIFIER_PADDING: usize = 19;

/// The two-letter code at the start of a flat-file line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCode {
    Id,
    Ac,
    Os,
    Oc,
    Pr,
    Ft,
    Xx,
    Sq,
    Terminator,
    Other,
}

impl LineCode {
    /// Organism, classification and project lines dropped from enriched records.
    #[must_use]
    pub fn is_strippable_metadata(self) -> bool {
        matches!(self, Self::Os | Self::Oc | Self::Pr)
    }
}

/// Reads the line code. A code only counts when followed by whitespace or end of line,
/// so `OSX` or sequence data never match.
#[must_use]
pub fn line_code(line: &str) -> LineCode {
    if line.starts_with(TERMINATOR) {
        return LineCode::Terminator;
    }
    let Some(code) = line.get(..2) else {
        return LineCode::Other;
    };
    let delimited = line[2..]
        .chars()
        .next()
        .is_none_or(char::is_whitespace);
    if !delimited {
        return LineCode::Other;
    }
    match code {
        "ID" => LineCode::Id,
        "AC" => LineCode::Ac,
        "OS" => LineCode::Os,
        "OC" => LineCode::Oc,
        "PR" => LineCode::Pr,
        "FT" => LineCode::Ft,
        "XX" => LineCode::Xx,
        "SQ" => LineCode::Sq,
        _ => LineCode::Other,
    }
}

/// Returns the line terminator carried by `line` (empty for a final unterminated line).
#[must_use]
pub fn line_ending(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

fn without_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Data part of a line (column 6 onwards) without its terminator.
fn data(line: &str) -> &str {
    without_ending(line).get(DATA_OFFSET..).unwrap_or("")
}

/// Contig accession from an `AC * _name` line. Returns `None` for ordinary `AC` lines.
#[must_use]
pub fn contig_accession(line: &str) -> Option<String> {
    if line_code(line) != LineCode::Ac {
        return None;
    }
    let rest = without_ending(line).get(2..)?.trim_start();
    let rest = rest.strip_prefix('*')?.trim_start();
    let rest = rest.strip_prefix('_').unwrap_or(rest);
    let accession = rest.trim_end().trim_end_matches(';');
    if accession.is_empty() {
        None
    } else {
        Some(accession.to_string())
    }
}

/// Feature key of an `FT` feature line, e.g. `CDS` or `rRNA`.
#[must_use]
pub fn feature_key(line: &str) -> Option<&str> {
    if line_code(line) != LineCode::Ft {
        return None;
    }
    let data = data(line);
    if data.starts_with(char::is_whitespace) {
        return None;
    }
    data.split_whitespace().next()
}

/// Qualifier text of an `FT` qualifier line, starting at the `/`.
#[must_use]
pub fn qualifier(line: &str) -> Option<&str> {
    if line_code(line) != LineCode::Ft {
        return None;
    }
    let trimmed = data(line).trim();
    trimmed.starts_with('/').then_some(trimmed)
}

/// True for an `FT` line that continues the previous feature's location.
#[must_use]
pub fn is_location_continuation(line: &str) -> bool {
    if line_code(line) != LineCode::Ft {
        return false;
    }
    let data = data(line);
    let trimmed = data.trim();
    data.starts_with(char::is_whitespace) && !trimmed.is_empty() && !trimmed.starts_with('/')
}

#[must_use]
pub fn is_locus_tag(line: &str) -> bool {
    qualifier(line).is_some_and(|q| q.starts_with("/locus_tag="))
}

/// Replaces the value of a `/locus_tag=` line, keeping its indentation and terminator.
#[must_use]
pub fn rewrite_locus_tag(line: &str, locus_tag: &str) -> String {
    let body = without_ending(line);
    let indent = body.find('/').map_or(body, |pos| &body[..pos]);
    format!("{indent}/locus_tag=\"{locus_tag}\"{}", line_ending(line))
}

/// Builds a qualifier line without terminator.
#[must_use]
pub fn qualifier_line(qualifier: &str) -> String {
    format!("FT{:width$}{qualifier}", "", width = QUALIFIER_PADDING)
}

/// Builds a feature line without terminator.
#[must_use]
pub fn feature_line(key: &str, location: &str) -> String {
    format!("FT   {key:<width$}{location}", width = FEATURE_KEY_WIDTH)
}
