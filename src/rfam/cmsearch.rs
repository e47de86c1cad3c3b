//! Parser for deoverlapped cmsearch tabular output.

use std::io::BufRead;

use crate::error::Error;
use crate::strand::Strand;

/// Fields per row: target, target acc, query, query acc, mdl, mdl from, mdl to,
/// seq from, seq to, strand, trunc, pass, gc, bias, score, E-value, inc, description.
const MATCH_FIELDS: usize = 18;

/// Index of the inclusion column; `?` marks hits below the inclusion threshold.
const INCLUSION_FIELD: usize = 16;

/// One covariance-model hit on a target sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmsearchMatch {
    pub target_name: String,
    pub query_name: String,
    pub accession: String,
    pub model: String,
    pub model_from: u64,
    pub model_to: u64,
    pub seq_from: u64,
    pub seq_to: u64,
    pub strand: Strand,
}

impl CmsearchMatch {
    #[must_use]
    pub fn forward_strand(&self) -> bool {
        self.strand.is_forward()
    }
}

/// Parses every included hit, in file order.
///
/// Blank lines and `#` comments are ignored. Rows flagged `?` in the inclusion
/// column are skipped before any other validation.
pub fn parse_matches<R: BufRead>(reader: R) -> Result<Vec<CmsearchMatch>, Error> {
    let mut matches = Vec::new();
    let mut skipped = 0usize;

    for (line_num, line_result) in reader.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line_result?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.get(INCLUSION_FIELD) == Some(&"?") {
            skipped += 1;
            continue;
        }

        let parsed = parse_fields(&fields)
            .map_err(|e| Error::Parse(format!("line {line_num}: {e}")))?;
        matches.push(parsed);
    }

    log::info!(
        "Parsed {} cmsearch matches ({skipped} below inclusion threshold)",
        matches.len()
    );
    Ok(matches)
}

fn parse_fields(fields: &[&str]) -> Result<CmsearchMatch, Error> {
    if fields.len() != MATCH_FIELDS {
        return Err(Error::Parse(format!(
            "expected {MATCH_FIELDS} fields, got {}",
            fields.len()
        )));
    }

    Ok(CmsearchMatch {
        target_name: fields[0].to_string(),
        query_name: fields[2].to_string(),
        accession: fields[3].to_string(),
        model: fields[4].to_string(),
        model_from: parse_coordinate("mdl from", fields[5])?,
        model_to: parse_coordinate("mdl to", fields[6])?,
        seq_from: parse_coordinate("seq from", fields[7])?,
        seq_to: parse_coordinate("seq to", fields[8])?,
        strand: Strand::from_cmsearch(fields[9])?,
    })
}

fn parse_coordinate(column: &str, value: &str) -> Result<u64, Error> {
    value
        .parse()
        .map_err(|e| Error::Parse(format!("invalid {column} '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const FORWARD_HIT: &str = "contig_1 - 5S_rRNA RF00001 cm 1 119 100 200 + no 1 0.52 0.0 85.3 1.2e-18 ! -";
    const REVERSE_HIT: &str = "contig_2  -  tRNA  RF00005  cm  2  70  300  230  -  no  1  0.55  0.0  45.1  3.4e-09  !  -";
    const EXCLUDED_HIT: &str = "contig_3 - tRNA RF00005 cm 1 71 10 80 + no 1 0.50 0.0 18.2 0.013 ? -";

    fn parse(data: &str) -> Result<Vec<CmsearchMatch>, Error> {
        parse_matches(Cursor::new(data.as_bytes()))
    }

    #[test]
    fn parse_forward_hit() {
        let matches = parse(FORWARD_HIT).unwrap();
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.target_name, "contig_1");
        assert_eq!(m.query_name, "5S_rRNA");
        assert_eq!(m.accession, "RF00001");
        assert_eq!(m.model, "cm");
        assert_eq!((m.model_from, m.model_to), (1, 119));
        assert_eq!((m.seq_from, m.seq_to), (100, 200));
        assert!(m.forward_strand());
    }

    #[test]
    fn parse_reverse_hit_with_wide_spacing() {
        let matches = parse(REVERSE_HIT).unwrap();
        let m = &matches[0];
        assert_eq!(m.strand, Strand::Reverse);
        assert_eq!((m.seq_from, m.seq_to), (300, 230));
    }

    #[test]
    fn inclusion_flag_skips_row() {
        let data = format!("{FORWARD_HIT}\n{EXCLUDED_HIT}\n{REVERSE_HIT}\n");
        let matches = parse(&data).unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.target_name != "contig_3"));
    }

    #[test]
    fn excluded_row_not_validated() {
        let data = "contig_3 - tRNA RF00005 cm 1 71 10 80 + no 1 0.50 0.0 18.2 0.013 ? extra words\n";
        assert!(parse(data).unwrap().is_empty());
    }

    #[test]
    fn comments_and_blank_lines_skipped() {
        let data = format!("#target name\n\n{FORWARD_HIT}\n");
        assert_eq!(parse(&data).unwrap().len(), 1);
    }

    #[test]
    fn wrong_field_count_error() {
        let data = format!("{FORWARD_HIT}\ncontig_9 - tRNA RF00005 cm 1 71\n");
        let err = parse(&data).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 2"), "{message}");
        assert!(message.contains("expected 18 fields, got 7"), "{message}");
    }

    #[test]
    fn invalid_coordinate_error() {
        let data = "contig_1 - 5S_rRNA RF00001 cm 1 119 1x0 200 + no 1 0.52 0.0 85.3 1.2e-18 ! -";
        let err = parse(data).unwrap_err();
        assert!(err.to_string().contains("invalid seq from '1x0'"));
    }

    #[test]
    fn invalid_strand_error() {
        let data = "contig_1 - 5S_rRNA RF00001 cm 1 119 100 200 . no 1 0.52 0.0 85.3 1.2e-18 ! -";
        assert!(parse(data).is_err());
    }
}
