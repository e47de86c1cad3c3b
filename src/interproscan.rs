//! Parser for InterProScan TSV output.

use std::collections::HashMap;
use std::io::BufRead;

use crate::annotation::{AnnotationIndex, AnnotationSet, Database};
use crate::error::Error;

/// First column holding cross-reference tokens (InterPro accession).
const FIRST_ANNOTATION_COLUMN: usize = 11;

/// Parses InterProScan TSV rows into an annotation index.
///
/// Column 0 is the protein identifier. Columns 11 onwards are scanned for InterPro
/// accessions, `|`-separated GO terms and `|`-separated pathway references
/// (KEGG, MetaCyc, Reactome). Tokens that match none of these are dropped.
/// Every protein seen gets an entry, even if none of its tokens were recognized.
pub fn parse_interproscan_tsv<R: BufRead>(reader: R) -> Result<AnnotationIndex, Error> {
    let mut sets: HashMap<String, AnnotationSet> = HashMap::new();
    let mut rows = 0usize;

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() <= FIRST_ANNOTATION_COLUMN {
            return Err(Error::Parse(format!(
                "row {}: expected at least {} columns, got {}",
                line_num + 1,
                FIRST_ANNOTATION_COLUMN + 1,
                columns.len()
            )));
        }

        let set = sets.entry(columns[0].to_string()).or_default();
        for token in &columns[FIRST_ANNOTATION_COLUMN..] {
            add_token(token, set);
        }
        rows += 1;
    }

    let index = AnnotationIndex::new(sets);
    log::info!(
        "Parsed {rows} InterProScan rows: {} sequences, {} annotations",
        index.len(),
        index.annotation_count()
    );
    Ok(index)
}

/// Classifies one column value and records whatever annotations it carries.
fn add_token(token: &str, set: &mut AnnotationSet) {
    if token.contains("IPR") {
        set.add(Database::InterPro, token);
    } else if token.contains("GO") {
        for go_term in token.split('|') {
            set.add(Database::Go, go_term.replace("GO:", ""));
        }
    } else if token.contains("KEGG") {
        for pathway in token.split('|') {
            if pathway.contains("KEGG") {
                set.add(Database::Kegg, pathway.replace("KEGG: ", ""));
            } else if pathway.contains("MetaCyc") {
                set.add(Database::MetaCyc, pathway.replace("MetaCyc: ", ""));
            } else if pathway.contains("Reactome") {
                set.add(Database::Reactome, pathway.replace("Reactome: ", ""));
            }
        }
    }
}
