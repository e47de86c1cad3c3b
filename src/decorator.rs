//! Merges functional annotations and RNA features into flat-file records.

use serde::Deserialize;

use crate::annotation::{AnnotationIndex, AnnotationSet};
use crate::embl::SequenceBlock;
use crate::embl::line::{self, LineCode};
use crate::error::Error;
use crate::rfam::{RnaFeatureBlock, RnaFeatureMap};

/// What to do with a record that has RNA features but no `SQ` line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructuralErrorPolicy {
    /// Stop the run.
    #[default]
    Abort,
    /// Log a warning and write the record unchanged.
    Skip,
}

/// Per-run merge settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationSettings {
    pub scanner_name: String,
    pub scanner_version: String,
    pub tag_name: String,
    pub strip_threshold: usize,
    pub structural_errors: StructuralErrorPolicy,
}

impl DecorationSettings {
    fn scanner_inference(&self) -> String {
        format!(
            "/inference=\"ab initio prediction:{}:{}\"",
            self.scanner_name, self.scanner_version
        )
    }
}

/// Locus-tag number shared by consecutive records.
///
/// The number only moves on once a record has been enriched past the strip
/// threshold, so records left untouched reuse it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocusTagCounter {
    value: u64,
}

impl LocusTagCounter {
    #[must_use]
    pub fn new(first: u64) -> Self {
        Self { value: first }
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn advance(&mut self) {
        self.value += 1;
    }
}

/// A merged record plus what was done to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub block: SequenceBlock,
    pub annotation_lines: usize,
    pub rna_features: usize,
    pub stripped: bool,
    pub skipped: bool,
}

impl MergeOutcome {
    fn skipped(block: SequenceBlock) -> Self {
        Self {
            block,
            annotation_lines: 0,
            rna_features: 0,
            stripped: false,
            skipped: true,
        }
    }
}

/// Read-only view of both lookups, applied record by record.
pub struct Decorator<'a> {
    annotations: &'a AnnotationIndex,
    rna_features: &'a RnaFeatureMap,
    settings: &'a DecorationSettings,
}

impl<'a> Decorator<'a> {
    pub fn new(
        annotations: &'a AnnotationIndex,
        rna_features: &'a RnaFeatureMap,
        settings: &'a DecorationSettings,
    ) -> Self {
        Self {
            annotations,
            rna_features,
            settings,
        }
    }

    /// Rewrites one record.
    ///
    /// Inference qualifiers go directly after the location of the first `CDS` feature, RNA
    /// features go above the `SQ` line (and above an `XX` spacer right before it),
    /// and every `/locus_tag` becomes `<tag>_LOCUS<counter>`. When the result holds
    /// more `FT` lines than the strip threshold, `OS`/`OC`/`PR` lines are dropped
    /// and the counter advances.
    pub fn merge(
        &self,
        block: SequenceBlock,
        counter: &mut LocusTagCounter,
    ) -> Result<MergeOutcome, Error> {
        let accession = block.accession.as_deref();
        let rna_blocks = accession
            .and_then(|acc| self.rna_features.get(acc))
            .filter(|blocks| !blocks.is_empty());
        let sq_index = block
            .lines
            .iter()
            .position(|l| line::line_code(l) == LineCode::Sq);

        if let (Some(acc), Some(_), None) = (accession, rna_blocks, sq_index) {
            let message = format!("{acc}: RNA features found but record has no SQ line");
            return match self.settings.structural_errors {
                StructuralErrorPolicy::Abort => Err(Error::Structural(message)),
                StructuralErrorPolicy::Skip => {
                    log::warn!("{message}, writing record unchanged");
                    Ok(MergeOutcome::skipped(block))
                }
            };
        }

        let rna_anchor = sq_index.map(|i| {
            if i > 0 && line::line_code(&block.lines[i - 1]) == LineCode::Xx {
                i - 1
            } else {
                i
            }
        });
        let cds_anchor = cds_location_end(&block.lines);
        let annotations = accession.and_then(|acc| self.annotations.lookup_isoform(acc));
        if accession.is_none() {
            log::debug!("Record without contig accession, renumbering locus tags only");
        }

        let ending = block.line_ending();
        let locus_tag = format!("{}_LOCUS{}", self.settings.tag_name, counter.value());
        let mut lines = Vec::with_capacity(block.lines.len() + 16);
        let mut annotation_lines = 0;

        for (i, current) in block.lines.iter().enumerate() {
            if Some(i) == rna_anchor {
                if let Some(rna_blocks) = rna_blocks {
                    push_rna_features(&mut lines, rna_blocks, &locus_tag, ending);
                }
            }

            if line::is_locus_tag(current) {
                lines.push(line::rewrite_locus_tag(current, &locus_tag));
            } else {
                lines.push(current.clone());
            }

            if Some(i) == cds_anchor {
                if let Some(set) = annotations {
                    annotation_lines = self.push_annotations(&mut lines, set, ending);
                }
            }
        }

        let mut merged = SequenceBlock {
            accession: block.accession.clone(),
            lines,
        };
        let feature_lines = merged.feature_line_count();
        let stripped = feature_lines > self.settings.strip_threshold;
        if stripped {
            merged
                .lines
                .retain(|l| !line::line_code(l).is_strippable_metadata());
            counter.advance();
        }

        log::debug!(
            "{}: {annotation_lines} annotation lines, {} RNA features, {feature_lines} FT lines{}",
            merged.accession.as_deref().unwrap_or("<no accession>"),
            rna_blocks.map_or(0, <[RnaFeatureBlock]>::len),
            if stripped { ", metadata stripped" } else { "" }
        );

        Ok(MergeOutcome {
            block: merged,
            annotation_lines,
            rna_features: rna_blocks.map_or(0, <[RnaFeatureBlock]>::len),
            stripped,
            skipped: false,
        })
    }

    /// Appends one motif line per annotation and the trailing scanner line, which is
    /// written even for an empty set. Returns the number of lines added.
    fn push_annotations(
        &self,
        lines: &mut Vec<String>,
        set: &AnnotationSet,
        ending: &str,
    ) -> usize {
        let before = lines.len();
        for annotation in set.iter() {
            lines.push(format!(
                "{}{ending}",
                line::qualifier_line(&annotation.inference_qualifier())
            ));
        }
        lines.push(format!(
            "{}{ending}",
            line::qualifier_line(&self.settings.scanner_inference())
        ));
        lines.len() - before
    }
}

/// Index of the last line of the first `CDS` feature's location, following
/// continuation lines of multi-line locations such as `join(...)`.
fn cds_location_end(lines: &[String]) -> Option<usize> {
    let start = lines.iter().position(|l| line::feature_key(l) == Some("CDS"))?;
    let continuations = lines[start + 1..]
        .iter()
        .take_while(|l| line::is_location_continuation(l))
        .count();
    Some(start + continuations)
}

fn push_rna_features(
    lines: &mut Vec<String>,
    rna_blocks: &[RnaFeatureBlock],
    locus_tag: &str,
    ending: &str,
) {
    for rna_line in rna_blocks.iter().flat_map(|b| &b.lines) {
        if line::is_locus_tag(rna_line) {
            lines.push(format!("{}{ending}", line::rewrite_locus_tag(rna_line, locus_tag)));
        } else {
            lines.push(format!("{rna_line}{ending}"));
        }
    }
}
