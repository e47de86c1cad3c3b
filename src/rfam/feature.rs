//! Feature-table entries derived from covariance-model hits.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::embl::line;
use crate::error::Error;

use super::cmsearch::CmsearchMatch;
use super::model::{NcRnaClass, RfamLookup, RfamModelEntry, RnaType};

/// A hit trimmed by fewer model positions than this at an edge is complete at that edge.
const COMPLETENESS_MARGIN: u64 = 11;

/// Order of RNA features within one contig.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureOrder {
    /// Order in which hits appear in the deoverlap file.
    #[default]
    Encounter,
    /// Ascending feature start; ties keep encounter order.
    Position,
}

/// Settings shared by every feature built from a run's hits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureOptions {
    pub tag_name: String,
    pub search_tool: String,
    pub search_tool_version: String,
    pub order: FeatureOrder,
}

impl Default for FeatureOptions {
    fn default() -> Self {
        Self {
            tag_name: "transl_table".to_string(),
            search_tool: "Infernal cmsearch".to_string(),
            search_tool_version: "1.1.2".to_string(),
            order: FeatureOrder::Encounter,
        }
    }
}

/// Evidence qualifiers attached to a predicted RNA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inference {
    /// `similar to RNA sequence, <description>:RFAM:<accession>`
    pub prediction: String,
    /// `ab initio prediction:<tool>:<version>`
    pub software: String,
}

/// One RNA feature ready for the feature table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebinFeature {
    pub feature_type: RnaType,
    pub start: u64,
    pub end: u64,
    pub gene: String,
    pub product: String,
    pub inference: Inference,
    pub start_complete: bool,
    pub end_complete: bool,
    pub complement: bool,
    pub ncrna_class: Option<NcRnaClass>,
    pub locus_tag: String,
}

impl WebinFeature {
    /// Joins a hit with its model entry.
    #[must_use]
    pub fn from_match(
        hit: &CmsearchMatch,
        model: &RfamModelEntry,
        options: &FeatureOptions,
    ) -> Self {
        let (start, end) = hit.strand.orient(hit.seq_from, hit.seq_to);
        let (start_complete, end_complete) = model_completeness(hit, model);

        Self {
            feature_type: model.rna_type,
            start,
            end,
            gene: hit.query_name.replace('_', " "),
            product: model.description.clone(),
            inference: Inference {
                prediction: format!(
                    "similar to RNA sequence, {}:RFAM:{}",
                    model.description, model.accession
                ),
                software: format!(
                    "ab initio prediction:{}:{}",
                    options.search_tool, options.search_tool_version
                ),
            },
            start_complete,
            end_complete,
            complement: hit.strand.is_reverse(),
            ncrna_class: model.ncrna_class,
            locus_tag: format!(
                "{}_{}{}",
                options.tag_name,
                model.accession.to_lowercase(),
                model.rna_type.abbreviation()
            ),
        }
    }

    /// Location text, e.g. `<100..>200` or `complement(100..200)`.
    #[must_use]
    pub fn location(&self) -> String {
        let start = if self.start_complete { "" } else { "<" };
        let end = if self.end_complete { "" } else { ">" };
        let span = format!("{start}{}..{end}{}", self.start, self.end);
        if self.complement {
            format!("complement({span})")
        } else {
            span
        }
    }

    /// Feature-table lines, without terminators.
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec![
            line::feature_line(&self.feature_type.to_string(), &self.location()),
            line::qualifier_line(&format!("/locus_tag=\"{}\"", self.locus_tag)),
            line::qualifier_line(&format!("/gene=\"{}\"", self.gene)),
            line::qualifier_line(&format!("/product=\"{}\"", self.product)),
            line::qualifier_line(&format!("/inference=\"{}\"", self.inference.prediction)),
            line::qualifier_line(&format!("/inference=\"{}\"", self.inference.software)),
        ];
        if let Some(class) = self.ncrna_class {
            lines.push(line::qualifier_line(&format!("/ncRNA_class=\"{class}\"")));
        }
        lines
    }
}

impl fmt::Display for WebinFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.feature_type, self.location(), self.locus_tag)
    }
}

fn model_completeness(hit: &CmsearchMatch, model: &RfamModelEntry) -> (bool, bool) {
    let start_complete = hit.model_from < COMPLETENESS_MARGIN;
    let end_complete = model.model_length.saturating_sub(hit.model_to) < COMPLETENESS_MARGIN;
    (start_complete, end_complete)
}

/// Rendered lines of one feature plus its start, used for ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RnaFeatureBlock {
    pub start: u64,
    pub lines: Vec<String>,
}

/// Contig accession to its RNA feature blocks.
#[derive(Debug, Clone, Default)]
pub struct RnaFeatureMap {
    features: HashMap<String, Vec<RnaFeatureBlock>>,
}

impl RnaFeatureMap {
    #[must_use]
    pub fn get(&self, contig: &str) -> Option<&[RnaFeatureBlock]> {
        self.features.get(contig).map(Vec::as_slice)
    }

    /// Number of contigs with at least one feature.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.features.values().map(Vec::len).sum()
    }
}

/// Groups hits by target contig and renders each as a feature block.
///
/// Every hit must name a model present in `lookup`.
pub fn build_rna_feature_map(
    lookup: &RfamLookup,
    matches: Vec<CmsearchMatch>,
    options: &FeatureOptions,
) -> Result<RnaFeatureMap, Error> {
    let mut features: HashMap<String, Vec<RnaFeatureBlock>> = HashMap::new();

    for hit in matches {
        let model = lookup.get(&hit.accession).ok_or_else(|| {
            Error::Validation(format!(
                "model {} for contig {} not found in Rfam lookup",
                hit.accession, hit.target_name
            ))
        })?;
        let feature = WebinFeature::from_match(&hit, model, options);
        let block = RnaFeatureBlock {
            start: feature.start,
            lines: feature.to_lines(),
        };

        let blocks = features.entry(hit.target_name).or_default();
        if !blocks.is_empty() {
            log::debug!("Found duplicate entry for {}: {feature}", feature.locus_tag);
        }
        blocks.push(block);
    }

    if options.order == FeatureOrder::Position {
        for blocks in features.values_mut() {
            blocks.sort_by_key(|b| b.start);
        }
    }

    let map = RnaFeatureMap { features };
    log::info!(
        "Built {} RNA features across {} contigs",
        map.feature_count(),
        map.len()
    );
    Ok(map)
}

/// Complete and partial hit counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageSummary {
    pub complete: usize,
    pub partial: usize,
}

impl CoverageSummary {
    #[must_use]
    pub fn total(&self) -> usize {
        self.complete + self.partial
    }
}

/// Counts hits that span their whole model against those truncated at either edge.
/// Hits whose model is missing from `lookup` are not counted.
#[must_use]
pub fn coverage_summary(matches: &[CmsearchMatch], lookup: &RfamLookup) -> CoverageSummary {
    let mut summary = CoverageSummary::default();
    for hit in matches {
        let Some(model) = lookup.get(&hit.accession) else {
            continue;
        };
        match model_completeness(hit, model) {
            (true, true) => summary.complete += 1,
            _ => summary.partial += 1,
        }
    }
    summary
}
