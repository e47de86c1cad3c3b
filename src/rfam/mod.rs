//! Rfam covariance-model hits and the RNA features built from them.

pub mod cmsearch;
pub mod feature;
pub mod model;

pub use cmsearch::{CmsearchMatch, parse_matches};
pub use feature::{
    CoverageSummary, FeatureOptions, FeatureOrder, RnaFeatureBlock, RnaFeatureMap, WebinFeature,
    build_rna_feature_map, coverage_summary,
};
pub use model::{RfamLookup, RfamModelEntry, RnaType, parse_rfam_lookup};
