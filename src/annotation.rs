//! Functional annotations keyed by protein identifier.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexSet;

/// Isoform suffixes tried, in order, when resolving a contig accession to a protein.
pub const ISOFORM_SUFFIXES: [&str; 2] = [".p1", ".p2"];

/// Cross-reference databases recognized in scanner output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Database {
    InterPro,
    Go,
    Kegg,
    MetaCyc,
    Reactome,
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InterPro => "InterPro",
            Self::Go => "GO",
            Self::Kegg => "KEGG",
            Self::MetaCyc => "MetaCyc",
            Self::Reactome => "Reactome",
        };
        write!(f, "{s}")
    }
}

/// A single cross-reference such as `InterPro:IPR004361` or `GO:0004462`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionalAnnotation {
    pub database: Database,
    pub identifier: String,
}

impl FunctionalAnnotation {
    pub fn new(database: Database, identifier: impl Into<String>) -> Self {
        Self {
            database,
            identifier: identifier.into(),
        }
    }

    /// Qualifier text injected below a CDS feature.
    #[must_use]
    pub fn inference_qualifier(&self) -> String {
        format!(
            "/inference=\"protein motif:{}:{}\"",
            self.database, self.identifier
        )
    }
}

/// Deduplicated annotations for one sequence. Iteration follows first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationSet {
    annotations: IndexSet<FunctionalAnnotation>,
}

impl AnnotationSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an annotation. Returns false if the pair was already present.
    pub fn add(&mut self, database: Database, identifier: impl Into<String>) -> bool {
        self.annotations
            .insert(FunctionalAnnotation::new(database, identifier))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionalAnnotation> {
        self.annotations.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    #[must_use]
    pub fn contains(&self, database: Database, identifier: &str) -> bool {
        self.annotations
            .contains(&FunctionalAnnotation::new(database, identifier))
    }
}

/// Immutable lookup from sequence identifier to its annotations.
#[derive(Debug, Clone, Default)]
pub struct AnnotationIndex {
    sets: HashMap<String, AnnotationSet>,
}

impl AnnotationIndex {
    #[must_use]
    pub fn new(sets: HashMap<String, AnnotationSet>) -> Self {
        Self { sets }
    }

    #[must_use]
    pub fn get(&self, seq_id: &str) -> Option<&AnnotationSet> {
        self.sets.get(seq_id)
    }

    /// Resolves a contig accession through its predicted proteins: `<acc>.p1` first,
    /// then `<acc>.p2`. Returns `None` when neither isoform was annotated.
    #[must_use]
    pub fn lookup_isoform(&self, accession: &str) -> Option<&AnnotationSet> {
        ISOFORM_SUFFIXES
            .iter()
            .find_map(|suffix| self.sets.get(&format!("{accession}{suffix}")))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Total number of annotations across all sequences.
    #[must_use]
    pub fn annotation_count(&self) -> usize {
        self.sets.values().map(AnnotationSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(entries: &[(&str, &[(Database, &str)])]) -> AnnotationIndex {
        let mut sets = HashMap::new();
        for (seq_id, annotations) in entries {
            let mut set = AnnotationSet::new();
            for (db, id) in *annotations {
                set.add(*db, *id);
            }
            sets.insert(seq_id.to_string(), set);
        }
        AnnotationIndex::new(sets)
    }

    #[test]
    fn duplicate_annotation_ignored() {
        let mut set = AnnotationSet::new();
        assert!(set.add(Database::Go, "0004462"));
        assert!(!set.add(Database::Go, "0004462"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn same_identifier_different_database() {
        let mut set = AnnotationSet::new();
        set.add(Database::Kegg, "00230");
        set.add(Database::MetaCyc, "00230");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn insertion_order_preserved() {
        let mut set = AnnotationSet::new();
        set.add(Database::InterPro, "IPR000001");
        set.add(Database::Go, "0004462");
        set.add(Database::InterPro, "IPR000001");
        let ids: Vec<&str> = set.iter().map(|a| a.identifier.as_str()).collect();
        assert_eq!(ids, ["IPR000001", "0004462"]);
    }

    #[test]
    fn isoform_p1_preferred() {
        let index = index_with(&[
            ("SEQ1.p1", &[(Database::Go, "1")]),
            ("SEQ1.p2", &[(Database::Go, "2")]),
        ]);
        let set = index.lookup_isoform("SEQ1").unwrap();
        assert!(set.contains(Database::Go, "1"));
    }

    #[test]
    fn isoform_p2_fallback() {
        let index = index_with(&[("SEQ1.p2", &[(Database::InterPro, "IPR000001")])]);
        let set = index.lookup_isoform("SEQ1").unwrap();
        assert!(set.contains(Database::InterPro, "IPR000001"));
        assert!(index.lookup_isoform("SEQ2").is_none());
    }

    #[test]
    fn bare_accession_not_matched() {
        let index = index_with(&[("SEQ1", &[(Database::Go, "1")])]);
        assert!(index.lookup_isoform("SEQ1").is_none());
        assert!(index.get("SEQ1").is_some());
    }

    #[test]
    fn inference_qualifier_text() {
        let annotation = FunctionalAnnotation::new(Database::InterPro, "IPR013766");
        assert_eq!(
            annotation.inference_qualifier(),
            "/inference=\"protein motif:InterPro:IPR013766\""
        );
    }

    #[test]
    fn database_names() {
        let names: Vec<String> = [
            Database::InterPro,
            Database::Go,
            Database::Kegg,
            Database::MetaCyc,
            Database::Reactome,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(names, ["InterPro", "GO", "KEGG", "MetaCyc", "Reactome"]);
    }
}
