//! Rfam family lookup table and RNA type classification.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;

use crate::error::Error;

/// Number of columns in a lookup row: accession, name, description, type, model length.
const LOOKUP_COLUMNS: usize = 5;

/// INSDC feature key assigned to an RNA family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RnaType {
    RRna,
    TRna,
    MRna,
    TmRna,
    NcRna,
    MiscRna,
    SnRna,
}

impl RnaType {
    /// Short code appended to synthesized locus tags.
    #[must_use]
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::RRna => "r",
            Self::TRna => "t",
            Self::MRna => "m",
            Self::TmRna => "tm",
            Self::NcRna => "nc",
            Self::MiscRna => "misc",
            Self::SnRna => "sn",
        }
    }
}

impl fmt::Display for RnaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::RRna => "rRNA",
            Self::TRna => "tRNA",
            Self::MRna => "mRNA",
            Self::TmRna => "tmRNA",
            Self::NcRna => "ncRNA",
            Self::MiscRna => "misc_RNA",
            Self::SnRna => "snRNA",
        };
        write!(f, "{s}")
    }
}

/// Controlled vocabulary for the `/ncRNA_class` qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NcRnaClass {
    AntisenseRna,
    AutocatalyticallySplicedIntron,
    HammerheadRibozyme,
    RnaseMrpRna,
    Ribozyme,
    LncRna,
    RnasePRna,
    TelomeraseRna,
    MiRna,
    SnRna,
    VaultRna,
    YRna,
    SrpRna,
    Other,
}

impl fmt::Display for NcRnaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AntisenseRna => "antisense_RNA",
            Self::AutocatalyticallySplicedIntron => "autocatalytically_spliced_intron",
            Self::HammerheadRibozyme => "hammerhead_ribozyme",
            Self::RnaseMrpRna => "RNase_MRP_RNA",
            Self::Ribozyme => "ribozyme",
            Self::LncRna => "lncRNA",
            Self::RnasePRna => "RNase_P_RNA",
            Self::TelomeraseRna => "telomerase_RNA",
            Self::MiRna => "miRNA",
            Self::SnRna => "snRNA",
            Self::VaultRna => "vault_RNA",
            Self::YRna => "Y_RNA",
            Self::SrpRna => "SRP_RNA",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// Classifies a family from its raw Rfam type string (e.g. `Gene; snRNA; splicing;`)
/// and model name. The first matching rule wins; only ncRNA families get a class.
#[must_use]
pub fn classify(name: &str, raw_type: &str) -> (RnaType, Option<NcRnaClass>) {
    if raw_type.contains("tRNA") {
        return (RnaType::TRna, None);
    }
    if raw_type.contains("rRNA") {
        return (RnaType::RRna, None);
    }

    let class = if raw_type.contains("antisense") {
        NcRnaClass::AntisenseRna
    } else if raw_type.starts_with("Intron;") {
        NcRnaClass::AutocatalyticallySplicedIntron
    } else if raw_type.contains("ribozyme") {
        if name.contains("Hammerhead") {
            NcRnaClass::HammerheadRibozyme
        } else if name.contains("RNase_MRP") {
            NcRnaClass::RnaseMrpRna
        } else {
            NcRnaClass::Ribozyme
        }
    } else if raw_type.contains("lncRNA") {
        NcRnaClass::LncRna
    } else if name.contains("RNase") {
        NcRnaClass::RnasePRna
    } else if name.contains("Telomerase") {
        NcRnaClass::TelomeraseRna
    } else if raw_type.contains("miRNA") {
        NcRnaClass::MiRna
    } else if raw_type.starts_with("Gene; snRNA") {
        NcRnaClass::SnRna
    } else if name.contains("Vault") {
        NcRnaClass::VaultRna
    } else if name.contains("Y_RNA") {
        NcRnaClass::YRna
    } else if name.contains("_SRP") {
        NcRnaClass::SrpRna
    } else {
        NcRnaClass::Other
    };
    (RnaType::NcRna, Some(class))
}

/// Families whose Rfam type string does not map onto the right INSDC feature.
fn family_override(accession: &str) -> Option<(RnaType, Option<NcRnaClass>)> {
    match accession {
        "RF01849" | "RF01850" => Some((RnaType::TmRna, None)),
        "RF00017" | "RF01854" | "RF01855" => Some((RnaType::NcRna, Some(NcRnaClass::SrpRna))),
        _ => None,
    }
}

/// One Rfam covariance model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfamModelEntry {
    pub accession: String,
    pub name: String,
    pub description: String,
    pub rna_type: RnaType,
    pub model_length: u64,
    pub ncrna_class: Option<NcRnaClass>,
}

impl RfamModelEntry {
    /// Builds an entry, classifying the raw type string.
    pub fn new(
        accession: &str,
        name: &str,
        description: &str,
        raw_type: &str,
        model_length: u64,
    ) -> Self {
        let (rna_type, ncrna_class) =
            family_override(accession).unwrap_or_else(|| classify(name, raw_type));
        Self {
            accession: accession.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            rna_type,
            model_length,
            ncrna_class,
        }
    }
}

/// Rfam accession to model entry.
#[derive(Debug, Clone, Default)]
pub struct RfamLookup {
    entries: HashMap<String, RfamModelEntry>,
}

impl RfamLookup {
    #[must_use]
    pub fn get(&self, accession: &str) -> Option<&RfamModelEntry> {
        self.entries.get(accession)
    }

    pub fn insert(&mut self, entry: RfamModelEntry) {
        self.entries.insert(entry.accession.clone(), entry);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses the Rfam lookup table.
///
/// Rows have five quoted columns: accession, name, description, raw type, model length.
/// The delimiter is a tab when the first line contains one, otherwise a comma.
/// A leading header row (non-numeric model length) is skipped.
pub fn parse_rfam_lookup<R: Read>(mut reader: R) -> Result<RfamLookup, Error> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    let first_line = content.lines().next().unwrap_or("");
    let delimiter = if first_line.contains('\t') { b'\t' } else { b',' };

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut lookup = RfamLookup::default();
    for (row_num, record) in csv_reader.records().enumerate() {
        let row = row_num + 1;
        let record = record.map_err(|e| Error::Parse(format!("row {row}: {e}")))?;
        if record.len() != LOOKUP_COLUMNS {
            return Err(Error::Parse(format!(
                "row {row}: expected {LOOKUP_COLUMNS} columns, got {}",
                record.len()
            )));
        }

        let length_field = &record[4];
        let model_length: u64 = match length_field.parse() {
            Ok(length) => length,
            Err(_) if row == 1 => {
                log::debug!("Skipping Rfam lookup header row");
                continue;
            }
            Err(e) => {
                return Err(Error::Parse(format!(
                    "row {row}: invalid model length '{length_field}': {e}"
                )));
            }
        };

        lookup.insert(RfamModelEntry::new(
            &record[0],
            &record[1],
            &record[2],
            &record[3],
            model_length,
        ));
    }

    log::info!("Parsed {} Rfam models", lookup.len());
    Ok(lookup)
}
