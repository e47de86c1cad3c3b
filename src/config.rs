use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::decorator::{DecorationSettings, StructuralErrorPolicy};
use crate::rfam::{FeatureOptions, FeatureOrder};

/// Optional run settings, read from a camelCase JSON file. Every key has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct DecoratorConfig {
    pub scanner_name: String,
    pub search_tool: String,
    pub search_tool_version: String,
    pub tag_name: String,
    pub strip_threshold: usize,
    pub first_locus_tag: u64,
    pub rna_feature_order: FeatureOrder,
    pub structural_errors: StructuralErrorPolicy,
}

impl Default for DecoratorConfig {
    fn default() -> Self {
        Self {
            scanner_name: "InterProScan".to_string(),
            search_tool: "Infernal cmsearch".to_string(),
            search_tool_version: "1.1.2".to_string(),
            tag_name: "transl_table".to_string(),
            strip_threshold: 3,
            first_locus_tag: 1,
            rna_feature_order: FeatureOrder::Encounter,
            structural_errors: StructuralErrorPolicy::Abort,
        }
    }
}

impl DecoratorConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("scannerName", &self.scanner_name),
            ("searchTool", &self.search_tool),
            ("searchToolVersion", &self.search_tool_version),
            ("tagName", &self.tag_name),
        ] {
            if value.trim().is_empty() {
                bail!("invalid {name}: must not be empty");
            }
        }

        if self
            .tag_name
            .chars()
            .any(|c| c.is_whitespace() || c == '"')
        {
            bail!(
                "invalid tagName '{}': must not contain whitespace or quotes",
                self.tag_name
            );
        }

        Ok(())
    }

    /// Settings for building RNA features.
    #[must_use]
    pub fn feature_options(&self) -> FeatureOptions {
        FeatureOptions {
            tag_name: self.tag_name.clone(),
            search_tool: self.search_tool.clone(),
            search_tool_version: self.search_tool_version.clone(),
            order: self.rna_feature_order,
        }
    }

    /// Settings for merging records, with the scanner version given on the command line.
    #[must_use]
    pub fn decoration_settings(&self, scanner_version: &str) -> DecorationSettings {
        DecorationSettings {
            scanner_name: self.scanner_name.clone(),
            scanner_version: scanner_version.to_string(),
            tag_name: self.tag_name.clone(),
            strip_threshold: self.strip_threshold,
            structural_errors: self.structural_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(json.as_bytes()).unwrap();
        f
    }

    #[test]
    fn empty_object_uses_defaults() {
        let f = write_config("{}");
        let config = DecoratorConfig::from_file(f.path()).unwrap();
        assert_eq!(config, DecoratorConfig::default());
        assert_eq!(config.strip_threshold, 3);
        assert_eq!(config.first_locus_tag, 1);
    }

    #[test]
    fn valid_config_all_fields() {
        let json = r#"{
            "scannerName": "InterProScan",
            "searchTool": "Infernal cmsearch",
            "searchToolVersion": "1.1.5",
            "tagName": "MGYG",
            "stripThreshold": 5,
            "firstLocusTag": 100,
            "rnaFeatureOrder": "position",
            "structuralErrors": "skip"
        }"#;
        let f = write_config(json);
        let config = DecoratorConfig::from_file(f.path()).unwrap();
        assert_eq!(config.tag_name, "MGYG");
        assert_eq!(config.strip_threshold, 5);
        assert_eq!(config.first_locus_tag, 100);
        assert_eq!(config.rna_feature_order, FeatureOrder::Position);
        assert_eq!(config.structural_errors, StructuralErrorPolicy::Skip);

        let options = config.feature_options();
        assert_eq!(options.search_tool_version, "1.1.5");
        let settings = config.decoration_settings("5.52-86.0");
        assert_eq!(settings.scanner_version, "5.52-86.0");
        assert_eq!(settings.strip_threshold, 5);
    }

    #[test]
    fn invalid_tag_name() {
        let f = write_config(r#"{ "tagName": "bad tag" }"#);
        let err = DecoratorConfig::from_file(f.path()).unwrap_err();
        assert!(err.to_string().contains("invalid tagName"));
    }

    #[test]
    fn empty_scanner_name() {
        let f = write_config(r#"{ "scannerName": " " }"#);
        let err = DecoratorConfig::from_file(f.path()).unwrap_err();
        assert!(err.to_string().contains("invalid scannerName"));
    }

    #[test]
    fn unknown_feature_order() {
        let f = write_config(r#"{ "rnaFeatureOrder": "random" }"#);
        let err = DecoratorConfig::from_file(f.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn missing_file() {
        let err = DecoratorConfig::from_file(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
