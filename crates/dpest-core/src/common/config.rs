//! Generator configuration value object.
//!
//! All defaults that the original tooling kept in an ambient configuration
//! file live here as an explicit value passed into every generator call.
//! A partial JSON overlay can be merged over the defaults; keys the overlay
//! does not name keep their default values.

use super::config_data;
use crate::domain::{DpestError, DpestResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// First line of template files (`ptf`).
    pub template_first_line: String,
    /// First line of instruction files (`pif`).
    pub instruction_first_line: String,
    pub template_extension: String,
    pub instruction_extension: String,
    pub cultivar_extension: String,
    pub ecotype_extension: String,
    pub species_extension: String,
    pub output_extension: String,
    /// Identifier fill for cultivar/ecotype templates.
    pub genotype_fill: char,
    /// Identifier fill for species templates.
    pub species_fill: char,
    /// PEST observation-name length cap.
    pub max_observation_name: usize,
    /// Calibration bounds per genotype parameter name.
    pub genotype_bounds: BTreeMap<String, (f64, f64)>,
    /// Default cultivar grouping applied when a request carries none.
    pub cultivar_groups: Vec<(String, Vec<String>)>,
    /// Default ecotype grouping applied when a request carries none.
    pub ecotype_groups: Vec<(String, Vec<String>)>,
    /// Overview variable name to observation group.
    pub overview_classification: BTreeMap<String, String>,
    /// Time-series variable code to observation group.
    pub timeseries_classification: BTreeMap<String, String>,
    /// Lower-case crop name to DSSAT crop code.
    pub crop_codes: BTreeMap<String, String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            template_first_line: config_data::TEMPLATE_FIRST_LINE.to_string(),
            instruction_first_line: config_data::INSTRUCTION_FIRST_LINE.to_string(),
            template_extension: config_data::TEMPLATE_EXTENSION.to_string(),
            instruction_extension: config_data::INSTRUCTION_EXTENSION.to_string(),
            cultivar_extension: config_data::CULTIVAR_EXTENSION.to_string(),
            ecotype_extension: config_data::ECOTYPE_EXTENSION.to_string(),
            species_extension: config_data::SPECIES_EXTENSION.to_string(),
            output_extension: config_data::OUTPUT_EXTENSION.to_string(),
            genotype_fill: config_data::GENOTYPE_FILL,
            species_fill: config_data::SPECIES_FILL,
            max_observation_name: config_data::MAX_OBSERVATION_NAME,
            genotype_bounds: config_data::GENOTYPE_BOUNDS
                .iter()
                .map(|(name, min, max)| (name.to_string(), (*min, *max)))
                .collect(),
            cultivar_groups: owned_groups(config_data::CULTIVAR_GROUPS),
            ecotype_groups: owned_groups(config_data::ECOTYPE_GROUPS),
            overview_classification: owned_table(config_data::OVERVIEW_CLASSIFICATION),
            timeseries_classification: owned_table(config_data::TIMESERIES_CLASSIFICATION),
            crop_codes: owned_table(config_data::CROP_CODES),
        }
    }
}

impl GeneratorConfig {
    /// Loads a JSON overlay; missing keys fall back to the defaults.
    pub fn from_overlay(path: &Path) -> DpestResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| {
            DpestError::configuration(
                "CFG.OVERLAY_READ",
                format!(
                    "failed to read configuration overlay '{}': {}",
                    path.display(),
                    source
                ),
            )
        })?;
        serde_json::from_str(&raw).map_err(|source| {
            DpestError::configuration(
                "CFG.OVERLAY_PARSE",
                format!(
                    "configuration overlay '{}' is not valid JSON: {}",
                    path.display(),
                    source
                ),
            )
        })
    }

    pub fn genotype_bounds_for(&self, parameter: &str) -> DpestResult<(f64, f64)> {
        self.genotype_bounds
            .get(parameter)
            .copied()
            .ok_or_else(|| {
                DpestError::configuration(
                    "CFG.GENOTYPE_BOUNDS",
                    format!(
                        "no calibration bounds configured for genotype parameter '{}'",
                        parameter
                    ),
                )
            })
    }

    pub fn crop_code_for(&self, crop_name: &str) -> DpestResult<&str> {
        self.crop_codes
            .get(&crop_name.to_ascii_lowercase())
            .map(String::as_str)
            .ok_or_else(|| {
                DpestError::configuration(
                    "CFG.CROP_CODE",
                    format!("no DSSAT crop code configured for crop '{}'", crop_name),
                )
            })
    }
}

fn owned_groups(groups: &[(&str, &[&str])]) -> Vec<(String, Vec<String>)> {
    groups
        .iter()
        .map(|(group, members)| {
            (
                group.to_string(),
                members.iter().map(|member| member.to_string()).collect(),
            )
        })
        .collect()
}

fn owned_table(table: &[(&str, &str)]) -> BTreeMap<String, String> {
    table
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::GeneratorConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_cover_the_wheat_tables() {
        let config = GeneratorConfig::default();
        assert_eq!(config.template_first_line, "ptf");
        assert_eq!(config.instruction_first_line, "pif");
        assert_eq!(config.genotype_bounds_for("P1V").unwrap(), (0.0, 60.0));
        assert_eq!(config.crop_code_for("Wheat").unwrap(), "WH");
        assert_eq!(
            config.overview_classification.get("Maturity (DAP)"),
            Some(&"phenology".to_string())
        );
    }

    #[test]
    fn unknown_lookups_are_configuration_errors() {
        let config = GeneratorConfig::default();
        assert_eq!(
            config.genotype_bounds_for("NOPE").unwrap_err().code(),
            "CFG.GENOTYPE_BOUNDS"
        );
        assert_eq!(
            config.crop_code_for("kudzu").unwrap_err().code(),
            "CFG.CROP_CODE"
        );
    }

    #[test]
    fn overlay_overrides_only_named_keys() {
        let temp = TempDir::new().expect("tempdir should be created");
        let overlay = temp.path().join("dpest.json");
        fs::write(
            &overlay,
            r#"{"template_first_line": "ptf", "genotype_fill": "Q", "crop_codes": {"wheat": "WW"}}"#,
        )
        .expect("overlay should be written");

        let config = GeneratorConfig::from_overlay(&overlay).expect("overlay should parse");
        assert_eq!(config.genotype_fill, 'Q');
        assert_eq!(config.crop_code_for("wheat").unwrap(), "WW");
        // Untouched keys keep their defaults.
        assert_eq!(config.instruction_first_line, "pif");
        assert!(config.genotype_bounds_for("PHINT").is_ok());
    }

    #[test]
    fn missing_overlay_is_a_configuration_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        let error = GeneratorConfig::from_overlay(&temp.path().join("absent.json"))
            .expect_err("missing overlay must fail");
        assert_eq!(error.code(), "CFG.OVERLAY_READ");
    }
}
