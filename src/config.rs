// src/config.rs
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Number of chart attempts the runner makes on every run.
pub const CHART_ATTEMPTS: usize = 6;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Dataset header names the report depends on. They must match the file verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub registration_date: String,
    pub district: String,
    pub company_class: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            registration_date: "registration_date".into(),
            district: "district".into(),
            company_class: "company_class".into(),
        }
    }
}

/// Immutable run configuration, fixed before the input is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub delimiter: char,
    pub columns: ColumnNames,
    /// chrono format strings, tried in order for every date value.
    pub date_formats: Vec<String>,
    pub top_districts: usize,
    pub preview_rows: usize,
    /// Successful charts needed for the summary to report success.
    pub expected_chart_count: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("indian-company-registrations.csv"),
            output_dir: PathBuf::from("charts"),
            delimiter: ',',
            columns: ColumnNames::default(),
            date_formats: default_date_formats(),
            top_districts: 10,
            preview_rows: 5,
            expected_chart_count: 7,
        }
    }
}

pub fn default_date_formats() -> Vec<String> {
    [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%d-%m-%Y",
        "%d/%m/%Y",
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%d-%b-%Y",
    ]
    .iter()
    .map(|f| f.to_string())
    .collect()
}

impl ReportConfig {
    /// Load a YAML config; fields not present keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.delimiter.is_ascii() {
            return Err(ConfigError::Invalid(format!(
                "delimiter {:?} is not a single ASCII character",
                self.delimiter
            )));
        }
        if self.top_districts == 0 {
            return Err(ConfigError::Invalid("top_districts must be > 0".into()));
        }
        if self.date_formats.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one date format is required".into(),
            ));
        }
        let cols = &self.columns;
        for (field, name) in [
            ("registration_date", &cols.registration_date),
            ("district", &cols.district),
            ("company_class", &cols.company_class),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "columns.{} must not be empty",
                    field
                )));
            }
        }
        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    /// The expected count can never be met when it exceeds the attempts made.
    pub fn expected_count_reachable(&self) -> bool {
        self.expected_chart_count <= CHART_ATTEMPTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_yaml_keeps_defaults() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        write!(
            tmp,
            "columns:\n  registration_date: DATE_OF_REGISTRATION\nexpected_chart_count: 6\n"
        )?;

        let cfg = ReportConfig::from_yaml_file(tmp.path())?;
        assert_eq!(cfg.columns.registration_date, "DATE_OF_REGISTRATION");
        assert_eq!(cfg.columns.company_class, "company_class");
        assert_eq!(cfg.expected_chart_count, 6);
        assert_eq!(cfg.top_districts, 10);
        assert_eq!(cfg.date_formats, default_date_formats());
        cfg.validate()?;
        Ok(())
    }

    #[test]
    fn test_bad_yaml_is_parse_error() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        write!(tmp, "top_districts: [not, a, number]\n")?;
        let err = ReportConfig::from_yaml_file(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        Ok(())
    }

    #[test]
    fn test_validate_rejects_non_ascii_delimiter() {
        let cfg = ReportConfig {
            delimiter: '§',
            ..ReportConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_default_expected_count_is_unreachable() {
        let cfg = ReportConfig::default();
        assert_eq!(cfg.expected_chart_count, 7);
        assert!(!cfg.expected_count_reachable());
    }
}
