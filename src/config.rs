//! Configuration management and validation.
//!
//! Provides the ingestion configuration: upload limits, delimiter handling,
//! date formats, email validation and the ordered list of supported
//! spreadsheet layouts.

use crate::constants::{
    DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_DATE_FORMATS, DEFAULT_DATETIME_FORMATS,
    DEFAULT_EMAIL_PATTERN, DEFAULT_MAX_FILE_SIZE, classroom_headers, template_headers,
};
use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Field delimiter selection for uploaded files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterChoice {
    /// Sniff the delimiter from the first lines of the file
    #[default]
    Auto,
    Comma,
    Semicolon,
    Tab,
    Pipe,
}

impl DelimiterChoice {
    /// Explicit delimiter byte, or `None` when sniffing
    pub fn as_byte(&self) -> Option<u8> {
        match self {
            DelimiterChoice::Auto => None,
            DelimiterChoice::Comma => Some(b','),
            DelimiterChoice::Semicolon => Some(b';'),
            DelimiterChoice::Tab => Some(b'\t'),
            DelimiterChoice::Pipe => Some(b'|'),
        }
    }
}

/// Whether a layout carries a due-date row beneath the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueDateRow {
    /// Row 2 is always the due-date row
    Required,
    /// Row 2 is the due-date row unless it looks like max points
    Optional,
}

/// One supported spreadsheet layout
///
/// Matchers are regular expressions applied to normalized header text
/// (trimmed, lower-cased, underscores as spaces, single spaces).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutProfile {
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Optional identity column; absence never rejects the layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_number: Option<String>,
    pub due_date_row: DueDateRow,
}

impl LayoutProfile {
    /// Fixed upload template: First/Last/Email, then an optional due-date
    /// row and the max-points row
    pub fn template() -> Self {
        Self {
            name: template_headers::LAYOUT_NAME.to_string(),
            first_name: template_headers::FIRST_NAME.to_string(),
            last_name: template_headers::LAST_NAME.to_string(),
            email: template_headers::EMAIL.to_string(),
            student_number: Some(template_headers::STUDENT_NUMBER.to_string()),
            due_date_row: DueDateRow::Optional,
        }
    }

    /// Google Classroom grade export
    pub fn classroom() -> Self {
        Self {
            name: classroom_headers::LAYOUT_NAME.to_string(),
            first_name: classroom_headers::FIRST_NAME.to_string(),
            last_name: classroom_headers::LAST_NAME.to_string(),
            email: classroom_headers::EMAIL.to_string(),
            student_number: Some(classroom_headers::STUDENT_NUMBER.to_string()),
            due_date_row: DueDateRow::Optional,
        }
    }
}

/// Accepted date and date-time formats for due-date cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateFormats {
    pub date: Vec<String>,
    /// Date-time formats whose date part is kept
    pub datetime: Vec<String>,
}

impl Default for DateFormats {
    fn default() -> Self {
        Self {
            date: DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect(),
            datetime: DEFAULT_DATETIME_FORMATS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl DateFormats {
    /// Parse a trimmed cell as a calendar date
    pub fn parse(&self, value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        self.date
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
            .or_else(|| {
                self.datetime
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                    .map(|dt| dt.date())
            })
    }
}

/// Global configuration for gradebook ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Delimiter handling for uploads
    pub delimiter: DelimiterChoice,

    /// Largest accepted upload in bytes
    pub max_file_size: usize,

    /// File extensions accepted by the CLI (lower-case, no dot)
    pub allowed_extensions: Vec<String>,

    /// Supported layouts in preference order
    pub layouts: Vec<LayoutProfile>,

    /// Accepted due-date formats
    pub date_formats: DateFormats,

    /// Pattern a trimmed email must match
    pub email_pattern: String,

    /// Minimum fraction of rows with a numeric score for a column to be kept (0 disables)
    pub min_column_coverage: f64,

    /// Tags attached to every assignment created by an upload
    pub default_tags: Vec<String>,

    /// JSON store location used by the CLI
    pub store_path: Option<PathBuf>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            delimiter: DelimiterChoice::Auto,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            layouts: vec![LayoutProfile::template(), LayoutProfile::classroom()],
            date_formats: DateFormats::default(),
            email_pattern: DEFAULT_EMAIL_PATTERN.to_string(),
            min_column_coverage: 0.0,
            default_tags: Vec::new(),
            store_path: None,
        }
    }
}

impl IngestConfig {
    /// Default configuration file location (`<config dir>/gradebook-ingest/config.toml`)
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("gradebook-ingest").join("config.toml"))
            .ok_or_else(|| Error::configuration("Could not determine user config directory"))
    }

    /// Default JSON store location (`<data dir>/gradebook-ingest/store.json`)
    pub fn default_store_path() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join("gradebook-ingest").join("store.json"))
            .ok_or_else(|| Error::configuration("Could not determine user data directory"))
    }

    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(
                format!("Failed to read config file {}", path.display()),
                e,
            )
        })?;

        let config: IngestConfig = toml::from_str(&content).map_err(|e| {
            Error::configuration(format!("Invalid config file {}: {}", path.display(), e))
        })?;

        debug!("Loaded configuration from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    /// Check bounds and compile every pattern once
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size == 0 {
            return Err(Error::configuration("max_file_size must be greater than 0"));
        }

        if !(0.0..=1.0).contains(&self.min_column_coverage) {
            return Err(Error::configuration(format!(
                "min_column_coverage must be between 0 and 1, got {}",
                self.min_column_coverage
            )));
        }

        if self.layouts.is_empty() {
            return Err(Error::configuration("at least one layout must be configured"));
        }

        self.email_regex()?;
        for layout in &self.layouts {
            compile_pattern(&layout.name, "first_name", &layout.first_name)?;
            compile_pattern(&layout.name, "last_name", &layout.last_name)?;
            compile_pattern(&layout.name, "email", &layout.email)?;
            if let Some(pattern) = &layout.student_number {
                compile_pattern(&layout.name, "student_number", pattern)?;
            }
        }

        Ok(())
    }

    /// Compiled email pattern
    pub fn email_regex(&self) -> Result<Regex> {
        Regex::new(&self.email_pattern).map_err(|e| {
            Error::configuration(format!(
                "Invalid email_pattern '{}': {}",
                self.email_pattern, e
            ))
        })
    }

    /// Whether the CLI accepts a file with this path
    pub fn is_allowed_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.allowed_extensions.iter().any(|allowed| *allowed == ext)
            })
            .unwrap_or(false)
    }

    /// Set the delimiter choice
    pub fn with_delimiter(mut self, delimiter: DelimiterChoice) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the upload size limit
    pub fn with_max_file_size(mut self, max_file_size: usize) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Replace the layout list
    pub fn with_layouts(mut self, layouts: Vec<LayoutProfile>) -> Self {
        self.layouts = layouts;
        self
    }

    /// Set the sparse-column threshold
    pub fn with_min_column_coverage(mut self, coverage: f64) -> Self {
        self.min_column_coverage = coverage;
        self
    }

    /// Set tags attached to every created assignment
    pub fn with_default_tags(mut self, tags: Vec<String>) -> Self {
        self.default_tags = tags;
        self
    }

    /// Set the JSON store location
    pub fn with_store_path(mut self, path: PathBuf) -> Self {
        self.store_path = Some(path);
        self
    }
}

/// Compile a layout matcher, case-insensitively
pub(crate) fn compile_pattern(layout: &str, role: &str, pattern: &str) -> Result<Regex> {
    regex::RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| {
            Error::configuration(format!(
                "Invalid {} matcher for layout '{}': {}",
                role, layout, e
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = IngestConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.layouts[0].name, "template");
        assert_eq!(config.layouts[1].name, "classroom");
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = IngestConfig::default().with_min_column_coverage(1.5);
        assert!(matches!(
            config.validate(),
            Err(Error::Configuration { .. })
        ));

        let config = IngestConfig::default().with_layouts(Vec::new());
        assert!(config.validate().is_err());

        let mut broken = LayoutProfile::template();
        broken.email = "(unclosed".to_string();
        let config = IngestConfig::default().with_layouts(vec![broken]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_date_formats() {
        let formats = DateFormats::default();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 10);

        assert_eq!(formats.parse("2024-01-10"), expected);
        assert_eq!(formats.parse("01/10/2024"), expected);
        assert_eq!(formats.parse("Jan 10, 2024"), expected);
        assert_eq!(formats.parse("10 January 2024"), expected);
        assert_eq!(formats.parse("2024-01-10 23:59:00"), expected);
        assert_eq!(formats.parse("next tuesday"), None);
    }

    #[test]
    fn test_allowed_extension() {
        let config = IngestConfig::default();
        assert!(config.is_allowed_extension(Path::new("grades.csv")));
        assert!(config.is_allowed_extension(Path::new("grades.CSV")));
        assert!(config.is_allowed_extension(Path::new("grades.tsv")));
        assert!(!config.is_allowed_extension(Path::new("grades.xlsx")));
        assert!(!config.is_allowed_extension(Path::new("grades")));
    }

    #[test]
    fn test_load_from_toml_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "delimiter = \"semicolon\"").unwrap();
        writeln!(file, "min_column_coverage = 0.1").unwrap();
        writeln!(file, "default_tags = [\"Term 1\"]").unwrap();

        let config = IngestConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.delimiter, DelimiterChoice::Semicolon);
        assert_eq!(config.min_column_coverage, 0.1);
        assert_eq!(config.default_tags, vec!["Term 1".to_string()]);
        assert_eq!(config.layouts.len(), 2);
        assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn test_load_from_toml_rejects_invalid() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_file_size = \"big\"").unwrap();

        assert!(matches!(
            IngestConfig::load_from_file(file.path()),
            Err(Error::Configuration { .. })
        ));
    }
}
