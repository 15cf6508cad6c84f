//! Gradebook Ingest Library
//!
//! A Rust library for reconciling teacher-submitted gradebook spreadsheets
//! against a persistent store of students, assignments and grades.
//!
//! This library provides tools for:
//! - Decoding uploaded delimiter-separated files with encoding and delimiter sniffing
//! - Classifying template and Google Classroom export layouts
//! - Normalizing rows into tagged cell values
//! - Reconciling rows onto existing entities without duplicates or data loss
//! - Building a structured upload report of creates, updates, skips and conflicts

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod store;
    pub mod services {
        pub mod layout_classifier;
        pub mod pipeline;
        pub mod reconciler;
        pub mod row_normalizer;
        pub mod tabular_reader;
        pub mod upload_report;
    }
    pub mod adapters {
        pub mod json_store;
        pub mod memory_store;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{Assignment, AssignmentKey, CellValue, Grade, Student, Tag};
pub use app::services::pipeline::{UploadOptions, UploadPipeline};
pub use app::services::upload_report::UploadReport;
pub use app::store::{ChangeSet, GradeStore};
pub use config::IngestConfig;

/// Result type alias for gradebook ingestion
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for gradebook ingestion
///
/// `MalformedFile` and `UnrecognizedLayout` reject a whole upload. Row and cell
/// problems are never errors; they are collected into the upload report.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Upload could not be decoded as text, was empty, or was not tabular
    #[error("Malformed file: {message}")]
    MalformedFile { message: String },

    /// No supported layout resolved all identity columns
    #[error("Unrecognized layout: {message}")]
    UnrecognizedLayout {
        message: String,
        attempts: Vec<String>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Storage collaborator failed
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failed
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Create a malformed file error
    pub fn malformed_file(message: impl Into<String>) -> Self {
        Self::MalformedFile {
            message: message.into(),
        }
    }

    /// Create an unrecognized layout error listing why each layout was rejected
    pub fn unrecognized_layout(attempts: Vec<String>) -> Self {
        let message = if attempts.is_empty() {
            "no layouts configured".to_string()
        } else {
            attempts.join("; ")
        };
        Self::UnrecognizedLayout { message, attempts }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a serialization error with context
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// Whether the error rejects the uploaded file itself rather than the environment
    pub fn is_fatal_upload_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedFile { .. } | Self::UnrecognizedLayout { .. }
        )
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        let location = error
            .position()
            .map(|p| format!(" at line {}", p.line()))
            .unwrap_or_default();
        Self::MalformedFile {
            message: format!("could not read delimited text{}: {}", location, error),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON processing failed".to_string(),
            source: error,
        }
    }
}
