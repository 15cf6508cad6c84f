//! Application constants for gradebook ingestion
//!
//! Default limits, header matcher patterns, date formats and the fixed
//! reason strings that appear in upload reports.

// =============================================================================
// Upload Limits
// =============================================================================

/// Largest accepted upload in bytes (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// File extensions accepted by the command-line front end
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// Delimiters considered when sniffing
pub const DELIMITER_CANDIDATES: &[u8] = &[b',', b';', b'\t', b'|'];

/// Number of leading lines sampled for delimiter sniffing
pub const DELIMITER_SAMPLE_LINES: usize = 10;

/// Number of rows the layout classifier inspects (header + two sub-rows)
pub const LAYOUT_HEADER_ROWS: usize = 3;

/// Row count above which the CLI shows a progress bar during reconciliation
pub const PROGRESS_ROW_THRESHOLD: usize = 500;

/// Tolerance used when comparing stored and incoming scores
pub const SCORE_EPSILON: f64 = 1e-9;

// =============================================================================
// Layout Profiles
// =============================================================================

/// Header matcher patterns for the fixed upload template
pub mod template_headers {
    pub const LAYOUT_NAME: &str = "template";
    pub const FIRST_NAME: &str = r"^(first name|first|firstname)$";
    pub const LAST_NAME: &str = r"^(last name|surname|last|lastname)$";
    pub const EMAIL: &str = r"^(email|e-mail|mail)$";
    pub const STUDENT_NUMBER: &str = r"^(student number|student no|student id)$";
}

/// Header matcher patterns for Google Classroom grade exports
pub mod classroom_headers {
    pub const LAYOUT_NAME: &str = "classroom";
    pub const FIRST_NAME: &str = r"^(first name|given name)$";
    pub const LAST_NAME: &str = r"^(last name|family name)$";
    pub const EMAIL: &str = r"^(email address|e-mail address)$";
    pub const STUDENT_NUMBER: &str = r"^(student id|sis id)$";
}

/// Simple local@domain shape used to accept student emails
pub const DEFAULT_EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

// =============================================================================
// Dates
// =============================================================================

/// Date formats tried, in order, for due-date cells
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Date-time formats whose date part is accepted as a due date
pub const DEFAULT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

// =============================================================================
// Report Reasons
// =============================================================================

/// Fixed reason strings shared by the normalizer, reconciler and report
pub mod reasons {
    pub const INVALID_EMAIL: &str = "missing/invalid email";
    pub const INVALID_SCORE: &str = "invalid score";
    pub const MISSING_MAX_POINTS: &str = "unscorable assignment — missing max points";
    pub const INVALID_MAX_POINTS: &str = "unscorable assignment — max points must be a positive integer";
    pub const DUPLICATE_COLUMN: &str = "duplicate assignment column";
    pub const INSUFFICIENT_DATA: &str = "insufficient data";
    pub const DUPLICATE_SCORE: &str = "duplicate score for student";
    pub const ASSIGNMENT_CONFLICT: &str = "assignment_conflict";
}

// =============================================================================
// Template
// =============================================================================

/// Identity headers written by the `template` command
pub const TEMPLATE_IDENTITY_HEADERS: &[&str] = &["First Name", "Last Name", "Email"];

/// Assignment placeholders written when the template has no named assignments
pub const TEMPLATE_PLACEHOLDER_ASSIGNMENTS: &[&str] = &["Assignment 1", "Assignment 2"];
