//! Warning types for non-fatal errors during JSONL reading.
//!
//! When reading catalog files it is preferable to keep every record that
//! parses rather than abort on the first bad line. The [`Warning`] type
//! represents a line that was skipped, with enough context for the caller to
//! report it to the user.

/// A non-fatal problem encountered while reading a JSONL file.
///
/// Each variant carries the 1-based line number where the problem occurred.
/// The affected line is skipped and reading continues with the next line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A line contained invalid JSON and could not be parsed.
    MalformedJson {
        /// The 1-based line number where the error occurred.
        line_number: usize,
        /// A description of the JSON parsing error.
        error: String,
    },

    /// A line was skipped for a reason other than malformed JSON,
    /// e.g. it contained only whitespace.
    SkippedLine {
        /// The 1-based line number that was skipped.
        line_number: usize,
        /// The reason the line was skipped.
        reason: String,
    },
}

impl Warning {
    /// Returns the line number associated with this warning.
    #[must_use]
    pub fn line_number(&self) -> usize {
        match self {
            Self::MalformedJson { line_number, .. } | Self::SkippedLine { line_number, .. } => {
                *line_number
            }
        }
    }

    /// Returns a static string identifying the warning kind, useful for
    /// programmatic filtering without pattern matching on the variants.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedJson { .. } => "malformed_json",
            Self::SkippedLine { .. } => "skipped_line",
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "line {line_number}: malformed JSON: {error}")
            }
            Self::SkippedLine {
                line_number,
                reason,
            } => {
                write!(f, "line {line_number}: skipped: {reason}")
            }
        }
    }
}

impl std::error::Error for Warning {}
