use thiserror::Error;

use crate::types::DatasetType;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Result type returned by the format-specific decoders.
pub type DecodeResult<T> = Result<T, ParseError>;

/// A decoder could not turn the input into a payload (malformed or empty input).
///
/// `context` locates the problem when the decoder knows where it is, e.g. `line 3`,
/// `line 1 column 9`, `sheet 'Q1'` or `page 2`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{format} parse error{}: {message}", context_suffix(.context))]
pub struct ParseError {
    /// Format whose decoder failed.
    pub format: DatasetType,
    /// Where in the input the failure happened, if known.
    pub context: Option<String>,
    /// Human-readable description of the failure.
    pub message: String,
}

impl ParseError {
    /// Create a parse error without location context.
    pub fn new(format: DatasetType, message: impl Into<String>) -> Self {
        Self {
            format,
            context: None,
            message: message.into(),
        }
    }

    /// Attach a location to the error.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

fn context_suffix(context: &Option<String>) -> String {
    match context {
        Some(c) => format!(" ({c})"),
        None => String::new(),
    }
}

/// Underlying cause carried by [`IngestionError::IngestionFailed`].
#[derive(Debug, Error)]
pub enum FailureCause {
    /// The decoder rejected the content.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The content could not be read (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type returned by the ingestion entry points.
///
/// Every failure surfaced by [`crate::ingestion::ingest`] is one of these variants; messages are
/// meant to be shown to the user verbatim.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The file name has no extension, or one that no decoder handles.
    #[error("unsupported file '{name}': {}", unsupported_reason(.extension))]
    UnsupportedFormat {
        name: String,
        extension: Option<String>,
    },

    /// The file is larger than the configured ceiling. Raised before any decoding.
    #[error("file '{name}' is {size} bytes, which exceeds the limit of {limit} bytes")]
    SizeLimitExceeded { name: String, size: u64, limit: u64 },

    /// Reading or decoding failed; `cause` keeps the original error.
    #[error("failed to process file '{name}': {cause}")]
    IngestionFailed {
        name: String,
        #[source]
        cause: FailureCause,
    },
}

impl IngestionError {
    pub(crate) fn failed(name: &str, cause: impl Into<FailureCause>) -> Self {
        Self::IngestionFailed {
            name: name.to_string(),
            cause: cause.into(),
        }
    }

    /// Name of the file the error refers to.
    pub fn file_name(&self) -> &str {
        match self {
            Self::UnsupportedFormat { name, .. }
            | Self::SizeLimitExceeded { name, .. }
            | Self::IngestionFailed { name, .. } => name,
        }
    }

    /// The decoder error wrapped by this failure, if any.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::IngestionFailed {
                cause: FailureCause::Parse(e),
                ..
            } => Some(e),
            _ => None,
        }
    }
}

fn unsupported_reason(extension: &Option<String>) -> String {
    match extension {
        Some(ext) => format!("unsupported file type '.{ext}' (expected csv, json, xlsx, xls or pdf)"),
        None => "file type could not be determined".to_string(),
    }
}
