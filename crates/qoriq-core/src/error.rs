//! Error types for the data readiness core.
//!
//! Dirty-but-well-formed input never produces an error: per-cell parse
//! failures fall back to the original value. Errors are reserved for
//! structurally invalid input, invalid configuration and I/O at the
//! collaborator boundary.
//!
//! Errors are serializable so collaborators (CLI, dashboards) can forward
//! them as `{code, message}` objects.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QoriqError {
    /// Thresholds, limits or scoring weights out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A column selected for a typed transform has an incompatible dtype.
    #[error("Cannot convert column '{column}' to {target_type}: {reason}")]
    TypeConversionFailed {
        column: String,
        target_type: String,
        reason: String,
    },

    /// A column could not be summarized.
    #[error("Cannot profile column '{column}': {reason}")]
    ProfilingFailed { column: String, reason: String },

    /// Cleaned CSV or manifest could not be written.
    #[error("Cannot write report artifacts: {0}")]
    ReportGenerationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any of the above, annotated with the step that failed.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<QoriqError>,
    },
}

impl QoriqError {
    pub fn with_context(self, context: impl Into<String>) -> Self {
        QoriqError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable code for collaborators; context wrappers report the code of
    /// the underlying error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::TypeConversionFailed { .. } => "TYPE_CONVERSION_FAILED",
            Self::ProfilingFailed { .. } => "PROFILING_FAILED",
            Self::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the caller can fix the problem by changing its settings or
    /// the selected columns.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidConfig(_) | Self::TypeConversionFailed { .. } => true,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

impl From<crate::config::ConfigValidationError> for QoriqError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        QoriqError::InvalidConfig(err.to_string())
    }
}

impl Serialize for QoriqError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("QoriqError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

pub type Result<T> = std::result::Result<T, QoriqError>;

/// Attach a step description to a failing crate or Polars result.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| QoriqError::Polars(e).with_context(context))
    }
}
