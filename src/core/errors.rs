//! Error types for the table recovery pipeline.
//!
//! Only conditions that must abort a page or a run are modelled as
//! [`PipelineError`]. Recoverable situations inside the table core (missing
//! structure, missing fallback grid, degenerate geometry, malformed spans) are
//! described by [`SoftFailure`] and are logged and counted instead of returned.
//!
//! # Usage
//!
//! ```rust
//! use pdf_table_docx::core::errors::PipelineError;
//!
//! let error = PipelineError::invalid_input("Input file is not a PDF: scan.png");
//! assert!(error.to_string().contains("not a PDF"));
//!
//! let config_error = PipelineError::config_error("dpi must be greater than zero");
//! assert!(matches!(config_error, PipelineError::ConfigError { .. }));
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Convenient result alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Enum representing the errors that can abort a page or a run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Error occurred while writing an image (debug artifacts).
    #[error("failed to save image to {path}")]
    ImageSave {
        /// Destination path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: image::ImageError,
    },

    /// A recognition collaborator (text or structure engine) failed.
    #[error("{engine} engine failed")]
    Recognition {
        /// Which engine failed.
        engine: &'static str,
        /// The underlying error reported by the engine.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The PDF rasterizer could not render a document.
    #[error("failed to rasterize {path}: {message}")]
    Rasterize {
        /// The PDF that failed.
        path: PathBuf,
        /// A message describing the failure.
        message: String,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// The document writer failed to render or save its output.
    #[error("document writer: {message}")]
    Document {
        /// A message describing the writer failure.
        message: String,
    },

    /// JSON (de)serialization error.
    #[error("serialization")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Creates an `InvalidInput` error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a `ConfigError`.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Wraps an error reported by a recognition engine.
    ///
    /// # Arguments
    ///
    /// * `engine` - Short engine name used in the message (e.g. `"text"`, `"structure"`).
    /// * `error` - The underlying error.
    pub fn recognition(
        engine: &'static str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Recognition {
            engine,
            source: Box::new(error),
        }
    }

    /// Creates a `Document` error from any displayable writer failure.
    pub fn document(message: impl std::fmt::Display) -> Self {
        Self::Document {
            message: message.to_string(),
        }
    }

    /// Creates a `Rasterize` error for the given PDF.
    pub fn rasterize(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Rasterize {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Recoverable conditions inside the table core.
///
/// None of these abort processing; each is scoped to a single table, cell, or
/// span attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoftFailure {
    /// The structure recognizer returned no usable markup or a zero-sized grid.
    StructureAbsent,
    /// No ruling-line grid could be found either; the table is skipped.
    FallbackAbsent,
    /// A cell region has zero area; the cell gets empty text.
    DegenerateGeometry,
    /// A span attribute could not be parsed or was zero; it is treated as 1.
    MalformedSpan,
}

impl std::fmt::Display for SoftFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoftFailure::StructureAbsent => write!(f, "structure absent"),
            SoftFailure::FallbackAbsent => write!(f, "fallback grid absent"),
            SoftFailure::DegenerateGeometry => write!(f, "degenerate geometry"),
            SoftFailure::MalformedSpan => write!(f, "malformed span"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognition_error_keeps_source() {
        let io = std::io::Error::other("model crashed");
        let error = PipelineError::recognition("text", io);
        assert_eq!(error.to_string(), "text engine failed");
        let source = std::error::Error::source(&error).expect("source");
        assert_eq!(source.to_string(), "model crashed");
    }

    #[test]
    fn test_soft_failure_display() {
        assert_eq!(SoftFailure::MalformedSpan.to_string(), "malformed span");
        assert_eq!(
            SoftFailure::FallbackAbsent.to_string(),
            "fallback grid absent"
        );
    }
}
