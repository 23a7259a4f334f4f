//! The core module of the table pipeline.
//!
//! This module contains the fundamental pieces shared by every stage:
//! - Configuration and its loaders
//! - Constants used throughout the pipeline
//! - Error handling
//! - Traits describing the external collaborators (recognition engines,
//!   rasterizer, document writer)

pub mod config;
pub mod constants;
pub mod errors;
pub mod traits;

pub use config::{
    ConfigFormat, ConfigLoader, ConfigValidator, FallbackGridConfig, PipelineConfig,
    validate_models_dir,
};
pub use constants::*;
pub use errors::{PipelineError, PipelineResult, SoftFailure};
pub use traits::{
    DocumentWriter, PageRasterizer, RecognizedTable, StructureRecognizer, TextRecognizer,
};
