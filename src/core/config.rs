//! Pipeline configuration and its loaders.
//!
//! Configuration can be built in code, or loaded from TOML or JSON files:
//!
//! ```rust
//! use pdf_table_docx::core::config::{ConfigFormat, ConfigLoader, PipelineConfig};
//!
//! let config = ConfigLoader::load_from_string(
//!     r#"
//!     dpi = 200
//!     fallback_enabled = false
//!     rotation_strategy = "none"
//!     "#,
//!     ConfigFormat::Toml,
//! )?;
//! assert_eq!(config.dpi, 200);
//! assert!(!config.fallback_enabled);
//! # Ok::<(), pdf_table_docx::core::PipelineError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::constants::*;
use super::errors::{PipelineError, PipelineResult};
use crate::domain::RotationStrategy;

/// Trait for configuration types that can check themselves.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> PipelineResult<()>;

    /// Returns the default configuration.
    fn get_defaults() -> Self
    where
        Self: Sized;
}

/// Parameters of the ruling-line fallback detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackGridConfig {
    /// Side of the adaptive-threshold neighbourhood (odd).
    pub block_size: u32,
    /// Constant subtracted from the local mean.
    pub threshold_offset: i32,
    /// Minimum run length for a stroke to count as a ruling line.
    pub line_length: u32,
    /// Minimum width and height of a grid-evidence box.
    pub min_box_size: u32,
    /// Proximity threshold for merging edge coordinates.
    pub cluster_threshold: i32,
}

impl Default for FallbackGridConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_THRESHOLD_BLOCK_SIZE,
            threshold_offset: DEFAULT_THRESHOLD_OFFSET,
            line_length: DEFAULT_LINE_LENGTH,
            min_box_size: DEFAULT_MIN_BOX_SIZE,
            cluster_threshold: DEFAULT_CLUSTER_THRESHOLD,
        }
    }
}

impl ConfigValidator for FallbackGridConfig {
    fn validate(&self) -> PipelineResult<()> {
        if self.block_size < 3 || self.block_size % 2 == 0 {
            return Err(PipelineError::config_error(format!(
                "fallback.block_size must be an odd number >= 3, got {}",
                self.block_size
            )));
        }
        if self.line_length == 0 {
            return Err(PipelineError::config_error(
                "fallback.line_length must be greater than 0",
            ));
        }
        if self.cluster_threshold < 0 {
            return Err(PipelineError::config_error(
                "fallback.cluster_threshold must not be negative",
            ));
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Options for a conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Rasterization resolution in pixels per inch.
    pub dpi: u32,
    /// Save rendered pages and rotation candidates as PNGs.
    pub debug: bool,
    /// Maximum number of pages per PDF; 0 processes every page.
    pub max_pages: usize,
    /// Run the ruling-line detector when structure recognition fails.
    pub fallback_enabled: bool,
    /// How the page orientation is chosen.
    pub rotation_strategy: RotationStrategy,
    /// Batches larger than this are processed in parallel.
    pub parallel_threshold: usize,
    /// Model directory to check before a run, if any.
    pub models_dir: Option<PathBuf>,
    /// Fallback detector parameters.
    pub fallback: FallbackGridConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            debug: false,
            max_pages: 0,
            fallback_enabled: true,
            rotation_strategy: RotationStrategy::OcrScore,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            models_dir: None,
            fallback: FallbackGridConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_enabled = enabled;
        self
    }

    pub fn with_rotation_strategy(mut self, strategy: RotationStrategy) -> Self {
        self.rotation_strategy = strategy;
        self
    }

    pub fn with_models_dir(mut self, models_dir: impl Into<PathBuf>) -> Self {
        self.models_dir = Some(models_dir.into());
        self
    }

    /// Returns true when page `page_index` (1-based) is within `max_pages`.
    pub fn includes_page(&self, page_index: usize) -> bool {
        self.max_pages == 0 || page_index <= self.max_pages
    }
}

impl ConfigValidator for PipelineConfig {
    fn validate(&self) -> PipelineResult<()> {
        if self.dpi == 0 {
            return Err(PipelineError::config_error("dpi must be greater than 0"));
        }
        self.fallback.validate()?;
        if let Some(models_dir) = &self.models_dir {
            validate_models_dir(models_dir)?;
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Checks that `models_dir` holds a non-empty subdirectory per engine model.
pub fn validate_models_dir(models_dir: &Path) -> PipelineResult<()> {
    if !models_dir.is_dir() {
        return Err(PipelineError::config_error(format!(
            "Models directory not found: {}",
            models_dir.display()
        )));
    }
    for sub in REQUIRED_MODEL_DIRS {
        let sub_dir = models_dir.join(sub);
        if !sub_dir.is_dir() {
            return Err(PipelineError::config_error(format!(
                "Missing model directory: {}",
                sub_dir.display()
            )));
        }
        let has_files = std::fs::read_dir(&sub_dir)?
            .filter_map(Result::ok)
            .any(|entry| entry.path().is_file());
        if !has_files {
            return Err(PipelineError::config_error(format!(
                "Model directory is empty: {}",
                sub_dir.display()
            )));
        }
    }
    Ok(())
}

/// Configuration file format
#[derive(Debug, Clone, Copy)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Loads and saves [`PipelineConfig`] files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file, auto-detecting the format from the extension
    pub fn load_from_file(path: &Path) -> PipelineResult<PipelineConfig> {
        let format = ConfigFormat::from_extension(path).ok_or_else(|| {
            PipelineError::config_error(format!(
                "Unsupported config file extension: {:?}",
                path.extension()
            ))
        })?;

        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::config_error(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::load_from_string(&content, format)
    }

    /// Load configuration from a string with specified format
    pub fn load_from_string(content: &str, format: ConfigFormat) -> PipelineResult<PipelineConfig> {
        match format {
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| {
                PipelineError::config_error(format!("Failed to parse TOML config: {e}"))
            }),
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| {
                PipelineError::config_error(format!("Failed to parse JSON config: {e}"))
            }),
        }
    }

    /// Save configuration to a file, auto-detecting the format from the extension
    pub fn save_to_file(config: &PipelineConfig, path: &Path) -> PipelineResult<()> {
        let format = ConfigFormat::from_extension(path).ok_or_else(|| {
            PipelineError::config_error(format!(
                "Unsupported config file extension: {:?}",
                path.extension()
            ))
        })?;

        let content = Self::save_to_string(config, format)?;

        std::fs::write(path, content).map_err(|e| {
            PipelineError::config_error(format!(
                "Failed to write config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Save configuration to string with specified format
    pub fn save_to_string(config: &PipelineConfig, format: ConfigFormat) -> PipelineResult<String> {
        match format {
            ConfigFormat::Toml => toml::to_string_pretty(config).map_err(|e| {
                PipelineError::config_error(format!("Failed to serialize config to TOML: {e}"))
            }),
            ConfigFormat::Json => serde_json::to_string_pretty(config).map_err(|e| {
                PipelineError::config_error(format!("Failed to serialize config to JSON: {e}"))
            }),
        }
    }
}
