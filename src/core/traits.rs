//! Interfaces to the external collaborators of the table core.
//!
//! Recognition engines are expensive to construct, so they are built once per
//! run by the caller and passed by reference into every page, table and cell
//! operation. Both engine traits require `Send + Sync` so cell and rotation
//! batches can be fanned out on rayon.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::errors::PipelineResult;
use crate::domain::{TableData, TextLine};

/// Text detection + recognition engine.
pub trait TextRecognizer: Send + Sync {
    /// Recognizes all text in `image`.
    ///
    /// An empty vector is a valid answer and means nothing was recognized.
    fn recognize(&self, image: &RgbImage) -> PipelineResult<Vec<TextLine>>;
}

/// One table reported by the structure recognizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizedTable {
    /// Table region in page pixels as `[x1, y1, x2, y2]`, when reported.
    pub bbox: Option<[f32; 4]>,
    /// Table markup (`<table><tr><td ...>`), possibly empty.
    pub markup: String,
}

impl RecognizedTable {
    pub fn new(bbox: Option<[f32; 4]>, markup: impl Into<String>) -> Self {
        Self {
            bbox,
            markup: markup.into(),
        }
    }
}

/// Table structure recognition engine.
pub trait StructureRecognizer: Send + Sync {
    /// Finds tables in a page image and describes each one as markup.
    fn analyze(&self, image: &RgbImage) -> PipelineResult<Vec<RecognizedTable>>;
}

/// Renders every page of a PDF to an RGB raster.
pub trait PageRasterizer {
    /// Renders all pages of `path` at `dpi` pixels per inch.
    fn render(&self, path: &Path, dpi: u32) -> PipelineResult<Vec<RgbImage>>;
}

/// Sink for finished tables (e.g. a DOCX document).
pub trait DocumentWriter {
    /// Appends a table. Tables with zero rows or columns are ignored.
    fn add_table(&mut self, table: &TableData) -> PipelineResult<()>;

    /// Starts a new page.
    fn add_page_break(&mut self);

    /// Writes the document to `path`.
    fn save(&self, path: &Path) -> PipelineResult<()>;
}
