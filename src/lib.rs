//! # PDF Table DOCX
//!
//! Recovers the tables of scanned PDF pages and writes them out as editable
//! DOCX tables, with a JSON report of every recognized cell.
//!
//! ## Features
//!
//! - Page orientation correction by scoring the text read at each quarter turn
//! - Table markup parsing into a logical grid with row and column spans
//! - Cell geometry synthesis over the table's bounding box
//! - Ruling-line grid detection when structure recognition fails
//! - DOCX output with merged cells, plus a JSON report per PDF
//!
//! Text and table-structure recognition are pluggable: bring any engine that
//! implements [`core::TextRecognizer`] and [`core::StructureRecognizer`].
//!
//! ## Modules
//!
//! * [`core`] - Configuration, errors, constants and collaborator traits
//! * [`domain`] - Tables, cells, recognized text and rotations
//! * [`processors`] - Markup parsing, cell geometry and ruling-line detection
//! * [`pipeline`] - Orientation, per-cell recognition, page and document processing
//! * [`output`] - DOCX writer
//! * [`utils`] - Image and filesystem helpers, logging setup, PDF rasterizer
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_table_docx::prelude::*;
//! use std::path::Path;
//!
//! # fn run(
//! #     rasterizer: impl PageRasterizer,
//! #     text_engine: &dyn TextRecognizer,
//! #     table_engine: &dyn StructureRecognizer,
//! # ) -> PipelineResult<()> {
//! let config = PipelineConfig::default().with_dpi(200).with_max_pages(5);
//! let converter = DocumentConverter::new(rasterizer, text_engine, table_engine, config);
//! let summary = converter.convert(Path::new("scans/"), Path::new("out/"))?;
//! println!("{}", summary.stats);
//! # Ok(())
//! # }
//! ```
//!
//! The table core can also be used on its own:
//!
//! ```rust
//! use pdf_table_docx::processors::{parse_table_markup, synthesize_cell_boxes};
//! use pdf_table_docx::domain::PixelRect;
//!
//! let grid = parse_table_markup("<table><tr><td colspan=\"2\">Total</td></tr><tr><td>1</td><td>2</td></tr></table>");
//! assert_eq!((grid.rows, grid.cols), (2, 2));
//!
//! let cells = synthesize_cell_boxes(Some(PixelRect::new(0, 0, 100, 100)), (1000, 1000), grid.rows, grid.cols, &grid.cells);
//! assert_eq!(cells[0].bbox, Some(PixelRect::new(0, 0, 100, 50)));
//! ```

pub mod core;
pub mod domain;
pub mod output;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use pdf_table_docx::prelude::*;
/// ```
///
/// Included items cover running a conversion: configuration, the collaborator
/// traits, the converter and its results, and the error type.
pub mod prelude {
    pub use crate::core::{
        ConfigLoader, DocumentWriter, PageRasterizer, PipelineConfig, PipelineError,
        PipelineResult, RecognizedTable, StructureRecognizer, TextRecognizer,
    };
    pub use crate::domain::{RotationStrategy, TableData, TextLine, TextPiece};
    pub use crate::output::DocxWriter;
    pub use crate::pipeline::{ConversionSummary, DocumentConverter, Report, RunStats};
    pub use crate::utils::init_tracing;
    #[cfg(feature = "pdf")]
    pub use crate::utils::HayroRasterizer;
}
