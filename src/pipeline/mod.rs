//! The conversion pipeline.
//!
//! A page goes through orientation correction, structure recognition (with the
//! ruling-line grid as fallback), cell geometry synthesis and per-cell text
//! recognition. The converter runs pages of whole PDFs and writes a DOCX file
//! and a JSON report for each.

pub mod cell_ocr;
pub mod converter;
pub mod orientation;
pub mod page;
pub mod report;
pub mod stats;

pub use cell_ocr::{CellBatch, merge_lines, ocr_cells};
pub use converter::{ConversionSummary, ConvertedPdf, DocumentConverter};
pub use orientation::{CorrectedPage, OrientationCorrector, correct_orientation};
pub use page::{PageOutcome, PageProcessor};
pub use report::{PageReport, Report};
pub use stats::{PageStats, RunStats};
