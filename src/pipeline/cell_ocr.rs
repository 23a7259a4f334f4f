//! Per-cell text recognition.

use image::RgbImage;
use rayon::prelude::*;

use crate::core::{PipelineResult, SoftFailure, TextRecognizer};
use crate::domain::{CellResult, LogicalCell, PixelRect, TextLine, text::pieces};
use crate::utils::crop_region;

/// Recognized cells of one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellBatch {
    /// One result per input cell, in input order.
    pub cells: Vec<CellResult>,
    /// Cells whose region was empty after clamping to the page.
    pub degenerate: usize,
}

/// Joins every recognized piece with single spaces and averages the confidences.
///
/// Returns `("", 0.0)` when nothing was recognized.
pub fn merge_lines(lines: &[TextLine]) -> (String, f32) {
    let mut texts = Vec::new();
    let mut confidence_sum = 0.0f32;
    for piece in pieces(lines) {
        texts.push(piece.text.as_str());
        confidence_sum += piece.confidence;
    }
    if texts.is_empty() {
        return (String::new(), 0.0);
    }
    let confidence = confidence_sum / texts.len() as f32;
    (texts.join(" ").trim().to_string(), confidence)
}

fn recognize_cell(
    image: &RgbImage,
    cell: &LogicalCell,
    recognizer: &dyn TextRecognizer,
) -> PipelineResult<(CellResult, bool)> {
    let region = cell.bbox.unwrap_or(PixelRect::new(0, 0, 0, 0));
    let Some(crop) = crop_region(image, &region) else {
        tracing::debug!(
            target: "cell_ocr",
            row = cell.row,
            col = cell.col,
            bbox = ?region,
            "{}",
            SoftFailure::DegenerateGeometry
        );
        return Ok((CellResult::from_cell(cell, String::new(), 0.0), true));
    };
    let lines = recognizer.recognize(&crop)?;
    let (text, confidence) = merge_lines(&lines);
    Ok((CellResult::from_cell(cell, text, confidence), false))
}

/// Recognizes the text of every cell.
///
/// Each cell must carry its pixel box (see
/// [`synthesize_cell_boxes`](crate::processors::synthesize_cell_boxes)). A
/// cell whose box is empty once clamped to the page gets empty text and
/// confidence 0 without a recognizer call. Batches larger than
/// `parallel_threshold` are recognized on rayon; output order always matches
/// input order.
///
/// # Errors
///
/// Propagates the first recognizer error.
pub fn ocr_cells(
    image: &RgbImage,
    cells: &[LogicalCell],
    recognizer: &dyn TextRecognizer,
    parallel_threshold: usize,
) -> PipelineResult<CellBatch> {
    let results: PipelineResult<Vec<(CellResult, bool)>> = if cells.len() > parallel_threshold {
        tracing::debug!(target: "cell_ocr", cells = cells.len(), "Recognizing cells in parallel");
        cells
            .par_iter()
            .map(|cell| recognize_cell(image, cell, recognizer))
            .collect()
    } else {
        cells
            .iter()
            .map(|cell| recognize_cell(image, cell, recognizer))
            .collect()
    };

    let mut batch = CellBatch::default();
    for (cell, degenerate) in results? {
        batch.degenerate += usize::from(degenerate);
        batch.cells.push(cell);
    }
    Ok(batch)
}
