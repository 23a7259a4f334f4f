//! Table data model shared by the structure parser, the fallback detector,
//! the geometry synthesizer and the writers.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in integer pixel coordinates.
///
/// Serialized as `[x1, y1, x2, y2]`. Width or height may be zero (or even
/// negative) when the source geometry is degenerate; callers treat such a
/// rectangle as an empty region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct PixelRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl PixelRect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Creates a rectangle from floating-point coordinates, truncating toward zero.
    pub fn from_f32(coords: [f32; 4]) -> Self {
        Self::new(
            coords[0] as i32,
            coords[1] as i32,
            coords[2] as i32,
            coords[3] as i32,
        )
    }

    /// Rectangle covering a whole image of the given size.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// Returns true when the rectangle encloses no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Intersects the rectangle with an image of the given size.
    ///
    /// Returns `None` when nothing of the rectangle lies inside the image.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<PixelRect> {
        let (w, h) = (width as i32, height as i32);
        let clamped = PixelRect::new(
            self.x1.clamp(0, w),
            self.y1.clamp(0, h),
            self.x2.clamp(0, w),
            self.y2.clamp(0, h),
        );
        (!clamped.is_empty()).then_some(clamped)
    }
}

impl From<[i32; 4]> for PixelRect {
    fn from(c: [i32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<PixelRect> for [i32; 4] {
    fn from(r: PixelRect) -> Self {
        [r.x1, r.y1, r.x2, r.y2]
    }
}

/// A table cell identified by its top-left grid anchor and its span extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalCell {
    /// Row index of the anchor (0-based).
    pub row: usize,
    /// Column index of the anchor (0-based).
    pub col: usize,
    /// Number of rows covered, at least 1.
    pub rowspan: usize,
    /// Number of columns covered, at least 1.
    pub colspan: usize,
    /// Explicit pixel geometry, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<PixelRect>,
}

impl LogicalCell {
    /// Creates a cell without geometry. Spans below 1 are raised to 1.
    pub fn new(row: usize, col: usize, rowspan: usize, colspan: usize) -> Self {
        Self {
            row,
            col,
            rowspan: rowspan.max(1),
            colspan: colspan.max(1),
            bbox: None,
        }
    }

    /// Creates an unspanned cell.
    pub fn single(row: usize, col: usize) -> Self {
        Self::new(row, col, 1, 1)
    }

    pub fn with_bbox(mut self, bbox: PixelRect) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Iterates over every `(row, col)` grid position the cell covers.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.row..self.row + self.rowspan)
            .flat_map(move |r| (self.col..self.col + self.colspan).map(move |c| (r, c)))
    }

    /// One past the last row covered.
    pub fn row_end(&self) -> usize {
        self.row + self.rowspan
    }

    /// One past the last column covered.
    pub fn col_end(&self) -> usize {
        self.col + self.colspan
    }
}

/// Which producer a [`TableStructure`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSource {
    /// Parsed from the structure recognizer's markup.
    Recognized,
    /// Derived from ruling lines by the fallback grid detector.
    Fallback,
}

/// The logical grid of one detected table.
///
/// `rows == 0 || cols == 0` means no structure was recovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStructure {
    pub source: TableSource,
    pub bbox: Option<PixelRect>,
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<LogicalCell>,
}

impl TableStructure {
    /// A structure produced by the recognizer path.
    pub fn recognized(
        bbox: Option<PixelRect>,
        rows: usize,
        cols: usize,
        cells: Vec<LogicalCell>,
    ) -> Self {
        Self {
            source: TableSource::Recognized,
            bbox,
            rows,
            cols,
            cells,
        }
    }

    /// A structure produced by the fallback grid detector.
    pub fn fallback(bbox: PixelRect, rows: usize, cols: usize, cells: Vec<LogicalCell>) -> Self {
        Self {
            source: TableSource::Fallback,
            bbox: Some(bbox),
            rows,
            cols,
            cells,
        }
    }

    /// Returns false when no usable grid was recovered.
    pub fn has_structure(&self) -> bool {
        self.rows > 0 && self.cols > 0
    }

    pub fn is_fallback(&self) -> bool {
        self.source == TableSource::Fallback
    }
}

/// A logical cell with its pixel box and recognized text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellResult {
    pub row: usize,
    pub col: usize,
    pub rowspan: usize,
    pub colspan: usize,
    pub bbox: PixelRect,
    pub text: String,
    /// Mean recognition confidence in `[0, 1]`, 0 when nothing was recognized.
    pub confidence: f32,
}

impl CellResult {
    /// Builds a result from a placed cell. The cell must carry a bbox; a missing
    /// one is recorded as an empty rectangle at the origin.
    pub fn from_cell(cell: &LogicalCell, text: String, confidence: f32) -> Self {
        Self {
            row: cell.row,
            col: cell.col,
            rowspan: cell.rowspan,
            colspan: cell.colspan,
            bbox: cell.bbox.unwrap_or(PixelRect::new(0, 0, 0, 0)),
            text,
            confidence,
        }
    }

    /// The logical cell this result was produced for.
    pub fn logical(&self) -> LogicalCell {
        LogicalCell::new(self.row, self.col, self.rowspan, self.colspan).with_bbox(self.bbox)
    }
}

/// A finished table, as consumed by the document writer and the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub bbox: Option<PixelRect>,
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<CellResult>,
    pub fallback_used: bool,
}
