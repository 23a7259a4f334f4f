//! Slot matrix for rendering tables with merged cells.
//!
//! Writers walk a table row by row and need to know, for every grid position,
//! whether a cell starts there, whether it is covered by a cell anchored
//! elsewhere, or whether nothing claims it.

use super::table::CellResult;

/// What occupies one grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Top-left position of the cell at this index.
    Anchor(usize),
    /// Covered by the spanning cell at this index.
    Covered(usize),
    /// Not claimed by any cell.
    Empty,
}

/// A `rows x cols` occupancy matrix over a table's cells.
#[derive(Debug, Clone)]
pub struct TableLayout {
    rows: usize,
    cols: usize,
    slots: Vec<Slot>,
    /// Cells dropped because they overlapped an earlier cell.
    overlapping: Vec<usize>,
}

impl TableLayout {
    /// Builds the layout for `cells`.
    ///
    /// The matrix is at least `rows x cols`. It grows to the right to fit every
    /// cell's colspan, so a column count that undercounts the real width never
    /// loses cells, and down only far enough to hold every anchor row; a
    /// rowspan reaching past the last row is cut there. A cell that would
    /// overlap an already placed cell is not placed; its index is reported by
    /// [`TableLayout::overlapping`].
    pub fn build(rows: usize, cols: usize, cells: &[CellResult]) -> Self {
        let rows = cells.iter().map(|c| c.row + 1).fold(rows, usize::max);
        let cols = cells
            .iter()
            .map(|c| c.col + c.colspan.max(1))
            .fold(cols, usize::max);

        let mut layout = Self {
            rows,
            cols,
            slots: vec![Slot::Empty; rows * cols],
            overlapping: Vec::new(),
        };

        for (idx, cell) in cells.iter().enumerate() {
            let mut logical = cell.logical();
            logical.rowspan = logical.rowspan.min(rows - cell.row);
            if logical.positions().any(|(r, c)| layout.slot(r, c) != Slot::Empty) {
                tracing::warn!(
                    target: "structure",
                    row = cell.row,
                    col = cell.col,
                    "Cell overlaps an earlier cell; leaving it out of the layout"
                );
                layout.overlapping.push(idx);
                continue;
            }
            for (r, c) in logical.positions() {
                let slot = if (r, c) == (cell.row, cell.col) {
                    Slot::Anchor(idx)
                } else {
                    Slot::Covered(idx)
                };
                layout.slots[r * cols + c] = slot;
            }
        }

        layout
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Slot at `(row, col)`; positions outside the matrix are `Empty`.
    pub fn slot(&self, row: usize, col: usize) -> Slot {
        if row >= self.rows || col >= self.cols {
            return Slot::Empty;
        }
        self.slots[row * self.cols + col]
    }

    pub fn overlapping(&self) -> &[usize] {
        &self.overlapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::PixelRect;

    fn cell(row: usize, col: usize, rowspan: usize, colspan: usize) -> CellResult {
        CellResult {
            row,
            col,
            rowspan,
            colspan,
            bbox: PixelRect::new(0, 0, 1, 1),
            text: String::new(),
            confidence: 0.0,
        }
    }

    #[test]
    fn test_layout_marks_anchor_and_covered() {
        let cells = vec![cell(0, 0, 2, 1), cell(0, 1, 1, 1), cell(1, 1, 1, 1)];
        let layout = TableLayout::build(2, 2, &cells);
        assert_eq!(layout.slot(0, 0), Slot::Anchor(0));
        assert_eq!(layout.slot(1, 0), Slot::Covered(0));
        assert_eq!(layout.slot(0, 1), Slot::Anchor(1));
        assert_eq!(layout.slot(1, 1), Slot::Anchor(2));
        assert!(layout.overlapping().is_empty());
    }

    #[test]
    fn test_layout_grows_to_fit_cells() {
        // declared width undercounts the cell pushed right by a rowspan
        let cells = vec![cell(0, 0, 2, 1), cell(0, 1, 1, 1), cell(1, 1, 1, 1), cell(1, 2, 1, 1)];
        let layout = TableLayout::build(2, 2, &cells);
        assert_eq!(layout.cols(), 3);
        assert_eq!(layout.slot(1, 2), Slot::Anchor(3));
        assert_eq!(layout.slot(0, 2), Slot::Empty);
    }

    #[test]
    fn test_layout_cuts_rowspan_at_last_row() {
        let cells = vec![cell(0, 0, 100, 1), cell(0, 1, 1, 1), cell(1, 1, 1, 1)];
        let layout = TableLayout::build(2, 2, &cells);
        assert_eq!(layout.rows(), 2);
        assert_eq!(layout.slot(1, 0), Slot::Covered(0));
        assert_eq!(layout.slot(1, 1), Slot::Anchor(2));
    }

    #[test]
    fn test_layout_rejects_overlap() {
        let cells = vec![cell(0, 0, 1, 2), cell(0, 1, 1, 1)];
        let layout = TableLayout::build(1, 2, &cells);
        assert_eq!(layout.slot(0, 1), Slot::Covered(0));
        assert_eq!(layout.overlapping(), &[1]);
    }
}
