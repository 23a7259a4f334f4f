//! Cell geometry synthesis.
//!
//! Turns a logical grid into pixel boxes. Cells that already carry a box (the
//! fallback detector knows the real ruling-line positions) keep it verbatim;
//! every other cell gets a box on a uniform grid laid over the table's
//! bounding box, with spans multiplying the unit cell size.

use crate::domain::{LogicalCell, PixelRect, TableStructure};

fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Computes a pixel box for every logical cell.
///
/// # Arguments
///
/// * `table_bbox` - Table region; `None` means the whole page.
/// * `page_size` - Page `(width, height)`, used when `table_bbox` is `None`.
/// * `rows`, `cols` - Grid size; values below 1 are raised to 1.
/// * `cells` - Logical cells. When empty, an unspanned `rows x cols` grid is assumed.
///
/// # Returns
///
/// The cells, in input order, each with `bbox` set. Boxes may have zero width
/// or height when the table geometry is degenerate; that is not an error.
pub fn synthesize_cell_boxes(
    table_bbox: Option<PixelRect>,
    page_size: (u32, u32),
    rows: usize,
    cols: usize,
    cells: &[LogicalCell],
) -> Vec<LogicalCell> {
    let bbox = table_bbox.unwrap_or_else(|| PixelRect::full(page_size.0, page_size.1));
    let rows = rows.max(1);
    let cols = cols.max(1);

    let uniform: Vec<LogicalCell>;
    let cells = if cells.is_empty() {
        uniform = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| LogicalCell::single(r, c)))
            .collect();
        uniform.as_slice()
    } else {
        cells
    };

    let (x1, y1) = (bbox.x1 as i64, bbox.y1 as i64);
    let cell_width = ((bbox.x2 as i64 - x1) / cols as i64).max(1);
    let cell_height = ((bbox.y2 as i64 - y1) / rows as i64).max(1);

    tracing::debug!(
        target: "structure",
        rows,
        cols,
        cell_width,
        cell_height,
        cells = cells.len(),
        "Synthesizing cell geometry"
    );

    cells
        .iter()
        .map(|cell| {
            if cell.bbox.is_some() {
                return *cell;
            }
            let (row, col) = (cell.row as i64, cell.col as i64);
            let (rowspan, colspan) = (cell.rowspan as i64, cell.colspan as i64);
            let rect = PixelRect::new(
                saturate(x1 + col * cell_width),
                saturate(y1 + row * cell_height),
                saturate(x1 + (col + colspan) * cell_width),
                saturate(y1 + (row + rowspan) * cell_height),
            );
            cell.with_bbox(rect)
        })
        .collect()
}

/// Convenience wrapper over [`synthesize_cell_boxes`] for a whole structure.
pub fn synthesize_structure(structure: &TableStructure, page_size: (u32, u32)) -> Vec<LogicalCell> {
    synthesize_cell_boxes(
        structure.bbox,
        page_size,
        structure.rows,
        structure.cols,
        &structure.cells,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxes(cells: &[LogicalCell]) -> Vec<[i32; 4]> {
        cells.iter().map(|c| c.bbox.unwrap().into()).collect()
    }

    #[test]
    fn test_uniform_two_by_two() {
        let cells = synthesize_cell_boxes(
            Some(PixelRect::new(0, 0, 100, 100)),
            (1000, 1000),
            2,
            2,
            &[],
        );
        assert_eq!(
            boxes(&cells),
            vec![
                [0, 0, 50, 50],
                [50, 0, 100, 50],
                [0, 50, 50, 100],
                [50, 50, 100, 100]
            ]
        );
        assert!(cells.iter().all(|c| c.rowspan == 1 && c.colspan == 1));
    }

    #[test]
    fn test_spans_multiply_unit_size() {
        let logical = vec![
            LogicalCell::new(0, 0, 2, 1),
            LogicalCell::new(0, 1, 1, 2),
            LogicalCell::new(1, 1, 1, 1),
            LogicalCell::new(1, 2, 1, 1),
        ];
        let cells = synthesize_cell_boxes(
            Some(PixelRect::new(10, 20, 310, 220)),
            (1000, 1000),
            2,
            3,
            &logical,
        );
        assert_eq!(
            boxes(&cells),
            vec![
                [10, 20, 110, 220],
                [110, 20, 310, 120],
                [110, 120, 210, 220],
                [210, 120, 310, 220]
            ]
        );
    }

    #[test]
    fn test_explicit_bbox_is_kept() {
        let explicit = PixelRect::new(3, 4, 17, 29);
        let logical = vec![LogicalCell::single(0, 0).with_bbox(explicit), LogicalCell::single(0, 1)];
        let cells = synthesize_cell_boxes(Some(PixelRect::new(0, 0, 40, 10)), (100, 100), 1, 2, &logical);
        assert_eq!(cells[0].bbox, Some(explicit));
        assert_eq!(cells[1].bbox, Some(PixelRect::new(20, 0, 40, 10)));
    }

    #[test]
    fn test_missing_bbox_uses_page_extent() {
        let cells = synthesize_cell_boxes(None, (90, 60), 3, 3, &[]);
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[8].bbox, Some(PixelRect::new(60, 40, 90, 60)));
    }

    #[test]
    fn test_zero_rows_and_cols_are_raised_to_one() {
        let cells = synthesize_cell_boxes(Some(PixelRect::new(0, 0, 30, 30)), (100, 100), 0, 0, &[]);
        assert_eq!(boxes(&cells), vec![[0, 0, 30, 30]]);
    }

    #[test]
    fn test_degenerate_table_gets_minimum_unit() {
        // 5 px wide over 10 columns: the unit width floors to 0 and is raised to 1
        let cells = synthesize_cell_boxes(Some(PixelRect::new(0, 0, 5, 0)), (100, 100), 1, 10, &[]);
        assert_eq!(cells[9].bbox, Some(PixelRect::new(9, 0, 10, 1)));
    }

    #[test]
    fn test_synthesis_is_idempotent() {
        let logical = vec![LogicalCell::new(0, 0, 1, 2), LogicalCell::single(1, 0), LogicalCell::single(1, 1)];
        let bbox = Some(PixelRect::new(7, 9, 211, 103));
        let first = synthesize_cell_boxes(bbox, (300, 300), 2, 2, &logical);
        let second = synthesize_cell_boxes(bbox, (300, 300), 2, 2, &logical);
        assert_eq!(first, second);
        // feeding the output back in keeps every box unchanged
        let third = synthesize_cell_boxes(bbox, (300, 300), 2, 2, &first);
        assert_eq!(first, third);
    }
}
