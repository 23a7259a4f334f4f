//! Table markup grid parsing.
//!
//! Structure recognizers describe a table as HTML-like markup
//! (`<table><tr><td rowspan="2">...</td>...</tr>...</table>`). This module turns
//! that markup into a flat list of logical cells anchored on an occupancy grid,
//! without building a document tree: a streaming tag scan collects the rows and
//! their declared spans, then a row/column cursor places every cell.
//!
//! # Example
//!
//! ```
//! use pdf_table_docx::processors::parse_table_markup;
//!
//! let grid = parse_table_markup(
//!     r#"<table><tr><td rowspan="2">A</td><td>B</td></tr><tr><td>C</td></tr></table>"#,
//! );
//! assert_eq!((grid.rows, grid.cols), (2, 2));
//! // "C" skips column 0, which the rowspan above still occupies
//! assert_eq!((grid.cells[2].row, grid.cells[2].col), (1, 1));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::domain::{LogicalCell, PixelRect, TableStructure};

/// Spans above this are treated as malformed and clamped.
pub const MAX_SPAN: usize = 100;

// A `>` inside a quoted attribute value does not end the tag.
static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
        .expect("static regex")
});

static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("static regex")
});

/// Result of parsing table markup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedGrid {
    /// Number of row elements.
    pub rows: usize,
    /// Widest row, measured as the sum of that row's declared colspans.
    ///
    /// This can be smaller than the real grid width when a rowspan from an
    /// earlier row pushes a later row's cells to the right; see
    /// [`ParsedGrid::occupied_cols`] for the width actually covered.
    pub cols: usize,
    /// Cells in declaration order.
    pub cells: Vec<LogicalCell>,
    /// Span attributes that could not be parsed and were treated as 1.
    pub malformed_spans: usize,
}

impl ParsedGrid {
    /// True when the markup described no usable grid.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// One past the right-most column covered by any placed cell.
    pub fn occupied_cols(&self) -> usize {
        self.cells.iter().map(LogicalCell::col_end).max().unwrap_or(0)
    }

    /// Wraps the grid as a recognizer-derived table structure.
    pub fn into_structure(self, bbox: Option<PixelRect>) -> TableStructure {
        TableStructure::recognized(bbox, self.rows, self.cols, self.cells)
    }
}

/// Span counts declared on one cell tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DeclaredCell {
    rowspan: usize,
    colspan: usize,
}

/// Outcome of reading one span attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanValue {
    /// Usable value (absent, empty and zero all read as 1).
    Valid(usize),
    /// Unparseable or out of range; read as 1 (or clamped).
    Malformed(usize),
}

impl SpanValue {
    fn value(self) -> usize {
        match self {
            SpanValue::Valid(v) | SpanValue::Malformed(v) => v,
        }
    }

    fn is_malformed(self) -> bool {
        matches!(self, SpanValue::Malformed(_))
    }
}

fn parse_span(raw: Option<&str>) -> SpanValue {
    let Some(raw) = raw.map(str::trim) else {
        return SpanValue::Valid(1);
    };
    if raw.is_empty() {
        return SpanValue::Valid(1);
    }
    match raw.parse::<usize>() {
        Ok(0) => SpanValue::Valid(1),
        Ok(v) if v > MAX_SPAN => SpanValue::Malformed(MAX_SPAN),
        Ok(v) => SpanValue::Valid(v),
        Err(_) => SpanValue::Malformed(1),
    }
}

/// Looks up an attribute value by (case-insensitive) name.
fn attr_value<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    ATTR_RE.captures_iter(attrs).find_map(|caps| {
        let key = caps.get(1)?.as_str();
        if !key.eq_ignore_ascii_case(name) {
            return None;
        }
        caps.get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str())
    })
}

/// Collects the declared cells of every row, in order.
///
/// Only row and cell boundaries of the outermost table matter: tags inside a
/// nested table are skipped, as are cells outside any row. A row that is never
/// closed still counts as a row.
fn scan_rows(markup: &str) -> (Vec<Vec<DeclaredCell>>, usize) {
    let mut rows: Vec<Vec<DeclaredCell>> = Vec::new();
    let mut current: Option<Vec<DeclaredCell>> = None;
    let mut table_depth = 0usize;
    let mut malformed = 0usize;

    for caps in TAG_RE.captures_iter(markup) {
        // comments have no tag-name group
        let Some(name) = caps.get(2) else {
            continue;
        };
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let name = name.as_str().to_ascii_lowercase();
        let attrs = caps.get(3).map_or("", |m| m.as_str());

        if name == "table" {
            if closing {
                table_depth = table_depth.saturating_sub(1);
            } else {
                table_depth += 1;
            }
            continue;
        }
        if table_depth > 1 {
            continue;
        }

        match (name.as_str(), closing) {
            ("tr", false) => {
                if let Some(row) = current.take() {
                    rows.push(row);
                }
                current = Some(Vec::new());
            }
            ("tr", true) => {
                if let Some(row) = current.take() {
                    rows.push(row);
                }
            }
            ("td" | "th", false) => {
                let Some(row) = current.as_mut() else {
                    continue;
                };
                let rowspan = parse_span(attr_value(attrs, "rowspan"));
                let colspan = parse_span(attr_value(attrs, "colspan"));
                for span in [rowspan, colspan] {
                    if span.is_malformed() {
                        malformed += 1;
                        tracing::debug!(target: "structure", attrs = attrs.trim(), "Malformed span attribute");
                    }
                }
                row.push(DeclaredCell {
                    rowspan: rowspan.value(),
                    colspan: colspan.value(),
                });
            }
            _ => {}
        }
    }

    if let Some(row) = current.take() {
        rows.push(row);
    }

    (rows, malformed)
}

/// Parses table markup into an occupancy-consistent list of logical cells.
///
/// Rows are walked top to bottom. Within a row a column cursor starts at 0 and
/// skips every position already claimed by a spanning cell from an earlier row
/// before placing the next declared cell; each placed cell then claims its
/// whole `rowspan x colspan` block. Only rows inside the table are tracked; a
/// rowspan reaching past the last row keeps its declared value on the cell.
///
/// Empty markup, or markup without any row, yields an empty grid
/// (`rows == 0`, `cols == 0`), which callers treat as "no structure".
pub fn parse_table_markup(markup: &str) -> ParsedGrid {
    let (declared_rows, malformed_spans) = scan_rows(markup);
    if declared_rows.is_empty() {
        return ParsedGrid {
            malformed_spans,
            ..ParsedGrid::default()
        };
    }

    let cols = declared_rows
        .iter()
        .map(|row| row.iter().map(|c| c.colspan).sum::<usize>())
        .max()
        .unwrap_or(0);

    let row_count = declared_rows.len();
    let mut occupied: Vec<HashSet<usize>> = vec![HashSet::new(); row_count];
    let mut cells = Vec::with_capacity(declared_rows.iter().map(Vec::len).sum());

    for (row_idx, row) in declared_rows.iter().enumerate() {
        let mut col = 0usize;
        for declared in row {
            while occupied[row_idx].contains(&col) {
                col += 1;
            }
            let cell = LogicalCell::new(row_idx, col, declared.rowspan, declared.colspan);
            let row_end = cell.row_end().min(row_count);
            for claimed in &mut occupied[row_idx..row_end] {
                claimed.extend(col..cell.col_end());
            }
            cells.push(cell);
            col += declared.colspan;
        }
    }

    tracing::debug!(
        target: "structure",
        rows = row_count,
        cols,
        cells = cells.len(),
        malformed_spans,
        "Parsed table markup"
    );

    ParsedGrid {
        rows: row_count,
        cols,
        cells,
        malformed_spans,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchors(grid: &ParsedGrid) -> Vec<(usize, usize, usize, usize)> {
        grid.cells
            .iter()
            .map(|c| (c.row, c.col, c.rowspan, c.colspan))
            .collect()
    }

    /// Every position in `[0, rows) x [0, width)` is covered exactly once.
    fn assert_partition(grid: &ParsedGrid, width: usize) {
        let mut counts = vec![0usize; grid.rows * width];
        for cell in &grid.cells {
            for (r, c) in cell.positions() {
                assert!(r < grid.rows && c < width, "cell {cell:?} leaves the grid");
                counts[r * width + c] += 1;
            }
        }
        assert!(
            counts.iter().all(|&n| n == 1),
            "positions not covered exactly once: {counts:?}"
        );
    }

    #[test]
    fn test_parse_simple_grid() {
        let grid = parse_table_markup(
            "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>",
        );
        assert_eq!((grid.rows, grid.cols), (2, 2));
        assert_eq!(
            anchors(&grid),
            vec![(0, 0, 1, 1), (0, 1, 1, 1), (1, 0, 1, 1), (1, 1, 1, 1)]
        );
        assert_partition(&grid, 2);
    }

    #[test]
    fn test_parse_rowspan_pushes_later_cells_right() {
        let grid = parse_table_markup(
            r#"<table><tr><td rowspan="2">A</td><td>B</td></tr><tr><td>C</td></tr></table>"#,
        );
        assert_eq!((grid.rows, grid.cols), (2, 2));
        assert_eq!(
            anchors(&grid),
            vec![(0, 0, 2, 1), (0, 1, 1, 1), (1, 1, 1, 1)]
        );
        assert_partition(&grid, 2);
    }

    #[test]
    fn test_parse_colspan_and_rowspan_mix() {
        let markup = concat!(
            "<table>",
            "<tr><td colspan=\"3\">title</td></tr>",
            "<tr><td rowspan=\"2\">k</td><td>v1</td><td>v2</td></tr>",
            "<tr><td colspan=\"2\">v3</td></tr>",
            "</table>"
        );
        let grid = parse_table_markup(markup);
        assert_eq!((grid.rows, grid.cols), (3, 3));
        assert_eq!(
            anchors(&grid),
            vec![(0, 0, 1, 3), (1, 0, 2, 1), (1, 1, 1, 1), (1, 2, 1, 1), (2, 1, 1, 2)]
        );
        assert_partition(&grid, 3);
    }

    #[test]
    fn test_column_count_undercounts_when_rowspan_pushes_right() {
        // Row 1 declares a single cell but it lands at column 2 behind the
        // rowspans of row 0: declared width stays 2, occupied width is 3.
        let markup = concat!(
            "<tr><td rowspan=\"2\">a</td><td rowspan=\"2\">b</td></tr>",
            "<tr><td>c</td></tr>",
            "<tr><td>d</td><td>e</td></tr>"
        );
        let grid = parse_table_markup(markup);
        assert_eq!(grid.rows, 3);
        assert_eq!(grid.cols, 2);
        assert_eq!(grid.occupied_cols(), 3);
        assert_eq!((grid.cells[2].row, grid.cells[2].col), (1, 2));
    }

    #[test]
    fn test_empty_markup_is_no_structure() {
        for markup in ["", "   ", "<table></table>", "<div>no rows</div>"] {
            let grid = parse_table_markup(markup);
            assert!(grid.is_empty(), "markup {markup:?}");
            assert_eq!((grid.rows, grid.cols), (0, 0));
            assert!(grid.cells.is_empty());
        }
    }

    #[test]
    fn test_malformed_spans_fall_back_to_one() {
        let grid = parse_table_markup(
            r#"<tr><td rowspan="two" colspan="0">a</td><td colspan="">b</td><td colspan=x>c</td></tr>"#,
        );
        assert_eq!(
            anchors(&grid),
            vec![(0, 0, 1, 1), (0, 1, 1, 1), (0, 2, 1, 1)]
        );
        assert_eq!(grid.cols, 3);
        assert_eq!(grid.malformed_spans, 2);
    }

    #[test]
    fn test_attribute_forms() {
        let grid = parse_table_markup(
            "<TR><TD COLSPAN='2' class=\"x\">a</TD><th rowspan=2 >b</th></TR><tr><td>c</td><td>d</td></tr>",
        );
        assert_eq!(grid.cells[0].colspan, 2);
        assert_eq!(grid.cells[1].rowspan, 2);
        assert_eq!(grid.cells[1].col, 2);
        assert_eq!(grid.cols, 3);
        // `b` keeps (1, 2), so row 1 fills columns 0 and 1
        assert_eq!((grid.cells[2].row, grid.cells[2].col), (1, 0));
        assert_eq!((grid.cells[3].row, grid.cells[3].col), (1, 1));
    }

    #[test]
    fn test_split_structure_tokens_joined() {
        let tokens = ["<tr>", "<td", " colspan=\"2\"", ">", "</td>", "</tr>", "<tr>", "<td></td>", "<td></td>", "</tr>"];
        let grid = parse_table_markup(&tokens.concat());
        assert_eq!((grid.rows, grid.cols), (2, 2));
        assert_eq!(anchors(&grid), vec![(0, 0, 1, 2), (1, 0, 1, 1), (1, 1, 1, 1)]);
    }

    #[test]
    fn test_nested_table_is_ignored() {
        let markup = concat!(
            "<table><tr><td>outer",
            "<table><tr><td>i1</td><td>i2</td><td>i3</td></tr><tr><td>i4</td></tr></table>",
            "</td><td>b</td></tr></table>"
        );
        let grid = parse_table_markup(markup);
        assert_eq!((grid.rows, grid.cols), (1, 2));
        assert_eq!(anchors(&grid), vec![(0, 0, 1, 1), (0, 1, 1, 1)]);
    }

    #[test]
    fn test_comments_and_cells_outside_rows_are_skipped() {
        let grid = parse_table_markup(
            "<table><td>stray</td><!-- <tr><td>x</td></tr> --><tr><td>a</td></tr></table>",
        );
        assert_eq!((grid.rows, grid.cols), (1, 1));
        assert_eq!(grid.cells.len(), 1);
    }

    #[test]
    fn test_unclosed_row_is_counted() {
        let grid = parse_table_markup("<tr><td>a</td><td>b</td><tr><td>c</td>");
        assert_eq!(grid.rows, 2);
        assert_eq!(anchors(&grid), vec![(0, 0, 1, 1), (0, 1, 1, 1), (1, 0, 1, 1)]);
    }

    #[test]
    fn test_huge_span_is_clamped() {
        let grid = parse_table_markup(r#"<tr><td colspan="999999">a</td></tr>"#);
        assert_eq!(grid.cells[0].colspan, MAX_SPAN);
        assert_eq!(grid.malformed_spans, 1);
    }

    #[test]
    fn test_quoted_gt_does_not_end_tag() {
        let grid = parse_table_markup(
            r#"<table><tr><td title="a>b" rowspan="2">A</td><td>B</td></tr><tr><td class='x>y'>C</td></tr></table>"#,
        );
        assert_eq!(
            anchors(&grid),
            vec![(0, 0, 2, 1), (0, 1, 1, 1), (1, 1, 1, 1)]
        );
        assert_partition(&grid, 2);
    }

    #[test]
    fn test_huge_spans_stay_bounded() {
        let markup = format!(
            "<table><tr>{}</tr></table>",
            r#"<td rowspan="1000" colspan="1000">x</td>"#.repeat(20)
        );
        let grid = parse_table_markup(&markup);
        assert_eq!(grid.rows, 1);
        assert_eq!(grid.cols, 20 * MAX_SPAN);
        assert_eq!(grid.malformed_spans, 40);
        assert!(grid.cells.iter().all(|c| c.rowspan == MAX_SPAN));
        assert_eq!(grid.cells[19].col, 19 * MAX_SPAN);
    }

    #[test]
    fn test_rowspan_past_last_row_keeps_declared_value() {
        let grid = parse_table_markup(
            r#"<tr><td rowspan="5">a</td><td>b</td></tr><tr><td>c</td></tr>"#,
        );
        assert_eq!(grid.rows, 2);
        assert_eq!(anchors(&grid), vec![(0, 0, 5, 1), (0, 1, 1, 1), (1, 1, 1, 1)]);
    }

    #[test]
    fn test_into_structure() {
        let structure = parse_table_markup("<tr><td>a</td></tr>")
            .into_structure(Some(PixelRect::new(0, 0, 10, 10)));
        assert!(structure.has_structure());
        assert!(!structure.is_fallback());
        assert_eq!(structure.cells.len(), 1);
    }
}
