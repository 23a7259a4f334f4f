//! DOCX output via `docx-rs`.
//!
//! Each table becomes a bordered Word table. Merged cells are written the way
//! Word stores them: a horizontal span is a single cell with `gridSpan`, and a
//! vertical span is a `vMerge="restart"` cell followed by one `vMerge` cell per
//! covered row below it.

use std::fs::File;
use std::path::Path;

use docx_rs::{
    BreakType, Docx, Paragraph, Run, RunFonts, Table, TableCell, TableRow, VMergeType,
};

use crate::core::constants::{DOCX_FONT, DOCX_FONT_HALF_POINTS};
use crate::core::{DocumentWriter, PipelineError, PipelineResult};
use crate::domain::{Slot, TableData, TableLayout};

/// Usable page width in twentieths of a point (A4 with 1 inch margins, roughly).
const TEXT_WIDTH_TWIPS: usize = 9000;

/// One cell of a planned Word table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedCell {
    /// Anchor of the cell at this index in `TableData::cells`.
    Anchor { cell: usize, colspan: usize, merges_down: bool },
    /// Continuation of a vertical merge started above.
    Continue { colspan: usize },
    /// A grid position no cell claims.
    Blank,
}

/// Lays a table out as Word rows.
///
/// The grid is at least `rows x cols` and grows to fit every cell. Cells that
/// overlap an earlier cell are dropped.
pub fn plan_rows(table: &TableData) -> Vec<Vec<PlannedCell>> {
    let layout = TableLayout::build(table.rows, table.cols, &table.cells);
    let mut planned = Vec::with_capacity(layout.rows());
    for r in 0..layout.rows() {
        let mut row = Vec::new();
        let mut c = 0;
        while c < layout.cols() {
            match layout.slot(r, c) {
                Slot::Anchor(idx) => {
                    let cell = &table.cells[idx];
                    let colspan = cell.colspan.max(1);
                    row.push(PlannedCell::Anchor {
                        cell: idx,
                        colspan,
                        merges_down: layout.slot(r + 1, c) == Slot::Covered(idx),
                    });
                    c += colspan;
                }
                Slot::Covered(idx) if table.cells[idx].col == c => {
                    let colspan = table.cells[idx].colspan.max(1);
                    row.push(PlannedCell::Continue { colspan });
                    c += colspan;
                }
                Slot::Covered(_) | Slot::Empty => {
                    row.push(PlannedCell::Blank);
                    c += 1;
                }
            }
        }
        planned.push(row);
    }
    planned
}

#[derive(Debug)]
enum Block {
    Table(Table),
    PageBreak,
}

/// Collects tables and page breaks and writes them as one DOCX file.
#[derive(Debug, Default)]
pub struct DocxWriter {
    blocks: Vec<Block>,
    tables: usize,
}

impl DocxWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tables added so far.
    pub fn table_count(&self) -> usize {
        self.tables
    }

    fn text_paragraph(text: &str) -> Paragraph {
        let run = Run::new()
            .add_text(text)
            .size(DOCX_FONT_HALF_POINTS)
            .fonts(
                RunFonts::new()
                    .ascii(DOCX_FONT)
                    .hi_ansi(DOCX_FONT)
                    .east_asia(DOCX_FONT),
            );
        Paragraph::new().add_run(run)
    }

    fn render(table: &TableData) -> Table {
        let planned = plan_rows(table);
        let cols = planned
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        PlannedCell::Anchor { colspan, .. } | PlannedCell::Continue { colspan } => {
                            *colspan
                        }
                        PlannedCell::Blank => 1,
                    })
                    .sum::<usize>()
            })
            .max()
            .unwrap_or(1)
            .max(1);

        let rows = planned
            .into_iter()
            .map(|row| {
                let cells = row
                    .into_iter()
                    .map(|planned| match planned {
                        PlannedCell::Anchor {
                            cell,
                            colspan,
                            merges_down,
                        } => {
                            let mut out = TableCell::new()
                                .add_paragraph(Self::text_paragraph(&table.cells[cell].text));
                            if colspan > 1 {
                                out = out.grid_span(colspan);
                            }
                            if merges_down {
                                out = out.vertical_merge(VMergeType::Restart);
                            }
                            out
                        }
                        PlannedCell::Continue { colspan } => {
                            let mut out = TableCell::new()
                                .add_paragraph(Paragraph::new())
                                .vertical_merge(VMergeType::Continue);
                            if colspan > 1 {
                                out = out.grid_span(colspan);
                            }
                            out
                        }
                        PlannedCell::Blank => TableCell::new().add_paragraph(Paragraph::new()),
                    })
                    .collect();
                TableRow::new(cells)
            })
            .collect();

        Table::new(rows).set_grid(vec![TEXT_WIDTH_TWIPS / cols; cols])
    }
}

impl DocumentWriter for DocxWriter {
    fn add_table(&mut self, table: &TableData) -> PipelineResult<()> {
        if table.rows == 0 || table.cols == 0 {
            tracing::debug!(target: "docx", "Ignoring table without rows or columns");
            return Ok(());
        }
        self.blocks.push(Block::Table(Self::render(table)));
        self.tables += 1;
        Ok(())
    }

    fn add_page_break(&mut self) {
        self.blocks.push(Block::PageBreak);
    }

    fn save(&self, path: &Path) -> PipelineResult<()> {
        let mut docx = Docx::new();
        for block in &self.blocks {
            docx = match block {
                Block::Table(table) => docx.add_table(table.clone()),
                Block::PageBreak => docx
                    .add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page))),
            };
        }
        let file = File::create(path)?;
        docx.build().pack(file).map_err(PipelineError::document)?;
        tracing::debug!(target: "docx", path = %path.display(), tables = self.tables, "Saved document");
        Ok(())
    }
}
