//! Single-page processing: orientation, structure, fallback, cells.

use std::cell::OnceCell;
use std::path::Path;

use image::RgbImage;

use super::cell_ocr::ocr_cells;
use super::orientation::OrientationCorrector;
use super::stats::PageStats;
use crate::core::{
    PipelineConfig, PipelineResult, RecognizedTable, SoftFailure, StructureRecognizer,
    TextRecognizer,
};
use crate::domain::{PixelRect, RotationAngle, TableData, TableStructure};
use crate::processors::{FallbackGridDetector, parse_table_markup, synthesize_structure};

/// Everything produced for one page.
#[derive(Debug, Clone)]
pub struct PageOutcome {
    /// Rotation applied before recognition.
    pub rotation: RotationAngle,
    /// Finished tables in recognizer order.
    pub tables: Vec<TableData>,
    pub stats: PageStats,
}

/// Turns a rendered page into finished tables.
///
/// Holds the engines by reference; they are built once per run by the caller.
pub struct PageProcessor<'a> {
    text: &'a dyn TextRecognizer,
    structure: &'a dyn StructureRecognizer,
    config: &'a PipelineConfig,
    detector: FallbackGridDetector,
}

impl<'a> PageProcessor<'a> {
    pub fn new(
        text: &'a dyn TextRecognizer,
        structure: &'a dyn StructureRecognizer,
        config: &'a PipelineConfig,
    ) -> Self {
        Self {
            text,
            structure,
            config,
            detector: FallbackGridDetector::new(config.fallback.clone()),
        }
    }

    /// Processes one page.
    ///
    /// The page is first rotated to its readable orientation, then handed to
    /// the structure recognizer. When fallback is enabled, a page without any
    /// recognized table gets the ruling-line grid as its only table, and every
    /// table whose markup describes no grid is replaced by that grid. Tables
    /// that end up without a grid are skipped and counted. The ruling-line
    /// detector runs at most once per page.
    ///
    /// `page_index` is 1-based. When `debug_dir` is given, the rotation
    /// candidates are saved there.
    ///
    /// # Errors
    ///
    /// Recognizer failures and debug image write failures.
    pub fn process(
        &self,
        page: &RgbImage,
        page_index: usize,
        debug_dir: Option<&Path>,
    ) -> PipelineResult<PageOutcome> {
        let mut corrector = OrientationCorrector::new(self.text, self.config.rotation_strategy)
            .with_parallel_threshold(self.config.parallel_threshold);
        if let Some(dir) = debug_dir {
            corrector = corrector.with_debug_dir(dir, page_index);
        }
        let corrected = corrector.correct(page)?;
        let image = &corrected.image;

        let recognized = self.structure.analyze(image)?;
        tracing::debug!(
            target: "structure",
            page = page_index,
            tables = recognized.len(),
            "Structure recognizer finished"
        );

        let mut stats = PageStats::new();
        let fallback: OnceCell<Option<TableStructure>> = OnceCell::new();
        let fallback_grid = || {
            fallback
                .get_or_init(|| self.detector.detect(image))
                .clone()
        };

        let mut structures: Vec<TableStructure> = recognized
            .iter()
            .map(|table| self.parse(table, page_index, &mut stats))
            .collect();

        if structures.is_empty() && self.config.fallback_enabled {
            match fallback_grid() {
                Some(grid) => structures.push(grid),
                None => tracing::debug!(
                    target: "fallback",
                    page = page_index,
                    "No tables recognized and no ruling-line grid found"
                ),
            }
        }

        let mut tables = Vec::with_capacity(structures.len());
        for (table_index, structure) in structures.into_iter().enumerate() {
            let structure = if structure.has_structure() {
                structure
            } else {
                stats.record(SoftFailure::StructureAbsent, 1);
                let grid = if self.config.fallback_enabled {
                    fallback_grid()
                } else {
                    None
                };
                match grid {
                    Some(grid) => grid,
                    None => {
                        stats.record(SoftFailure::FallbackAbsent, 1);
                        tracing::warn!(
                            target: "fallback",
                            page = page_index,
                            table = table_index,
                            fallback_enabled = self.config.fallback_enabled,
                            "Skipping table: {}",
                            SoftFailure::FallbackAbsent
                        );
                        continue;
                    }
                }
            };

            let table = self.build_table(image, &structure, &mut stats)?;
            if table.fallback_used {
                stats.tables_from_fallback += 1;
            } else {
                stats.tables_recognized += 1;
            }
            tables.push(table);
        }

        tracing::info!(
            target: "structure",
            page = page_index,
            rotation = corrected.angle.degrees(),
            tables = tables.len(),
            skipped = stats.tables_skipped,
            "Page processed"
        );

        Ok(PageOutcome {
            rotation: corrected.angle,
            tables,
            stats,
        })
    }

    fn parse(
        &self,
        table: &RecognizedTable,
        page_index: usize,
        stats: &mut PageStats,
    ) -> TableStructure {
        let grid = parse_table_markup(&table.markup);
        if grid.malformed_spans > 0 {
            stats.record(SoftFailure::MalformedSpan, grid.malformed_spans);
            tracing::warn!(
                target: "structure",
                page = page_index,
                count = grid.malformed_spans,
                "{} in table markup",
                SoftFailure::MalformedSpan
            );
        }
        grid.into_structure(table.bbox.map(PixelRect::from_f32))
    }

    fn build_table(
        &self,
        image: &RgbImage,
        structure: &TableStructure,
        stats: &mut PageStats,
    ) -> PipelineResult<TableData> {
        let cells = synthesize_structure(structure, image.dimensions());
        let batch = ocr_cells(image, &cells, self.text, self.config.parallel_threshold)?;
        if batch.degenerate > 0 {
            stats.record(SoftFailure::DegenerateGeometry, batch.degenerate);
            tracing::warn!(
                target: "cell_ocr",
                cells = batch.degenerate,
                "{}: cells left empty",
                SoftFailure::DegenerateGeometry
            );
        }
        Ok(TableData {
            bbox: structure.bbox,
            rows: structure.rows.max(1),
            cols: structure.cols.max(1),
            cells: batch.cells,
            fallback_used: structure.is_fallback(),
        })
    }
}
