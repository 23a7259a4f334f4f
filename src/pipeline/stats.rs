//! Page and run statistics.
//!
//! `PageStats` counts what happened to the tables of one page, including the
//! soft failures that were absorbed instead of aborting. `RunStats` sums them
//! over a whole conversion run.

use std::fmt;

use crate::core::SoftFailure;

/// Counters for one processed page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageStats {
    /// Tables built from recognizer markup.
    pub tables_recognized: usize,
    /// Tables built from the ruling-line grid.
    pub tables_from_fallback: usize,
    /// Tables dropped because neither markup nor ruling lines gave a grid.
    pub tables_skipped: usize,
    /// Recognizer tables whose markup described no grid.
    pub structures_absent: usize,
    /// Cells whose region had zero area after clamping.
    pub degenerate_cells: usize,
    /// Span attributes that could not be parsed.
    pub malformed_spans: usize,
}

impl PageStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts `count` occurrences of a soft failure.
    pub fn record(&mut self, failure: SoftFailure, count: usize) {
        match failure {
            SoftFailure::StructureAbsent => self.structures_absent += count,
            SoftFailure::FallbackAbsent => self.tables_skipped += count,
            SoftFailure::DegenerateGeometry => self.degenerate_cells += count,
            SoftFailure::MalformedSpan => self.malformed_spans += count,
        }
    }

    /// Number of tables emitted for the page.
    pub fn tables_emitted(&self) -> usize {
        self.tables_recognized + self.tables_from_fallback
    }

    /// Adds another page's counters to these.
    pub fn merge(&mut self, other: &PageStats) {
        self.tables_recognized += other.tables_recognized;
        self.tables_from_fallback += other.tables_from_fallback;
        self.tables_skipped += other.tables_skipped;
        self.structures_absent += other.structures_absent;
        self.degenerate_cells += other.degenerate_cells;
        self.malformed_spans += other.malformed_spans;
    }
}

/// Totals for a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// PDFs whose outputs were written.
    pub pdfs_converted: usize,
    /// PDFs skipped because they could not be rasterized.
    pub pdfs_failed: usize,
    /// Pages processed successfully.
    pub pages_processed: usize,
    /// Pages abandoned after a recognition error.
    pub pages_failed: usize,
    /// Sum of the per-page counters.
    pub tables: PageStats,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page(&mut self, page: &PageStats) {
        self.pages_processed += 1;
        self.tables.merge(page);
    }

    pub fn record_page_failure(&mut self) {
        self.pages_failed += 1;
    }

    /// Returns the page success rate as a percentage (0.0 to 100.0).
    pub fn page_success_rate(&self) -> f64 {
        let total = self.pages_processed + self.pages_failed;
        if total == 0 {
            0.0
        } else {
            (self.pages_processed as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Conversion Statistics:")?;
        writeln!(
            f,
            "  PDFs: {} converted, {} failed",
            self.pdfs_converted, self.pdfs_failed
        )?;
        writeln!(
            f,
            "  Pages: {} processed, {} failed ({:.1}% ok)",
            self.pages_processed,
            self.pages_failed,
            self.page_success_rate()
        )?;
        writeln!(
            f,
            "  Tables: {} recognized, {} from ruling lines, {} skipped",
            self.tables.tables_recognized, self.tables.tables_from_fallback, self.tables.tables_skipped
        )?;
        writeln!(
            f,
            "  Soft failures: {} absent structures, {} degenerate cells, {} malformed spans",
            self.tables.structures_absent, self.tables.degenerate_cells, self.tables.malformed_spans
        )?;
        Ok(())
    }
}
