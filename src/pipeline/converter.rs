//! Whole-document conversion: PDFs in, DOCX files and JSON reports out.
//!
//! For every input PDF the converter writes
//!
//! ```text
//! <output>/<stem>/<stem>.docx
//! <output>/<stem>/<stem>.json
//! <output>/<stem>/debug/...          (with `debug = true`)
//! ```
//!
//! where `<stem>` is the file stem with spaces replaced by underscores.

use std::path::{Path, PathBuf};

use super::page::PageProcessor;
use super::report::Report;
use super::stats::RunStats;
use crate::core::{
    ConfigValidator, DocumentWriter, PageRasterizer, PipelineConfig, PipelineResult,
    StructureRecognizer, TextRecognizer,
};
use crate::output::DocxWriter;
use crate::utils::{collect_pdfs, ensure_dir, save_image, stem_safe};

/// Files written for one PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedPdf {
    pub source: PathBuf,
    pub docx: PathBuf,
    pub report: PathBuf,
}

/// Result of a conversion run.
#[derive(Debug, Clone, Default)]
pub struct ConversionSummary {
    pub outputs: Vec<ConvertedPdf>,
    pub stats: RunStats,
}

/// Drives the page pipeline over one PDF or a directory of PDFs.
pub struct DocumentConverter<'a, R: PageRasterizer> {
    rasterizer: R,
    text: &'a dyn TextRecognizer,
    structure: &'a dyn StructureRecognizer,
    config: PipelineConfig,
}

impl<'a, R: PageRasterizer> DocumentConverter<'a, R> {
    pub fn new(
        rasterizer: R,
        text: &'a dyn TextRecognizer,
        structure: &'a dyn StructureRecognizer,
        config: PipelineConfig,
    ) -> Self {
        Self {
            rasterizer,
            text,
            structure,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Converts `input` (a PDF or a directory of PDFs) into `output_dir`,
    /// writing DOCX files with [`DocxWriter`].
    pub fn convert(&self, input: &Path, output_dir: &Path) -> PipelineResult<ConversionSummary> {
        self.convert_with(input, output_dir, DocxWriter::new)
    }

    /// Like [`DocumentConverter::convert`], with a writer built by `make_writer`
    /// for every PDF.
    ///
    /// A PDF that cannot be rasterized is logged and skipped. A page whose
    /// recognition fails is logged, counted and left out of the outputs; the
    /// remaining pages are still processed.
    ///
    /// # Errors
    ///
    /// Invalid configuration, invalid input paths, and failures writing outputs.
    pub fn convert_with<W, F>(
        &self,
        input: &Path,
        output_dir: &Path,
        make_writer: F,
    ) -> PipelineResult<ConversionSummary>
    where
        W: DocumentWriter,
        F: Fn() -> W,
    {
        self.config.validate()?;
        let pdfs = collect_pdfs(input)?;
        let output_dir = ensure_dir(output_dir)?;

        let mut summary = ConversionSummary::default();
        for pdf in &pdfs {
            tracing::info!(target: "converter", pdf = %pdf.display(), "Processing PDF");
            match self.convert_pdf(pdf, &output_dir, make_writer(), &mut summary.stats)? {
                Some(converted) => {
                    summary.stats.pdfs_converted += 1;
                    summary.outputs.push(converted);
                }
                None => summary.stats.pdfs_failed += 1,
            }
        }

        tracing::info!(
            target: "converter",
            pdfs = pdfs.len(),
            pages = summary.stats.pages_processed,
            failed_pages = summary.stats.pages_failed,
            "Conversion finished"
        );
        Ok(summary)
    }

    fn convert_pdf<W: DocumentWriter>(
        &self,
        pdf: &Path,
        output_dir: &Path,
        mut writer: W,
        stats: &mut RunStats,
    ) -> PipelineResult<Option<ConvertedPdf>> {
        let name = stem_safe(pdf);
        let pdf_dir = ensure_dir(&output_dir.join(&name))?;
        let debug_dir = if self.config.debug {
            Some(ensure_dir(&pdf_dir.join("debug"))?)
        } else {
            None
        };

        let pages = match self.rasterizer.render(pdf, self.config.dpi) {
            Ok(pages) => pages,
            Err(e) => {
                tracing::error!(target: "converter", pdf = %pdf.display(), error = %e, "Skipping PDF");
                return Ok(None);
            }
        };

        let selected = (1..=pages.len())
            .take_while(|&page_index| self.config.includes_page(page_index))
            .count();
        let processor = PageProcessor::new(self.text, self.structure, &self.config);
        let file_name = pdf
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut report = Report::new(file_name);

        for (offset, page) in pages.iter().take(selected).enumerate() {
            let page_index = offset + 1;
            tracing::info!(target: "converter", page = page_index, total = pages.len(), "Page");

            let page_debug_dir = match &debug_dir {
                Some(dir) => {
                    save_image(page, &dir.join(format!("page_{page_index:03}_render.png")))?;
                    Some(ensure_dir(&dir.join(format!("page_{page_index:03}")))?)
                }
                None => None,
            };

            match processor.process(page, page_index, page_debug_dir.as_deref()) {
                Ok(outcome) => {
                    stats.record_page(&outcome.stats);
                    let page_report = report.add_page(page_index, outcome.rotation);
                    for table in outcome.tables {
                        writer.add_table(&table)?;
                        page_report.tables.push(table);
                    }
                }
                Err(e) => {
                    tracing::error!(
                        target: "converter",
                        pdf = %pdf.display(),
                        page = page_index,
                        error = %e,
                        "Page failed"
                    );
                    stats.record_page_failure();
                }
            }

            if page_index < selected {
                writer.add_page_break();
            }
        }

        let docx_path = pdf_dir.join(format!("{name}.docx"));
        let report_path = pdf_dir.join(format!("{name}.json"));
        writer.save(&docx_path)?;
        report.save(&report_path)?;
        tracing::info!(target: "converter", dir = %pdf_dir.display(), "Saved outputs");

        Ok(Some(ConvertedPdf {
            source: pdf.to_path_buf(),
            docx: docx_path,
            report: report_path,
        }))
    }
}
