//! JSON report written next to every DOCX.
//!
//! ```json
//! {
//!   "pdf": "invoice.pdf",
//!   "pages": [
//!     { "page_index": 1, "rotation": 90, "tables": [ ... ] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::PipelineResult;
use crate::domain::{RotationAngle, TableData};

/// One processed page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    /// 1-based page number.
    pub page_index: usize,
    pub rotation: RotationAngle,
    pub tables: Vec<TableData>,
}

/// Report for one PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// File name of the source PDF.
    pub pdf: String,
    pub pages: Vec<PageReport>,
}

impl Report {
    pub fn new(pdf: impl Into<String>) -> Self {
        Self {
            pdf: pdf.into(),
            pages: Vec::new(),
        }
    }

    /// Appends a page and returns it so tables can be added.
    pub fn add_page(&mut self, page_index: usize, rotation: RotationAngle) -> &mut PageReport {
        self.pages.push(PageReport {
            page_index,
            rotation,
            tables: Vec::new(),
        });
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Total number of tables over all pages.
    pub fn table_count(&self) -> usize {
        self.pages.iter().map(|p| p.tables.len()).sum()
    }

    pub fn to_json(&self) -> PipelineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the report as indented UTF-8 JSON. Non-ASCII text is kept as is.
    pub fn save(&self, path: &Path) -> PipelineResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> PipelineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CellResult, LogicalCell, PixelRect};

    fn sample() -> Report {
        let mut report = Report::new("年度报告.pdf");
        report.add_page(1, RotationAngle::Deg0);
        let page = report.add_page(2, RotationAngle::Deg270);
        let cell = LogicalCell::new(0, 0, 1, 2).with_bbox(PixelRect::new(0, 0, 80, 20));
        page.tables.push(TableData {
            bbox: Some(PixelRect::new(0, 0, 80, 40)),
            rows: 2,
            cols: 2,
            cells: vec![CellResult::from_cell(&cell, "合计".to_string(), 0.5)],
            fallback_used: true,
        });
        report
    }

    #[test]
    fn test_json_layout() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"pdf\": \"年度报告.pdf\""));
        assert!(json.contains("\"rotation\": 270"));
        assert!(json.contains("\"text\": \"合计\""));
        assert!(json.contains("\"fallback_used\": true"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["pages"][1]["page_index"], 2);
        assert_eq!(value["pages"][1]["tables"][0]["cells"][0]["colspan"], 2);
        assert_eq!(
            value["pages"][1]["tables"][0]["cells"][0]["bbox"],
            serde_json::json!([0, 0, 80, 20])
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = sample();
        report.save(&path).unwrap();
        let loaded = Report::load(&path).unwrap();
        assert_eq!(loaded, report);
        assert_eq!(loaded.table_count(), 1);
    }

    #[test]
    fn test_unknown_rotation_is_rejected() {
        let json = r#"{"pdf": "a.pdf", "pages": [{"page_index": 1, "rotation": 45, "tables": []}]}"#;
        assert!(serde_json::from_str::<Report>(json).is_err());
    }
}
