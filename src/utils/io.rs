//! Input discovery and output directory helpers.

use crate::core::{PipelineError, PipelineResult};
use std::path::{Path, PathBuf};

/// Returns true when `path` has a `.pdf` extension, in any letter case.
pub fn is_pdf_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Resolves the PDFs to convert.
///
/// A file path must itself be a PDF. A directory yields its direct `*.pdf`
/// children in sorted order.
///
/// # Errors
///
/// `InvalidInput` when the path does not exist, names a non-PDF file, or is a
/// directory without PDFs.
pub fn collect_pdfs(input: &Path) -> PipelineResult<Vec<PathBuf>> {
    if !input.exists() {
        return Err(PipelineError::invalid_input(format!(
            "Input path does not exist: {}",
            input.display()
        )));
    }
    if input.is_file() {
        if !is_pdf_file(input) {
            return Err(PipelineError::invalid_input(format!(
                "Input file is not a PDF: {}",
                input.display()
            )));
        }
        return Ok(vec![input.to_path_buf()]);
    }

    let mut pdfs: Vec<PathBuf> = std::fs::read_dir(input)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_pdf_file(path))
        .collect();
    pdfs.sort();

    if pdfs.is_empty() {
        return Err(PipelineError::invalid_input(format!(
            "No PDF files found in directory: {}",
            input.display()
        )));
    }
    Ok(pdfs)
}

/// Creates `path` and its parents if needed and returns it.
pub fn ensure_dir(path: &Path) -> PipelineResult<PathBuf> {
    std::fs::create_dir_all(path)?;
    Ok(path.to_path_buf())
}

/// File stem with spaces replaced by underscores, used to name outputs.
pub fn stem_safe(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace(' ', "_"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf_file() {
        assert!(is_pdf_file(Path::new("a.pdf")));
        assert!(is_pdf_file(Path::new("dir/B.PDF")));
        assert!(!is_pdf_file(Path::new("scan.png")));
        assert!(!is_pdf_file(Path::new("pdf")));
    }

    #[test]
    fn test_stem_safe() {
        assert_eq!(stem_safe(Path::new("/in/annual report 2023.pdf")), "annual_report_2023");
        assert_eq!(stem_safe(Path::new("plain.pdf")), "plain");
    }

    #[test]
    fn test_collect_pdfs_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let pdfs = collect_pdfs(dir.path()).unwrap();
        let names: Vec<_> = pdfs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn test_collect_pdfs_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_pdfs(&dir.path().join("missing")).is_err());

        let empty = collect_pdfs(dir.path()).unwrap_err();
        assert!(empty.to_string().contains("No PDF files"));

        let png = dir.path().join("scan.png");
        std::fs::write(&png, b"x").unwrap();
        let not_pdf = collect_pdfs(&png).unwrap_err();
        assert!(not_pdf.to_string().contains("not a PDF"));
    }

    #[test]
    fn test_collect_single_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("one.pdf");
        std::fs::write(&pdf, b"x").unwrap();
        assert_eq!(collect_pdfs(&pdf).unwrap(), vec![pdf]);
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        assert_eq!(ensure_dir(&nested).unwrap(), nested);
        assert!(ensure_dir(&nested).is_ok());
        assert!(nested.is_dir());
    }
}
