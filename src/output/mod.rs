//! Document writers.

pub mod docx;

pub use docx::{DocxWriter, PlannedCell, plan_rows};
