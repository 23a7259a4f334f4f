//! Domain types: tables, cells, recognized text and page orientation.

pub mod layout;
pub mod orientation;
pub mod table;
pub mod text;

pub use layout::{Slot, TableLayout};
pub use orientation::{
    OrientationChoice, RotationAngle, RotationStrategy, is_cjk_ideograph, score_text_lines,
};
pub use table::{CellResult, LogicalCell, PixelRect, TableData, TableSource, TableStructure};
pub use text::{TextLine, TextPiece};
