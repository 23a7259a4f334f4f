//! Table structure processors.
//!
//! # Modules
//!
//! * `table_markup` - Parses recognizer markup into a logical cell grid
//! * `cell_geometry` - Lays pixel boxes over a logical grid
//! * `grid_lines` - Recovers a grid from ruling lines when recognition fails

pub mod cell_geometry;
pub mod grid_lines;
pub mod table_markup;

pub use cell_geometry::{synthesize_cell_boxes, synthesize_structure};
pub use grid_lines::{FallbackGridDetector, cluster_positions, detect_grid};
pub use table_markup::{MAX_SPAN, ParsedGrid, parse_table_markup};
