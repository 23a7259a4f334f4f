//! Constants used throughout the table pipeline.

/// Default rasterization resolution in pixels per inch.
pub const DEFAULT_DPI: u32 = 300;

/// Points per inch in PDF user space.
pub const PDF_POINTS_PER_INCH: f32 = 72.0;

/// The default threshold for parallel processing.
///
/// Cell and rotation batches with more items than this are processed on rayon.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

/// Side of the square neighbourhood used for adaptive thresholding.
pub const DEFAULT_THRESHOLD_BLOCK_SIZE: u32 = 25;

/// Constant subtracted from the local mean before thresholding.
pub const DEFAULT_THRESHOLD_OFFSET: i32 = 10;

/// Length of the structuring element that isolates ruling lines.
pub const DEFAULT_LINE_LENGTH: u32 = 40;

/// Grid-evidence boxes narrower or shorter than this are discarded as noise.
pub const DEFAULT_MIN_BOX_SIZE: u32 = 20;

/// Edge coordinates closer than this are merged into one grid line.
pub const DEFAULT_CLUSTER_THRESHOLD: i32 = 10;

/// Model subdirectories the recognition engines are loaded from.
pub const REQUIRED_MODEL_DIRS: [&str; 4] = ["det", "rec", "cls", "table"];

/// Font size of table text in the DOCX output, in half-points (10 pt).
pub const DOCX_FONT_HALF_POINTS: usize = 20;

/// Font used for table text in the DOCX output, for both Latin and East-Asian runs.
pub const DOCX_FONT: &str = "SimSun";
