//! Ruling-line grid detection.
//!
//! Used when the structure recognizer gives up on a table. The page is
//! binarized with an adaptive mean threshold, long horizontal and vertical
//! strokes are isolated with a morphological opening, and the bounding boxes of
//! the resulting line mask are clustered into column and row boundaries.

use image::{GrayImage, ImageBuffer, Luma, RgbImage, imageops};
use imageproc::contours::find_contours;
use imageproc::integral_image::integral_image;
use itertools::Itertools;

use crate::core::config::FallbackGridConfig;
use crate::domain::{LogicalCell, PixelRect, TableStructure};

const INK: u8 = 255;

/// Detects a table grid from the ruling lines drawn on a page.
#[derive(Debug, Clone, Default)]
pub struct FallbackGridDetector {
    config: FallbackGridConfig,
}

impl FallbackGridDetector {
    pub fn new(config: FallbackGridConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FallbackGridConfig {
        &self.config
    }

    /// Runs the detector on a page image.
    ///
    /// Returns `None` when no line evidence of at least `min_box_size` in both
    /// dimensions is found, or when the evidence collapses to a single boundary
    /// on either axis. Otherwise every cell of the returned grid is unspanned
    /// and carries its pixel box.
    pub fn detect(&self, image: &RgbImage) -> Option<TableStructure> {
        let gray = imageops::grayscale(image);
        let binary = adaptive_threshold_mean(
            &gray,
            self.config.block_size,
            self.config.threshold_offset,
        );
        let horizontal = keep_horizontal_runs(&binary, self.config.line_length);
        let vertical = keep_vertical_runs(&binary, self.config.line_length);
        let grid = blend_masks(&horizontal, &vertical);

        let min_side = self.config.min_box_size as i32;
        let boxes: Vec<PixelRect> = find_contours::<u32>(&grid)
            .iter()
            .filter_map(|contour| {
                let (min_x, max_x) = contour.points.iter().map(|p| p.x).minmax().into_option()?;
                let (min_y, max_y) = contour.points.iter().map(|p| p.y).minmax().into_option()?;
                let rect = PixelRect::new(
                    min_x as i32,
                    min_y as i32,
                    max_x as i32 + 1,
                    max_y as i32 + 1,
                );
                (rect.width() >= min_side && rect.height() >= min_side).then_some(rect)
            })
            .collect();

        if boxes.is_empty() {
            tracing::debug!(target: "fallback", "No ruling-line evidence found");
            return None;
        }

        let threshold = self.config.cluster_threshold;
        let xs = cluster_positions(
            boxes.iter().flat_map(|b| [b.x1, b.x2]).collect(),
            threshold,
        );
        let ys = cluster_positions(
            boxes.iter().flat_map(|b| [b.y1, b.y2]).collect(),
            threshold,
        );
        if xs.len() < 2 || ys.len() < 2 {
            tracing::debug!(
                target: "fallback",
                columns = xs.len(),
                rows = ys.len(),
                "Grid boundaries collapsed to a single line"
            );
            return None;
        }

        let cols = xs.len() - 1;
        let rows = ys.len() - 1;
        let cells = (0..rows)
            .cartesian_product(0..cols)
            .map(|(r, c)| {
                LogicalCell::single(r, c)
                    .with_bbox(PixelRect::new(xs[c], ys[r], xs[c + 1], ys[r + 1]))
            })
            .collect();
        let bbox = PixelRect::new(xs[0], ys[0], xs[cols], ys[rows]);

        tracing::debug!(
            target: "fallback",
            boxes = boxes.len(),
            rows,
            cols,
            "Detected ruling-line grid"
        );
        Some(TableStructure::fallback(bbox, rows, cols, cells))
    }
}

/// Detects a grid with the given parameters. See [`FallbackGridDetector::detect`].
pub fn detect_grid(image: &RgbImage, config: &FallbackGridConfig) -> Option<TableStructure> {
    FallbackGridDetector::new(config.clone()).detect(image)
}

/// Sorts `values` and merges every value within `threshold` of the current
/// cluster representative into that cluster.
///
/// The representative is the smallest member, so the result is strictly
/// increasing and consecutive entries differ by more than `threshold`.
pub fn cluster_positions(mut values: Vec<i32>, threshold: i32) -> Vec<i32> {
    values.sort_unstable();
    let mut clusters: Vec<i32> = Vec::new();
    for v in values {
        match clusters.last() {
            Some(&last) if (v - last).abs() <= threshold => {}
            _ => clusters.push(v),
        }
    }
    clusters
}

/// Adaptive mean thresholding, inverted: dark pixels become [`INK`].
///
/// A pixel is ink when its intensity is at most the mean of the surrounding
/// `block_size x block_size` window minus `offset`. Windows are clipped at the
/// image border.
fn adaptive_threshold_mean(gray: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let (w, h) = gray.dimensions();
    // (w + 1) x (h + 1); entry (x, y) sums gray[0..y][0..x]
    let integral: ImageBuffer<Luma<i64>, Vec<i64>> = integral_image(gray);
    let at = |x: u32, y: u32| integral.get_pixel(x, y)[0];

    let half = block_size / 2;
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        let y0 = y.saturating_sub(half);
        let y1 = (y + half).min(h - 1) + 1;
        for x in 0..w {
            let x0 = x.saturating_sub(half);
            let x1 = (x + half).min(w - 1) + 1;
            let area = i64::from((y1 - y0) * (x1 - x0));
            let sum = at(x1, y1) - at(x1, y0) - at(x0, y1) + at(x0, y0);
            let mean = (sum + area / 2) / area;
            if i64::from(gray.get_pixel(x, y)[0]) <= mean - i64::from(offset) {
                out.put_pixel(x, y, Luma([INK]));
            }
        }
    }
    out
}

/// Morphological opening with a `min_len x 1` rectangle: keeps only the ink
/// pixels that belong to a horizontal run of at least `min_len` pixels.
fn keep_horizontal_runs(mask: &GrayImage, min_len: u32) -> GrayImage {
    let (w, h) = mask.dimensions();
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        let mut x = 0;
        while x < w {
            if mask.get_pixel(x, y)[0] == 0 {
                x += 1;
                continue;
            }
            let start = x;
            while x < w && mask.get_pixel(x, y)[0] != 0 {
                x += 1;
            }
            if x - start >= min_len {
                for xx in start..x {
                    out.put_pixel(xx, y, Luma([INK]));
                }
            }
        }
    }
    out
}

/// Vertical counterpart of [`keep_horizontal_runs`].
fn keep_vertical_runs(mask: &GrayImage, min_len: u32) -> GrayImage {
    let (w, h) = mask.dimensions();
    let mut out = GrayImage::new(w, h);
    for x in 0..w {
        let mut y = 0;
        while y < h {
            if mask.get_pixel(x, y)[0] == 0 {
                y += 1;
                continue;
            }
            let start = y;
            while y < h && mask.get_pixel(x, y)[0] != 0 {
                y += 1;
            }
            if y - start >= min_len {
                for yy in start..y {
                    out.put_pixel(x, yy, Luma([INK]));
                }
            }
        }
    }
    out
}

/// Equal-weight blend of two masks. Any pixel set in either input is nonzero
/// in the output.
fn blend_masks(a: &GrayImage, b: &GrayImage) -> GrayImage {
    let mut out = GrayImage::new(a.width(), a.height());
    for (dst, (pa, pb)) in out.pixels_mut().zip(a.pixels().zip(b.pixels())) {
        let v = (pa[0] as u16 + pb[0] as u16).div_ceil(2);
        *dst = Luma([v as u8]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn white_page(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([255, 255, 255]))
    }

    /// 2x2 ruled table: lines 3 px thick at x = 50, 200, 350 and y = 50, 150, 250.
    fn ruled_page() -> RgbImage {
        let mut page = white_page(400, 300);
        for y in [50, 150, 250] {
            draw_filled_rect_mut(&mut page, Rect::at(50, y).of_size(303, 3), BLACK);
        }
        for x in [50, 200, 350] {
            draw_filled_rect_mut(&mut page, Rect::at(x, 50).of_size(3, 203), BLACK);
        }
        page
    }

    fn near(actual: i32, expected: i32) -> bool {
        (actual - expected).abs() <= 3
    }

    #[test]
    fn test_cluster_positions() {
        assert_eq!(cluster_positions(vec![10, 12, 11, 50, 53], 10), vec![10, 50]);
        assert_eq!(cluster_positions(vec![], 10), Vec::<i32>::new());
        assert_eq!(cluster_positions(vec![5], 10), vec![5]);
    }

    #[test]
    fn test_cluster_representative_is_first_member() {
        // 0 opens a cluster; 8 and 10 join it (<= 10 from 0); 11 starts a new one
        assert_eq!(cluster_positions(vec![11, 10, 8, 0], 10), vec![0, 11]);
        // chained values do not drift the representative
        assert_eq!(cluster_positions(vec![0, 6, 12, 18], 10), vec![0, 12]);
    }

    #[test]
    fn test_cluster_threshold_zero_keeps_distinct_values() {
        assert_eq!(cluster_positions(vec![3, 1, 2, 2], 0), vec![1, 2, 3]);
    }

    #[test]
    fn test_adaptive_threshold_marks_dark_strokes() {
        let mut gray = GrayImage::from_pixel(60, 60, Luma([255]));
        for x in 10..50 {
            gray.put_pixel(x, 30, Luma([0]));
        }
        let binary = adaptive_threshold_mean(&gray, 25, 10);
        assert_eq!(binary.get_pixel(20, 30)[0], INK);
        assert_eq!(binary.get_pixel(20, 31)[0], 0);
        assert_eq!(binary.get_pixel(5, 5)[0], 0);
    }

    #[test]
    fn test_adaptive_threshold_follows_uneven_background() {
        // bright left half, dim right half, a faint stroke on each
        let mut gray = GrayImage::from_fn(60, 60, |x, _| Luma([if x < 30 { 200 } else { 100 }]));
        for x in 10..26 {
            gray.put_pixel(x, 30, Luma([180]));
        }
        for x in 35..56 {
            gray.put_pixel(x, 30, Luma([80]));
        }
        let binary = adaptive_threshold_mean(&gray, 25, 10);
        assert_eq!(binary.get_pixel(15, 30)[0], INK);
        assert_eq!(binary.get_pixel(50, 30)[0], INK);
        assert_eq!(binary.get_pixel(5, 5)[0], 0);
        assert_eq!(binary.get_pixel(50, 10)[0], 0);
    }

    #[test]
    fn test_run_filters_drop_short_strokes() {
        let mut mask = GrayImage::new(100, 100);
        for x in 0..60 {
            mask.put_pixel(x, 10, Luma([INK]));
        }
        for x in 0..20 {
            mask.put_pixel(x, 20, Luma([INK]));
        }
        let horizontal = keep_horizontal_runs(&mask, 40);
        assert_eq!(horizontal.get_pixel(59, 10)[0], INK);
        assert_eq!(horizontal.get_pixel(5, 20)[0], 0);

        let vertical = keep_vertical_runs(&mask, 40);
        assert!(vertical.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_blend_is_union() {
        let mut a = GrayImage::new(2, 1);
        let mut b = GrayImage::new(2, 1);
        a.put_pixel(0, 0, Luma([INK]));
        b.put_pixel(1, 0, Luma([INK]));
        let blended = blend_masks(&a, &b);
        assert!(blended.pixels().all(|p| p[0] > 0));
    }

    #[test]
    fn test_blank_page_has_no_grid() {
        let detector = FallbackGridDetector::default();
        assert!(detector.detect(&white_page(200, 200)).is_none());
    }

    #[test]
    fn test_text_like_marks_have_no_grid() {
        let mut page = white_page(300, 200);
        for i in 0..8 {
            draw_filled_rect_mut(&mut page, Rect::at(20 + i * 30, 50).of_size(12, 18), BLACK);
        }
        assert!(FallbackGridDetector::default().detect(&page).is_none());
    }

    #[test]
    fn test_ruled_table_grid() {
        let grid = detect_grid(&ruled_page(), &FallbackGridConfig::default())
            .expect("grid should be detected");

        assert!(grid.is_fallback());
        assert_eq!((grid.rows, grid.cols), (2, 2));
        assert_eq!(grid.cells.len(), 4);

        let bbox = grid.bbox.unwrap();
        assert!(near(bbox.x1, 50) && near(bbox.y1, 50));
        assert!(near(bbox.x2, 350) && near(bbox.y2, 250));

        let positions: Vec<_> = grid.cells.iter().map(|c| (c.row, c.col)).collect();
        assert_eq!(positions, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);

        let top_left = grid.cells[0].bbox.unwrap();
        assert_eq!((top_left.x1, top_left.y1), (bbox.x1, bbox.y1));
        assert!(near(top_left.x2, 200) && near(top_left.y2, 150));

        // adjacent cells share their boundary
        let top_right = grid.cells[1].bbox.unwrap();
        assert_eq!(top_right.x1, top_left.x2);
        assert_eq!(top_right.x2, bbox.x2);
        assert!(grid.cells.iter().all(|c| c.rowspan == 1 && c.colspan == 1));
    }

    #[test]
    fn test_min_box_size_filters_small_evidence() {
        let config = FallbackGridConfig {
            min_box_size: 400,
            ..FallbackGridConfig::default()
        };
        assert!(detect_grid(&ruled_page(), &config).is_none());
    }
}
