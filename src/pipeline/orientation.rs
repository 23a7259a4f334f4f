//! Page orientation correction.
//!
//! Every quarter-turn of the page is run through the text recognizer and the
//! rotation whose text scores highest wins. Scanned pages come in sideways or
//! upside down often enough that this is done for every page unless disabled.

use std::path::{Path, PathBuf};

use image::RgbImage;
use rayon::prelude::*;

use crate::core::constants::DEFAULT_PARALLEL_THRESHOLD;
use crate::core::{PipelineResult, TextRecognizer};
use crate::domain::{OrientationChoice, RotationAngle, RotationStrategy, score_text_lines};
use crate::utils::save_image;

/// The chosen rotation of a page.
#[derive(Debug, Clone)]
pub struct CorrectedPage {
    /// The page rotated by `angle`.
    pub image: RgbImage,
    pub angle: RotationAngle,
    /// Score of every evaluated candidate, in evaluation order. Empty when
    /// correction is disabled.
    pub candidates: Vec<OrientationChoice>,
}

/// Picks the readable orientation of a page.
pub struct OrientationCorrector<'a> {
    recognizer: &'a dyn TextRecognizer,
    strategy: RotationStrategy,
    parallel_threshold: usize,
    debug_dir: Option<(PathBuf, usize)>,
}

impl<'a> OrientationCorrector<'a> {
    pub fn new(recognizer: &'a dyn TextRecognizer, strategy: RotationStrategy) -> Self {
        Self {
            recognizer,
            strategy,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            debug_dir: None,
        }
    }

    /// Candidates are evaluated in parallel when there are more than `threshold`.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Saves every candidate as `page_NNN_rot_<angle>.png` in `dir`.
    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>, page_index: usize) -> Self {
        self.debug_dir = Some((dir.into(), page_index));
        self
    }

    /// Returns the page in its most readable orientation.
    ///
    /// With [`RotationStrategy::None`] the page is returned unchanged at 0
    /// degrees and the recognizer is never called. Otherwise the four rotations
    /// are scored with [`score_text_lines`]; ties go to the earliest candidate
    /// in the order 0, 90, 180, 270.
    ///
    /// # Errors
    ///
    /// Propagates the first recognizer error, or a failure to save a debug image.
    pub fn correct(&self, image: &RgbImage) -> PipelineResult<CorrectedPage> {
        if self.strategy == RotationStrategy::None {
            return Ok(CorrectedPage {
                image: image.clone(),
                angle: RotationAngle::Deg0,
                candidates: Vec::new(),
            });
        }

        let candidates = RotationAngle::CANDIDATES;
        let evaluated: PipelineResult<Vec<(RotationAngle, RgbImage, f32)>> =
            if candidates.len() > self.parallel_threshold {
                candidates
                    .par_iter()
                    .map(|&angle| self.evaluate(image, angle))
                    .collect()
            } else {
                candidates
                    .iter()
                    .map(|&angle| self.evaluate(image, angle))
                    .collect()
            };
        let evaluated = evaluated?;

        if let Some((dir, page_index)) = &self.debug_dir {
            for (angle, rotated, _) in &evaluated {
                save_image(rotated, &candidate_path(dir, *page_index, *angle))?;
            }
        }

        let scores: Vec<OrientationChoice> = evaluated
            .iter()
            .map(|(angle, _, score)| OrientationChoice {
                angle: *angle,
                score: *score,
            })
            .collect();

        let mut best: Option<(RotationAngle, RgbImage, f32)> = None;
        for (angle, rotated, score) in evaluated {
            if best.as_ref().is_none_or(|(_, _, best_score)| score > *best_score) {
                best = Some((angle, rotated, score));
            }
        }

        let (angle, rotated, score) = match best {
            Some(best) => best,
            None => (RotationAngle::Deg0, image.clone(), 0.0),
        };
        tracing::debug!(target: "orientation", angle = angle.degrees(), score, "Selected page orientation");

        Ok(CorrectedPage {
            image: rotated,
            angle,
            candidates: scores,
        })
    }

    fn evaluate(
        &self,
        image: &RgbImage,
        angle: RotationAngle,
    ) -> PipelineResult<(RotationAngle, RgbImage, f32)> {
        let rotated = angle.apply(image);
        let lines = self.recognizer.recognize(&rotated)?;
        let score = score_text_lines(&lines);
        tracing::debug!(target: "orientation", angle = angle.degrees(), score, "Scored rotation candidate");
        Ok((angle, rotated, score))
    }
}

fn candidate_path(dir: &Path, page_index: usize, angle: RotationAngle) -> PathBuf {
    dir.join(format!("page_{page_index:03}_rot_{}.png", angle.degrees()))
}

/// Convenience wrapper over [`OrientationCorrector`] returning the rotated page
/// and the chosen angle.
pub fn correct_orientation(
    image: &RgbImage,
    recognizer: &dyn TextRecognizer,
    strategy: RotationStrategy,
) -> PipelineResult<(RgbImage, RotationAngle)> {
    let corrected = OrientationCorrector::new(recognizer, strategy).correct(image)?;
    Ok((corrected.image, corrected.angle))
}
