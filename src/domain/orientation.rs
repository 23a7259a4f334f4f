//! Page rotation candidates and text-density scoring.
//!
//! Rotations follow the usual image convention of positive angles turning the
//! page counter-clockwise, with the canvas expanded so nothing is cropped. For
//! right-angle rotations this is an exact transpose/flip of the pixel grid.

use image::{RgbImage, imageops};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::text::{TextLine, pieces};

/// One of the four page rotations the corrector evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum RotationAngle {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl RotationAngle {
    /// Candidate order. Ties are resolved in favour of the earlier entry.
    pub const CANDIDATES: [RotationAngle; 4] = [
        RotationAngle::Deg0,
        RotationAngle::Deg90,
        RotationAngle::Deg180,
        RotationAngle::Deg270,
    ];

    pub fn degrees(self) -> u16 {
        match self {
            RotationAngle::Deg0 => 0,
            RotationAngle::Deg90 => 90,
            RotationAngle::Deg180 => 180,
            RotationAngle::Deg270 => 270,
        }
    }

    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(RotationAngle::Deg0),
            90 => Some(RotationAngle::Deg90),
            180 => Some(RotationAngle::Deg180),
            270 => Some(RotationAngle::Deg270),
            _ => None,
        }
    }

    /// Rotates `image` counter-clockwise by this angle.
    pub fn apply(self, image: &RgbImage) -> RgbImage {
        match self {
            RotationAngle::Deg0 => image.clone(),
            // imageops rotates clockwise: 270° clockwise == 90° counter-clockwise.
            RotationAngle::Deg90 => imageops::rotate270(image),
            RotationAngle::Deg180 => imageops::rotate180(image),
            RotationAngle::Deg270 => imageops::rotate90(image),
        }
    }
}

impl std::fmt::Display for RotationAngle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

impl From<RotationAngle> for u16 {
    fn from(angle: RotationAngle) -> Self {
        angle.degrees()
    }
}

impl TryFrom<u16> for RotationAngle {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        RotationAngle::from_degrees(degrees)
            .ok_or_else(|| format!("unsupported rotation angle: {degrees}"))
    }
}

/// How the page orientation is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationStrategy {
    /// Try all four rotations and keep the best-scoring one.
    #[default]
    OcrScore,
    /// Keep the page as rendered, without calling the text oracle.
    None,
}

impl FromStr for RotationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ocr_score" => Ok(RotationStrategy::OcrScore),
            "none" => Ok(RotationStrategy::None),
            other => Err(format!(
                "unknown rotation strategy '{other}', expected 'ocr_score' or 'none'"
            )),
        }
    }
}

/// The outcome of evaluating one rotation candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationChoice {
    pub angle: RotationAngle,
    pub score: f32,
}

/// Returns true for characters in the CJK Unified Ideographs block (U+4E00..=U+9FFF).
pub fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Scores recognized text for readability.
///
/// `2 * cjk + chars + confidence_sum / chars`, or 0 when nothing was recognized.
/// Confidence is summed per piece but averaged per character, so the last term
/// stays small and mostly breaks ties between equally dense candidates.
pub fn score_text_lines(lines: &[TextLine]) -> f32 {
    let mut total_confidence = 0.0f32;
    let mut total_chars = 0usize;
    let mut cjk_chars = 0usize;

    for piece in pieces(lines) {
        total_confidence += piece.confidence;
        total_chars += piece.text.chars().count();
        cjk_chars += piece.text.chars().filter(|&c| is_cjk_ideograph(c)).count();
    }

    if total_chars == 0 {
        return 0.0;
    }

    let average_confidence = total_confidence / total_chars as f32;
    (cjk_chars * 2 + total_chars) as f32 + average_confidence
}
