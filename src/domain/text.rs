//! Recognized text as returned by the text oracle.

use serde::{Deserialize, Serialize};

/// One recognized fragment and its confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPiece {
    pub text: String,
    pub confidence: f32,
}

impl TextPiece {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// A recognized line, made of one or more pieces.
pub type TextLine = Vec<TextPiece>;

/// Iterates over every piece of every line.
pub fn pieces(lines: &[TextLine]) -> impl Iterator<Item = &TextPiece> {
    lines.iter().flatten()
}
