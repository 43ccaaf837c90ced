//! Format detection over unified OCR text.
//!
//! Three ordered stages, first decision wins: a keyword scan over
//! whitespace-stripped uppercase text, the per-format belongs-to-me
//! predicates in registry order, and an optional structural fallback
//! that is off unless explicitly enabled.

pub mod keywords;
pub mod structure;

pub use keywords::keyword_scan;
pub use structure::{structural_scan, StructureMetrics};

use crate::formats::registry;
use crate::model::FormatLabel;

/// Samples shorter than this are too thin to classify; callers should
/// re-acquire in full mode before trying again.
pub const MIN_SAMPLE_LEN: usize = 100;

/// True when the sample is below the re-acquisition threshold.
pub fn sample_too_short(text: &str) -> bool {
    text.trim().len() < MIN_SAMPLE_LEN
}

/// Probe each registered variant's predicate in registry order.
fn registry_probe(text: &str) -> Option<FormatLabel> {
    registry().iter().find(|e| e.matches(text)).map(|e| e.label())
}

pub struct Classifier {
    structural: bool,
}

impl Classifier {
    pub fn new() -> Self {
        Classifier { structural: false }
    }

    /// Enable the structural fallback as a last resort after both
    /// earlier stages decline.
    pub fn with_structural() -> Self {
        Classifier { structural: true }
    }

    pub fn classify(&self, text: &str) -> FormatLabel {
        if let Some(label) = keyword_scan(text) {
            tracing::debug!(%label, stage = "keywords", "format detected");
            return label;
        }
        if let Some(label) = registry_probe(text) {
            tracing::debug!(%label, stage = "predicates", "format detected");
            return label;
        }
        if self.structural {
            if let Some(label) = structural_scan(text) {
                tracing::debug!(%label, stage = "structure", "format detected");
                return label;
            }
        }
        FormatLabel::Unknown
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify with the default stage set (keywords, then predicates).
pub fn classify(text: &str) -> FormatLabel {
    Classifier::new().classify(text)
}
