//! Pipeline coordination: classify, pick the variant, extract, validate.

use crate::acquire::{AcquireMode, TextAcquisition};
use crate::classify::{sample_too_short, Classifier};
use crate::error::FacturaError;
use crate::formats::{self, validate};
use crate::model::{ExtractionReport, FormatLabel, CANONICAL_FIELDS};

/// Run the registered variant for `label` over unified text.
///
/// `Unknown` or an unregistered label fails with `UnsupportedFormat`
/// before any variant runs. Validation failures are not errors: the
/// report carries `success: false` plus the missing-field list.
pub fn extract(text: &str, label: FormatLabel) -> Result<ExtractionReport, FacturaError> {
    let Some(extractor) = formats::lookup(label) else {
        return Err(FacturaError::UnsupportedFormat(label));
    };

    let fields = extractor.extract_fields(text);
    let missing = validate(extractor, &fields);

    // Advisory only: formats legitimately promise subsets of the
    // canonical eight, but a gap is still worth surfacing in the logs.
    for field in CANONICAL_FIELDS {
        let unfilled = fields.get(*field).map(|v| v.is_empty()).unwrap_or(true);
        if unfilled && !missing.iter().any(|m| m == field) {
            tracing::warn!(%label, field, "canonical field not populated by this format");
        }
    }

    if !missing.is_empty() {
        tracing::info!(%label, missing = ?missing, "extraction incomplete");
    }

    Ok(ExtractionReport {
        label,
        success: missing.is_empty(),
        fields,
        missing,
    })
}

/// End-to-end pipeline over one document: quick OCR sample, full-mode
/// escalation when the sample is too thin, classification (unless the
/// caller supplies a label), then extraction over full-mode text.
pub struct Pipeline {
    classifier: Classifier,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline {
            classifier: Classifier::new(),
        }
    }

    pub fn with_classifier(classifier: Classifier) -> Self {
        Pipeline { classifier }
    }

    pub fn process(
        &self,
        acquisition: &mut TextAcquisition,
        label_override: Option<FormatLabel>,
    ) -> Result<ExtractionReport, FacturaError> {
        let mut text = acquisition.unified_text(AcquireMode::Quick, false);
        let mut have_full = false;
        if sample_too_short(&text) {
            tracing::info!(
                document = %acquisition.document().display(),
                chars = text.trim().len(),
                "quick sample too short, re-acquiring in full mode"
            );
            // Force past the cache, otherwise the stale quick text wins.
            text = acquisition.unified_text(AcquireMode::Full, true);
            have_full = true;
        }
        if text.trim().is_empty() {
            return Err(FacturaError::UnknownFormat);
        }

        let label = match label_override {
            Some(label) => label,
            None => self.classifier.classify(&text),
        };
        if label == FormatLabel::Unknown {
            return Err(FacturaError::UnknownFormat);
        }
        tracing::info!(%label, document = %acquisition.document().display(), "processing document");

        // The quick sample renders only the first page; extraction needs
        // every page of the document.
        if !have_full {
            let complete = acquisition.unified_text(AcquireMode::Full, true);
            if complete.trim().is_empty() {
                tracing::warn!(
                    document = %acquisition.document().display(),
                    "full-mode re-acquisition came back empty, extracting from the quick sample"
                );
            } else {
                text = complete;
            }
        }

        extract(&text, label)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
