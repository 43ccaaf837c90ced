pub mod acquire;
pub mod amount;
pub mod classify;
pub mod error;
pub mod formats;
pub mod model;
pub mod pipeline;

pub use acquire::{AcquireConfig, AcquireMode, OcrEngine, Rasterizer, TextAcquisition};
pub use amount::{normalize_amount, normalize_amount_with, AmountStrategy};
pub use classify::{classify, Classifier};
pub use error::FacturaError;
pub use model::{ExtractionReport, FieldMap, FormatLabel, CANONICAL_FIELDS, PAGE_BREAK};
pub use pipeline::{extract, Pipeline};

/// Process one scanned invoice end to end with the default pipeline:
/// quick OCR sample, full-mode escalation when the sample is thin,
/// classification, then field extraction for the detected format.
pub fn process_document(
    acquisition: &mut TextAcquisition,
    label_override: Option<FormatLabel>,
) -> Result<ExtractionReport, FacturaError> {
    Pipeline::new().process(acquisition, label_override)
}
