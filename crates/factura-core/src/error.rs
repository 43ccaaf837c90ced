use crate::model::FormatLabel;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FacturaError {
    #[error("pdftoppm not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    RasterizerNotFound,

    #[error("tesseract not found. Install tesseract-ocr and the Spanish language pack")]
    OcrNotFound,

    #[error("{tool} failed with exit code {code}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        code: i32,
        stderr: String,
    },

    #[error("{tool} did not finish within {seconds}s and was killed")]
    ToolTimeout { tool: &'static str, seconds: u64 },

    #[error("rasterization failed: {0}")]
    Rasterize(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("could not detect the invoice format. Pass the label manually to override")]
    UnknownFormat,

    #[error("unsupported invoice format '{0}'. No extractor is registered for this label")]
    UnsupportedFormat(FormatLabel),

    #[error("failed to read document {}: {reason}", .path.display())]
    DocumentRead { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
