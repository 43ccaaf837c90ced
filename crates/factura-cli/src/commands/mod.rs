pub mod batch;
pub mod classify;
pub mod extract;
pub mod formats;

use std::path::Path;
use std::time::Duration;

use factura_core::acquire::pdftoppm::PdftoppmRasterizer;
use factura_core::acquire::tesseract::TesseractOcr;
use factura_core::{AcquireConfig, FacturaError, TextAcquisition};

/// Build a text acquisition over the system `pdftoppm` and `tesseract`
/// binaries, failing up front when either tool is missing.
pub(crate) fn acquisition(
    document: &Path,
    lang: &str,
    timeout: Option<u64>,
) -> Result<TextAcquisition, FacturaError> {
    if !document.is_file() {
        return Err(FacturaError::DocumentRead {
            path: document.to_path_buf(),
            reason: "no such file".to_string(),
        });
    }
    if !PdftoppmRasterizer::is_available() {
        return Err(FacturaError::RasterizerNotFound);
    }
    if !TesseractOcr::is_available() {
        return Err(FacturaError::OcrNotFound);
    }

    let config = AcquireConfig {
        language: lang.to_string(),
        page_timeout: timeout.map(Duration::from_secs),
        ..AcquireConfig::default()
    };
    Ok(TextAcquisition::new(
        document,
        Box::new(PdftoppmRasterizer::new()),
        Box::new(TesseractOcr::new()),
        config,
    ))
}
