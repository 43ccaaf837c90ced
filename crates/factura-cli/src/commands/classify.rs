use std::path::PathBuf;

use factura_core::acquire::AcquireMode;
use factura_core::classify::sample_too_short;
use factura_core::{Classifier, FacturaError};

/// Print the detected format label, `unknown` when no format matches.
pub fn run(
    document: PathBuf,
    structural: bool,
    lang: &str,
    timeout: Option<u64>,
) -> Result<(), FacturaError> {
    let mut acquisition = super::acquisition(&document, lang, timeout)?;

    let mut text = acquisition.unified_text(AcquireMode::Quick, false);
    if sample_too_short(&text) {
        text = acquisition.unified_text(AcquireMode::Full, true);
    }

    let classifier = if structural {
        Classifier::with_structural()
    } else {
        Classifier::new()
    };
    println!("{}", classifier.classify(&text));

    Ok(())
}
