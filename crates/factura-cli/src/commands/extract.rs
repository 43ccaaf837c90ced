use std::path::PathBuf;

use factura_core::{Classifier, FacturaError, FormatLabel, Pipeline};

use crate::output;

pub fn run(
    document: PathBuf,
    format: Option<String>,
    output_format: &str,
    out: Option<PathBuf>,
    structural: bool,
    lang: &str,
    timeout: Option<u64>,
) -> Result<(), FacturaError> {
    let override_label = match format {
        Some(name) => {
            let label = FormatLabel::from_str_loose(&name);
            if !label.is_known() {
                return Err(FacturaError::UnsupportedFormat(label));
            }
            Some(label)
        }
        None => None,
    };

    let mut acquisition = super::acquisition(&document, lang, timeout)?;
    let classifier = if structural {
        Classifier::with_structural()
    } else {
        Classifier::new()
    };
    let report = Pipeline::with_classifier(classifier).process(&mut acquisition, override_label)?;

    if let Some(path) = out {
        output::csv::write_file(&report, &path)?;
        println!("{}", path.display());
        return Ok(());
    }

    match output_format {
        "json" => output::json::print(&report)?,
        "csv" => output::csv::print(&report)?,
        _ => output::table::print(&report),
    }

    Ok(())
}
