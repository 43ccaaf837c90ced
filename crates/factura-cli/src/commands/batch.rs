use std::fs;
use std::path::{Path, PathBuf};

use factura_core::{Classifier, FacturaError, Pipeline};

use crate::output;

/// Run extraction over every PDF in a directory, writing one CSV per
/// invoice. A failing document is reported and skipped, never aborting
/// the rest of the batch.
pub fn run(
    directory: PathBuf,
    out_dir: Option<PathBuf>,
    structural: bool,
    lang: &str,
    timeout: Option<u64>,
) -> Result<(), FacturaError> {
    let out_dir = out_dir.unwrap_or_else(|| directory.join("extracted"));
    fs::create_dir_all(&out_dir)?;

    let mut documents: Vec<PathBuf> = fs::read_dir(&directory)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_pdf(path))
        .collect();
    documents.sort();

    if documents.is_empty() {
        eprintln!("no PDF documents in {}", directory.display());
        return Ok(());
    }

    let mut complete = 0usize;
    let mut incomplete = 0usize;
    let mut failed = 0usize;

    for document in &documents {
        match process_one(document, &out_dir, structural, lang, timeout) {
            Ok(true) => complete += 1,
            Ok(false) => incomplete += 1,
            Err(e) => {
                failed += 1;
                eprintln!("{}: {e}", document.display());
            }
        }
    }

    eprintln!(
        "{complete} complete, {incomplete} incomplete, {failed} failed (of {})",
        documents.len()
    );
    Ok(())
}

fn process_one(
    document: &Path,
    out_dir: &Path,
    structural: bool,
    lang: &str,
    timeout: Option<u64>,
) -> Result<bool, FacturaError> {
    let mut acquisition = super::acquisition(document, lang, timeout)?;
    let classifier = if structural {
        Classifier::with_structural()
    } else {
        Classifier::new()
    };
    let report = Pipeline::with_classifier(classifier).process(&mut acquisition, None)?;

    let stem = document
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice");
    let target = out_dir.join(format!("{stem}_fields.csv"));
    output::csv::write_file(&report, &target)?;

    if !report.success {
        tracing::warn!(
            document = %document.display(),
            missing = ?report.missing,
            "incomplete extraction"
        );
    }
    Ok(report.success)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
