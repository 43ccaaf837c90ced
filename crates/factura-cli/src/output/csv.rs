use std::io;
use std::path::Path;

use factura_core::{ExtractionReport, FacturaError};

/// Two-column export, one row per field in the report.
pub fn print(report: &ExtractionReport) -> Result<(), FacturaError> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    write_rows(&mut writer, report)
}

pub fn write_file(report: &ExtractionReport, path: &Path) -> Result<(), FacturaError> {
    let mut writer = csv::Writer::from_path(path).map_err(into_io)?;
    write_rows(&mut writer, report)
}

fn write_rows<W: io::Write>(
    writer: &mut csv::Writer<W>,
    report: &ExtractionReport,
) -> Result<(), FacturaError> {
    writer.write_record(["field", "value"]).map_err(into_io)?;
    for (field, value) in &report.fields {
        writer
            .write_record([field.as_str(), value.as_str()])
            .map_err(into_io)?;
    }
    writer.flush()?;
    Ok(())
}

fn into_io(e: csv::Error) -> FacturaError {
    FacturaError::Io(io::Error::new(io::ErrorKind::Other, e))
}
