use factura_core::{ExtractionReport, FacturaError};

pub fn print(report: &ExtractionReport) -> Result<(), FacturaError> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}
