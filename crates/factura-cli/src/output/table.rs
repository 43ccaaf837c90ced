use factura_core::ExtractionReport;

pub fn print(report: &ExtractionReport) {
    println!("=== {} ===\n", report.label.as_str());

    let max_name = report
        .fields
        .keys()
        .map(|k| k.len())
        .max()
        .unwrap_or(10);

    for (field, value) in &report.fields {
        let shown = if value.is_empty() { "-" } else { value.as_str() };
        println!("  {:<width$}  {}", field, shown, width = max_name);
    }

    if !report.missing.is_empty() {
        println!("\n  Missing required fields: {}", report.missing.join(", "));
    }
}
