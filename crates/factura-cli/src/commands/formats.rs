use factura_core::formats::registry;
use factura_core::{FacturaError, CANONICAL_FIELDS};

pub fn list() -> Result<(), FacturaError> {
    println!("{:<10}  {}", "format", "required fields");
    for extractor in registry() {
        println!(
            "{:<10}  {}",
            extractor.label().as_str(),
            extractor.required_fields().join(", ")
        );
    }
    Ok(())
}

pub fn fields() -> Result<(), FacturaError> {
    for field in CANONICAL_FIELDS {
        println!("{field}");
    }
    Ok(())
}
