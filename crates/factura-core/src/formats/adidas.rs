//! Adidas Colombia retail invoices.
//!
//! The scans are noisy; only the two tax ids are reliable enough to
//! require, the rest is best effort.

use super::{pattern, FieldSpec, FormatExtractor};
use crate::amount::AmountStrategy;
use crate::model::FormatLabel;

pub struct AdidasExtractor {
    specs: Vec<FieldSpec>,
}

impl AdidasExtractor {
    pub fn new() -> Self {
        let specs = vec![
            FieldSpec::text(
                "issuer_tax_id",
                vec![
                    pattern(r"NIT[:\s]*([0-9.\-]+)"),
                    pattern(r"N\.?I\.?T\.?[:\s]*([0-9\-]+)"),
                ],
            ),
            FieldSpec::text(
                "client_tax_id",
                vec![
                    pattern(r"(?:Identificaci[oó]n|Nit Cliente)[:\s]*([0-9.\-]+)"),
                    pattern(r"Cliente[:\sA-Za-z]*([0-9]{6,})"),
                    // OCR mangles "Identificación" into "fina ni".
                    pattern(r"fina\s*ni[:\s]*([0-9]{6,})"),
                    pattern(r"([0-9]{7,}-\d)"),
                ],
            ),
            FieldSpec::text(
                "issue_date",
                vec![
                    pattern(r"Fecha y Hora[:\s]*(\d{2}/\d{2}/\d{4}\s*-\s*\d{2}:\d{2}:\d{2})"),
                    pattern(r"Fecha\s*[:\s]*(\d{2}/\d{2}/\d{4}\s+\d{2}:\d{2}:\d{2})"),
                ],
            ),
            FieldSpec::text(
                "legal_name",
                vec![
                    pattern(r"Adidas Colombia Ltda\.?"),
                    pattern(r"adidas\s*([^\n]+)"),
                ],
            ),
            FieldSpec::text(
                "invoice_number",
                vec![
                    pattern(r"N[uú]mero Interno[:\s]*([0-9]{17})"),
                    pattern(r"Num\.?\s*Interno[:\s]*([0-9]{17})"),
                ],
            ),
            FieldSpec::money("subtotal", vec![pattern(r"SUBTOTAL[:\s]*([0-9., ]+)")]),
            FieldSpec::money(
                "tax",
                vec![
                    pattern(r"IVA[:\s]+[0-9.,]+\s*([0-9.,]+[0-9])"),
                    pattern(r"IMPUESTO\s*[A-Z]*\s*([0-9., ]+)"),
                ],
            ),
        ];
        AdidasExtractor { specs }
    }
}

impl Default for AdidasExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatExtractor for AdidasExtractor {
    fn label(&self) -> FormatLabel {
        FormatLabel::Adidas
    }

    fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["issuer_tax_id", "client_tax_id"]
    }

    fn amount_strategy(&self) -> AmountStrategy {
        AmountStrategy::SeparatorHeuristic
    }

    fn matches(&self, text: &str) -> bool {
        let upper = text.to_uppercase();
        upper.contains("ADIDAS COLOMBIA LTDA") || upper.contains("805.011.074-2")
    }
}
