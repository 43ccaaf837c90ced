//! Tiendas D1 discount-store invoices.

use super::{extract_with_specs, pattern_dotall, FieldSpec, FormatExtractor};
use crate::amount::AmountStrategy;
use crate::model::{FieldMap, FormatLabel};

const DEFAULT_LEGAL_NAME: &str = "D1 S A S";

pub struct D1Extractor {
    specs: Vec<FieldSpec>,
}

impl D1Extractor {
    pub fn new() -> Self {
        let specs = vec![
            FieldSpec::text(
                "issue_date",
                vec![pattern_dotall(r"FECHA:\s*(\d{4}-\d{2}-\d{2})")],
            ),
            FieldSpec::text(
                "invoice_number",
                vec![
                    pattern_dotall(r"FACTURA\s+ELECTR[OÓ]NICA\s+DE\s+VENTA\s+N:\s*([A-Z0-9]+)"),
                    pattern_dotall(r"VENTA\s+N:\s*([A-Z0-9]+)"),
                ],
            ),
            FieldSpec::money(
                "total",
                vec![
                    pattern_dotall(r"TOTAL:\s*([\d.,]+)"),
                    pattern_dotall(r"TOTALES\s+DE\s+FACTURA.*?TOTAL:\s*([\d.,]+)"),
                ],
            ),
            FieldSpec::money("subtotal", vec![pattern_dotall(r"SUBTOTAL:\s*([\d.,]+)")]),
            FieldSpec::money(
                "tax",
                vec![
                    pattern_dotall(r"IVA:\s*([\d.,]+)"),
                    pattern_dotall(r"TOTALES\s+DE\s+FACTURA.*?IVA:\s*([\d.,]+)"),
                ],
            ),
            FieldSpec::text(
                "legal_name",
                vec![pattern_dotall(r"(D1\s+S\s*A\s*S)")],
            ),
            FieldSpec::text(
                "issuer_tax_id",
                vec![
                    pattern_dotall(r"D1\s+S\s+A\s+S\s+NIT\s+([\d\-]+)"),
                    pattern_dotall(r"NIT\s+([\d\-]+)"),
                ],
            ),
            FieldSpec::text(
                "client_tax_id",
                vec![
                    pattern_dotall(r"NUM\.\s+DOCUMENTO:\s*(\d+)"),
                    pattern_dotall(r"DOCUMENTO:\s*(\d+)"),
                ],
            ),
        ];
        D1Extractor { specs }
    }
}

impl Default for D1Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatExtractor for D1Extractor {
    fn label(&self) -> FormatLabel {
        FormatLabel::D1
    }

    fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[
            "issue_date",
            "invoice_number",
            "total",
            "subtotal",
            "tax",
            "legal_name",
            "issuer_tax_id",
            "client_tax_id",
        ]
    }

    fn amount_strategy(&self) -> AmountStrategy {
        AmountStrategy::SeparatorHeuristic
    }

    fn matches(&self, text: &str) -> bool {
        let upper = text.to_uppercase();
        let has_d1 = upper.contains("D1") && (upper.contains("S A S") || upper.contains("SAS"));
        let has_indicators = upper.contains("FACTURA ELECTRÓNICA")
            || upper.contains("FACTURA ELECTRONICA")
            || upper.contains("TIENDA-");
        has_d1 && has_indicators
    }

    fn extract_fields(&self, text: &str) -> FieldMap {
        let mut fields = extract_with_specs(text, &self.specs, self.amount_strategy());
        if fields.get("legal_name").map(|v| v.is_empty()).unwrap_or(true) {
            fields.insert("legal_name".to_string(), DEFAULT_LEGAL_NAME.to_string());
        }
        fields
    }
}
