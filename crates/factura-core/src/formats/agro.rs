//! Agrocampo veterinary-supply invoices.

use super::{extract_with_specs, pattern, pattern_dotall, FieldSpec, FormatExtractor};
use crate::amount::AmountStrategy;
use crate::model::{FieldMap, FormatLabel};

pub struct AgroExtractor {
    specs: Vec<FieldSpec>,
}

impl AgroExtractor {
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
                    pattern_dotall(r"CLIENTE.*?NIT[^\d]*([\d\-]+)"),
                    pattern_dotall(r"NIT[^\d]*([\d\-]+).*?TEL"),
                ],
            ),
            FieldSpec::text(
                "issue_date",
                vec![
                    pattern(r"FECHA EMISI[OÓ]N[:\s]*(\d{2}/\d{2}/\d{4})"),
                    pattern(r"Fecha de emisi[oó]n[:\s]*(\d{2}-\d{2}-\d{4})"),
                ],
            ),
            FieldSpec::text(
                "legal_name",
                vec![
                    pattern(r"AGROCAMPO SAS Res\."),
                    pattern(r"ELABORADO POR\s*([^\n]+)"),
                ],
            ),
            FieldSpec::text(
                "invoice_number",
                vec![
                    pattern(r"FACTURA ELECTR[OÓ]NICA DE VENTA FACTURA ELECTR[OÓ]NICA DE\s+([A-Z0-9]+)"),
                    pattern(r"FACTURA\s+([A-Z0-9]+)"),
                ],
            ),
            FieldSpec::money("subtotal", vec![pattern(r"TOTAL BRUTO[:\s]*([0-9., ]+)")]),
            FieldSpec::money(
                "tax",
                vec![
                    pattern(r"IVA\s+[0-9.]+\s+([0-9.,]+[0-9])"),
                    pattern(r"VALOR\s*IMPUESTO\s*[0-9.]*\s*([0-9.,]+[0-9])"),
                    pattern(r"IMPUESTO\s*([0-9., ]+)"),
                    pattern(r"IVA\s*([0-9., ]+)"),
                ],
            ),
            FieldSpec::money("total", vec![pattern(r"VALOR TOTAL[:\s]*([0-9., ]+)")]),
        ];
        AgroExtractor { specs }
    }
}

impl Default for AgroExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatExtractor for AgroExtractor {
    fn label(&self) -> FormatLabel {
        FormatLabel::Agro
    }

    fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[
            "issuer_tax_id",
            "client_tax_id",
            "issue_date",
            "tax",
            "legal_name",
            "invoice_number",
            "total",
        ]
    }

    fn amount_strategy(&self) -> AmountStrategy {
        AmountStrategy::CommaDecimal
    }

    fn matches(&self, text: &str) -> bool {
        let upper = text.to_uppercase();
        upper.contains("AGROCAMPO SAS") || upper.contains("WWW.AGROCAMPO.COM.CO")
    }

    fn extract_fields(&self, text: &str) -> FieldMap {
        let mut fields = extract_with_specs(text, &self.specs, self.amount_strategy());
        // Legal-name patterns drag in trailing resolution text; keep the
        // leading token only.
        if let Some(name) = fields.get_mut("legal_name") {
            if let Some(first) = name.split_whitespace().next() {
                *name = first.to_string();
            }
        }
        fields
    }
}
