//! Procafecol (Juan Valdez) store invoices.

use super::{extract_with_specs, pattern, FieldSpec, FormatExtractor};
use crate::amount::AmountStrategy;
use crate::model::{FieldMap, FormatLabel};

pub struct ProcafeExtractor {
    specs: Vec<FieldSpec>,
}

impl ProcafeExtractor {
    pub fn new() -> Self {
        let specs = vec![
            FieldSpec::text(
                "issuer_tax_id",
                vec![
                    pattern(r"NIT[:\s]*([0-9.\- ]+)"),
                    pattern(r"N\.?I\.?T\.?[:\s]*([0-9.\- ]+)"),
                    pattern(r"NIT\s*No\.?\s*[:\-]?\s*([0-9.\- ]+)"),
                    pattern(r"NIT\s+([0-9]{3,}[\- ]?[0-9]+)"),
                ],
            ),
            FieldSpec::text(
                "client_tax_id",
                vec![
                    pattern(r"C[eé]dula\s+de\s+ciudadan[ií]a[:\s]*([0-9.\-]+)"),
                    pattern(r"C[eé]dula[:\s]*([0-9.\-]+)"),
                    pattern(r"C\.?C\.?[:\s]*([0-9.\-]+)"),
                    pattern(r"Identificaci[oó]n[:\s]*([0-9.\-]+)"),
                    pattern(r"Documento\s*(?:No\.?|N[°o]|#)?[:\s]*([0-9.\-]+)"),
                ],
            ),
            FieldSpec::text(
                "issue_date",
                vec![
                    pattern(r"Fecha\s+de\s+Emisi[oó]n[:\s\-]*([0-9]{4}[-/][0-9]{2}[-/][0-9]{2})"),
                    pattern(r"Fecha\s+Emisi[oó]n[:\s\-]*([0-9]{4}[-/][0-9]{2}[-/][0-9]{2})"),
                    pattern(r"Fecha\s+de\s+Emisi[oó]n[:\s\-]*([0-9]{2}[-/][0-9]{2}[-/][0-9]{4})"),
                    pattern(r"Fecha\s+Emisi[oó]n[:\s\-]*([0-9]{2}[-/][0-9]{2}[-/][0-9]{4})"),
                ],
            ),
            FieldSpec::text(
                "legal_name",
                vec![
                    pattern(r"Raz[oó]n\s*Social\s*/\s*Nombre[:\s]*([A-Z0-9ÁÉÍÓÚÑÜ.\-&\s]+)"),
                    pattern(r"Raz[oó]n\s*Social\s*[:\s]*([A-Z0-9ÁÉÍÓÚÑÜ.\-&\s]+)"),
                    pattern(r"Nombre\s*/\s*Raz[oó]n\s*Social[:\s]*([A-Z0-9ÁÉÍÓÚÑÜ.\-&\s]+)"),
                    pattern(r"Nombre\s*[:\s]*([A-Z0-9ÁÉÍÓÚÑÜ.\-&\s]+)"),
                ],
            ),
            FieldSpec::text(
                "invoice_number",
                vec![
                    pattern(r"FACTURA\s+ELECTR[OÓ]NICA\s+DE\s+VENTA\s*[:\-]?\s*(?:No\.?|N[°o]|#)?\s*(F\-?\d+)"),
                    pattern(r"FACTURA\s+DE\s+VENTA\s+ELECTR[OÓ]NICA\s*[:\-]?\s*(?:No\.?|N[°o]|#)?\s*(F\-?\d+)"),
                    pattern(r"FACTURA\s+ELECTR[OÓ]NICA\s*[:\-]?\s*(?:No\.?|N[°o]|#)?\s*(F\-?\d+)"),
                    pattern(r"FACTURA\s+DE\s+VENTA\s*[:\-]?\s*(?:No\.?|N[°o]|#)?\s*(F\-?\d+)"),
                    pattern(r"(?:^|\n)\s*(F\d{5,})"),
                ],
            ),
            FieldSpec::money(
                "subtotal",
                vec![
                    pattern(r"SUB\s*TOTAL[:\s]*\$?\s*([0-9.,]+)"),
                    pattern(r"SUB\s*TOTAL\s*BASE[:\s]*\$?\s*([0-9.,]+)"),
                ],
            ),
            FieldSpec::money(
                "tax",
                vec![
                    pattern(r"IVA[:\s]*\$?\s*([0-9.,]+)"),
                    pattern(r"Impuesto\s*IVA[:\s]*\$?\s*([0-9.,]+)"),
                    pattern(r"IVA\s*\d{1,2}\s*[:\-]?\s*\$?\s*([0-9.,]+)"),
                ],
            ),
            FieldSpec::money("total", vec![pattern(r"VALOR TOTAL[:\s]*([0-9., ]+)")]),
        ];
        ProcafeExtractor { specs }
    }
}

impl Default for ProcafeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatExtractor for ProcafeExtractor {
    fn label(&self) -> FormatLabel {
        FormatLabel::Procafe
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
        upper.contains("PROCAFECOL") || upper.contains("FACTURA ELECTRÓNICA DE VENTA")
    }

    fn extract_fields(&self, text: &str) -> FieldMap {
        let mut fields = extract_with_specs(text, &self.specs, self.amount_strategy());
        // The name patterns run on to the next label; keep the leading token.
        if let Some(name) = fields.get_mut("legal_name") {
            if let Some(first) = name.split_whitespace().next() {
                *name = first.to_string();
            }
        }
        fields
    }
}
