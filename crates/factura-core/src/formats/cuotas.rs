//! Installment-plan invoices ("pago en cuotas").

use super::{pattern, FieldSpec, FormatExtractor};
use crate::amount::AmountStrategy;
use crate::model::FormatLabel;

pub struct CuotasExtractor {
    specs: Vec<FieldSpec>,
}

impl CuotasExtractor {
    pub fn new() -> Self {
        let specs = vec![
            FieldSpec::text("issuer_tax_id", vec![pattern(r"NIT[:\s]*([0-9.\-]+)")]),
            FieldSpec::text(
                "issue_date",
                vec![
                    pattern(r"FECHA DE EMISI[OÓ]N[:\s]*(\d{2}/\d{2}/\d{4})"),
                    pattern(r"FECHA[:\s]*(\d{2}-\d{2}-\d{4})"),
                ],
            ),
            FieldSpec::text(
                "legal_name",
                vec![
                    pattern(r"CLIENTE[:\s]*([^\n]+)"),
                    pattern(r"RAZ[OÓ]N SOCIAL[:\s]*([^\n]+)"),
                ],
            ),
            FieldSpec::text(
                "invoice_number",
                vec![pattern(r"FACTURA No\.[:\s]*([A-Z0-9\-]+)")],
            ),
            FieldSpec::money("subtotal", vec![pattern(r"SUBTOTAL[:\s]*([0-9.,]+)")]),
            FieldSpec::money(
                "tax",
                vec![
                    pattern(r"IVA[:\s]*([0-9.,]+)"),
                    pattern(r"IMPUESTO[:\s]*([0-9.,]+)"),
                ],
            ),
            FieldSpec::money(
                "total",
                vec![
                    pattern(r"TOTAL A PAGAR[:\s]*([0-9.,]+)"),
                    pattern(r"TOTAL[:\s]*([0-9.,]+)"),
                ],
            ),
        ];
        CuotasExtractor { specs }
    }
}

impl Default for CuotasExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatExtractor for CuotasExtractor {
    fn label(&self) -> FormatLabel {
        FormatLabel::Cuotas
    }

    fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[
            "issuer_tax_id",
            "issue_date",
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
        upper.contains("FACTURA POR CUOTAS") || upper.contains("PAGO EN CUOTAS")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "FACTURA POR CUOTAS NIT: 800.123.456-1 \
        FACTURA No.: CU-0042 FECHA DE EMISIÓN: 01/06/2024 \
        CLIENTE: PEDRO PEREZ\nSUBTOTAL: 120.000,50 IVA: 22.800 TOTAL A PAGAR: 142.800,50";

    #[test]
    fn test_matches_installment_phrases() {
        let e = CuotasExtractor::new();
        assert!(e.matches("detalle del pago en cuotas"));
        assert!(e.matches("FACTURA POR CUOTAS No. 1"));
        assert!(!e.matches("factura ordinaria"));
    }

    #[test]
    fn test_extracts_required_fields() {
        let e = CuotasExtractor::new();
        let fields = e.extract_fields(SAMPLE);
        assert_eq!(fields["issuer_tax_id"], "800.123.456-1");
        assert_eq!(fields["issue_date"], "01/06/2024");
        assert_eq!(fields["invoice_number"], "CU-0042");
        assert_eq!(fields["legal_name"], "PEDRO PEREZ");
        assert_eq!(fields["total"], "142.800,50");
    }

    #[test]
    fn test_total_prefers_a_pagar_label() {
        let e = CuotasExtractor::new();
        let fields = e.extract_fields("TOTAL: 1,00 TOTAL A PAGAR: 2,50");
        assert_eq!(fields["total"], "2,50");
    }
}
