//! Taberna point-of-sale receipts.

use super::{pattern, FieldSpec, FormatExtractor};
use crate::amount::AmountStrategy;
use crate::model::FormatLabel;

pub struct TabernaExtractor {
    specs: Vec<FieldSpec>,
}

impl TabernaExtractor {
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
                "issue_date",
                vec![
                    pattern(r"FECHA[:\s]*(\d{2}/\d{2}/\d{4})"),
                    pattern(r"FECHA[:\s]*(\d{2}-\d{2}-\d{4})"),
                ],
            ),
            FieldSpec::text(
                "legal_name",
                vec![
                    pattern(r"RAZ[OÓ]N SOCIAL[:\s]*([^\n]+)"),
                    pattern(r"CLIENTE[:\s]*([^\n]+)"),
                ],
            ),
            FieldSpec::text(
                "invoice_number",
                vec![
                    pattern(r"FACTURA No\.[:\s]*([A-Z0-9\-]+)"),
                    pattern(r"FACTURA[:\s]*([A-Z0-9\-]+)"),
                ],
            ),
            FieldSpec::money("subtotal", vec![pattern(r"SUBTOTAL[:\s]*([0-9.,]+)")]),
            FieldSpec::money("tax", vec![pattern(r"IVA[:\s]*([0-9.,]+)")]),
            FieldSpec::money("total", vec![pattern(r"TOTAL[:\s]*([0-9.,]+)")]),
        ];
        TabernaExtractor { specs }
    }
}

impl Default for TabernaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatExtractor for TabernaExtractor {
    fn label(&self) -> FormatLabel {
        FormatLabel::Taberna
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
        text.to_uppercase().contains("TABERNA")
    }
}
