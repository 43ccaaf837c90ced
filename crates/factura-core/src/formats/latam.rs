//! LATAM Airlines ticket receipts.
//!
//! Ticket layouts interleave labels and values across columns, so most
//! patterns span line breaks.

use super::{extract_with_specs, pattern_dotall, FieldSpec, FormatExtractor};
use crate::amount::AmountStrategy;
use crate::model::{FieldMap, FormatLabel};

const DEFAULT_LEGAL_NAME: &str = "LATAM AIRLINES COLOMBIA";

pub struct LatamExtractor {
    specs: Vec<FieldSpec>,
}

impl LatamExtractor {
    pub fn new() -> Self {
        let specs = vec![
            FieldSpec::text(
                "issue_date",
                vec![
                    pattern_dotall(r"Ciudad\s+y\s+Fecha\s+de\s+emisi[oó]n\s+[^0-9]*(\d{2}/\d{2}/\d{2})"),
                    pattern_dotall(r"Fecha\s+de\s+emisi[oó]n[:\s]*(\d{2}/\d{2}/\d{2})"),
                    pattern_dotall(r"Colombia\s+(\d{2}/\d{2}/\d{2})"),
                ],
            ),
            FieldSpec::text(
                "invoice_number",
                vec![
                    pattern_dotall(r"N\s*de\s+orden\s+([A-Z]{2}\d+[A-Z]+)"),
                    pattern_dotall(r"orden\s+([A-Z]{2}\d{7,}[A-Z]*)"),
                    pattern_dotall(r"de\s+orden\s+([A-Z0-9]{10,})"),
                    pattern_dotall(r"(LA\d{7,}[A-Z]+)"),
                ],
            ),
            FieldSpec::money(
                "total",
                vec![
                    pattern_dotall(r"Forma\s+de\s+pago\s+([\d.]+)"),
                    pattern_dotall(r"pago\s+([\d.]+)\s+Vuelo"),
                ],
            ),
            FieldSpec::money(
                "subtotal",
                vec![
                    pattern_dotall(r"Vuelo\s+\$\s*([\d.,]+)"),
                    pattern_dotall(r"Vuelo\s+([\d.,]+)"),
                    pattern_dotall(r"Pasaje\s+\$?\s*([\d.,]+)"),
                ],
            ),
            FieldSpec::money(
                "tax",
                vec![
                    pattern_dotall(r"Vuelo\s+[\d.]+\s+([\d.]+)"),
                    pattern_dotall(r"([\d.]+)\s+LATAM\s+Wallet"),
                ],
            ),
            FieldSpec::text(
                "legal_name",
                vec![
                    pattern_dotall(r"(AEROVIAS\s+DE\s+INTEGRACI[OÓ]N\s+REGIONAL\s+S\.A\.)"),
                    pattern_dotall(r"(AEROVIAS\s+DE\s+INTEGRACION\s+REGIONAL\s+S\s*A)"),
                    pattern_dotall(r"(LATAM\s+AIRLINES\s+COLOMBIA)"),
                ],
            ),
            FieldSpec::text(
                "issuer_tax_id",
                vec![
                    pattern_dotall(r"NIT\s+([\d.\-\s]+\-\s*\d)"),
                    pattern_dotall(r"NIT[:\s]*([\d.\-]+)"),
                ],
            ),
            FieldSpec::text(
                "client_tax_id",
                vec![
                    pattern_dotall(r"Documento\s+de\s+Identificaci[oó]n\s+(\d{7,})"),
                    pattern_dotall(r"Identificacion\s+(\d{7,})"),
                    pattern_dotall(r"Adulto\s+(\d{7,})"),
                    pattern_dotall(r"Adulto\s+\d+\s+(\d{7,})"),
                    pattern_dotall(r"Tipo\s+de\s+pasajero.*?(\d{10})"),
                    pattern_dotall(r"(\d{10})"),
                ],
            ),
        ];
        LatamExtractor { specs }
    }
}

impl Default for LatamExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatExtractor for LatamExtractor {
    fn label(&self) -> FormatLabel {
        FormatLabel::Latam
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
        AmountStrategy::IntegerPesos
    }

    fn matches(&self, text: &str) -> bool {
        let upper = text.to_uppercase();
        (upper.contains("LATAM") && upper.contains("AIRLINES"))
            || (upper.contains("AEROVIAS") && upper.contains("REGIONAL"))
            || upper.contains("TIQUETE DE TRANSPORTE")
    }

    fn extract_fields(&self, text: &str) -> FieldMap {
        let mut fields = extract_with_specs(text, &self.specs, self.amount_strategy());
        // The issuer name is fixed for this carrier; fill it in when the
        // scanned header is unreadable.
        if fields.get("legal_name").map(|v| v.is_empty()).unwrap_or(true) {
            fields.insert("legal_name".to_string(), DEFAULT_LEGAL_NAME.to_string());
        }
        fields
    }
}
