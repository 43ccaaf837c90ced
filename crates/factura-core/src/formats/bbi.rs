//! DIAN-style electronic invoices (BBI Colombia and lookalikes).

use super::{extract_with_specs, pattern, pattern_dotall, FieldSpec, FormatExtractor};
use crate::amount::AmountStrategy;
use crate::model::{FieldMap, FormatLabel};
use once_cell::sync::Lazy;
use regex::Regex;

static MATCH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        pattern(r"NOMBRE\s*COMERCIAL[:\s]*B+[^A-Z0-9]*I*\s*COLOMBIA"),
        pattern(r"RAZ[ÓO]N\s*SOCIAL[:\s]*B+I+\s*COLOMBIA"),
        pattern(r"BBI\s*COLOMBIA\s*S"),
        pattern(r"BBICOLOMBIASAS"),
        pattern(r"B8I\s*COLOMBIA"),
    ]
});

static ISSUER_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s.]").expect("invalid pattern"));

pub struct BbiExtractor {
    specs: Vec<FieldSpec>,
}

impl BbiExtractor {
    pub fn new() -> Self {
        let specs = vec![
            FieldSpec::text(
                "issue_date",
                vec![pattern(r"Fecha de Emisi[oó]n:\s*(\d{2}[/\-]\d{2}[/\-]\d{4})")],
            ),
            FieldSpec::text(
                "invoice_number",
                vec![
                    pattern(r"N[uú]mero de Factura[:\s]*([\w\-]+)"),
                    pattern(r"\b(\d{3,4}[A-Z\-]*\d{4,5})\b"),
                ],
            ),
            FieldSpec::money(
                "total",
                vec![
                    pattern(r"Total factura COP\s*([\d.,]+)"),
                    pattern(r"Total factura[^\d]*([\d.,]{5,})"),
                    pattern(r"Total neto factura[^\d]*([\d.,]+)"),
                ],
            ),
            FieldSpec::money(
                "subtotal",
                vec![
                    pattern(r"Subtotal\s*([\d.,]+)"),
                    pattern(r"Subtota[l]*[\w\s]{0,10}?([\d.,]{3,15})"),
                ],
            ),
            FieldSpec::money(
                "tax",
                vec![
                    pattern(r"Total impuesto\s*([\d.,]+)"),
                    pattern(r"IVA\s*[\d.,%]*\s*([\d.,]+)"),
                    pattern(r"IMPUESTOS\s*([\d.,]+)"),
                ],
            ),
            FieldSpec::text(
                "legal_name",
                vec![
                    pattern(
                        r"Raz[oó]n Social[:\s]*([A-Z0-9\s.\-&]+?)\s*(?:Nombre Comercial|Nit del Emisor|Pa[ií]s|Tipo de Contribuyente|$)",
                    ),
                    pattern(
                        r"Nombre Comercial[:\s]*([A-Z0-9\s.\-&]+?)\s*(?:Nit del Emisor|Pa[ií]s|$)",
                    ),
                ],
            ),
            FieldSpec::text(
                "issuer_tax_id",
                vec![pattern(r"Nit del Emisor[:\s]*([\d.\-\s]{8,15})")],
            ),
            FieldSpec::text(
                "client_tax_id",
                vec![
                    pattern(r"N[uú]mero Documento[:\s]*(\d{8,12})"),
                    pattern_dotall(r"(?:Adquiriente|Comprador).*?NIT\D*(\d{8,12})"),
                ],
            ),
        ];
        BbiExtractor { specs }
    }
}

impl Default for BbiExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatExtractor for BbiExtractor {
    fn label(&self) -> FormatLabel {
        FormatLabel::Bbi
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
        AmountStrategy::DotThousands
    }

    fn matches(&self, text: &str) -> bool {
        let upper = text.to_uppercase();
        MATCH_PATTERNS.iter().any(|re| re.is_match(&upper)) || upper.contains("900860284")
    }

    fn extract_fields(&self, text: &str) -> FieldMap {
        let mut fields = extract_with_specs(text, &self.specs, self.amount_strategy());
        // OCR leaves dots and stray spaces inside the issuer tax id.
        if let Some(nit) = fields.get_mut("issuer_tax_id") {
            *nit = ISSUER_NOISE.replace_all(nit, "").into_owned();
        }
        fields
    }
}
