//! Cinema-chain invoices (Cine Colombia).

use super::{extract_with_specs, pattern, squeeze_ws, FieldSpec, FormatExtractor};
use crate::amount::{normalize_amount_with, AmountStrategy};
use crate::model::{FieldMap, FormatLabel};
use once_cell::sync::Lazy;
use regex::Regex;

static ISSUE_DATE: Lazy<Regex> = Lazy::new(|| {
    pattern(r"ce:\s*(\d{1,2})[-\s](ene|feb|mar|abr|may|jun|jul|ago|sep|oct|nov|dic)[a-z.]*[-\s](\d{4})")
});

static TOTAL_ANY: Lazy<Regex> = Lazy::new(|| pattern(r"(?:VALOR TOTAL|TOTAL)\s*([\d.,]{5,})"));

static ISSUER_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d\-]").expect("invalid pattern"));

fn month_number(abbrev: &str) -> &'static str {
    match abbrev.to_lowercase().as_str() {
        "feb" => "02",
        "mar" => "03",
        "abr" => "04",
        "may" => "05",
        "jun" => "06",
        "jul" => "07",
        "ago" => "08",
        "sep" => "09",
        "oct" => "10",
        "nov" => "11",
        "dic" => "12",
        _ => "01",
    }
}

pub struct HellenExtractor {
    specs: Vec<FieldSpec>,
}

impl HellenExtractor {
    pub fn new() -> Self {
        let specs = vec![
            FieldSpec::text(
                "legal_name",
                vec![
                    pattern(
                        r"NIT:\s*[\d.\-]+\s+([A-Z\s.]+?)\s+(?:es\s+responsable|Agente\s+Retenedor|Factura\s+electr[oó]nica|www\.|$)",
                    ),
                    pattern(r"(CINE COLOMBIA S\.A\.S\.)"),
                ],
            ),
            FieldSpec::text("issuer_tax_id", vec![pattern(r"NIT:\s*([\d.\-]+)")]),
            FieldSpec::text(
                "invoice_number",
                vec![
                    pattern(r"Factura Electr[oó]nica de Venta[^:]*:\s*\S*\s*(AME-\d+)"),
                    pattern(r"\b(AME-\d+)\b"),
                ],
            ),
            // issue_date and total have bespoke handling in extract_fields.
            FieldSpec::text("issue_date", vec![]),
            FieldSpec::money("total", vec![pattern(r"VALOR TOTAL\s*([\d.,]{5,})")]),
            FieldSpec::money("subtotal", vec![pattern(r"SUBTOTAL[^\d]*([\d.,]{5,})")]),
            FieldSpec::money(
                "tax",
                vec![pattern(r"IMPUESTO A LAS VENTAS[^\d]*([\d.,]{4,})")],
            ),
            FieldSpec::text(
                "client_tax_id",
                vec![pattern(r"NO\.\s*IDENTIFICACI[OÓ]N[:\s]*(\d{6,12})")],
            ),
        ];
        HellenExtractor { specs }
    }
}

impl Default for HellenExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatExtractor for HellenExtractor {
    fn label(&self) -> FormatLabel {
        FormatLabel::Hellen
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
        ((upper.contains("CINE") && upper.contains("COLOMBIA"))
            || upper.contains("FACTURA ELECTRÓNICA DE VENTA"))
            && upper.contains("NIT")
    }

    fn extract_fields(&self, text: &str) -> FieldMap {
        let mut fields = extract_with_specs(text, &self.specs, self.amount_strategy());

        if let Some(nit) = fields.get_mut("issuer_tax_id") {
            *nit = ISSUER_NOISE.replace_all(nit, "").into_owned();
        }

        // Dates print as "12-ene-2024"; rewrite to dd/mm/yyyy.
        if let Some(caps) = ISSUE_DATE.captures(text) {
            let day: u32 = caps[1].parse().unwrap_or(1);
            let month = month_number(&caps[2]);
            let year = &caps[3];
            fields.insert("issue_date".to_string(), format!("{day:02}/{month}/{year}"));
        }

        // The totals block repeats TOTAL labels; when the headline VALOR
        // TOTAL is absent, the last labelled figure is the grand total.
        if fields.get("total").map(|v| v.is_empty()).unwrap_or(true) {
            if let Some(caps) = TOTAL_ANY.captures_iter(text).last() {
                if let Some(m) = caps.get(1) {
                    let value = normalize_amount_with(&squeeze_ws(m.as_str()), self.amount_strategy());
                    fields.insert("total".to_string(), value);
                }
            }
        }

        fields
    }
}
