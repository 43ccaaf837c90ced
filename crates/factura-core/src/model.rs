use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Marker inserted between pages when OCR output is unified into one string.
pub const PAGE_BREAK: &str = "\n---PAGE_BREAK---\n";

/// The canonical invoice attributes every extractor speaks in terms of.
///
/// Variants promise a subset of these; a promised field that could not be
/// found is present in the map with an empty value, never absent.
pub const CANONICAL_FIELDS: &[&str] = &[
    "issue_date",
    "invoice_number",
    "total",
    "subtotal",
    "tax",
    "legal_name",
    "issuer_tax_id",
    "client_tax_id",
];

/// Extracted field name -> value. Empty string means "missing".
pub type FieldMap = BTreeMap<String, String>;

/// Vendor/template identifier assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatLabel {
    Bbi,
    Hellen,
    Agro,
    Taberna,
    Cuotas,
    Latam,
    Procafe,
    D1,
    Adidas,
    Unknown,
}

impl FormatLabel {
    /// All labels with a registered extractor, in registration order.
    pub const KNOWN: &'static [FormatLabel] = &[
        FormatLabel::Bbi,
        FormatLabel::Hellen,
        FormatLabel::Agro,
        FormatLabel::Taberna,
        FormatLabel::Cuotas,
        FormatLabel::Latam,
        FormatLabel::Procafe,
        FormatLabel::D1,
        FormatLabel::Adidas,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatLabel::Bbi => "bbi",
            FormatLabel::Hellen => "hellen",
            FormatLabel::Agro => "agro",
            FormatLabel::Taberna => "taberna",
            FormatLabel::Cuotas => "cuotas",
            FormatLabel::Latam => "latam",
            FormatLabel::Procafe => "procafe",
            FormatLabel::D1 => "d1",
            FormatLabel::Adidas => "adidas",
            FormatLabel::Unknown => "unknown",
        }
    }

    /// Parse a caller-supplied label, tolerant of case and surrounding noise.
    pub fn from_str_loose(s: &str) -> FormatLabel {
        match s.trim().to_lowercase().as_str() {
            "bbi" => FormatLabel::Bbi,
            "hellen" => FormatLabel::Hellen,
            "agro" | "agrocampo" => FormatLabel::Agro,
            "taberna" => FormatLabel::Taberna,
            "cuotas" => FormatLabel::Cuotas,
            "latam" => FormatLabel::Latam,
            "procafe" | "procafecol" => FormatLabel::Procafe,
            "d1" => FormatLabel::D1,
            "adidas" => FormatLabel::Adidas,
            _ => FormatLabel::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FormatLabel::Unknown)
    }
}

impl fmt::Display for FormatLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Uniform outcome of extract-then-validate for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// The format the extractor ran as.
    pub label: FormatLabel,
    /// True iff every field the variant requires came back non-empty.
    pub success: bool,
    /// All promised fields, empty string where nothing matched.
    pub fields: FieldMap,
    /// Required fields that came back empty (empty when success).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

impl ExtractionReport {
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip() {
        for label in FormatLabel::KNOWN {
            assert_eq!(FormatLabel::from_str_loose(label.as_str()), *label);
        }
    }

    #[test]
    fn test_label_loose_parsing() {
        assert_eq!(FormatLabel::from_str_loose("  BBI "), FormatLabel::Bbi);
        assert_eq!(FormatLabel::from_str_loose("D1"), FormatLabel::D1);
        assert_eq!(FormatLabel::from_str_loose("garbage"), FormatLabel::Unknown);
        assert_eq!(FormatLabel::from_str_loose(""), FormatLabel::Unknown);
    }

    #[test]
    fn test_known_excludes_unknown() {
        assert_eq!(FormatLabel::KNOWN.len(), 9);
        assert!(FormatLabel::KNOWN.iter().all(|l| l.is_known()));
    }
}
