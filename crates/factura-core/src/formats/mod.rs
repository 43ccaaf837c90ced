pub mod adidas;
pub mod agro;
pub mod bbi;
pub mod cuotas;
pub mod d1;
pub mod hellen;
pub mod latam;
pub mod procafe;
pub mod taberna;

use crate::amount::{normalize_amount_with, AmountStrategy};
use crate::model::{FieldMap, FormatLabel};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// An ordered list of candidate patterns for one canonical field.
///
/// Patterns are tried in declared order; the first capturing group of the
/// first match wins (the whole match when the pattern has no group).
pub struct FieldSpec {
    pub field: &'static str,
    pub patterns: Vec<Regex>,
    /// Monetary fields are routed through the variant's amount strategy.
    pub monetary: bool,
}

impl FieldSpec {
    pub fn text(field: &'static str, patterns: Vec<Regex>) -> Self {
        FieldSpec {
            field,
            patterns,
            monetary: false,
        }
    }

    pub fn money(field: &'static str, patterns: Vec<Regex>) -> Self {
        FieldSpec {
            field,
            patterns,
            monetary: true,
        }
    }
}

/// Compile a case-insensitive field pattern.
pub(crate) fn pattern(pat: &str) -> Regex {
    RegexBuilder::new(pat)
        .case_insensitive(true)
        .build()
        .expect("invalid field pattern")
}

/// Compile a case-insensitive pattern whose `.` also spans line breaks,
/// for fields whose label and value may land on different pages/lines.
pub(crate) fn pattern_dotall(pat: &str) -> Regex {
    RegexBuilder::new(pat)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .expect("invalid field pattern")
}

/// One extractor variant per known vendor format.
///
/// Implementations declare their pattern table, the subset of canonical
/// fields they require, their amount disambiguation strategy and a
/// belongs-to-me predicate used by the classifier's second tier.
pub trait FormatExtractor: Send + Sync {
    fn label(&self) -> FormatLabel;

    fn specs(&self) -> &[FieldSpec];

    /// Fields that must come back non-empty for validation to pass.
    fn required_fields(&self) -> &'static [&'static str];

    fn amount_strategy(&self) -> AmountStrategy;

    /// Belongs-to-me predicate over unified text (brand strings, known
    /// tax-id literals, header phrases).
    fn matches(&self, text: &str) -> bool;

    /// Map unified text to the variant's promised fields. Every promised
    /// field is present in the result; missing is the empty string.
    fn extract_fields(&self, text: &str) -> FieldMap {
        extract_with_specs(text, self.specs(), self.amount_strategy())
    }
}

/// Field-table driven extraction shared by all variants.
pub fn extract_with_specs(
    text: &str,
    specs: &[FieldSpec],
    strategy: AmountStrategy,
) -> FieldMap {
    let mut fields = FieldMap::new();
    for spec in specs {
        let raw = first_match(text, &spec.patterns);
        let value = if spec.monetary && !raw.is_empty() {
            normalize_amount_with(&raw, strategy)
        } else {
            raw
        };
        fields.insert(spec.field.to_string(), value);
    }
    fields
}

/// Evaluate patterns in order; first capturing group of the first match,
/// or the whole match when the pattern has no group; `""` when nothing
/// matches.
pub fn first_match(text: &str, patterns: &[Regex]) -> String {
    for re in patterns {
        if let Some(caps) = re.captures(text) {
            let m = caps.get(1).or_else(|| caps.get(0));
            if let Some(m) = m {
                return squeeze_ws(m.as_str());
            }
        }
    }
    String::new()
}

/// Collapse interior whitespace runs and trim.
pub(crate) fn squeeze_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compute required-but-empty fields against the variant's declared set.
pub fn validate(extractor: &dyn FormatExtractor, fields: &FieldMap) -> Vec<String> {
    extractor
        .required_fields()
        .iter()
        .filter(|name| {
            fields
                .get(**name)
                .map(|v| v.is_empty())
                .unwrap_or(true)
        })
        .map(|name| name.to_string())
        .collect()
}

static REGISTRY: Lazy<Vec<Box<dyn FormatExtractor>>> = Lazy::new(|| {
    vec![
        Box::new(bbi::BbiExtractor::new()) as Box<dyn FormatExtractor>,
        Box::new(hellen::HellenExtractor::new()),
        Box::new(agro::AgroExtractor::new()),
        Box::new(taberna::TabernaExtractor::new()),
        Box::new(cuotas::CuotasExtractor::new()),
        Box::new(latam::LatamExtractor::new()),
        Box::new(procafe::ProcafeExtractor::new()),
        Box::new(d1::D1Extractor::new()),
        Box::new(adidas::AdidasExtractor::new()),
    ]
});

/// The registered extractor family in fixed probe order.
pub fn registry() -> &'static [Box<dyn FormatExtractor>] {
    &REGISTRY
}

/// Look up the variant registered for a label.
pub fn lookup(label: FormatLabel) -> Option<&'static dyn FormatExtractor> {
    REGISTRY
        .iter()
        .find(|e| e.label() == label)
        .map(|b| b.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CANONICAL_FIELDS;

    #[test]
    fn test_registry_covers_every_known_label() {
        for label in FormatLabel::KNOWN {
            assert!(lookup(*label).is_some(), "no extractor for {label}");
        }
        assert!(lookup(FormatLabel::Unknown).is_none());
    }

    #[test]
    fn test_registry_one_variant_per_label() {
        let mut seen = std::collections::HashSet::new();
        for e in registry() {
            assert!(seen.insert(e.label()), "duplicate extractor for {}", e.label());
        }
        assert_eq!(seen.len(), 9);
    }

    #[test]
    fn test_promised_and_required_fields_are_canonical() {
        for e in registry() {
            for spec in e.specs() {
                assert!(
                    CANONICAL_FIELDS.contains(&spec.field),
                    "{}: non-canonical field {}",
                    e.label(),
                    spec.field
                );
            }
            for req in e.required_fields() {
                assert!(
                    e.specs().iter().any(|s| s.field == *req),
                    "{}: required field {req} is not promised",
                    e.label()
                );
            }
        }
    }

    #[test]
    fn test_every_promised_field_present_even_on_garbage() {
        for e in registry() {
            let fields = e.extract_fields("texto sin nada util");
            for spec in e.specs() {
                assert!(
                    fields.contains_key(spec.field),
                    "{}: field {} absent from map",
                    e.label(),
                    spec.field
                );
            }
        }
    }

    #[test]
    fn test_extraction_is_pure() {
        let text = "FACTURA No. ABC-123 NIT: 900.123.456-7 TOTAL: 1.234,56";
        for e in registry() {
            assert_eq!(e.extract_fields(text), e.extract_fields(text));
        }
    }

    #[test]
    fn test_first_match_group_and_whole_match() {
        let with_group = vec![pattern(r"NIT[:\s]*(\d+)")];
        assert_eq!(first_match("NIT: 900123", &with_group), "900123");

        let without_group = vec![pattern(r"AGROCAMPO SAS")];
        assert_eq!(first_match("ver AGROCAMPO SAS aqui", &without_group), "AGROCAMPO SAS");

        assert_eq!(first_match("nada", &with_group), "");
    }

    #[test]
    fn test_first_match_order_matters() {
        let patterns = vec![pattern(r"TOTAL A PAGAR[:\s]*([\d.,]+)"), pattern(r"TOTAL[:\s]*([\d.,]+)")];
        let text = "TOTAL: 99 TOTAL A PAGAR: 150";
        assert_eq!(first_match(text, &patterns), "150");
    }
}
