//! First-tier keyword scan.
//!
//! OCR tends to break brand names apart, so the scan runs over the
//! uppercased text with every whitespace character removed.

use crate::model::FormatLabel;

/// Brand substrings in fixed priority order. "D1" is last: two
/// characters match far too easily to let it shadow anything else.
const PRIORITY: &[(&str, FormatLabel)] = &[
    ("BBICOLOMBIA", FormatLabel::Bbi),
    ("B8ICOLOMBIA", FormatLabel::Bbi),
    ("BBICOLOMBIASAS", FormatLabel::Bbi),
    ("HELLEN", FormatLabel::Hellen),
    ("AGRO", FormatLabel::Agro),
    ("TABERNA", FormatLabel::Taberna),
    ("CUOTAS", FormatLabel::Cuotas),
    ("LATAM", FormatLabel::Latam),
    ("ADIDAS", FormatLabel::Adidas),
    ("PROCAFE", FormatLabel::Procafe),
    ("D1", FormatLabel::D1),
];

/// Condense text for substring probing.
fn condense(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_uppercase())
        .collect()
}

/// First matching brand substring decides the label.
pub fn keyword_scan(text: &str) -> Option<FormatLabel> {
    let condensed = condense(text);
    PRIORITY
        .iter()
        .find(|(needle, _)| condensed.contains(needle))
        .map(|(_, label)| *label)
}
