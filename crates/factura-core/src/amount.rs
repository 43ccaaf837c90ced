use rust_decimal::Decimal;
use std::str::FromStr;

/// Canonical rendering of an unparseable or empty amount.
pub const ZERO_AMOUNT: &str = "0,00";

/// Named disambiguation strategies for freeform numeric literals.
///
/// The invoice formats disagree on how a lone separator should be read
/// (a dot followed by three digits is thousands in some templates and a
/// decimal in others), so the strategy is an explicit per-format choice
/// instead of one unified rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmountStrategy {
    /// Decide from separator positions: the separator kind occurring last
    /// is the decimal, a lone dot is a decimal only when followed by
    /// exactly two digits. This is the canonical strategy.
    #[default]
    SeparatorHeuristic,
    /// Every dot is a thousands separator, comma is the decimal.
    DotThousands,
    /// Comma is the decimal; a lone dot is taken verbatim as the decimal
    /// point, so multiple bare dots fail the parse.
    CommaDecimal,
    /// Whole pesos: separators are dropped entirely, `,00` appended.
    IntegerPesos,
}

/// Normalize a freeform numeric literal with the canonical strategy.
///
/// Output is always grouped-by-dot, decimal-by-comma with two fraction
/// digits (`1.234.567,89`); anything unparseable yields `0,00`.
pub fn normalize_amount(raw: &str) -> String {
    normalize_amount_with(raw, AmountStrategy::SeparatorHeuristic)
}

/// Normalize a freeform numeric literal with an explicit strategy.
pub fn normalize_amount_with(raw: &str, strategy: AmountStrategy) -> String {
    let clean: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if clean.is_empty() {
        return ZERO_AMOUNT.to_string();
    }

    let plain = match strategy {
        AmountStrategy::SeparatorHeuristic => disambiguate(&clean),
        AmountStrategy::DotThousands => clean.replace('.', "").replace(',', "."),
        AmountStrategy::CommaDecimal => {
            if clean.contains(',') && clean.contains('.') {
                clean.replace('.', "").replace(',', ".")
            } else if clean.contains(',') {
                clean.replace(',', ".")
            } else {
                // Lone dot(s) kept verbatim; "1.234.567" fails the parse below.
                clean
            }
        }
        AmountStrategy::IntegerPesos => clean.replace(['.', ','], ""),
    };

    match Decimal::from_str(&plain) {
        Ok(value) => render_canonical(value),
        Err(_) => ZERO_AMOUNT.to_string(),
    }
}

/// Positional separator disambiguation on a `[0-9.,]` string.
fn disambiguate(clean: &str) -> String {
    let commas = clean.matches(',').count();
    let dots = clean.matches('.').count();

    if commas > 1 {
        // All commas are thousands separators; a single surviving dot is
        // the decimal point, several dots are thousands as well.
        let no_commas = clean.replace(',', "");
        if no_commas.matches('.').count() == 1 {
            return no_commas;
        }
        return no_commas.replace('.', "");
    }

    if commas == 1 && dots > 0 {
        // Whichever separator occurs later in the string is the decimal.
        let last_comma = clean.rfind(',').unwrap_or(0);
        let last_dot = clean.rfind('.').unwrap_or(0);
        if last_comma > last_dot {
            return clean.replace('.', "").replace(',', ".");
        }
        return clean.replace(',', "");
    }

    if commas == 1 {
        return clean.replace(',', ".");
    }

    if dots > 0 {
        // Only dots. A two-digit tail after the last dot marks a decimal
        // point; anything else means every dot is a thousands separator.
        let last_dot = clean.rfind('.').unwrap_or(0);
        let tail = &clean[last_dot + 1..];
        if tail.len() == 2 {
            let mut integer = clean[..last_dot].replace('.', "");
            integer.push('.');
            integer.push_str(tail);
            return integer;
        }
        return clean.replace('.', "");
    }

    clean.to_string()
}

/// Render a decimal as `1.234.567,89`: dot grouping, comma decimal,
/// exactly two fraction digits.
fn render_canonical(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let s = rounded.to_string();
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i.to_string(), format!("{f:0<2}")),
        None => (s, "00".to_string()),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        let remaining = digits.len() - i;
        if i > 0 && remaining % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    format!("{grouped},{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_render_canonical_formatting() {
        assert_eq!(render_canonical(dec!(1234567.891)), "1.234.567,89");
        assert_eq!(render_canonical(dec!(0)), "0,00");
        assert_eq!(render_canonical(dec!(45.5)), "45,50");
        assert_eq!(render_canonical(dec!(999.995)), "1.000,00");
    }

    #[test]
    fn test_canonical_vectors() {
        assert_eq!(normalize_amount("1.234.567,89"), "1.234.567,89");
        assert_eq!(normalize_amount("1234567.89"), "1.234.567,89");
        assert_eq!(normalize_amount(""), "0,00");
        assert_eq!(normalize_amount("abc"), "0,00");
    }

    #[test]
    fn test_currency_noise_stripped() {
        assert_eq!(normalize_amount("$ 1.234.567,89 COP"), "1.234.567,89");
        assert_eq!(normalize_amount("  45.000  "), "45.000,00");
    }

    #[test]
    fn test_multiple_commas_are_thousands() {
        assert_eq!(normalize_amount("1,234,567.89"), "1.234.567,89");
        assert_eq!(normalize_amount("1,234,567"), "1.234.567,00");
    }

    #[test]
    fn test_later_separator_is_decimal() {
        assert_eq!(normalize_amount("1.234,56"), "1.234,56");
        assert_eq!(normalize_amount("1,234.56"), "1.234,56");
    }

    #[test]
    fn test_lone_comma_is_decimal() {
        assert_eq!(normalize_amount("123,4"), "123,40");
        assert_eq!(normalize_amount("123,45"), "123,45");
    }

    #[test]
    fn test_lone_dot_two_digit_tail_is_decimal() {
        assert_eq!(normalize_amount("123.45"), "123,45");
        // Three-digit tail reads as a thousands group.
        assert_eq!(normalize_amount("45.000"), "45.000,00");
        assert_eq!(normalize_amount("1.234.567"), "1.234.567,00");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "1.234.567,89",
            "1234567.89",
            "45.000",
            "123,45",
            "0,00",
            "$ 987.654,32",
            "1,234,567.89",
            "",
            "abc",
        ];
        for raw in samples {
            let once = normalize_amount(raw);
            assert_eq!(normalize_amount(&once), once, "not stable for {raw:?}");
        }
    }

    #[test]
    fn test_dot_thousands_strategy() {
        let s = AmountStrategy::DotThousands;
        assert_eq!(normalize_amount_with("1.234.567,89", s), "1.234.567,89");
        // Even a two-digit tail after a dot is a thousands separator here.
        assert_eq!(normalize_amount_with("12.34", s), "1.234,00");
        assert_eq!(normalize_amount_with("123,45", s), "123,45");
    }

    #[test]
    fn test_comma_decimal_strategy() {
        let s = AmountStrategy::CommaDecimal;
        assert_eq!(normalize_amount_with("1.234,56", s), "1.234,56");
        assert_eq!(normalize_amount_with("123,45", s), "123,45");
        assert_eq!(normalize_amount_with("1234.56", s), "1.234,56");
        // Multiple bare dots cannot parse under this strategy.
        assert_eq!(normalize_amount_with("1.234.567", s), "0,00");
    }

    #[test]
    fn test_integer_pesos_strategy() {
        let s = AmountStrategy::IntegerPesos;
        assert_eq!(normalize_amount_with("$ 518.260", s), "518.260,00");
        assert_eq!(normalize_amount_with("1.234.567", s), "1.234.567,00");
        assert_eq!(normalize_amount_with("", s), "0,00");
    }

    #[test]
    fn test_rounding_to_two_digits() {
        // A lone comma is always the decimal, however many digits follow.
        assert_eq!(normalize_amount("123,456"), "123,46");
        assert_eq!(normalize_amount("0,5"), "0,50");
    }

    #[test]
    fn test_grouping_boundaries() {
        assert_eq!(normalize_amount("100"), "100,00");
        assert_eq!(normalize_amount("1000"), "1.000,00");
        assert_eq!(normalize_amount("999999"), "999.999,00");
        assert_eq!(normalize_amount("1000000"), "1.000.000,00");
    }
}
