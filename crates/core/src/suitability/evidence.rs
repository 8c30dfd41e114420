//! Text helpers shared by the rule evaluators.

use std::sync::OnceLock;

use regex::{Captures, Regex};

fn mixed_fraction_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(-?\d+)\s+(\d+)\s*/\s*(\d+)").expect("mixed fraction pattern is valid")
    })
}

fn fraction_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(-?\d+)\s*/\s*(\d+)").expect("fraction pattern is valid"))
}

fn decimal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"-?\d[\d,]*(?:\.\d+)?|-?\.\d+").expect("decimal pattern is valid")
    })
}

fn length_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?i)(?P<value>\d+\s+\d+\s*/\s*\d+|\d+\s*/\s*\d+|\d[\d,]*(?:\.\d+)?|\.\d+)\s*(?P<unit>mm\b|millimet\w*|cm\b|centimet\w*|in\b|inch\w*|")?"#,
        )
        .expect("length pattern is valid")
    })
}

/// Pulls the first number out of free text.
///
/// Tries a mixed fraction (`1 1/4`), then a plain fraction (`3/4`), then a
/// decimal with thousands separators (`1,200.5`). A zero denominator makes
/// that pattern miss and the next one is tried.
pub fn extract_number(text: &str) -> Option<f64> {
    if let Some(caps) = mixed_fraction_pattern().captures(text) {
        if let Some(value) = mixed_fraction_value(text, &caps) {
            return Some(value);
        }
    }

    if let Some(caps) = fraction_pattern().captures(text) {
        if let Some(value) = fraction_value(text, &caps) {
            return Some(value);
        }
    }

    let found = decimal_pattern().find(text)?;
    let negative = is_negative(text, found.start(), found.as_str());
    let digits = found.as_str().trim_start_matches('-').replace(',', "");
    let value: f64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Reads the first length in free text as inches.
///
/// The unit comes from the token right after the number, so dual-unit text
/// such as `1 1/4 in. (32 mm)` reads as 1.25. A bare number is inches.
pub fn extract_length_inches(text: &str) -> Option<f64> {
    let caps = length_pattern().captures(text)?;
    let value = extract_number(caps.name("value")?.as_str())?;
    let unit = caps.name("unit").map(|unit| unit.as_str().to_ascii_lowercase());

    Some(match unit.as_deref() {
        Some(unit) if unit.starts_with("mm") || unit.starts_with("millimet") => value / 25.4,
        Some(unit) if unit.starts_with("cm") || unit.starts_with("centimet") => value / 2.54,
        _ => value,
    })
}

fn mixed_fraction_value(text: &str, caps: &Captures<'_>) -> Option<f64> {
    let whole = caps.get(1)?;
    let numerator: f64 = caps[2].parse().ok()?;
    let denominator: f64 = caps[3].parse().ok()?;
    if denominator == 0.0 {
        return None;
    }

    let negative = is_negative(text, whole.start(), whole.as_str());
    let magnitude: f64 = whole.as_str().trim_start_matches('-').parse().ok()?;
    let value = magnitude + numerator / denominator;
    Some(if negative { -value } else { value })
}

fn fraction_value(text: &str, caps: &Captures<'_>) -> Option<f64> {
    let numerator_match = caps.get(1)?;
    let denominator: f64 = caps[2].parse().ok()?;
    if denominator == 0.0 {
        return None;
    }

    let negative = is_negative(text, numerator_match.start(), numerator_match.as_str());
    let numerator: f64 = numerator_match.as_str().trim_start_matches('-').parse().ok()?;
    let value = numerator / denominator;
    Some(if negative { -value } else { value })
}

// A hyphen glued to a word ("PEI-4", "3-7%") is a separator, not a sign.
fn is_negative(text: &str, start: usize, matched: &str) -> bool {
    if !matched.starts_with('-') {
        return false;
    }
    !text[..start].chars().next_back().is_some_and(char::is_alphanumeric)
}

/// Case-insensitive substring test. Empty text never matches.
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .filter(|keyword| !keyword.is_empty())
        .any(|keyword| haystack.contains(&keyword.to_lowercase()))
}

/// Case-insensitive whole-word test, so that "no" does not match "non-slip".
pub fn contains_word(text: &str, word: &str) -> bool {
    text.split(|ch: char| !ch.is_alphanumeric())
        .any(|token| !token.is_empty() && token.eq_ignore_ascii_case(word))
}

#[cfg(test)]
mod tests {
    use super::{contains_any, contains_word, extract_length_inches, extract_number};

    #[test]
    fn mixed_fraction_is_whole_plus_fraction() {
        assert_eq!(extract_number("1 1/4"), Some(1.25));
        assert_eq!(extract_number("1 1/4 in."), Some(1.25));
    }

    #[test]
    fn negative_mixed_fraction_applies_sign_to_fraction() {
        assert_eq!(extract_number("-1 1/2"), Some(-1.5));
    }

    #[test]
    fn simple_fraction() {
        assert_eq!(extract_number("3/4"), Some(0.75));
        assert_eq!(extract_number("3/8 in. thick"), Some(0.375));
    }

    #[test]
    fn plain_decimal_and_thousands_separator() {
        assert_eq!(extract_number("12.5"), Some(12.5));
        assert_eq!(extract_number("1,200 sq. ft."), Some(1200.0));
        assert_eq!(extract_number("<0.5%"), Some(0.5));
        assert_eq!(extract_number("approx .42"), Some(0.42));
    }

    #[test]
    fn text_without_digits_is_absent() {
        assert_eq!(extract_number("n/a"), None);
        assert_eq!(extract_number(""), None);
    }

    #[test]
    fn zero_denominator_falls_through_to_next_pattern() {
        assert_eq!(extract_number("1 1/0"), Some(1.0));
        assert_eq!(extract_number("5/0"), Some(5.0));
    }

    #[test]
    fn hyphen_after_a_word_is_not_a_sign() {
        assert_eq!(extract_number("PEI-4"), Some(4.0));
        assert_eq!(extract_number("3-7%"), Some(3.0));
    }

    #[test]
    fn contains_any_is_case_insensitive() {
        assert!(contains_any("Indoor ONLY", &["indoor only"]));
        assert!(contains_any("Frost Resistant", &["freeze", "frost resistant"]));
        assert!(!contains_any("Outdoor", &["indoor"]));
    }

    #[test]
    fn contains_any_rejects_empty_text() {
        assert!(!contains_any("", &["anything"]));
        assert!(!contains_any("   ", &[" "]));
    }

    #[test]
    fn contains_word_matches_whole_tokens_only() {
        assert!(contains_word("No", "no"));
        assert!(contains_word("Yes - with thinset", "yes"));
        assert!(!contains_word("Non-combustible", "no"));
        assert!(!contains_word("", "no"));
    }

    #[test]
    fn length_unit_follows_the_first_number() {
        assert_eq!(extract_length_inches("1 1/4 in. (32 mm)"), Some(1.25));
        assert_eq!(extract_length_inches("3/4\" (19 mm)"), Some(0.75));
        assert_eq!(extract_length_inches("3/8 inch"), Some(0.375));

        let metric_first = extract_length_inches("32 mm (1 1/4 in.)").expect("length");
        assert!((metric_first - 32.0 / 25.4).abs() < 1e-9);
    }

    #[test]
    fn metric_lengths_convert_to_inches() {
        let millimetres = extract_length_inches("10mm").expect("length");
        assert!((millimetres - 10.0 / 25.4).abs() < 1e-9);

        let centimetres = extract_length_inches("2 cm thick").expect("length");
        assert!((centimetres - 2.0 / 2.54).abs() < 1e-9);
    }

    #[test]
    fn bare_length_is_inches_and_missing_length_is_absent() {
        assert_eq!(extract_length_inches("1.5"), Some(1.5));
        assert_eq!(extract_length_inches("varies"), None);
    }
}
