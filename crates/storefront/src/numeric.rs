// ABOUTME: Numeric cleanup for price, rating, and count fields scraped as display text.
// ABOUTME: Strips currency, grouping separators, and trailing words; malformed input yields None.

use crate::schema::DecimalMark;

/// Parses the first number found in display text such as `"$1,799.99"`,
/// `"4.3 out of 5 stars"` or `"12,345 ratings"`.
///
/// The numeric token starts at the first digit and runs through digits,
/// decimal points and grouping separators; it ends at the first other
/// character. Within the token every character that is not a digit or the
/// decimal point is dropped before parsing.
///
/// Returns `None` when the text has no digits or the cleaned token does not
/// parse (for example `"1.2.3"`).
pub fn parse_number(text: &str, mark: DecimalMark) -> Option<f64> {
    let (point, grouping) = match mark {
        DecimalMark::Dot => ('.', ','),
        DecimalMark::Comma => (',', '.'),
    };

    let start = text.find(|c: char| c.is_ascii_digit())?;
    // A leading ".5" keeps its point.
    let start = match text[..start].chars().next_back() {
        Some(c) if c == point => start - c.len_utf8(),
        _ => start,
    };

    let mut cleaned = String::new();
    for c in text[start..].chars() {
        if c.is_ascii_digit() {
            cleaned.push(c);
        } else if c == point {
            cleaned.push('.');
        } else if c == grouping || c == '\'' || c == '\u{a0}' || c == '\u{202f}' {
            continue;
        } else {
            break;
        }
    }

    let cleaned = cleaned.trim_end_matches('.');
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}
