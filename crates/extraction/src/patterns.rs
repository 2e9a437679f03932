//! Email and phone pattern extractors
//!
//! Both extractors take an arbitrary, possibly very long string (typically a
//! whole flattened transcript) and return the first valid match, or None.
//! Neither ever panics or returns an error.

use once_cell::sync::Lazy;
use regex::Regex;

// Fallback scan for emails embedded in punctuation-heavy sentences that the
// token pass mishandles.
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

// US phone shapes: optional +1, optional parens, dash/dot/space separators.
// Anchored on both sides against adjacent digits so a phone-sized window is
// never carved out of a longer digit run (account numbers, order ids).
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\d])((?:\+?1[\s.-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4})\b").unwrap()
});

/// Extract the first valid email address from text, lower-cased.
///
/// Two passes: a cheap tokenized pass with strict syntactic validation for
/// the common case, then a regex scan over the raw text as a fallback.
pub fn extract_email(text: &str) -> Option<String> {
    let is_delimiter =
        |c: char| c.is_whitespace() || matches!(c, ',' | ';' | '<' | '>' | '(' | ')' | '"');

    for token in text.split(is_delimiter) {
        let token = token.trim_matches(|c: char| matches!(c, '.' | ',' | '!' | '?' | ':' | ';'));
        if is_valid_email(token) {
            return Some(token.to_ascii_lowercase());
        }
    }

    EMAIL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|s| is_valid_email(s))
        .map(|s| s.to_ascii_lowercase())
}

/// Strict syntactic email validation
///
/// Checks the shape the widget actually needs: one `@`, a sane local part,
/// a dotted domain whose labels are alphanumeric-or-hyphen, and an
/// alphabetic TLD of at least two characters.
fn is_valid_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };

    if local.is_empty()
        || local.len() > 64
        || local.starts_with('.')
        || local.ends_with('.')
        || local.contains("..")
    {
        return false;
    }
    if !local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-'))
    {
        return false;
    }

    if domain.contains('@') || !domain.contains('.') || domain.contains("..") {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.iter().any(|label| {
        label.is_empty()
            || label.starts_with('-')
            || label.ends_with('-')
            || !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    }) {
        return false;
    }

    // TLD must be alphabetic and at least two characters
    let tld = labels[labels.len() - 1];
    tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Extract the first valid US phone number, formatted in national display
/// form, e.g. "(754) 485-9632".
///
/// Matches are normalized to digits; exactly 10 digits get a "1" country
/// code prepended. Anything that does not normalize to a plausible
/// 11-digit US number is rejected, not coerced.
pub fn extract_phone(text: &str) -> Option<String> {
    for caps in PHONE_PATTERN.captures_iter(text) {
        let Some(m) = caps.get(1) else {
            continue;
        };
        let mut digits: String = m.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() == 10 {
            digits.insert(0, '1');
        }
        if digits.len() != 11 || !digits.starts_with('1') {
            continue;
        }

        let national = &digits[1..];
        let (area, rest) = national.split_at(3);
        let (exchange, line) = rest.split_at(3);

        // NANP: area code and exchange cannot start with 0 or 1
        if area.as_bytes()[0] < b'2' || exchange.as_bytes()[0] < b'2' {
            continue;
        }

        return Some(format!("({}) {}-{}", area, exchange, line));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_email_basic() {
        assert_eq!(
            extract_email("reach me at John.Doe@Example.com please"),
            Some("john.doe@example.com".to_string())
        );
    }

    #[test]
    fn test_extract_email_none() {
        assert_eq!(extract_email("no email here"), None);
        assert_eq!(extract_email(""), None);
    }

    #[test]
    fn test_extract_email_punctuation_fallback() {
        assert_eq!(
            extract_email("you can write to me (jane@acme.com) anytime!"),
            Some("jane@acme.com".to_string())
        );
        // "email:..." survives the token pass only via the regex fallback
        assert_eq!(
            extract_email("email:bob.smith+leads@mail.co,thanks"),
            Some("bob.smith+leads@mail.co".to_string())
        );
    }

    #[test]
    fn test_extract_email_rejects_malformed() {
        assert_eq!(extract_email("ping me at not@an@address"), None);
        assert_eq!(extract_email("double..dot@example.com is wrong"), None);
        assert_eq!(extract_email("missing-tld@example"), None);
        assert_eq!(extract_email("numeric-tld@example.123"), None);
    }

    #[test]
    fn test_extract_phone_dashed() {
        assert_eq!(
            extract_phone("call 754-485-9632"),
            Some("(754) 485-9632".to_string())
        );
    }

    #[test]
    fn test_extract_phone_variants() {
        assert_eq!(
            extract_phone("my cell is (754) 485.9632, call after 5"),
            Some("(754) 485-9632".to_string())
        );
        assert_eq!(
            extract_phone("+1 754 485 9632"),
            Some("(754) 485-9632".to_string())
        );
        assert_eq!(
            extract_phone("7544859632 works too"),
            Some("(754) 485-9632".to_string())
        );
    }

    #[test]
    fn test_extract_phone_too_short() {
        assert_eq!(extract_phone("my number is 12345"), None);
    }

    #[test]
    fn test_extract_phone_ignores_longer_digit_runs() {
        // A phone-sized window must not be carved out of an account number
        assert_eq!(extract_phone("my account number is 9876543210123"), None);
        assert_eq!(extract_phone("order 754485963212345 shipped"), None);
        // A real phone next to a long run is still found
        assert_eq!(
            extract_phone("account 9876543210123, phone 754-485-9632"),
            Some("(754) 485-9632".to_string())
        );
    }

    #[test]
    fn test_extract_phone_rejects_bad_area_code() {
        // Area codes and exchanges starting with 0 or 1 are not assignable
        assert_eq!(extract_phone("054-485-9632"), None);
        assert_eq!(extract_phone("754-185-9632"), None);
    }

    #[test]
    fn test_extract_phone_first_valid_wins() {
        assert_eq!(
            extract_phone("office 054-000-0000, mobile 754-485-9632"),
            Some("(754) 485-9632".to_string())
        );
    }
}
