//! Severity rating extraction from model answers.

use regex::Regex;
use std::sync::OnceLock;

/// Lowest valid rating.
pub const MIN_SEVERITY: u8 = 1;
/// Highest valid rating.
pub const MAX_SEVERITY: u8 = 10;

const RANGE_DASHES: [char; 2] = ['-', '\u{2013}'];

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {{
        static $name: OnceLock<Regex> = OnceLock::new();
        $name.get_or_init(|| Regex::new($pattern).expect("valid regex"))
    }};
}

/// `Severity of the case out of 1-10:- 7`, optionally parenthesised.
#[allow(clippy::expect_used)]
fn labelled() -> &'static Regex {
    static_regex!(LABELLED, r"(?i)severity[^:\n]*:-\s*\(?\s*(\d+)")
}

#[allow(clippy::expect_used)]
fn keyword() -> &'static Regex {
    static_regex!(KEYWORD, r"(?i)\bseverity\b")
}

#[allow(clippy::expect_used)]
fn integer() -> &'static Regex {
    static_regex!(INTEGER, r"\d+")
}

/// Extracts a 1-10 severity rating from `answer`.
///
/// Prefers the `Severity ...:- N` form the severity prompt asks for, then
/// falls back to the first integer after the word "severity" that is not
/// part of a range such as `1-10`. Out-of-range ratings yield `None`.
///
/// # Examples
///
/// ```
/// use nyaya_rag::chain::extract_severity;
///
/// assert_eq!(extract_severity("Severity of the case out of 1-10:- 8"), Some(8));
/// assert_eq!(extract_severity("No rating given."), None);
/// ```
#[must_use]
pub fn extract_severity(answer: &str) -> Option<u8> {
    if let Some(caps) = labelled().captures(answer) {
        return parse_rating(&caps[1]);
    }

    let start = keyword().find(answer)?.end();
    let tail = &answer[start..];
    integer()
        .find_iter(tail)
        .find(|m| {
            !tail[m.end()..].starts_with(RANGE_DASHES) && !tail[..m.start()].ends_with(RANGE_DASHES)
        })
        .and_then(|m| parse_rating(m.as_str()))
}

fn parse_rating(digits: &str) -> Option<u8> {
    digits
        .parse::<u8>()
        .ok()
        .filter(|n| (MIN_SEVERITY..=MAX_SEVERITY).contains(n))
}
