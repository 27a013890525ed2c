//! Character-offset helpers.
//!
//! Splitter sizes are counted in characters while slicing happens on byte
//! offsets; these helpers convert between the two without splitting a
//! multi-byte character.

/// Returns the byte offset of the `n`th character, or `s.len()` past the end.
///
/// # Examples
///
/// ```
/// use nyaya_rag::io::byte_offset_of_char;
///
/// let s = "IPC धारा";
/// assert_eq!(byte_offset_of_char(s, 4), 4); // 'ध'
/// assert_eq!(byte_offset_of_char(s, 5), 7); // first vowel sign after 'ध'
/// ```
#[must_use]
pub fn byte_offset_of_char(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}

/// Returns the longest prefix of `s` holding at most `max_chars` characters.
#[must_use]
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    &s[..byte_offset_of_char(s, max_chars)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_offset_ascii() {
        assert_eq!(byte_offset_of_char("hello", 3), 3);
        assert_eq!(byte_offset_of_char("hello", 10), 5);
    }

    #[test]
    fn test_byte_offset_multibyte() {
        let s = "aधb";
        assert_eq!(byte_offset_of_char(s, 0), 0);
        assert_eq!(byte_offset_of_char(s, 1), 1);
        assert_eq!(byte_offset_of_char(s, 2), 4);
        assert_eq!(byte_offset_of_char(s, 3), 5);
        assert_eq!(byte_offset_of_char(s, 9), 5);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("aधb", 2), "aध");
        assert_eq!(truncate_chars("short", 50), "short");
        assert_eq!(truncate_chars("", 3), "");
    }
}
