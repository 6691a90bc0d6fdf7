//! Small helpers used by the facade: UTF-8 length counting, a stopwatch and
//! switchable console output.

pub mod console;
pub mod stopwatch;

pub use console::ConsoleOutput;
pub use stopwatch::Stopwatch;

/// UTF-8 encoded length of a sequence of UTF-16 code units, without encoding.
///
/// A high surrogate counts 4 bytes and consumes the unit after it.
pub fn utf8_len<I>(units: I) -> usize
where
    I: IntoIterator<Item = u16>,
{
    let mut count = 0;
    let mut iter = units.into_iter();
    while let Some(ch) = iter.next() {
        if ch <= 0x7F {
            count += 1;
        } else if ch <= 0x7FF {
            count += 2;
        } else if (0xD800..=0xDBFF).contains(&ch) {
            count += 4;
            iter.next();
        } else {
            count += 3;
        }
    }
    count
}

pub fn utf8_len_str(s: &str) -> usize {
    utf8_len(s.encode_utf16())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_is_one_byte_per_unit() {
        for s in ["", "a", "hello world", "~!@#$%^&*()_+{}|:<>?"] {
            assert_eq!(utf8_len_str(s), s.chars().count());
        }
    }

    #[test]
    fn test_two_byte_code_points() {
        for ch in ['\u{80}', 'é', 'ß', '\u{7FF}'] {
            assert_eq!(utf8_len_str(&ch.to_string()), 2, "{ch:?}");
        }
    }

    #[test]
    fn test_three_byte_code_points() {
        assert_eq!(utf8_len_str("中"), 3);
        assert_eq!(utf8_len_str("中文"), 6);
        assert_eq!(utf8_len_str("\u{FFFF}"), 3);
    }

    #[test]
    fn test_surrogate_pair_counts_once() {
        assert_eq!(utf8_len_str("😀"), 4);
        assert_eq!(utf8_len_str("a😀b"), 6);
        assert_eq!(utf8_len([0xD83D, 0xDE00]), 4);
    }

    #[test]
    fn test_matches_encoded_length_for_valid_strings() {
        let s = "Alluxio 分布式 ✓ 😀 café";
        assert_eq!(utf8_len_str(s), s.len());
    }

    #[test]
    fn test_unpaired_surrogates() {
        // dangling high surrogate still counts as a pair
        assert_eq!(utf8_len([0x61, 0xD800]), 5);
        // a lone low surrogate is a plain 3-byte unit
        assert_eq!(utf8_len([0xDC00]), 3);
    }
}
