//! Display-width helpers for status-line layout.
//!
//! The grid canvas only ever holds single `char` cells (no grapheme
//! clustering, no combining marks), so display width reduces to
//! `unicode_width::UnicodeWidthChar` per character rather than the full EGC
//! segmentation machinery a text editor needs.

use unicode_width::UnicodeWidthChar;

/// Display width of a single character, in terminal columns. Falls back to
/// `1` for control characters and anything `unicode-width` can't size.
pub fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(1)
}

/// Display width of a string: the sum of its characters' widths.
pub fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Truncates `s` to at most `max_cols` display columns, never splitting a
/// wide character. Used for right-aligning the fired rule's header on the
/// status line.
pub fn truncate_to_width(s: &str, max_cols: usize) -> &str {
    if display_width(s) <= max_cols {
        return s;
    }
    let mut cols = 0;
    let mut end = s.len();
    for (idx, c) in s.char_indices() {
        let w = char_width(c);
        if cols + w > max_cols {
            end = idx;
            break;
        }
        cols += w;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_width_is_length() {
        assert_eq!(display_width("hello"), 5);
    }

    #[test]
    fn wide_glyph_counts_as_two_columns() {
        assert_eq!(char_width('世'), 2);
        assert_eq!(display_width("世界"), 4);
    }

    #[test]
    fn truncate_keeps_within_budget() {
        assert_eq!(truncate_to_width("hello world", 5), "hello");
    }

    #[test]
    fn truncate_never_splits_a_wide_char() {
        let s = "a世b";
        let truncated = truncate_to_width(s, 2);
        assert_eq!(truncated, "a");
    }

    #[test]
    fn truncate_is_identity_when_already_short_enough() {
        assert_eq!(truncate_to_width("hi", 10), "hi");
    }
}
