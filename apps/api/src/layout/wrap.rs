//! Fixed-width greedy word wrap.
//!
//! Widths are counted in characters. Words are never split: a word longer than
//! the width sits alone on its own line, so joining the output with single spaces
//! always reproduces the whitespace-normalized input.

/// Wraps `text` into lines of at most `width` characters.
///
/// Runs of whitespace (including newlines) collapse to single spaces. Blank input
/// yields no lines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > width {
            // Current line is full; push it and start a new one with this word.
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn normalized(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_blank_input_yields_no_lines() {
        assert!(wrap_text("", 10).is_empty());
        assert!(wrap_text(" \n\t ", 10).is_empty());
    }

    #[test]
    fn test_short_text_is_one_line() {
        assert_eq!(wrap_text("Rust and SQL", 40), vec!["Rust and SQL"]);
    }

    #[test]
    fn test_wraps_at_word_boundaries() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert_eq!(
            lines,
            vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]
        );
    }

    #[test]
    fn test_long_word_sits_alone_unbroken() {
        let lines = wrap_text("a supercalifragilistic b", 5);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_width_counts_characters_not_bytes() {
        // "über" is 4 chars but 5 bytes
        assert_eq!(wrap_text("über über", 9), vec!["über über"]);
    }

    proptest! {
        #[test]
        fn prop_wrap_is_lossless_under_whitespace_normalization(
            text in "[a-zA-Z0-9,.éü \\t\\n]{0,300}",
            width in 1usize..120,
        ) {
            let lines = wrap_text(&text, width);
            prop_assert_eq!(lines.join(" "), normalized(&text));
        }

        #[test]
        fn prop_lines_fit_unless_single_word(
            text in "[a-z ]{0,300}",
            width in 1usize..60,
        ) {
            for line in wrap_text(&text, width) {
                let fits = line.chars().count() <= width;
                prop_assert!(fits || !line.contains(' '), "line {:?} exceeds {}", line, width);
            }
        }
    }
}
