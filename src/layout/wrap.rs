//! Greedy word wrapping bounded by a pixel width and a line count.

/// Wraps `text` into at most `max_lines` lines no wider than `max_width`.
///
/// Whitespace is collapsed and words are accumulated greedily, each candidate line being measured
/// as a whole string.  Returns `None` when the text needs more than `max_lines` lines, when the
/// text is empty, or when a single word is wider than `max_width` and `allow_char_break` is off.
/// With `allow_char_break` on, an overlong word is split into maximal prefixes that fit and the
/// pieces re-enter the word stream.
pub fn wrap_lines<M>(
    text: &str,
    measure: M,
    max_width: f64,
    max_lines: usize,
    allow_char_break: bool,
) -> Option<Vec<String>>
where
    M: Fn(&str) -> f64,
{
    // Stack of pending words, next word on top.
    let mut pending: Vec<String> = text.split_whitespace().rev().map(str::to_owned).collect();
    if pending.is_empty() || max_lines == 0 {
        return None;
    }

    let mut lines = Vec::new();
    let mut current = String::new();

    while let Some(word) = pending.pop() {
        if measure(&word) > max_width {
            if !allow_char_break {
                return None;
            }
            let pieces = split_word(&word, &measure, max_width)?;
            pending.extend(pieces.into_iter().rev());
            continue;
        }

        let candidate = if current.is_empty() {
            word.clone()
        } else {
            format!("{current} {word}")
        };

        if measure(&candidate) <= max_width {
            current = candidate;
            continue;
        }

        lines.push(std::mem::take(&mut current));
        if lines.len() >= max_lines {
            return None;
        }
        pending.push(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }

    (lines.len() <= max_lines).then_some(lines)
}

/// Splits `word` into maximal prefixes whose measured width stays within `max_width`.
///
/// Returns `None` if a single character is already wider than the box.
fn split_word<M>(word: &str, measure: &M, max_width: f64) -> Option<Vec<String>>
where
    M: Fn(&str) -> f64,
{
    let mut pieces = Vec::new();
    let mut buffer = String::new();

    for ch in word.chars() {
        buffer.push(ch);
        if measure(&buffer) <= max_width {
            continue;
        }

        buffer.pop();
        if buffer.is_empty() {
            return None;
        }
        pieces.push(std::mem::take(&mut buffer));
        buffer.push(ch);
        if measure(&buffer) > max_width {
            return None;
        }
    }

    if !buffer.is_empty() {
        pieces.push(buffer);
    }
    Some(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Every character is 10 units wide.
    fn mono(text: &str) -> f64 {
        text.chars().count() as f64 * 10.0
    }

    #[test]
    fn collapses_whitespace_and_packs_greedily() {
        let lines = wrap_lines("  one   two\tthree ", mono, 70.0, 3, false).expect("fits");
        assert_eq!(lines, vec!["one two", "three"]);
    }

    #[test]
    fn fails_when_line_budget_is_exceeded() {
        assert_eq!(wrap_lines("aaa bbb ccc", mono, 30.0, 2, false), None);
        assert_eq!(
            wrap_lines("aaa bbb ccc", mono, 30.0, 3, false),
            Some(vec!["aaa".to_owned(), "bbb".to_owned(), "ccc".to_owned()])
        );
    }

    #[test]
    fn overlong_word_without_char_break_fails() {
        assert_eq!(wrap_lines("abcdefgh", mono, 50.0, 3, false), None);
    }

    #[test]
    fn overlong_word_is_split_into_maximal_prefixes() {
        let lines = wrap_lines("abcdefgh ij", mono, 50.0, 3, true).expect("fits");
        assert_eq!(lines, vec!["abcde", "fgh", "ij"]);
    }

    #[test]
    fn glyph_wider_than_box_fails_even_with_char_break() {
        assert_eq!(wrap_lines("ab", mono, 5.0, 4, true), None);
    }

    #[test]
    fn empty_text_does_not_wrap() {
        assert_eq!(wrap_lines("   ", mono, 100.0, 2, true), None);
    }

    #[test]
    fn zero_line_budget_never_fits() {
        assert_eq!(wrap_lines("a", mono, 100.0, 0, true), None);
    }
}
