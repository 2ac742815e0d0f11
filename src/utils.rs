//! # Utilities Module
//!
//! ## Purpose
//! Text helpers used for snippets and display strings. All helpers are
//! character-aware: catalog text is Arabic, so byte-indexed slicing is never
//! safe here.

/// Truncate to at most `max_chars` characters, appending an ellipsis when
/// anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Leading words of `text`, with an ellipsis when more words follow.
pub fn text_preview(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().take(max_words + 1).collect();

    if words.len() > max_words {
        format!("{}...", words[..max_words].join(" "))
    } else {
        words.join(" ")
    }
}

/// Strip control characters, keeping whitespace.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("Hello world", 20), "Hello world");
        assert_eq!(truncate_chars("This is a very long text", 10), "This is...");
    }

    #[test]
    fn test_truncate_is_safe_on_arabic_text() {
        let text = "قانون الضريبة على الدخل رقم 91 لسنة 2005";
        let cut = truncate_chars(text, 10);
        assert!(cut.ends_with("..."));
        assert!(cut.chars().count() <= 10);
    }

    #[test]
    fn test_text_preview() {
        assert_eq!(text_preview("one two three", 5), "one two three");
        assert_eq!(text_preview("one two three four", 2), "one two...");
        assert_eq!(text_preview("", 5), "");
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize("a\u{0000}b\nc"), "ab\nc");
    }
}
