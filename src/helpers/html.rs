//! HTML helper functions

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Strip HTML tags from a string, leaving surrounding text untouched
pub fn strip_html(s: &str) -> String {
    TAG.replace_all(s, "").into_owned()
}

/// Replace tags with spaces, collapse whitespace runs and trim
///
/// # Examples
/// ```ignore
/// plain_text("<p>Hello  <b>world</b></p>") // -> "Hello world"
/// ```
pub fn plain_text(s: &str) -> String {
    let without_tags = TAG.replace_all(s, " ");
    WHITESPACE
        .replace_all(&without_tags, " ")
        .trim()
        .to_string()
}

/// Keep at most `length` characters
pub fn take_chars(s: &str, length: usize) -> String {
    match s.char_indices().nth(length) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Truncate a string to a specified length
pub fn truncate(s: &str, length: usize, omission: Option<&str>) -> String {
    let omission = omission.unwrap_or("...");

    if s.chars().count() <= length {
        s.to_string()
    } else {
        let truncated = take_chars(s, length.saturating_sub(omission.chars().count()));
        format!("{}{}", truncated.trim_end(), omission)
    }
}

/// Escape a JSON document for embedding inside a `<script>` element
pub fn script_safe_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello <b>World</b></p>"), "Hello World");
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(plain_text("<p>Hello  world</p>"), "Hello world");
        assert_eq!(plain_text("line<br/>break\n\tand  tabs"), "line break and tabs");
        assert_eq!(plain_text("<div></div>"), "");
    }

    #[test]
    fn test_take_chars() {
        assert_eq!(take_chars("héllo", 2), "hé");
        assert_eq!(take_chars("hi", 10), "hi");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello World", 8, None), "Hello...");
        assert_eq!(truncate("Hi", 10, None), "Hi");
    }

    #[test]
    fn test_script_safe_json() {
        assert_eq!(
            script_safe_json(r#"{"a":"</script>"}"#),
            r#"{"a":"<\/script>"}"#
        );
    }
}
