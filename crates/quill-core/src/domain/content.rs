//! Derived content fields: excerpts and cover images pulled out of raw markup.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum excerpt length in characters, before the ellipsis.
pub const EXCERPT_LIMIT: usize = 120;

/// Category assigned when a post carries no labels.
pub const UNCATEGORIZED: &str = "Uncategorized";

const ELLIPSIS: &str = "...";

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

static RE_IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img[^>]+src=["']([^"'>]+)["']"#).expect("valid regex")
});

/// Remove markup tags and non-breaking space entities, then trim.
pub fn strip_markup(markup: &str) -> String {
    RE_TAG
        .replace_all(markup, "")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

/// Plain-text excerpt of `content`, truncated to [`EXCERPT_LIMIT`] characters.
///
/// An ellipsis is appended only when something was cut off. Empty content
/// yields an empty excerpt.
pub fn derive_excerpt(content: &str) -> String {
    let text = strip_markup(content);
    let mut chars = text.char_indices();
    match chars.nth(EXCERPT_LIMIT) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text,
    }
}

/// The `src` of the first `<img>` tag in `markup`, if any.
pub fn first_image_src(markup: &str) -> Option<&str> {
    RE_IMG_SRC
        .captures(markup)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_strips_tags_without_ellipsis() {
        assert_eq!(derive_excerpt("<p>Hello <b>world</b></p>"), "Hello world");
    }

    #[test]
    fn test_excerpt_truncates_long_content() {
        let content = format!("<div>{}</div>", "a".repeat(200));
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt, format!("{}...", "a".repeat(EXCERPT_LIMIT)));
    }

    #[test]
    fn test_excerpt_at_exact_limit_is_untouched() {
        let content = "b".repeat(EXCERPT_LIMIT);
        assert_eq!(derive_excerpt(&content), content);
    }

    #[test]
    fn test_excerpt_counts_characters_not_bytes() {
        let content = "த".repeat(EXCERPT_LIMIT + 5);
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt.chars().count(), EXCERPT_LIMIT + 3);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn test_empty_content_gives_empty_excerpt() {
        assert_eq!(derive_excerpt(""), "");
    }

    #[test]
    fn test_strip_markup_replaces_nbsp() {
        assert_eq!(strip_markup("  <p>one&nbsp;two</p> "), "one two");
    }

    #[test]
    fn test_first_image_src() {
        let html = r#"<p>intro</p><IMG class="x" SRC='https://cdn.test/a.jpg'><img src="b.jpg">"#;
        assert_eq!(first_image_src(html), Some("https://cdn.test/a.jpg"));
        assert_eq!(first_image_src("<p>no images</p>"), None);
    }
}
