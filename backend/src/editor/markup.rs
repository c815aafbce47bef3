//! Rule-based helpers over the editor's HTML markup.
//!
//! None of this is a real HTML parser. Nested or overlapping tags may convert
//! imperfectly, which is acceptable for a quick export.

use once_cell::sync::Lazy;
use regex::Regex;

/// Substitutions applied in order by [`to_markdown`].
static MARKDOWN_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"<h1>(.*?)</h1>", "# ${1}\n"),
        (r"<h2>(.*?)</h2>", "## ${1}\n"),
        (r"<h3>(.*?)</h3>", "### ${1}\n"),
        (r"<strong>(.*?)</strong>", "**${1}**"),
        (r"<em>(.*?)</em>", "*${1}*"),
        (r"<u>(.*?)</u>", "_${1}_"),
        (r"<li>(.*?)</li>", "- ${1}\n"),
        (r"<br\s*/?>", "\n"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (compile(pattern), replacement))
    .collect()
});

static ANY_TAG: Lazy<Regex> = Lazy::new(|| compile(r"<[^>]+>"));

static IMG_OPEN: Lazy<Regex> = Lazy::new(|| compile(r"<img([^>]*)"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("markup pattern compiles")
}

/// Approximate the markup as markdown: headings, emphasis, list items and
/// line breaks are converted, every other tag is dropped.
pub fn to_markdown(html: &str) -> String {
    let mut text = html.to_string();
    for (pattern, replacement) in MARKDOWN_RULES.iter() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }
    ANY_TAG.replace_all(&text, "").into_owned()
}

/// Count `<img` elements that carry no `alt=` attribute.
pub fn count_images_missing_alt(html: &str) -> usize {
    IMG_OPEN
        .captures_iter(html)
        .filter(|caps| !caps[1].contains("alt="))
        .count()
}

/// Words of visible text, with tags treated as whitespace.
pub fn word_count(html: &str) -> usize {
    ANY_TAG.replace_all(html, " ").split_whitespace().count()
}

/// Whether the markup renders anything: visible text or at least one image.
pub fn has_visible_content(html: &str) -> bool {
    word_count(html) > 0 || IMG_OPEN.is_match(html)
}

/// Estimated reading time at 200 words per minute, never below one minute.
pub fn read_time_minutes(html: &str) -> usize {
    let minutes = (word_count(html) as f64 / 200.0).round() as usize;
    minutes.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_headings_and_paragraphs() {
        let md = to_markdown("<h2>New Post</h2><p>Start writing your post here...</p>");
        assert_eq!(md, "## New Post\nStart writing your post here...");
    }

    #[test]
    fn test_markdown_inline_and_lists() {
        let html = "<p>A <strong>bold</strong> and <em>it</em> <u>u</u></p>\
                    <ul><li><p>one</p></li><li>two</li></ul>line<br>break<br/>end";
        assert_eq!(
            to_markdown(html),
            "A **bold** and *it* _u_- one\n- two\nline\nbreak\nend"
        );
    }

    #[test]
    fn test_markdown_drops_unknown_tags() {
        assert_eq!(
            to_markdown(r#"<p><a href="https://example.com">link</a> <s>gone</s></p>"#),
            "link gone"
        );
        assert_eq!(to_markdown("<h1>Title</h1>"), "# Title\n");
    }

    #[test]
    fn test_missing_alt_count() {
        let html = r#"<p><img src="a.png"><img src="b.png" alt="b"><img src="c.png" /></p>"#;
        assert_eq!(count_images_missing_alt(html), 2);
        assert_eq!(count_images_missing_alt("<p>no images</p>"), 0);
        assert_eq!(
            count_images_missing_alt(r#"<img alt="" src="x.png">"#),
            0
        );
    }

    #[test]
    fn test_visible_content() {
        assert!(has_visible_content("<p>a</p>"));
        assert!(has_visible_content(r#"<p><img src="x.png"></p>"#));
        assert!(!has_visible_content("<p></p>"));
        assert!(!has_visible_content("  "));
    }

    #[test]
    fn test_word_count_and_read_time() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("<h2>New Post</h2><p>Start writing</p>"), 4);
        assert_eq!(read_time_minutes("<p>short</p>"), 1);

        let long = format!("<p>{}</p>", "word ".repeat(500));
        assert_eq!(word_count(&long), 500);
        assert_eq!(read_time_minutes(&long), 3);
    }
}
