//! Text cleanup: entity decoding, capitalization, CMS URL rewriting.

use regex::Regex;

/// Encoded forms the CMS is known to leave in rendered titles.
const ENTITIES: &[(&str, &str)] = &[
    ("&#8211;", "—"),
    ("&#8212;", "—"),
    ("&#8220;", "\""),
    ("&#8221;", "\""),
    ("&#8217;", "'"),
    ("&#8216;", "'"),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&nbsp;", " "),
];

/// Decodes the fixed table of HTML entities in a single pass.
///
/// Idempotent on already-decoded text.
pub fn decode_entities(text: &str) -> String {
    let mut decoded = text.to_string();
    for (encoded, plain) in ENTITIES {
        decoded = decoded.replace(encoded, plain);
    }
    decoded
}

/// Uppercases the first character, leaving the rest untouched.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Rewrites absolute CMS URLs into relative paths so the output is
/// host-agnostic.
///
/// The content root (`https://[wordpress.]<host>/homepage/`) maps to `./`;
/// any first-level subpath maps to `./<subpath>`. Unrelated URLs are left
/// untouched.
pub fn rewrite_cms_urls(content: &str, site_host: &str) -> String {
    let host = regex::escape(site_host);

    // The regex crate has no lookahead; the delimiter is captured and kept.
    let root = Regex::new(&format!(r#"https?://(?:wordpress\.)?{}/homepage/?(["'\s>]|$)"#, host)).unwrap();
    let rewritten = root.replace_all(content, "./$1");

    let subpath = Regex::new(&format!(r#"https?://(?:wordpress\.)?{}/homepage/([^/"]+)/?"#, host)).unwrap();
    subpath.replace_all(&rewritten, "./$1").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("A &amp; B", "A & B")]
    #[case("Caf&eacute; &amp; Bar", "Caf&eacute; & Bar")]
    #[case("&#8220;quoted&#8221;", "\"quoted\"")]
    #[case("it&#8217;s", "it's")]
    #[case("a &#8211; b &#8212; c", "a — b — c")]
    #[case("1 &lt; 2 &gt; 0", "1 < 2 > 0")]
    #[case("&quot;x&quot;&nbsp;y", "\"x\" y")]
    fn test_decode_entities(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(decode_entities(input), expected);
    }

    #[test]
    fn test_decode_idempotent() {
        let once = decode_entities("A &amp; B — \"done\"");
        assert_eq!(decode_entities(&once), once);
    }

    #[rstest]
    #[case("", "")]
    #[case("hello", "Hello")]
    #[case("Already", "Already")]
    #[case("über", "Über")]
    fn test_capitalize_first(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(capitalize_first(input), expected);
    }

    #[test]
    fn test_rewrite_subpath() {
        let html = r#"<a href="https://wordpress.example/homepage/foo">foo</a>"#;
        assert_eq!(rewrite_cms_urls(html, "example"), r#"<a href="./foo">foo</a>"#);
    }

    #[test]
    fn test_rewrite_root() {
        let html = r#"<a href="https://example/homepage/">home</a>"#;
        assert_eq!(rewrite_cms_urls(html, "example"), r#"<a href="./">home</a>"#);
    }

    #[test]
    fn test_rewrite_leaves_unrelated_urls() {
        let html = r#"<a href="https://other.example/homepage/foo">x</a>"#;
        assert_eq!(rewrite_cms_urls(html, "example.org"), html);
    }

    #[test]
    fn test_rewrite_plain_http() {
        let html = r#"<a href="http://wordpress.example.org/homepage/bar/">bar</a>"#;
        assert_eq!(rewrite_cms_urls(html, "example.org"), r#"<a href="./bar">bar</a>"#);
    }
}
