//! Literal substring substitution applied by the transform stage.

use crate::config::RewriteConfig;

/// A literal `from` → `to` replacement.
///
/// Matching is case-sensitive and scans left to right; matches never
/// overlap and there is no limit on how many are replaced. Replaced text is
/// never rescanned, so an existing `https://` is not turned into
/// `httpss://`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    from: String,
    to: String,
}

impl Substitution {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn from_config(config: &RewriteConfig) -> Self {
        Self::new(config.from.clone(), config.to.clone())
    }

    /// Text being searched for.
    pub fn pattern(&self) -> &str {
        &self.from
    }

    /// Text substituted for each match.
    pub fn replacement(&self) -> &str {
        &self.to
    }

    /// Replace every occurrence, returning the new bytes and the match count.
    ///
    /// Works on raw bytes, so content in any ASCII-compatible encoding is
    /// rewritten without being decoded. Input without a match is returned
    /// as-is without reallocating. An empty pattern never matches.
    pub fn apply(&self, content: Vec<u8>) -> (Vec<u8>, usize) {
        let pattern = self.from.as_bytes();
        if pattern.is_empty() {
            return (content, 0);
        }
        let Some(first) = find(&content, pattern) else {
            return (content, 0);
        };

        let mut out = Vec::with_capacity(content.len());
        let mut count = 0;
        let mut start = 0;
        let mut next = Some(first);
        while let Some(offset) = next {
            let at = start + offset;
            out.extend_from_slice(&content[start..at]);
            out.extend_from_slice(self.to.as_bytes());
            start = at + pattern.len();
            count += 1;
            next = find(&content[start..], pattern);
        }
        out.extend_from_slice(&content[start..]);
        (out, count)
    }
}

/// Offset of the first occurrence of `needle` in `haystack`.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

impl Default for Substitution {
    fn default() -> Self {
        Self::from_config(&RewriteConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(text: &str) -> (String, usize) {
        let (out, n) = Substitution::default().apply(text.as_bytes().to_vec());
        (String::from_utf8(out).unwrap(), n)
    }

    #[test]
    fn test_replaces_every_occurrence() {
        let (out, n) = apply(r#"<a href="http://x.com">http://y.com</a> http://z"#);
        assert_eq!(out, r#"<a href="https://x.com">https://y.com</a> https://z"#);
        assert_eq!(n, 3);
    }

    #[test]
    fn test_leaves_https_links_alone() {
        let (out, n) = apply("https://a.com and http://b.com");
        assert_eq!(out, "https://a.com and https://b.com");
        assert_eq!(n, 1);
        assert!(!out.contains("httpss://"));
    }

    #[test]
    fn test_is_idempotent() {
        let text = "http://a https://b http://http://c hthttp://";
        let (once, _) = apply(text);
        let (twice, n) = apply(&once);
        assert_eq!(once, twice);
        assert_eq!(n, 0);
    }

    #[test]
    fn test_case_sensitive() {
        let (out, n) = apply("HTTP://A.COM Http://b");
        assert_eq!(out, "HTTP://A.COM Http://b");
        assert_eq!(n, 0);
    }

    #[test]
    fn test_non_overlapping_left_to_right() {
        let sub = Substitution::new("aa", "b");
        let (out, n) = sub.apply(b"aaaaa".to_vec());
        assert_eq!(out, b"bba");
        assert_eq!(n, 2);
    }

    #[test]
    fn test_empty_pattern_is_noop() {
        let sub = Substitution::new("", "x");
        let (out, n) = sub.apply(b"abc".to_vec());
        assert_eq!(out, b"abc");
        assert_eq!(n, 0);
    }

    #[test]
    fn test_rewrites_legacy_encoded_bytes() {
        // Latin-1 "café" is not valid UTF-8
        let content = b"<p>caf\xE9</p><a href=\"http://x.com\">".to_vec();
        let (out, n) = Substitution::default().apply(content);
        assert_eq!(out, b"<p>caf\xE9</p><a href=\"https://x.com\">");
        assert_eq!(n, 1);
    }

    #[test]
    fn test_match_at_end_of_content() {
        let (out, n) = apply("see http://");
        assert_eq!(out, "see https://");
        assert_eq!(n, 1);
    }

    #[test]
    fn test_empty_text() {
        let (out, n) = apply("");
        assert!(out.is_empty());
        assert_eq!(n, 0);
    }

    #[test]
    fn test_from_config() {
        let config = RewriteConfig {
            extension: ".md".to_string(),
            from: "foo".to_string(),
            to: "bar".to_string(),
        };
        let sub = Substitution::from_config(&config);
        assert_eq!(sub.pattern(), "foo");
        assert_eq!(sub.replacement(), "bar");
    }
}
