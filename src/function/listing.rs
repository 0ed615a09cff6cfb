// listing.rs
use once_cell::sync::Lazy;
use regex::Regex;

// 目录列表特征，任意一条命中即判定
static DIR_LISTING_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)<title>Index of /",
        r"(?i)Directory listing for /",
        r"(?i)Name\s+Last modified\s+Size\s+Description",
        r#"(?i)<a href="\?C=N;O=D">Name</a>"#,
        r"(?s)<pre>.*?</pre>",
        r"(?i)\[DIR\]",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("directory listing pattern must compile"))
    .collect()
});

/// Content types whose bodies are worth scanning for listing markers.
/// Expects an already lower-cased header value.
pub fn is_html(content_type: &str) -> bool {
    content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
}

/// Heuristic check for an auto-generated directory index page.
pub fn is_directory_listing(body: &str, content_type: &str) -> bool {
    if !is_html(&content_type.to_ascii_lowercase()) {
        return false;
    }
    DIR_LISTING_PATTERNS.iter().any(|pattern| pattern.is_match(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apache_index_title() {
        assert!(is_directory_listing("<html><title>Index of /files</title></html>", "text/html"));
        assert!(is_directory_listing("<TITLE>index of /backup</TITLE>", "text/html; charset=UTF-8"));
    }

    #[test]
    fn every_marker_matches_on_its_own() {
        let bodies = [
            "<h1>Directory listing for /uploads/</h1>",
            "<th>Name   Last modified   Size   Description</th>",
            r#"<a href="?C=N;O=D">Name</a>"#,
            "<pre>\n<a href=\"a.txt\">a.txt</a>\n</pre>",
            "<img alt=\"[DIR]\" src=\"/icons/folder.gif\">",
        ];
        for body in bodies {
            assert!(is_directory_listing(body, "text/html"), "no match for {body}");
        }
    }

    #[test]
    fn non_html_is_never_a_listing() {
        let body = "<title>Index of /</title>";
        assert!(!is_directory_listing(body, "text/plain"));
        assert!(!is_directory_listing(body, "application/json"));
        assert!(!is_directory_listing(body, ""));
    }

    #[test]
    fn ordinary_page_is_not_a_listing() {
        let body = "<html><head><title>Welcome</title></head><body>Hello</body></html>";
        assert!(!is_directory_listing(body, "text/html"));
    }

    #[test]
    fn pre_marker_is_case_sensitive() {
        assert!(!is_directory_listing("<PRE>data</PRE>", "text/html"));
    }

    #[test]
    fn detection_is_pure() {
        let body = "<pre>x</pre>";
        let first = is_directory_listing(body, "text/html");
        for _ in 0..5 {
            assert_eq!(is_directory_listing(body, "text/html"), first);
        }
    }
}
