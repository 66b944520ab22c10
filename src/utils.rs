use std::path::{Path, PathBuf};
use url::Url;

/// Convert a target name or URL slug to a sanitized filename stem
pub fn sanitize_filename(name: &str) -> String {
    let mut stem = name.replace(['/', '\\', ':', '?', '&', '=', '#', '%', ' '], "_");
    stem = stem.trim_matches('.').to_string();

    // Limit filename length
    if stem.chars().count() > 100 {
        stem.chars().take(100).collect()
    } else {
        stem
    }
}

/// Path of the screenshot for `name` captured under the given viewport tag
pub fn screenshot_path(dir: &Path, name: &str, tag: &str) -> PathBuf {
    dir.join(format!("{}_{}.png", sanitize_filename(name), tag))
}

/// Name for the `index`-th discovered article: the name stem of the article
/// prefix followed by the URL's final path segment.
pub fn article_name(prefix: &str, url: &str, index: usize) -> String {
    let slug = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
        })
        .unwrap_or_else(|| format!("article-{}", index));

    let stem = prefix.trim_matches('/').replace('/', "-");
    if stem.is_empty() {
        sanitize_filename(&slug)
    } else {
        sanitize_filename(&format!("{}-{}", stem, slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("blog-index"), "blog-index");
        assert_eq!(sanitize_filename("a/b?c=d"), "a_b_c_d");
        assert_eq!(sanitize_filename(&"x".repeat(150)).len(), 100);
    }

    #[test]
    fn test_screenshot_path() {
        let path = screenshot_path(Path::new("shots"), "home", "desktop_full");
        assert_eq!(path, PathBuf::from("shots/home_desktop_full.png"));
    }

    #[test]
    fn test_article_name_uses_last_segment() {
        assert_eq!(
            article_name("/blog/", "https://example.com/blog/tax/deductions", 0),
            "blog-deductions"
        );
        assert_eq!(
            article_name("/blog/", "https://example.com/blog/post-a/", 1),
            "blog-post-a"
        );
    }

    #[test]
    fn test_article_name_falls_back_to_index() {
        assert_eq!(article_name("/blog/", "https://example.com/", 3), "blog-article-3");
        assert_eq!(article_name("/", "not a url", 2), "article-2");
    }
}
