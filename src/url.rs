//! URL helpers for syndication: where posts live on the site, canonical URLs,
//! and rewriting site-relative links into absolute ones (feed readers and
//! third-party platforms can't resolve `/images/foo.png`).

use std::sync::LazyLock;

use regex::Regex;
use url::{ParseError, Url};

/// The path under which posts are served.
pub const BLOG_PATH: &str = "blog";

static RELATIVE_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\b(src|href)="/([^/])"#).unwrap());

static RELATIVE_MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]\(/([^/])").unwrap());

/// Returns `site` with a trailing slash so relative joins keep its path.
pub fn directory(site: &Url) -> Url {
    let mut site = site.clone();
    if !site.path().ends_with('/') {
        let path = format!("{}/", site.path());
        site.set_path(&path);
    }
    site
}

/// `{site}/blog/{slug}`
pub fn post_url(site: &Url, slug: &str) -> Result<Url> {
    directory(site).join(&format!("{}/{}", BLOG_PATH, slug))
}

/// The canonical URL of a site path: the path joined to the site with any
/// query string and fragment dropped.
pub fn canonical(site: &Url, path: &str) -> Result<Url> {
    let mut url = directory(site).join(path.trim_start_matches('/'))?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Rewrites `src="/…"` and `href="/…"` attributes to absolute URLs on `site`.
/// Protocol-relative URLs (`//host/…`) are left alone.
pub fn absolutize_html(html: &str, site: &Url) -> String {
    let prefix = origin_prefix(site);
    RELATIVE_ATTRIBUTE
        .replace_all(html, format!("${{1}}=\"{}/${{2}}", prefix).as_str())
        .into_owned()
}

/// Like [`absolutize_html`], but also rewrites markdown link and image
/// targets of the form `](/…)`.
pub fn absolutize_markdown(markdown: &str, site: &Url) -> String {
    let prefix = origin_prefix(site);
    let html_done = absolutize_html(markdown, site);
    RELATIVE_MARKDOWN_LINK
        .replace_all(&html_done, format!("]({}/${{1}}", prefix).as_str())
        .into_owned()
}

// `https://example.org/` and `https://example.org` both give
// `https://example.org`; a site below a path keeps it.
fn origin_prefix(site: &Url) -> String {
    site.as_str().trim_end_matches('/').to_owned()
}

type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod test {
    use super::*;

    fn site() -> Url {
        Url::parse("https://example.org").unwrap()
    }

    #[test]
    fn test_post_url() -> Result<()> {
        assert_eq!(
            "https://example.org/blog/hello",
            post_url(&site(), "hello")?.as_str()
        );
        assert_eq!(
            "https://example.org/me/blog/hello",
            post_url(&Url::parse("https://example.org/me")?, "hello")?.as_str()
        );
        Ok(())
    }

    #[test]
    fn test_canonical_drops_query_and_fragment() -> Result<()> {
        fixture_canonical("https://example.org/blog", "/blog?q=rust&page=2")?;
        fixture_canonical("https://example.org/blog/post", "/blog/post#comments")?;
        fixture_canonical("https://example.org/", "/")
    }

    #[test]
    fn test_absolutize_html() {
        assert_eq!(
            r#"<img src="https://example.org/cat.png"><a href="https://example.org/">home</a>"#,
            absolutize_html(r#"<img src="/cat.png"><a href="/">home</a>"#, &site())
        );
    }

    #[test]
    fn test_absolutize_leaves_other_urls() {
        let html = r#"<a href="//cdn.example.org/x.js"></a><a href="https://x.org/a"></a><a href="rel">r</a>"#;
        assert_eq!(html, absolutize_html(html, &site()));
    }

    #[test]
    fn test_absolutize_markdown() {
        assert_eq!(
            "[post](https://example.org/blog/other) ![img](https://example.org/i.png) [x](https://x.org)",
            absolutize_markdown("[post](/blog/other) ![img](/i.png) [x](https://x.org)", &site())
        );
    }

    fn fixture_canonical(wanted: &str, path: &str) -> Result<()> {
        assert_eq!(wanted, canonical(&site(), path)?.as_str());
        Ok(())
    }
}
