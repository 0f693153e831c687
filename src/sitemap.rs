//! Sitemap generation.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.org/blog/hello</loc>
//!   </url>
//! </urlset>
//! ```

use std::path::Path;

use url::{ParseError, Url};
use walkdir::WalkDir;

use crate::post::Post;
use crate::url::{canonical, post_url};
use crate::util::escape_html;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Builds the sitemap: one entry per static page path, then one per post.
pub fn sitemap_xml(
    site_url: &Url,
    static_pages: &[String],
    posts: &[Post],
) -> Result<String, ParseError> {
    let mut locs = Vec::with_capacity(static_pages.len() + posts.len());
    for page in static_pages {
        locs.push(canonical(site_url, page)?);
    }
    for post in posts {
        locs.push(post_url(site_url, &post.slug)?);
    }

    let mut xml = String::with_capacity(128 * locs.len() + 128);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<urlset xmlns="{}">"#, SITEMAP_NS));
    xml.push('\n');
    for loc in locs {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_html(loc.as_str())));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    Ok(xml)
}

/// Finds the static page paths under `dir`. Each file maps to a site path
/// (`about.html` → `/about`, `blog/index.html` → `/blog`, `index.html` → `/`).
/// Files whose name starts with `_`, paths containing `[` (dynamic routes)
/// and `404` pages are skipped.
pub fn discover_pages(dir: &Path) -> Result<Vec<String>, walkdir::Error> {
    let mut pages = Vec::new();
    for result in WalkDir::new(dir).sort_by_file_name() {
        let entry = result?;
        if !entry.file_type().is_file() {
            continue;
        }
        // strip_prefix shouldn't fail since `dir` is always an ancestor of
        // the entry's path
        let relative = match entry.path().strip_prefix(dir) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        if let Some(page) = page_path(relative) {
            pages.push(page);
        }
    }
    pages.dedup();
    Ok(pages)
}

fn page_path(relative: &Path) -> Option<String> {
    let file_name = relative.file_name()?.to_str()?;
    let stem = relative.file_stem()?.to_str()?;
    let relative_str = relative.to_str()?;
    if file_name.starts_with('_') || relative_str.contains('[') || stem == "404" {
        return None;
    }

    let mut segments: Vec<&str> = relative
        .parent()
        .into_iter()
        .flat_map(|parent| parent.iter())
        .filter_map(|segment| segment.to_str())
        .collect();
    if stem != "index" {
        segments.push(stem);
    }
    Some(format!("/{}", segments.join("/")))
}
