//! Support for creating an RSS 2.0 feed from a list of posts.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::LazyLock;

use chrono::{TimeZone, Utc};
use regex::Regex;
use rss::{validation::Validate, Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use thiserror::Error;
use url::Url;

use crate::markdown;
use crate::post::Post;
use crate::url::{absolutize_html, post_url};

const CONTENT_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/content/";

static IFRAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<iframe\b.*?</iframe>").unwrap());

/// Bundled configuration for creating a feed.
pub struct FeedConfig<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub site_url: &'a Url,
}

/// Creates a feed from some configuration ([`FeedConfig`]) and a list of
/// [`Post`]s and writes the result to a [`std::io::Write`].
pub fn write_feed<W: Write>(config: &FeedConfig, posts: &[Post], mut w: W) -> Result<()> {
    w.write_all(rss_feed(config, posts)?.as_bytes())?;
    Ok(())
}

/// Renders the feed document. Every post becomes exactly one item carrying
/// its full rendered HTML.
pub fn rss_feed(config: &FeedConfig, posts: &[Post]) -> Result<String> {
    let channel = channel(config, posts)?;
    channel.validate().map_err(|e| Error::Validation(e.to_string()))?;
    Ok(channel.to_string())
}

fn channel(config: &FeedConfig, posts: &[Post]) -> Result<Channel> {
    let items = posts
        .iter()
        .map(|post| item(config.site_url, post))
        .collect::<Result<Vec<_>>>()?;

    let mut namespaces = BTreeMap::new();
    namespaces.insert("content".to_owned(), CONTENT_NAMESPACE.to_owned());

    Ok(ChannelBuilder::default()
        .title(config.title)
        .link(config.site_url.as_str())
        .description(config.description)
        .last_build_date(Some(Utc::now().to_rfc2822()))
        .namespaces(namespaces)
        .items(items)
        .build())
}

fn item(site_url: &Url, post: &Post) -> Result<Item> {
    let link = post_url(site_url, &post.slug)?.to_string();

    // Dates without a timezone are taken to be UTC throughout.
    let pub_date = Utc.from_utc_datetime(&post.created).to_rfc2822();

    Ok(ItemBuilder::default()
        .title(Some(post.metadata.title.clone()))
        .description(Some(post.metadata.description.clone()))
        .link(Some(link.clone()))
        .guid(Some(
            GuidBuilder::default()
                .permalink(false)
                .value(format!("{}/", link))
                .build(),
        ))
        .pub_date(Some(pub_date))
        .content(Some(feed_content(&markdown::render(&post.body), site_url)))
        .build())
}

/// Makes rendered post HTML safe for feed readers: site-relative URLs become
/// absolute and iframes are dropped.
pub fn feed_content(html: &str, site_url: &Url) -> String {
    IFRAME.replace_all(&absolutize_html(html, site_url), "").into_owned()
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned when a post URL can't be built from the site URL.
    #[error("building post url: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Returned when the generated channel isn't valid RSS.
    #[error("rss validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::fixture;

    fn site() -> Url {
        Url::parse("https://example.org/").unwrap()
    }

    fn posts() -> Vec<Post> {
        let mut first = fixture("first", "First & best", "One", "a", "2024-06-14");
        first.body = "![cat](/cat.png)\n\n<iframe src=\"https://video\"></iframe>\n".to_owned();
        vec![
            first,
            fixture("second", "Second", "Two", "b", "2024-06-01T10:30:00Z"),
        ]
    }

    fn feed() -> Result<String> {
        let site = site();
        rss_feed(
            &FeedConfig {
                title: "Blog",
                description: "A blog",
                site_url: &site,
            },
            &posts(),
        )
    }

    #[test]
    fn test_every_post_appears_once() -> Result<()> {
        let xml = feed()?;
        assert_eq!(2, xml.matches("<item>").count());
        assert_eq!(1, xml.matches("<link>https://example.org/blog/first</link>").count());
        assert_eq!(1, xml.matches("<link>https://example.org/blog/second</link>").count());
        Ok(())
    }

    #[test]
    fn test_item_fields() -> Result<()> {
        let xml = feed()?;
        assert!(xml.contains(r#"<guid isPermaLink="false">https://example.org/blog/first/</guid>"#), "{}", xml);
        assert!(xml.contains("<pubDate>Fri, 14 Jun 2024 00:00:00 +0000</pubDate>"));
        assert!(xml.contains("First &amp; best"));
        assert!(xml.contains("content:encoded"));
        assert!(xml.contains(CONTENT_NAMESPACE));
        Ok(())
    }

    #[test]
    fn test_feed_content() {
        let html = "<p><img loading=\"lazy\" src=\"/cat.png\" alt=\"\" /></p>\n<iframe src=\"x\">\n</iframe><p>after</p>";
        assert_eq!(
            "<p><img loading=\"lazy\" src=\"https://example.org/cat.png\" alt=\"\" /></p>\n<p>after</p>",
            feed_content(html, &site())
        );
    }
}
