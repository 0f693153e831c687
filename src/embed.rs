//! Expansion of embed placeholders in rendered post HTML.
//!
//! A post can embed a tweet by writing `{% twitter <id> %}` on its own line.
//! [`expand_embeds`] swaps each placeholder for the HTML snippet returned by
//! an [`EmbedProvider`]. A failed lookup degrades to an empty string; it never
//! fails the render.

use std::sync::LazyLock;
use std::time::Duration;

use regex::{Captures, Regex};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Appended once to any page containing at least one expanded tweet.
pub const TWITTER_WIDGETS_SCRIPT: &str =
    r#"<script async src="https://platform.twitter.com/widgets.js" charset="utf-8"></script>"#;

const TWITTER_OEMBED_URL: &str = "https://publish.twitter.com/oembed";

static TWITTER_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{% twitter (.*?) %\}").unwrap());

/// Something that can turn a tweet id into embeddable HTML.
pub trait EmbedProvider {
    fn tweet_html(&self, id: &str) -> Result<String>;
}

/// Fetches tweet embeds from Twitter's oEmbed endpoint.
pub struct TwitterEmbed {
    client: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct OEmbed {
    html: String,
}

impl TwitterEmbed {
    pub fn new() -> Result<TwitterEmbed> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(TwitterEmbed { client })
    }
}

impl EmbedProvider for TwitterEmbed {
    fn tweet_html(&self, id: &str) -> Result<String> {
        let status_url = format!("https://twitter.com/a/status/{}", id);
        let response = self
            .client
            .get(TWITTER_OEMBED_URL)
            .query(&[
                ("url", status_url.as_str()),
                ("omit_script", "1"),
                ("align", "center"),
                ("hide_thread", "1"),
            ])
            .send()?
            .error_for_status()?;
        Ok(response.json::<OEmbed>()?.html)
    }
}

/// A provider for offline builds: every lookup fails, so placeholders are
/// simply removed.
pub struct NoEmbeds;

impl EmbedProvider for NoEmbeds {
    fn tweet_html(&self, _id: &str) -> Result<String> {
        Err(Error::Disabled)
    }
}

/// Replaces every `{% twitter <id> %}` in `html`. The widgets script is
/// appended once if at least one tweet was expanded.
pub fn expand_embeds(html: &str, provider: &dyn EmbedProvider) -> String {
    if !TWITTER_PLACEHOLDER.is_match(html) {
        return html.to_owned();
    }

    let mut expanded = 0usize;
    let mut out = TWITTER_PLACEHOLDER
        .replace_all(html, |caps: &Captures| {
            let id = caps[1].trim();
            if id.is_empty() {
                warn!("empty tweet id in embed placeholder");
                return String::new();
            }
            match provider.tweet_html(id) {
                Ok(snippet) => {
                    debug!(id, "expanded tweet embed");
                    expanded += 1;
                    snippet
                }
                Err(err) => {
                    warn!(id, error = %err, "tweet embed unavailable");
                    String::new()
                }
            }
        })
        .into_owned();

    if expanded > 0 {
        out.push_str(TWITTER_WIDGETS_SCRIPT);
    }
    out
}

/// The result of an embed lookup.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failed embed lookup.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned for transport errors and non-success responses.
    #[error("embed request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Returned by [`NoEmbeds`].
    #[error("embeds are disabled")]
    Disabled,
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;

    /// Serves canned snippets and records the ids it was asked for.
    struct FakeProvider {
        known: &'static str,
        requested: RefCell<Vec<String>>,
    }

    impl EmbedProvider for FakeProvider {
        fn tweet_html(&self, id: &str) -> Result<String> {
            self.requested.borrow_mut().push(id.to_owned());
            if id == self.known {
                Ok(format!("<blockquote>tweet {}</blockquote>", id))
            } else {
                Err(Error::Disabled)
            }
        }
    }

    fn provider() -> FakeProvider {
        FakeProvider {
            known: "42",
            requested: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_expands_known_tweets_and_appends_script_once() {
        let provider = provider();
        let html = expand_embeds(
            "<p>{% twitter 42 %}</p><p>{% twitter 42 %}</p>",
            &provider,
        );
        assert_eq!(
            format!(
                "<p><blockquote>tweet 42</blockquote></p><p><blockquote>tweet 42</blockquote></p>{}",
                TWITTER_WIDGETS_SCRIPT
            ),
            html
        );
        assert_eq!(1, html.matches(TWITTER_WIDGETS_SCRIPT).count());
        assert_eq!(vec!["42", "42"], *provider.requested.borrow());
    }

    #[test]
    fn test_failed_lookup_degrades_to_empty() {
        let html = expand_embeds("<p>{% twitter 7 %}</p>", &provider());
        assert_eq!("<p></p>", html);
    }

    #[test]
    fn test_mixed_lookups_still_append_script() {
        let html = expand_embeds("{% twitter 7 %}{% twitter 42 %}", &provider());
        assert_eq!(
            format!("<blockquote>tweet 42</blockquote>{}", TWITTER_WIDGETS_SCRIPT),
            html
        );
    }

    #[test]
    fn test_no_placeholders_is_untouched() {
        let provider = provider();
        assert_eq!("<p>hi</p>", expand_embeds("<p>hi</p>", &provider));
        assert!(provider.requested.borrow().is_empty());
    }

    #[test]
    fn test_no_embeds_removes_placeholders() {
        assert_eq!("<p></p>", expand_embeds("<p>{% twitter 1 %}</p>", &NoEmbeds));
    }
}
