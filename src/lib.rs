//! The library code for the `ogham` blog engine. Posts are markdown files
//! with YAML frontmatter; everything else is derived from them on every run:
//!
//! 1. Loading posts from disk ([`crate::store`], [`crate::post`])
//! 2. Rendering a post body to HTML ([`crate::markdown`]), with syntax
//!    highlighting ([`crate::highlight`]) and tweet embeds
//!    ([`crate::embed`])
//! 3. Building list pages: search ([`crate::search`]), pagination
//!    ([`crate::pagination`]) and the two combined ([`crate::listing`])
//! 4. The "more posts" sections of a post page ([`crate::rank`])
//! 5. Syndication: the RSS feed ([`crate::feed`]), the sitemap
//!    ([`crate::sitemap`]) and the payload for third-party platforms
//!    ([`crate::syndication`])
//!
//! None of these steps keep state between runs. The post collection is small
//! (tens of posts), so it is simply rebuilt from disk every time.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod embed;
pub mod feed;
pub mod highlight;
pub mod listing;
pub mod logging;
pub mod markdown;
pub mod pagination;
pub mod post;
pub mod rank;
pub mod search;
pub mod sitemap;
pub mod store;
pub mod syndication;
pub mod theme;
pub mod url;
mod util;
