//! The article payload handed to third-party publishing platforms (dev.to
//! and friends). Sending it is someone else's job; this module only decides
//! which post is due and what it looks like off-site.

use chrono::NaiveDate;
use serde::Serialize;
use url::{ParseError, Url};

use crate::post::Post;
use crate::url::{absolutize_markdown, directory, post_url};

/// A post as published on another platform, pointing back to the original.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub slug: String,
    pub tags: String,
    pub series: Option<String>,
    pub created: String,
    pub canonical_url: String,
    pub main_image: String,
    pub body_markdown: String,
    pub published: bool,
}

impl Article {
    pub fn from_post(post: &Post, site_url: &Url) -> Result<Article, ParseError> {
        let canonical = post_url(site_url, &post.slug)?.to_string();
        let body = format!(
            "***Original article: {}***\n{}",
            canonical,
            absolutize_markdown(&post.body, site_url)
        );

        Ok(Article {
            title: post.metadata.title.clone(),
            description: post.metadata.description.clone(),
            slug: post.slug.clone(),
            tags: post.metadata.tags.clone(),
            series: post.metadata.series.clone(),
            created: post.metadata.created.clone(),
            canonical_url: canonical,
            main_image: main_image(post.metadata.cover_image.as_deref(), site_url)?,
            body_markdown: body,
            published: true,
        })
    }
}

fn main_image(cover_image: Option<&str>, site_url: &Url) -> Result<String, ParseError> {
    match cover_image {
        None | Some("") => Ok(String::new()),
        Some(image) if image.starts_with("http") => Ok(image.to_owned()),
        Some(image) => Ok(directory(site_url)
            .join(image.trim_start_matches('/'))?
            .to_string()),
    }
}

/// The post that is due for syndication on `today`: created that day and not
/// yet published to dev.to. The newest wins if there are several.
pub fn select_unpublished(posts: &[Post], today: NaiveDate) -> Option<&Post> {
    posts
        .iter()
        .find(|post| post.metadata.dev_to.is_none() && post.created.date() == today)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::fixture;

    fn site() -> Url {
        Url::parse("https://example.org").unwrap()
    }

    #[test]
    fn test_article_from_post() -> Result<(), ParseError> {
        let mut post = fixture("hello", "Hello", "Greeting", "meta, greet", "2024-06-14");
        post.body = "See [this](/blog/other) and <img src=\"/a.png\">\n".to_owned();
        post.metadata.cover_image = Some("/images/cover.png".to_owned());
        post.metadata.series = Some("intro".to_owned());

        let article = Article::from_post(&post, &site())?;
        assert_eq!("https://example.org/blog/hello", article.canonical_url);
        assert_eq!(
            "***Original article: https://example.org/blog/hello***\nSee [this](https://example.org/blog/other) and <img src=\"https://example.org/a.png\">\n",
            article.body_markdown
        );
        assert_eq!("https://example.org/images/cover.png", article.main_image);
        assert_eq!(Some("intro".to_owned()), article.series);
        assert_eq!("meta, greet", article.tags);
        assert!(article.published);
        Ok(())
    }

    #[test]
    fn test_main_image() -> Result<(), ParseError> {
        assert_eq!("", main_image(None, &site())?);
        assert_eq!(
            "https://cdn.example.org/x.png",
            main_image(Some("https://cdn.example.org/x.png"), &site())?
        );
        Ok(())
    }

    #[test]
    fn test_select_unpublished() {
        let mut published = fixture("published", "P", "", "", "2024-06-14T08:00:00Z");
        published.metadata.dev_to = Some("123".to_owned());
        let posts = vec![
            published,
            fixture("due", "D", "", "", "2024-06-14"),
            fixture("old", "O", "", "", "2024-06-13"),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        assert_eq!(Some("due"), select_unpublished(&posts, today).map(|p| p.slug.as_str()));

        let tomorrow = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert!(select_unpublished(&posts, tomorrow).is_none());
    }
}
