//! Defines the [`Post`] and [`Metadata`] types along with the logic for
//! splitting a post source file into its YAML frontmatter and markdown body.
//! The derived fields ([`ReadingStats`], the display date) are computed once
//! when the post is parsed; the rendered HTML is not stored and is produced on
//! demand by [`crate::markdown`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Average reading speed used for [`ReadingStats`].
pub const WORDS_PER_MINUTE: usize = 200;

/// A single blog post. Posts are immutable snapshots; a new collection is
/// parsed for every build.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The post's identifier, derived from its file name (`hello.md` has the
    /// slug `hello`).
    pub slug: String,

    /// The validated frontmatter.
    pub metadata: Metadata,

    /// The raw markdown following the frontmatter.
    pub body: String,

    /// `metadata.created` parsed as a UTC timestamp.
    pub created: NaiveDateTime,

    /// `created` formatted for humans, e.g. `Friday, June 14, 2024`.
    pub display_date: String,

    pub reading: ReadingStats,
}

/// The frontmatter of a post source file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Metadata {
    pub title: String,

    pub description: String,

    /// Comma separated tags. Always present, though possibly empty.
    #[serde(deserialize_with = "nullable_string")]
    pub tags: String,

    /// The creation date as written in the frontmatter.
    pub created: String,

    /// Posts sharing a `series` label are read start to finish.
    #[serde(default)]
    pub series: Option<String>,

    #[serde(default)]
    pub cover_image: Option<String>,

    #[serde(default)]
    pub cover_image_mobile: Option<String>,

    #[serde(default)]
    pub cover_color: Option<String>,

    /// The article id on dev.to. Unset until the post has been syndicated.
    #[serde(default, deserialize_with = "optional_scalar")]
    pub dev_to: Option<String>,
}

/// Word count and reading time estimate for a post body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadingStats {
    pub words: usize,
    pub minutes: usize,

    /// e.g. `5 min read`
    pub text: String,
}

impl ReadingStats {
    pub fn from_body(body: &str) -> ReadingStats {
        let words = body.split_whitespace().count();
        let minutes = (words + WORDS_PER_MINUTE - 1) / WORDS_PER_MINUTE;
        ReadingStats {
            words,
            minutes,
            text: format!("{} min read", minutes),
        }
    }
}

impl Post {
    /// Parses a post from its slug and the contents of its source file. The
    /// source must be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with `title`, `description`, `tags` and `created`
    /// 3. Terminal frontmatter fence (`---`) on its own line
    /// 4. Post body
    ///
    /// ```md
    /// ---
    /// title: Hello, world!
    /// description: A first post
    /// tags: greet, meta
    /// created: 2021-04-16
    /// ---
    /// # Hello
    /// ```
    pub fn parse(slug: &str, input: &str) -> Result<Post> {
        let (yaml, body) = split_frontmatter(input)?;
        let metadata: Metadata = serde_yaml::from_str(yaml)?;
        let created = parse_created(&metadata.created)?;
        Ok(Post {
            slug: slug.to_owned(),
            display_date: display_date(&created),
            reading: ReadingStats::from_body(body),
            created,
            body: body.to_owned(),
            metadata,
        })
    }

    /// The post's tags, trimmed, in the order they were written. Empty
    /// entries (e.g. from a trailing comma) are dropped.
    pub fn tags(&self) -> Vec<&str> {
        split_tags(&self.metadata.tags).collect()
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn series(&self) -> Option<&str> {
        self.metadata.series.as_deref()
    }
}

pub(crate) fn split_tags(tags: &str) -> impl Iterator<Item = &str> {
    tags.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// Returns the YAML between the fences and the body after the closing fence.
fn split_frontmatter(input: &str) -> Result<(&str, &str)> {
    const FENCE: &str = "---";
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    if !input.starts_with(FENCE) {
        return Err(Error::FrontmatterMissingStartFence);
    }

    let yaml_start = match input.find('\n') {
        Some(i) if input[..i].trim_end() == FENCE => i + 1,
        _ => return Err(Error::FrontmatterMissingStartFence),
    };

    let mut offset = yaml_start;
    for line in input[yaml_start..].split_inclusive('\n') {
        if line.trim_end() == FENCE {
            return Ok((&input[yaml_start..offset], &input[offset + line.len()..]));
        }
        offset += line.len();
    }
    Err(Error::FrontmatterMissingEndFence)
}

/// Parses the `created` frontmatter field. Dates without a time are taken as
/// midnight UTC and offsets are normalised to UTC.
pub fn parse_created(created: &str) -> Result<NaiveDateTime> {
    const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

    let created = created.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(created) {
        return Ok(dt.naive_utc());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(created, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(created, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| Error::InvalidDate(created.to_owned()))
}

fn display_date(created: &NaiveDateTime) -> String {
    created.format("%A, %B %-d, %Y").to_string()
}

fn nullable_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_scalar(deserializer)?.unwrap_or_default())
}

// YAML happily turns `dev_to: 12345` into a number and `tags:` into null.
fn optional_scalar<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    use serde_yaml::Value;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(D::Error::custom(format!(
            "expected a string or number, found {:?}",
            other
        ))),
    }
}

/// Represents the result of parsing a single post.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] from its source text.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    #[error("post must begin with `---`")]
    FrontmatterMissingStartFence,

    /// Returned when the starting fence was found but the terminal one was
    /// missing.
    #[error("missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when the frontmatter isn't valid YAML or lacks a required
    /// field.
    #[error("invalid frontmatter: {0}")]
    DeserializeYaml(#[from] serde_yaml::Error),

    /// Returned when `created` isn't a recognised date.
    #[error("invalid `created` date `{0}`")]
    InvalidDate(String),
}

/// Builds a post directly from field values for tests in other modules.
#[cfg(test)]
pub(crate) fn fixture(slug: &str, title: &str, description: &str, tags: &str, created: &str) -> Post {
    let created_at = parse_created(created).unwrap();
    Post {
        slug: slug.to_owned(),
        metadata: Metadata {
            title: title.to_owned(),
            description: description.to_owned(),
            tags: tags.to_owned(),
            created: created.to_owned(),
            ..Metadata::default()
        },
        body: String::new(),
        display_date: display_date(&created_at),
        created: created_at,
        reading: ReadingStats::from_body(""),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SOURCE: &str = "---
title: Hello, world!
description: A first post
tags: greet, meta ,
created: 2024-06-14
series: intro
dev_to: 12345
---
# Hello

one two three
";

    #[test]
    fn test_parse_post() -> Result<()> {
        let post = Post::parse("hello", SOURCE)?;
        assert_eq!("hello", post.slug);
        assert_eq!("Hello, world!", post.title());
        assert_eq!(vec!["greet", "meta"], post.tags());
        assert_eq!(Some("intro"), post.series());
        assert_eq!(Some("12345"), post.metadata.dev_to.as_deref());
        assert_eq!("# Hello\n\none two three\n", post.body);
        assert_eq!("Friday, June 14, 2024", post.display_date);
        Ok(())
    }

    #[test]
    fn test_reading_stats() {
        let body = "word ".repeat(401);
        let stats = ReadingStats::from_body(&body);
        assert_eq!(401, stats.words);
        assert_eq!(3, stats.minutes);
        assert_eq!("3 min read", stats.text);
        assert_eq!("0 min read", ReadingStats::from_body("").text);
    }

    #[test]
    fn test_null_tags_are_empty() -> Result<()> {
        let post = Post::parse(
            "empty",
            "---\ntitle: t\ndescription: d\ntags:\ncreated: 2020-01-01\n---\n",
        )?;
        assert_eq!("", post.metadata.tags);
        assert!(post.tags().is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_tags_is_an_error() {
        let result = Post::parse("x", "---\ntitle: t\ndescription: d\ncreated: 2020-01-01\n---\n");
        assert!(matches!(result, Err(Error::DeserializeYaml(_))));
    }

    #[test]
    fn test_missing_fences() {
        assert!(matches!(
            Post::parse("x", "title: t\n"),
            Err(Error::FrontmatterMissingStartFence)
        ));
        assert!(matches!(
            Post::parse("x", "---\ntitle: t\n"),
            Err(Error::FrontmatterMissingEndFence)
        ));
    }

    #[test]
    fn test_rule_in_body_is_not_a_fence() -> Result<()> {
        let post = Post::parse(
            "x",
            "---\ntitle: t\ndescription: a---b\ntags: ''\ncreated: 2020-01-01\n---\nabove\n\n---\n\nbelow\n",
        )?;
        assert_eq!("a---b", post.metadata.description);
        assert_eq!("above\n\n---\n\nbelow\n", post.body);
        Ok(())
    }

    #[test]
    fn test_parse_created() -> Result<()> {
        let midnight = NaiveDate::from_ymd_opt(2024, 6, 14)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        assert_eq!(midnight, parse_created("2024-06-14")?);
        assert_eq!(midnight, parse_created("2024-06-14T02:00:00+02:00")?);
        assert_eq!(midnight, parse_created("2024-06-14 00:00")?);
        assert!(matches!(parse_created("June 14"), Err(Error::InvalidDate(_))));
        Ok(())
    }
}
