//! Defines the [`PostRepository`] trait and its two implementations:
//! [`DirectoryRepository`], which treats a directory of markdown files as a
//! read-only database, and [`MemoryRepository`], which holds already-loaded
//! sources (handy for tests and for callers that get posts from elsewhere).
//!
//! Both rebuild nothing incrementally; every [`PostRepository::load_all`]
//! parses the full collection and returns it newest first.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};

use crate::post::{self, Post};

const MARKDOWN_EXTENSION: &str = "md";
const DRAFT_PREFIX: &str = "draft-";

/// Read access to the post collection.
pub trait PostRepository {
    /// Returns every post, sorted by `created` (most recent first).
    fn load_all(&self) -> Result<Vec<Post>>;

    /// Returns the post identified by `slug`, or [`Error::NotFound`].
    fn load_one(&self, slug: &str) -> Result<Post>;
}

/// Loads posts from the `*.md` files directly inside a directory. The slug of
/// each post is its file name less the `.md` extension.
pub struct DirectoryRepository {
    directory: PathBuf,

    /// Whether `draft-*.md` files are served. They are skipped by default.
    include_drafts: bool,
}

impl DirectoryRepository {
    pub fn new(directory: impl Into<PathBuf>) -> DirectoryRepository {
        DirectoryRepository {
            directory: directory.into(),
            include_drafts: false,
        }
    }

    pub fn include_drafts(mut self, include_drafts: bool) -> DirectoryRepository {
        self.include_drafts = include_drafts;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn is_visible(&self, slug: &str) -> bool {
        self.include_drafts || !slug.starts_with(DRAFT_PREFIX)
    }

    fn parse_file(&self, slug: &str, path: &Path) -> Result<Post> {
        let parse = || -> Result<Post> {
            let contents = fs::read_to_string(path)?;
            Ok(Post::parse(slug, &contents)?)
        };
        parse().map_err(|err| Error::Annotated {
            path: path.to_owned(),
            source: Box::new(err),
        })
    }
}

impl PostRepository for DirectoryRepository {
    fn load_all(&self) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        for result in fs::read_dir(&self.directory)? {
            let entry = result?;
            let path = entry.path();
            if !entry.file_type()?.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(MARKDOWN_EXTENSION)
            {
                continue;
            }
            let slug = match path.file_stem().and_then(|s| s.to_str()) {
                Some(slug) => slug.to_owned(),
                None => return Err(Error::InvalidFileName(path)),
            };
            if !self.is_visible(&slug) {
                debug!(slug = %slug, "skipping draft");
                continue;
            }
            let post = self.parse_file(&slug, &path)?;
            debug!(slug = %post.slug, created = %post.created, "loaded post");
            posts.push(post);
        }

        sort_newest_first(&mut posts);
        info!(
            count = posts.len(),
            directory = %self.directory.display(),
            "loaded posts"
        );
        Ok(posts)
    }

    fn load_one(&self, slug: &str) -> Result<Post> {
        if !is_plain_slug(slug) || !self.is_visible(slug) {
            return Err(Error::NotFound(slug.to_owned()));
        }
        let path = self
            .directory
            .join(format!("{}.{}", slug, MARKDOWN_EXTENSION));
        if !path.is_file() {
            return Err(Error::NotFound(slug.to_owned()));
        }
        self.parse_file(slug, &path)
    }
}

/// Holds posts parsed up front from `(slug, source)` pairs.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    posts: Vec<Post>,
}

impl MemoryRepository {
    /// Parses every source with the same rules as [`DirectoryRepository`].
    /// Fails on the first invalid source or on a repeated slug.
    pub fn from_sources<'a, I>(sources: I) -> Result<MemoryRepository>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut seen = HashSet::new();
        let mut posts = Vec::new();
        for (slug, source) in sources {
            if !seen.insert(slug) {
                return Err(Error::DuplicateSlug(slug.to_owned()));
            }
            let post = Post::parse(slug, source).map_err(|err| Error::Annotated {
                path: PathBuf::from(slug),
                source: Box::new(err.into()),
            })?;
            posts.push(post);
        }
        sort_newest_first(&mut posts);
        Ok(MemoryRepository { posts })
    }
}

impl PostRepository for MemoryRepository {
    fn load_all(&self) -> Result<Vec<Post>> {
        Ok(self.posts.clone())
    }

    fn load_one(&self, slug: &str) -> Result<Post> {
        self.posts
            .iter()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| Error::NotFound(slug.to_owned()))
    }
}

// `sort_by` is stable, so posts created at the same instant keep their
// relative order.
fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created.cmp(&a.created));
}

fn is_plain_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(|c| c == '/' || c == '\\')
}

/// Represents the result of a [`PostRepository`] operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading posts.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when no post has the requested slug.
    #[error("post `{0}` not found")]
    NotFound(String),

    /// Returned when two posts share a slug.
    #[error("duplicate slug `{0}`")]
    DuplicateSlug(String),

    /// Returned when a source file name isn't valid UTF-8.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(PathBuf),

    /// Returned when a post source fails to parse.
    #[error(transparent)]
    Parse(#[from] post::Error),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An error with the path of the post that caused it.
    #[error("parsing post `{}`: {source}", path.display())]
    Annotated { path: PathBuf, source: Box<Error> },
}
