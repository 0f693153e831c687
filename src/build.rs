//! Exports the [`build_site`] function which stitches together the high-level
//! steps of a build: loading the posts ([`crate::store`]), rendering each
//! post body ([`crate::markdown`]), and generating the RSS feed
//! ([`crate::feed`]) and the sitemap ([`crate::sitemap`]).
//!
//! Page layout is not done here; the rendered post bodies are written as HTML
//! fragments for whatever templating sits on top.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::embed::EmbedProvider;
use crate::feed::{self, write_feed, FeedConfig};
use crate::markdown::render_with_embeds;
use crate::post::Post;
use crate::sitemap::{discover_pages, sitemap_xml};
use crate::store::{self, DirectoryRepository, PostRepository};
use crate::url::BLOG_PATH;

pub const FEED_FILE: &str = "rss.xml";
pub const SITEMAP_FILE: &str = "sitemap.xml";

/// What a build produced.
#[derive(Debug)]
pub struct BuildSummary {
    pub posts: usize,
    pub feed: PathBuf,
    pub sitemap: PathBuf,
}

/// Builds the site from a [`Config`] object into `output_directory`.
pub fn build_site(
    config: &Config,
    output_directory: &Path,
    embeds: &dyn EmbedProvider,
) -> Result<BuildSummary> {
    let repository =
        DirectoryRepository::new(&config.posts_directory).include_drafts(config.include_drafts);
    let posts = repository.load_all()?;

    // Blow away the old post fragments so deleted posts don't linger.
    let posts_output_directory = output_directory.join(BLOG_PATH);
    rmdir(&posts_output_directory)?;
    fs::create_dir_all(&posts_output_directory)?;
    write_posts(&posts, &posts_output_directory, embeds)?;

    let feed = output_directory.join(FEED_FILE);
    write_feed(
        &FeedConfig {
            title: &config.title,
            description: &config.description,
            site_url: &config.site_url,
        },
        &posts,
        BufWriter::new(File::create(&feed)?),
    )?;
    info!(path = %feed.display(), items = posts.len(), "wrote feed");

    let sitemap = output_directory.join(SITEMAP_FILE);
    let static_pages = static_pages(config)?;
    fs::write(
        &sitemap,
        sitemap_xml(&config.site_url, &static_pages, &posts)?,
    )?;
    info!(path = %sitemap.display(), pages = static_pages.len(), "wrote sitemap");

    Ok(BuildSummary {
        posts: posts.len(),
        feed,
        sitemap,
    })
}

fn write_posts(posts: &[Post], dir: &Path, embeds: &dyn EmbedProvider) -> Result<()> {
    for post in posts {
        let path = dir.join(format!("{}.html", post.slug));
        fs::write(&path, render_with_embeds(&post.body, embeds))?;
    }
    info!(directory = %dir.display(), count = posts.len(), "wrote post fragments");
    Ok(())
}

/// The configured static pages plus any discovered in the pages directory.
fn static_pages(config: &Config) -> Result<Vec<String>> {
    let mut pages = config.static_pages.clone();
    if let Some(dir) = &config.pages_directory {
        for page in discover_pages(dir)? {
            if !pages.contains(&page) {
                pages.push(page);
            }
        }
    }
    Ok(pages)
}

fn rmdir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned for errors loading posts.
    #[error(transparent)]
    Load(#[from] store::Error),

    /// Returned for errors generating the feed.
    #[error(transparent)]
    Feed(#[from] feed::Error),

    /// Returned when a sitemap URL can't be built.
    #[error("building sitemap url: {0}")]
    Url(#[from] url::ParseError),

    /// Returned when the pages directory can't be walked.
    #[error("discovering pages: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Returned for I/O problems while cleaning output directories.
    #[error("Cleaning directory '{}': {err}", path.display())]
    Clean {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
