//! Loads the project configuration from an `ogham.yaml` file. The file is
//! searched for in the given directory and then in each of its parents, so
//! the tool can be run from anywhere inside a project.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::listing::DEFAULT_PAGE_SIZE;

pub const PROJECT_FILE: &str = "ogham.yaml";

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(DEFAULT_PAGE_SIZE)
    }
}

fn default_posts_directory() -> PathBuf {
    PathBuf::from("posts")
}

fn default_static_pages() -> Vec<String> {
    vec![String::from("/")]
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Project {
    site_url: Url,

    #[serde(default)]
    title: String,

    #[serde(default)]
    description: String,

    #[serde(default = "default_posts_directory")]
    posts_directory: PathBuf,

    #[serde(default)]
    pages_directory: Option<PathBuf>,

    #[serde(default = "default_static_pages")]
    static_pages: Vec<String>,

    #[serde(default)]
    page_size: PageSize,

    #[serde(default)]
    include_drafts: bool,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub site_url: Url,
    pub title: String,
    pub description: String,
    pub posts_directory: PathBuf,
    pub pages_directory: Option<PathBuf>,
    pub static_pages: Vec<String>,
    pub page_size: usize,
    pub include_drafts: bool,
}

impl Config {
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path)
                .with_context(|| format!("Loading configuration from `{}`", path.display()))
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        use crate::util::open;
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;
        if project.page_size.0 == 0 {
            return Err(anyhow!("`page_size` must be at least 1"));
        }

        Ok(Config {
            site_url: project.site_url,
            title: project.title,
            description: project.description,
            posts_directory: project_root.join(project.posts_directory),
            pages_directory: project.pages_directory.map(|dir| project_root.join(dir)),
            static_pages: project.static_pages,
            page_size: project.page_size.0,
            include_drafts: project.include_drafts,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_from_directory_searches_parents() -> Result<()> {
        let root = tempfile::tempdir()?;
        fs::write(
            root.path().join(PROJECT_FILE),
            "site_url: https://example.org\ntitle: Blog\npage_size: 5\n",
        )?;
        let nested = root.path().join("posts").join("drafts");
        fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested)?;
        assert_eq!("https://example.org/", config.site_url.as_str());
        assert_eq!("Blog", config.title);
        assert_eq!(5, config.page_size);
        assert_eq!(root.path().join("posts"), config.posts_directory);
        assert_eq!(vec!["/".to_owned()], config.static_pages);
        assert!(!config.include_drafts);
        Ok(())
    }

    #[test]
    fn test_invalid_site_url() -> Result<()> {
        let root = tempfile::tempdir()?;
        let path = root.path().join(PROJECT_FILE);
        fs::write(&path, "site_url: not a url\n")?;
        assert!(Config::from_project_file(&path).is_err());
        Ok(())
    }
}
