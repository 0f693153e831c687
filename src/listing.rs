//! Everything a blog list page needs, computed from plain values: the query
//! string in, the visible posts, page badges and tag chips out.

use url::form_urlencoded;

use crate::pagination::{badges, paginate, Badge};
use crate::post::Post;
use crate::search::{collect_tags, filter, is_tag_active, toggle_tag};

/// Posts per list page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// The `q` and `page` parameters of a list page request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingQuery {
    pub q: String,

    /// 1-based. Defaults to 1 when missing, zero or unparsable.
    pub page: usize,
}

impl Default for ListingQuery {
    fn default() -> Self {
        ListingQuery {
            q: String::new(),
            page: 1,
        }
    }
}

impl ListingQuery {
    /// Reads `q` and `page` from a URL query string (with or without the
    /// leading `?`). Other parameters are ignored.
    pub fn parse(query: &str) -> ListingQuery {
        let mut listing = ListingQuery::default();
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "q" => listing.q = value.into_owned(),
                "page" => {
                    listing.page = value.trim().parse::<usize>().ok().filter(|p| *p > 0).unwrap_or(1)
                }
                _ => {}
            }
        }
        listing
    }

    /// Renders the query back into a query string for page and tag links.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("q", &self.q)
            .append_pair("page", &self.page.to_string())
            .finish()
    }
}

/// A tag chip on the list page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagChip<'a> {
    pub label: &'a str,

    /// Whether the tag is already part of the search.
    pub active: bool,

    /// The search to run when the chip is clicked.
    pub toggled_query: String,
}

/// The data behind one list page.
#[derive(Debug)]
pub struct Listing<'a> {
    /// The posts shown on this page.
    pub posts: Vec<&'a Post>,

    /// How many posts matched the search, across all pages.
    pub total_matches: usize,

    pub page: usize,
    pub total_pages: usize,

    /// Empty when everything fits on one page.
    pub badges: Vec<Badge>,

    pub tags: Vec<TagChip<'a>>,
}

impl<'a> Listing<'a> {
    pub fn build(posts: &'a [Post], query: &ListingQuery, page_size: usize) -> Listing<'a> {
        let matching = filter(posts, &query.q);
        let page = paginate(&matching, page_size, query.page);
        let badges = match page.total_pages > 1 {
            true => badges(query.page, page.total_pages),
            false => Vec::new(),
        };
        let tags = collect_tags(posts)
            .into_iter()
            .map(|label| TagChip {
                label,
                active: is_tag_active(&query.q, label),
                toggled_query: toggle_tag(&query.q, label),
            })
            .collect();

        Listing {
            posts: page.items.to_vec(),
            total_matches: matching.len(),
            page: query.page,
            total_pages: page.total_pages,
            badges,
            tags,
        }
    }
}
