//! The "more posts" sections of a post page: related posts ranked by shared
//! tags, and the other parts of the post's series.

use std::cmp::Reverse;

use crate::post::Post;

/// How many related posts a post page shows.
pub const DEFAULT_RELATED_LIMIT: usize = 4;

/// One entry of a series listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeriesEntry {
    pub title: String,
    pub slug: String,
}

/// Ranks every other post by how many of `post`'s tags it shares, most
/// recent first among equals, and returns the first `limit`.
///
/// A tag counts as shared when it occurs anywhere in the candidate's raw tag
/// string, so `react` also relates to a post tagged `reactive`.
pub fn related_to<'a>(post: &Post, all: &'a [Post], limit: usize) -> Vec<&'a Post> {
    let tags = post.tags();
    let mut scored: Vec<(usize, &Post)> = all
        .iter()
        .filter(|candidate| candidate.slug != post.slug)
        .map(|candidate| (shared_tags(&tags, candidate), candidate))
        .collect();

    scored.sort_by_key(|(score, candidate)| (Reverse(*score), Reverse(candidate.created)));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, candidate)| candidate)
        .collect()
}

fn shared_tags(tags: &[&str], candidate: &Post) -> usize {
    tags.iter()
        .filter(|tag| candidate.metadata.tags.contains(**tag))
        .count()
}

/// Every post in `post`'s series (`post` included), oldest first so the
/// series reads start to finish. Empty when `post` has no series.
pub fn series_of(post: &Post, all: &[Post]) -> Vec<SeriesEntry> {
    let series = match post.series() {
        Some(series) => series,
        None => return Vec::new(),
    };

    let mut members: Vec<&Post> = all
        .iter()
        .filter(|candidate| candidate.series() == Some(series))
        .collect();
    members.sort_by_key(|member| member.created);
    members
        .into_iter()
        .map(|member| SeriesEntry {
            title: member.metadata.title.clone(),
            slug: member.slug.clone(),
        })
        .collect()
}
