//! Free-text search over post titles, descriptions and tags.
//!
//! Matching is forgiving on purpose so it works while a reader is still
//! typing: every query word only has to be a substring of some word of the
//! post.

use std::collections::HashSet;

use crate::post::{split_tags, Post};

/// Returns true iff every whitespace separated word of `query` is a
/// case-insensitive substring of at least one word in the post's title,
/// description or tags. A blank query matches every post.
pub fn matches(post: &Post, query: &str) -> bool {
    let tokens = query_tokens(query);
    if tokens.is_empty() {
        return true;
    }
    let words = post_words(post);
    tokens
        .iter()
        .all(|token| words.iter().any(|word| word.contains(token.as_str())))
}

/// The posts matching `query`, in their original order.
pub fn filter<'a>(posts: &'a [Post], query: &str) -> Vec<&'a Post> {
    posts.iter().filter(|post| matches(post, query)).collect()
}

/// Every distinct tag across `posts`, in the order it was first seen.
pub fn collect_tags(posts: &[Post]) -> Vec<&str> {
    let mut seen = HashSet::new();
    posts
        .iter()
        .flat_map(|post| split_tags(&post.metadata.tags))
        .filter(|tag| seen.insert(*tag))
        .collect()
}

/// Whether `tag` is one of the words of `query` (case-insensitive).
pub fn is_tag_active(query: &str, tag: &str) -> bool {
    let tag = tag.to_lowercase();
    query_tokens(query).iter().any(|token| *token == tag)
}

/// Adds `tag` to `query`, or removes it if it is already one of the query's
/// words. Used to turn tag chips into search toggles.
pub fn toggle_tag(query: &str, tag: &str) -> String {
    if is_tag_active(query, tag) {
        let tag = tag.to_lowercase();
        query_tokens(query)
            .into_iter()
            .filter(|token| *token != tag)
            .collect::<Vec<_>>()
            .join(" ")
    } else if query.trim().is_empty() {
        tag.to_owned()
    } else {
        format!("{} {}", query.trim(), tag)
    }
}

fn query_tokens(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

fn post_words(post: &Post) -> Vec<String> {
    let metadata = &post.metadata;
    metadata
        .title
        .split_whitespace()
        .chain(metadata.description.split_whitespace())
        .chain(metadata.tags.split(','))
        .map(|word| word.trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}
