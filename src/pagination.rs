//! Splits a list of posts into pages and computes the page badges (numbered
//! links plus `...` gaps) shown under a list page.

/// One page of a collection.
#[derive(Debug, PartialEq, Eq)]
pub struct Page<'a, T> {
    /// The items visible on the requested page. Empty when the page is out of
    /// range.
    pub items: &'a [T],

    /// The requested page (1-based), as given.
    pub page: usize,

    pub total_pages: usize,
}

/// A badge under a list page: a link to a page, or a gap between pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Badge {
    Page(usize),
    Separator,
}

/// Returns the `page`th (1-based) chunk of `page_size` items. Pages outside
/// `1..=total_pages` are not clamped; they simply have no items, so callers
/// that need a valid page must check `total_pages` themselves.
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> Page<'_, T> {
    if page_size == 0 {
        return Page {
            items: &[],
            page,
            total_pages: 0,
        };
    }

    let total_pages = match items.len() % page_size {
        0 => items.len() / page_size,
        _ => items.len() / page_size + 1,
    };

    let visible = match page.checked_sub(1).and_then(|i| i.checked_mul(page_size)) {
        Some(start) if start < items.len() => {
            let stop = start.saturating_add(page_size).min(items.len());
            &items[start..stop]
        }
        _ => &items[..0],
    };

    Page {
        items: visible,
        page,
        total_pages,
    }
}

/// Computes the badges for `current` out of `total_pages`: the first and last
/// pages and the pages adjacent to the current one. A gap of a single page is
/// filled in with that page, wider gaps become one [`Badge::Separator`].
pub fn badges(current: usize, total_pages: usize) -> Vec<Badge> {
    if total_pages == 0 {
        return Vec::new();
    }

    let current = current.clamp(1, total_pages);
    let mut shown = vec![1, current.saturating_sub(1), current, current + 1, total_pages];
    shown.retain(|page| (1..=total_pages).contains(page));
    shown.sort_unstable();
    shown.dedup();

    let mut badges = Vec::with_capacity(shown.len() * 2);
    let mut previous = 0;
    for page in shown {
        match page - previous {
            1 => {}
            2 => badges.push(Badge::Page(previous + 1)),
            _ => badges.push(Badge::Separator),
        }
        badges.push(Badge::Page(page));
        previous = page;
    }
    badges
}
