use std::fmt::{self, Display};

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// Number of pages shown on each side of the current page.
pub const DEFAULT_SIBLING_COUNT: u64 = 1;

/// A single marker of a page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaginationToken {
    Page(u64),
    /// One or more consecutive pages that are not shown.
    Ellipsis,
}

impl PaginationToken {
    pub fn page(&self) -> Option<u64> {
        match self {
            PaginationToken::Page(page) => Some(*page),
            PaginationToken::Ellipsis => None,
        }
    }

    pub fn is_ellipsis(&self) -> bool {
        matches!(self, PaginationToken::Ellipsis)
    }
}

impl Display for PaginationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaginationToken::Page(page) => write!(f, "{}", page),
            PaginationToken::Ellipsis => write!(f, "…"),
        }
    }
}

impl Serialize for PaginationToken {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PaginationToken::Page(page) => serializer.serialize_u64(*page),
            PaginationToken::Ellipsis => serializer.serialize_str("ellipsis"),
        }
    }
}

/// Ordered page markers for one render of a page selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaginationRange(Vec<PaginationToken>);

impl PaginationRange {
    pub fn tokens(&self) -> &[PaginationToken] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaginationToken> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pages(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.iter().filter_map(PaginationToken::page)
    }

    /// Renders the range with `current` wrapped in brackets, e.g.
    /// `1 … 4 [5] 6 … 20`.
    pub fn render(&self, current: u64) -> String {
        self.0
            .iter()
            .map(|token| match token {
                PaginationToken::Page(page) if *page == current => {
                    format!("[{}]", page)
                }
                token => token.to_string(),
            })
            .collect::<Vec<String>>()
            .join(" ")
    }

    pub fn into_inner(self) -> Vec<PaginationToken> {
        self.0
    }
}

impl Display for PaginationRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<String>>()
            .join(" ");
        write!(f, "{}", rendered)
    }
}

impl Serialize for PaginationRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for token in &self.0 {
            seq.serialize_element(token)?;
        }
        seq.end()
    }
}

impl<'a> IntoIterator for &'a PaginationRange {
    type Item = &'a PaginationToken;
    type IntoIter = std::slice::Iter<'a, PaginationToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Computes the page markers for `current` out of `total` pages.
///
/// The first and last pages are always present, `sibling_count` pages are
/// shown on each side of `current` and every other run of pages collapses
/// into a single [`PaginationToken::Ellipsis`].
///
/// `total` of zero is treated as a single page and `current` is clamped
/// into `1..=total`.
pub fn pagination_range(
    current: u64,
    total: u64,
    sibling_count: u64,
) -> PaginationRange {
    let total = total.max(1);
    let current = current.clamp(1, total);

    let start = current.saturating_sub(sibling_count).max(2);
    let end = current.saturating_add(sibling_count).min(total - 1);

    let mut range = Vec::with_capacity(
        (end.saturating_sub(start) as usize).saturating_add(5),
    );

    range.push(PaginationToken::Page(1));

    if start > 2 {
        range.push(PaginationToken::Ellipsis);
    }

    range.extend((start..=end).map(PaginationToken::Page));

    if end < total - 1 {
        range.push(PaginationToken::Ellipsis);
    }

    if total > 1 {
        range.push(PaginationToken::Page(total));
    }

    PaginationRange(range)
}

pub fn has_previous(page: u64) -> bool {
    page > 1
}

pub fn has_next(page: u64, total_pages: u64) -> bool {
    page < total_pages
}
