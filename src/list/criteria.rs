//! Filter and sort building blocks injected into a [`ListViewModel`].
//!
//! [`ListViewModel`]: super::ListViewModel

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// A pure predicate over one entity type.
pub trait Filter<T> {
    fn matches(&self, item: &T) -> bool;

    /// Query parameters to forward to the server alongside `page`/`limit`.
    /// Most filters only run locally and return nothing.
    fn query_params(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// A comparator over one entity type.
pub trait Sorter<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// The identity filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchAll;

impl<T> Filter<T> for MatchAll {
    fn matches(&self, _item: &T) -> bool {
        true
    }
}

/// Sort-nothing comparator; every pair ties, so fetched order is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unsorted;

impl<T> Sorter<T> for Unsorted {
    fn compare(&self, _a: &T, _b: &T) -> Ordering {
        Ordering::Equal
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Case-insensitive substring test. An empty (or blank) needle matches everything.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Base letters only: decomposed, accents dropped, lowercased.
fn collation_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Locale-style, case-insensitive text ordering. Base letters decide first
/// ("Élégance" sorts with the e's), then accents. Strings that differ only in
/// case are `Equal`, so the stable sort keeps the fetched order.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b)).then_with(|| {
        a.nfd()
            .flat_map(char::to_lowercase)
            .cmp(b.nfd().flat_map(char::to_lowercase))
    })
}

/// Numeric ordering; NaN compares equal to everything.
pub fn compare_number(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok()
}

/// Chronological ordering of RFC 3339 timestamps. Pairs where either side is
/// missing or unparsable tie.
pub fn compare_dates(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a.and_then(parse_timestamp), b.and_then(parse_timestamp)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => Ordering::Equal,
    }
}
