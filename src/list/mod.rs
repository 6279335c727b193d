//! List View-Model: one page of a collection with local filtering, sorting
//! and a fetch state machine.
//!
//! ```text
//! Idle ──load──▶ Loading ──ok──▶ Ready ──set_page──▶ Loading
//!                   │                ▲
//!                   └──err──▶ Errored┘ (retry)
//! ```
//!
//! Filter and sort changes never leave `Ready`; they only change what
//! [`ListViewModel::visible_items`] yields. Every fetch is tagged with a
//! [`FetchTicket`] so a completion that arrives after a newer fetch, or after
//! the view was disposed, is dropped instead of overwriting fresher state.

pub mod criteria;

use crate::api::resource::{CollectionSource, ListQuery, Page};
use crate::errors::ApiError;
use crate::models::Record;
use criteria::{Filter, Sorter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Errored,
}

/// Identifies one in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    page: u32,
}

impl FetchTicket {
    pub fn page(&self) -> u32 {
        self.page
    }
}

/// What [`ListViewModel::complete_fetch`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Failed,
    /// Superseded by a newer fetch or arrived after dispose; ignored.
    Stale,
}

pub struct ListViewModel<T, F, S> {
    items: Vec<T>,
    total: u64,
    page: u32,
    /// Page of the most recent fetch, applied or not; what `retry` asks for.
    requested_page: u32,
    limit: u32,
    filter: F,
    sort: Option<S>,
    state: LoadState,
    error: Option<String>,
    seq: u64,
    disposed: bool,
}

impl<T, F, S> ListViewModel<T, F, S>
where
    T: Record,
    F: Filter<T> + Default,
    S: Sorter<T>,
{
    /// An idle view with a fixed page size. A zero size is bumped to 1.
    pub fn new(limit: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            requested_page: 1,
            limit: limit.max(1),
            filter: F::default(),
            sort: None,
            state: LoadState::Idle,
            error: None,
            seq: 0,
            disposed: false,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Display message of the last failed fetch, cleared on success.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn sort(&self) -> Option<&S> {
        self.sort.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// `max(1, ceil(total / limit))`.
    pub fn total_pages(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.limit)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// The query a fetch of `page` would send, including server-side filter params.
    pub fn query(&self, page: u32) -> ListQuery {
        ListQuery::new(page, self.limit).with_params(self.filter.query_params())
    }

    /// Start a fetch of `page`. Any ticket issued earlier becomes stale.
    /// The current page only moves once the fetch is applied.
    pub fn begin_fetch(&mut self, page: u32) -> FetchTicket {
        self.seq += 1;
        self.requested_page = page.max(1);
        self.state = LoadState::Loading;
        FetchTicket {
            seq: self.seq,
            page: self.requested_page,
        }
    }

    /// Apply a fetch result if `ticket` is still the latest one.
    ///
    /// On failure the previous items stay visible and the error message is
    /// recorded for display.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Page<T>, ApiError>,
    ) -> FetchOutcome {
        if self.disposed || ticket.seq != self.seq {
            tracing::debug!(
                page = ticket.page,
                disposed = self.disposed,
                "Dropping stale fetch completion"
            );
            return FetchOutcome::Stale;
        }
        match result {
            Ok(page) => {
                self.items = page.items;
                self.total = page.total;
                self.page = ticket.page;
                self.error = None;
                self.state = LoadState::Ready;
                FetchOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(page = ticket.page, error = %e, "Failed to load page");
                self.error = Some(e.user_message());
                self.state = LoadState::Errored;
                FetchOutcome::Failed
            }
        }
    }

    async fn fetch<C>(&mut self, page: u32, source: &C) -> FetchOutcome
    where
        C: CollectionSource<T> + ?Sized,
    {
        let ticket = self.begin_fetch(page);
        let query = self.query(ticket.page);
        let result = source.fetch_page(&query).await;
        self.complete_fetch(ticket, result)
    }

    /// Fetch the current page.
    pub async fn load<C>(&mut self, source: &C) -> FetchOutcome
    where
        C: CollectionSource<T> + ?Sized,
    {
        self.fetch(self.page, source).await
    }

    /// Move to `page`, clamped to `1..=total_pages`, and fetch it.
    pub async fn set_page<C>(&mut self, page: u32, source: &C) -> FetchOutcome
    where
        C: CollectionSource<T> + ?Sized,
    {
        let page = page.clamp(1, self.total_pages());
        self.fetch(page, source).await
    }

    /// Re-issue the last fetch. Only ever triggered by the user.
    pub async fn retry<C>(&mut self, source: &C) -> FetchOutcome
    where
        C: CollectionSource<T> + ?Sized,
    {
        self.fetch(self.requested_page, source).await
    }

    /// Replace the filter. Does not reset the page or refetch.
    pub fn set_filter(&mut self, filter: F) {
        self.filter = filter;
    }

    /// Replace the sort. `None` keeps the fetched order.
    pub fn set_sort(&mut self, sort: Option<S>) {
        self.sort = sort;
    }

    /// Filtered, then stably sorted view of the current page.
    pub fn visible_items(&self) -> impl Iterator<Item = &T> + '_ {
        let mut visible: Vec<&T> = self
            .items
            .iter()
            .filter(|item| self.filter.matches(item))
            .collect();
        if let Some(sort) = &self.sort {
            visible.sort_by(|a, b| sort.compare(a, b));
        }
        visible.into_iter()
    }

    /// Stop accepting fetch results; the view is going away.
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    pub(crate) fn items_mut(&mut self) -> &mut Vec<T> {
        &mut self.items
    }

    pub(crate) fn set_total(&mut self, total: u64) {
        self.total = total;
    }
}
