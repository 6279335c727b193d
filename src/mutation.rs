//! Optimistic Mutation Coordinator.
//!
//! "Optimistic" here means post-acknowledgment: the local collection is
//! patched only after the server confirmed the write, without refetching the
//! page. A failed write leaves the collection exactly as it was and hands the
//! error back to the caller.

use futures::future::join_all;

use crate::api::resource::RemoveSource;
use crate::errors::ApiError;
use crate::list::ListViewModel;
use crate::list::criteria::{Filter, Sorter};
use crate::models::Record;

/// Side effect of a confirmed removal the caller may want to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveEffect {
    /// The current page is now empty while earlier pages exist; the caller
    /// decides whether to step back.
    pub page_emptied: bool,
}

/// Per-item result of a bulk deletion.
#[derive(Debug, Default)]
pub struct BulkOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, ApiError)>,
}

impl BulkOutcome {
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Applies confirmed writes to one list.
pub struct MutationCoordinator<'a, T, F, S> {
    list: &'a mut ListViewModel<T, F, S>,
}

impl<'a, T, F, S> MutationCoordinator<'a, T, F, S>
where
    T: Record,
    F: Filter<T> + Default,
    S: Sorter<T>,
{
    pub fn new(list: &'a mut ListViewModel<T, F, S>) -> Self {
        Self { list }
    }

    /// Append a freshly created record and bump the total.
    pub fn confirm_created(&mut self, result: Result<T, ApiError>) -> Result<(), ApiError> {
        let record = result?;
        if record.id().is_none() {
            tracing::warn!(label = record.label(), "Server confirmed a creation without an id");
        }
        self.list.items_mut().push(record);
        let total = self.list.total() + 1;
        self.list.set_total(total);
        Ok(())
    }

    /// Replace a record in place, keeping its position. Returns whether the
    /// record was on the current page.
    pub fn confirm_updated(&mut self, result: Result<T, ApiError>) -> Result<bool, ApiError> {
        let record = result?;
        let Some(id) = record.id().map(str::to_string) else {
            return Ok(false);
        };
        match self.list.items_mut().iter_mut().find(|item| item.has_id(&id)) {
            Some(slot) => {
                *slot = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Apply `patch` to the local copy of `id` after an ack that carried no
    /// usable body (status toggles, stock edits).
    pub fn confirm_patched<P>(
        &mut self,
        id: &str,
        result: Result<(), ApiError>,
        patch: P,
    ) -> Result<bool, ApiError>
    where
        P: FnOnce(&mut T),
    {
        result?;
        match self.list.items_mut().iter_mut().find(|item| item.has_id(id)) {
            Some(item) => {
                patch(item);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drop `id` from the page and decrement the total.
    pub fn confirm_removed(
        &mut self,
        id: &str,
        result: Result<(), ApiError>,
    ) -> Result<RemoveEffect, ApiError> {
        result?;
        self.remove_local(id);
        Ok(RemoveEffect {
            page_emptied: self.list.items().is_empty() && self.list.page() > 1,
        })
    }

    fn remove_local(&mut self, id: &str) {
        self.list.items_mut().retain(|item| !item.has_id(id));
        let total = self.list.total().saturating_sub(1);
        self.list.set_total(total);
    }

    /// Delete every id concurrently and wait for all of them.
    ///
    /// Only individually confirmed ids leave the collection; failures are
    /// reported alongside their error.
    pub async fn bulk_remove<R>(&mut self, source: &R, ids: &[String]) -> BulkOutcome
    where
        R: RemoveSource + ?Sized,
    {
        let results = join_all(ids.iter().map(|id| source.remove_one(id))).await;

        let mut outcome = BulkOutcome::default();
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(()) => {
                    self.remove_local(id);
                    outcome.succeeded.push(id.clone());
                }
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "Bulk delete item failed");
                    outcome.failed.push((id.clone(), e));
                }
            }
        }
        outcome
    }
}
