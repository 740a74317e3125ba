//! Incremental ("infinite scroll") accumulation of paginated results.
//!
//! One [`InfiniteScroll`] is one accumulation run: page 0 seeds the list and
//! each continuation appends the next page at the tail. Loads borrow the
//! state mutably, so a continuation cannot start while another is pending.
//!
//! The backend's `total` is trusted as reported. When it moves between two
//! pages (rows created or deleted server-side) the newest value wins; items
//! may then be duplicated or skipped across the page boundary.
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::fetch::search;
use super::query::{Filter, SearchParameters, Sort};
use crate::api::Transport;
use crate::error::FetchError;

/// Whether items remain after `page_index` pages of `page_size` (0-based).
pub fn has_more(total: u64, page_size: u32, page_index: u32) -> bool {
    total > u64::from(page_size) * (u64::from(page_index) + 1)
}

#[derive(Debug, Clone)]
pub struct InfiniteScroll<T> {
    path: String,
    params: SearchParameters,
    items: Vec<T>,
    total: Option<u64>,
    has_more: bool,
    loaded: bool,
}

impl<T: DeserializeOwned> InfiniteScroll<T> {
    pub fn new(path: impl Into<String>, page_size: u32) -> Self {
        Self {
            path: path.into(),
            params: SearchParameters::new(page_size, 0),
            items: Vec::new(),
            total: None,
            has_more: true,
            loaded: false,
        }
    }

    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.params.filters = filters;
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.params.sort = Some(sort);
        self
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Index of the last page appended; meaningless before the first load.
    pub fn page(&self) -> u32 {
        self.params.page
    }

    pub fn page_size(&self) -> u32 {
        self.params.size
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Drops everything accumulated and starts a new run with new criteria.
    pub fn reset(&mut self, filters: Vec<Filter>, sort: Option<Sort>) {
        self.params = SearchParameters {
            filters,
            sort,
            ..SearchParameters::new(self.params.size, 0)
        };
        self.items.clear();
        self.total = None;
        self.has_more = true;
        self.loaded = false;
    }

    /// Fetches page 0 and replaces the accumulated list with it.
    #[instrument(skip_all, fields(path = %self.path))]
    pub async fn load_initial<C>(&mut self, transport: &C) -> Result<(), FetchError>
    where
        C: Transport + ?Sized,
    {
        let params = self.params.at_page(0);
        let page = search::<T, C>(transport, &self.path, Some(&params)).await?;
        debug!(total = page.total, received = page.data.len(), "initial page loaded");
        self.params = params;
        self.items = page.data;
        self.record_total(page.total);
        self.loaded = true;
        Ok(())
    }

    /// Appends the next page. On failure nothing changes, so the same page is
    /// requested again by the next call.
    #[instrument(skip_all, fields(path = %self.path, page = self.params.page + 1))]
    pub async fn load_more<C>(&mut self, transport: &C) -> Result<(), FetchError>
    where
        C: Transport + ?Sized,
    {
        if !self.loaded {
            return self.load_initial(transport).await;
        }
        if !self.has_more {
            debug!("no further pages");
            return Ok(());
        }
        let params = self.params.at_page(self.params.page + 1);
        let page = search::<T, C>(transport, &self.path, Some(&params)).await?;
        debug!(total = page.total, received = page.data.len(), "page appended");
        self.params = params;
        self.items.extend(page.data);
        self.record_total(page.total);
        Ok(())
    }

    fn record_total(&mut self, total: u64) {
        if let Some(previous) = self.total {
            if previous != total {
                warn!(previous, total, "reported total changed during accumulation");
            }
        }
        self.total = Some(total);
        self.has_more = has_more(total, self.params.size, self.params.page);
    }
}
