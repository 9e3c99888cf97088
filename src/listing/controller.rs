use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::api::{ApiError, PageFetcher};
use crate::listing::query::ListQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListTimings {
    pub search_debounce: Duration,
}

impl Default for ListTimings {
    fn default() -> Self {
        Self {
            search_debounce: Duration::from_millis(300),
        }
    }
}

/// Snapshot of what a list screen renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
    pub error: Option<String>,
    pub loading: bool,
    pub loaded: bool,
}

struct ListState<T> {
    query: ListQuery,
    view: ListView<T>,
    seq: u64,
    search_timer: Option<JoinHandle<()>>,
    search_generation: u64,
}

impl<T> ListState<T> {
    fn cancel_search(&mut self) {
        self.search_generation += 1;
        if let Some(handle) = self.search_timer.take() {
            handle.abort();
        }
    }
}

struct ListInner<F: PageFetcher> {
    fetcher: F,
    timings: ListTimings,
    state: Mutex<ListState<F::Item>>,
}

impl<F: PageFetcher> ListInner<F> {
    fn lock(&self) -> MutexGuard<'_, ListState<F::Item>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drives one list screen: filters, paging and reloads.
///
/// Text search is debounced; every other change reloads right away. A reload
/// replaces the visible items wholesale. A failed reload keeps whatever was
/// on screen and records the error instead.
pub struct ListController<F: PageFetcher> {
    inner: Arc<ListInner<F>>,
}

impl<F: PageFetcher> Clone for ListController<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: PageFetcher> ListController<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_query(fetcher, ListQuery::default(), ListTimings::default())
    }

    pub fn with_query(fetcher: F, query: ListQuery, timings: ListTimings) -> Self {
        let view = ListView {
            items: Vec::new(),
            page: query.page,
            page_size: query.page_size,
            total: 0,
            total_pages: 0,
            error: None,
            loading: false,
            loaded: false,
        };
        Self {
            inner: Arc::new(ListInner {
                fetcher,
                timings,
                state: Mutex::new(ListState {
                    query,
                    view,
                    seq: 0,
                    search_timer: None,
                    search_generation: 0,
                }),
            }),
        }
    }

    pub fn query(&self) -> ListQuery {
        self.inner.lock().query.clone()
    }

    pub fn view(&self) -> ListView<F::Item> {
        self.inner.lock().view.clone()
    }

    /// Updates the search text and reloads once typing pauses.
    pub fn set_text(&self, q: &str) {
        let mut state = self.inner.lock();
        if !state.query.set_text(q) {
            return;
        }
        state.cancel_search();
        let generation = state.search_generation;
        let delay = self.inner.timings.search_debounce;
        let this = self.clone();
        state.search_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut state = this.inner.lock();
                if state.search_generation != generation {
                    return;
                }
                state.search_timer = None;
            }
            if let Err(e) = this.reload().await {
                debug!(error = %e, "search reload failed");
            }
        }));
    }

    pub async fn set_active_only(&self, active_only: bool) -> Result<bool, ApiError> {
        self.apply(|q| q.set_active_only(active_only)).await
    }

    pub async fn set_brands(&self, ids: Vec<i64>) -> Result<bool, ApiError> {
        self.apply(|q| q.set_brands(ids)).await
    }

    pub async fn set_categories(&self, ids: Vec<i64>) -> Result<bool, ApiError> {
        self.apply(|q| q.set_categories(ids)).await
    }

    pub async fn set_warehouses(&self, ids: Vec<i64>) -> Result<bool, ApiError> {
        self.apply(|q| q.set_warehouses(ids)).await
    }

    pub async fn set_page(&self, page: u32) -> Result<bool, ApiError> {
        self.apply(|q| q.set_page(page)).await
    }

    pub async fn set_page_size(&self, page_size: u32) -> Result<bool, ApiError> {
        self.apply(|q| q.set_page_size(page_size)).await
    }

    async fn apply(&self, change: impl FnOnce(&mut ListQuery) -> bool) -> Result<bool, ApiError> {
        let changed = {
            let mut state = self.inner.lock();
            let changed = change(&mut state.query);
            if changed {
                // the pending search text is already part of the query
                state.cancel_search();
            }
            changed
        };
        if changed {
            self.reload().await?;
        }
        Ok(changed)
    }

    /// Fetches the current query. Results of a reload that has since been
    /// superseded are discarded.
    #[instrument(skip(self))]
    pub async fn reload(&self) -> Result<(), ApiError> {
        let (seq, query) = {
            let mut state = self.inner.lock();
            state.seq += 1;
            state.view.loading = true;
            (state.seq, state.query.clone())
        };

        let result = self.inner.fetcher.fetch_page(&query).await;

        let mut state = self.inner.lock();
        if state.seq != seq {
            debug!(seq, "discarding stale list response");
            return Ok(());
        }
        state.view.loading = false;

        match result {
            Ok(page) => {
                let view = &mut state.view;
                view.items = page.items;
                view.page = page.page;
                view.page_size = page.page_size;
                view.total = page.total;
                view.total_pages = page.total_pages;
                view.error = None;
                view.loaded = true;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, page = query.page, "list reload failed");
                state.view.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::query::Page;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Script {
        calls: Vec<ListQuery>,
        replies: VecDeque<(u64, Result<Vec<&'static str>, String>)>,
    }

    #[derive(Clone, Default)]
    struct FakeFetcher(Arc<Mutex<Script>>);

    impl FakeFetcher {
        fn reply(&self, delay_ms: u64, result: Result<Vec<&'static str>, &str>) {
            self.0
                .lock()
                .unwrap()
                .replies
                .push_back((delay_ms, result.map_err(str::to_string)));
        }

        fn calls(&self) -> Vec<ListQuery> {
            self.0.lock().unwrap().calls.clone()
        }
    }

    impl PageFetcher for FakeFetcher {
        type Item = &'static str;

        async fn fetch_page(&self, query: &ListQuery) -> Result<Page<Self::Item>, ApiError> {
            let (delay, reply) = {
                let mut script = self.0.lock().unwrap();
                script.calls.push(query.clone());
                script.replies.pop_front().unwrap_or((0, Ok(Vec::new())))
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            match reply {
                Ok(items) => Ok(Page {
                    total: items.len() as u64,
                    total_pages: 1,
                    items,
                    page: query.page,
                    page_size: query.page_size,
                }),
                Err(message) => Err(ApiError::Backend { status: 500, message }),
            }
        }
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn text_search_is_debounced() {
        let fetcher = FakeFetcher::default();
        let list = ListController::new(fetcher.clone());

        list.set_text("k");
        advance(100).await;
        list.set_text("ke");
        advance(250).await;
        assert!(fetcher.calls().is_empty());

        advance(100).await;
        let calls = fetcher.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].q, "ke");
    }

    #[tokio::test(start_paused = true)]
    async fn filter_change_resets_page_and_reloads_once() {
        let fetcher = FakeFetcher::default();
        let list = ListController::new(fetcher.clone());

        assert!(list.set_page(3).await.unwrap());
        assert!(list.set_brands(vec![5]).await.unwrap());

        let calls = fetcher.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].page, 3);
        assert_eq!(calls[1].page, 1);
        assert_eq!(calls[1].brand_ids, vec![5]);

        assert!(!list.set_brands(vec![5]).await.unwrap());
        assert_eq!(fetcher.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn filter_change_absorbs_pending_search() {
        let fetcher = FakeFetcher::default();
        let list = ListController::new(fetcher.clone());

        list.set_text("tea");
        list.set_active_only(true).await.unwrap();
        advance(1000).await;

        let calls = fetcher.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].q, "tea");
        assert!(calls[0].active_only);
    }

    #[tokio::test(start_paused = true)]
    async fn page_change_absorbs_pending_search() {
        let fetcher = FakeFetcher::default();
        let list = ListController::new(fetcher.clone());

        list.set_text("tea");
        list.set_page(2).await.unwrap();
        list.set_page_size(50).await.unwrap();
        advance(1000).await;

        let calls = fetcher.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].q, "tea");
        assert_eq!(calls[0].page, 2);
        assert_eq!(calls[1].page_size, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_reload_keeps_previous_items() {
        let fetcher = FakeFetcher::default();
        fetcher.reply(0, Ok(vec!["a", "b"]));
        fetcher.reply(0, Err("timeout talking to catalog"));
        let list = ListController::new(fetcher.clone());

        list.reload().await.unwrap();
        assert!(list.set_page(2).await.is_err());

        let view = list.view();
        assert_eq!(view.items, vec!["a", "b"]);
        assert_eq!(view.error.as_deref(), Some("timeout talking to catalog"));
        assert!(!view.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_first_load_stays_empty() {
        let fetcher = FakeFetcher::default();
        fetcher.reply(0, Err("nope"));
        let list = ListController::new(fetcher);

        assert!(list.reload().await.is_err());
        let view = list.view();
        assert!(view.items.is_empty());
        assert!(!view.loaded);
        assert_eq!(view.error.as_deref(), Some("nope"));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_is_discarded() {
        let fetcher = FakeFetcher::default();
        fetcher.reply(500, Ok(vec!["old"]));
        fetcher.reply(10, Ok(vec!["new"]));
        let list = ListController::new(fetcher);

        let slow = {
            let list = list.clone();
            tokio::spawn(async move { list.reload().await })
        };
        advance(1).await;
        list.set_page(2).await.unwrap();
        slow.await.unwrap().unwrap();

        let view = list.view();
        assert_eq!(view.items, vec!["new"]);
        assert_eq!(view.page, 2);
    }
}
